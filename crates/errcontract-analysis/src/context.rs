//! The analysis context: configuration, loaded program, type checker, and the
//! per-endpoint identifier set cache. Built once per run and passed by
//! reference to every component.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use errcontract_core::errors::AnalysisError;
use errcontract_core::types::collections::FxHashMap;
use errcontract_core::ContractConfig;

use crate::checker::{DeclRef, TypeChecker};
use crate::contract::classifier::EndpointDecl;
use crate::contract::metadata::{self, ErrorIdSet};
use crate::project::{normalize_path, FileId, Project};

pub struct AnalysisContext {
    config: ContractConfig,
    checker: TypeChecker,
    endpoint_base: PathBuf,
    id_sets: RefCell<FxHashMap<DeclRef, Arc<ErrorIdSet>>>,
}

impl AnalysisContext {
    /// Load the project under `root` and build the context around it.
    pub fn new(root: &Path, config: ContractConfig) -> Result<Self, AnalysisError> {
        let project = Project::load(root, &config)?;
        Ok(Self::from_project(project, config))
    }

    pub fn from_project(project: Project, config: ContractConfig) -> Self {
        let endpoint_base = normalize_path(&config.endpoint_base_path(project.root()));
        tracing::debug!(endpoint_base = %endpoint_base.display(), "analysis context ready");
        Self {
            config,
            checker: TypeChecker::new(project),
            endpoint_base,
            id_sets: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    pub fn checker(&self) -> &TypeChecker {
        &self.checker
    }

    pub fn project(&self) -> &Project {
        self.checker.project()
    }

    /// Absolute path of the file endpoint base classes must be declared in.
    pub fn endpoint_base(&self) -> &Path {
        &self.endpoint_base
    }

    /// The endpoint base file, when it is part of the loaded program.
    pub fn endpoint_base_file(&self) -> Option<FileId> {
        self.project().file_id(&self.endpoint_base)
    }

    /// Constructor name every thrown error must use.
    pub fn sanctioned_class(&self) -> &str {
        self.config.analysis.effective_error_class()
    }

    /// Permitted identifiers of `endpoint`, resolved on first request.
    pub fn error_ids(&self, endpoint: &EndpointDecl) -> Arc<ErrorIdSet> {
        let key = endpoint.decl();
        if let Some(cached) = self.id_sets.borrow().get(&key) {
            return Arc::clone(cached);
        }
        let ids = Arc::new(metadata::resolve_error_ids(&self.checker, endpoint));
        self.id_sets.borrow_mut().insert(key, Arc::clone(&ids));
        ids
    }

    /// Number of endpoints whose identifier sets have been resolved.
    pub fn resolved_endpoints(&self) -> usize {
        self.id_sets.borrow().len()
    }
}
