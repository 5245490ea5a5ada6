//! Project loading: build configuration, file discovery, parsing, and the
//! module graph between the loaded files.

pub mod resolve;
pub mod source_kind;
pub mod tsconfig;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Instant;

use errcontract_core::errors::{AnalysisError, ParseError, ProjectError};
use errcontract_core::types::collections::{FxHashMap, FxHashSet};
use errcontract_core::ContractConfig;

use crate::syntax::ast::{ExportDecl, Item};
use crate::syntax::{SourceFile, TsParser};

pub use resolve::{normalize_path, ModuleResolver, ModuleTarget};
pub use source_kind::SourceKind;
pub use tsconfig::{CompilerOptions, TsConfig};

/// Index of a loaded file. Files are numbered in sorted path order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How an import specifier resolved, relative to the loaded program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    File(FileId),
    /// Outside the project (bare package specifier).
    External,
    /// Should be in the project but was not found or not loaded.
    Unresolved,
}

/// The loaded, parsed program.
pub struct Project {
    root: PathBuf,
    tsconfig: TsConfig,
    resolver: ModuleResolver,
    files: Vec<SourceFile>,
    by_path: FxHashMap<PathBuf, FileId>,
    /// Resolved import specifiers per file.
    imports: Vec<FxHashMap<String, ImportTarget>>,
}

impl Project {
    /// Load the program described by the configured build configuration
    /// under `root`.
    pub fn load(root: &Path, config: &ContractConfig) -> Result<Self, AnalysisError> {
        let start = Instant::now();
        let root = std::fs::canonicalize(root).map_err(|_| ProjectError::RootNotFound {
            path: root.to_path_buf(),
        })?;
        if !root.is_dir() {
            return Err(ProjectError::RootNotFound { path: root }.into());
        }

        let tsconfig = TsConfig::load(&config.tsconfig_path(&root))?;
        let resolver = ModuleResolver::new(&tsconfig.compiler_options);
        let root_files = tsconfig.root_files()?;
        if root_files.is_empty() {
            return Err(ProjectError::NoSourceFiles {
                path: tsconfig.path.clone(),
            }
            .into());
        }

        let follow_imports = config.project.effective_follow_imports();
        let mut parser = TsParser::new()?;
        let mut parsed: FxHashMap<PathBuf, SourceFile> = FxHashMap::default();
        let mut queue: VecDeque<PathBuf> = root_files.into_iter().collect();
        let mut seen: FxHashSet<PathBuf> = queue.iter().cloned().collect();

        while let Some(path) = queue.pop_front() {
            let file = parse_file(&mut parser, &path)?;
            if follow_imports {
                for specifier in module_specifiers(&file) {
                    if let ModuleTarget::File(target) = resolver.resolve(specifier, &path) {
                        if seen.insert(target.clone()) {
                            tracing::trace!(from = %path.display(), to = %target.display(), "following import");
                            queue.push_back(target);
                        }
                    }
                }
            }
            parsed.insert(path, file);
        }

        let mut paths: Vec<PathBuf> = parsed.keys().cloned().collect();
        paths.sort();
        let mut files = Vec::with_capacity(paths.len());
        let mut by_path = FxHashMap::default();
        for (i, path) in paths.into_iter().enumerate() {
            if let Some(file) = parsed.remove(&path) {
                by_path.insert(path, FileId(i as u32));
                files.push(file);
            }
        }

        let imports = files
            .iter()
            .map(|file| {
                module_specifiers(file)
                    .map(|specifier| {
                        let target = match resolver.resolve(specifier, &file.path) {
                            ModuleTarget::File(path) => by_path
                                .get(&path)
                                .map(|id| ImportTarget::File(*id))
                                .unwrap_or(ImportTarget::Unresolved),
                            ModuleTarget::External => ImportTarget::External,
                            ModuleTarget::Missing => ImportTarget::Unresolved,
                        };
                        (specifier.to_string(), target)
                    })
                    .collect()
            })
            .collect();

        tracing::info!(
            root = %root.display(),
            files = files.len(),
            strict_null_checks = tsconfig.compiler_options.effective_strict_null_checks(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "project loaded"
        );

        Ok(Self {
            root,
            tsconfig,
            resolver,
            files,
            by_path,
            imports,
        })
    }

    /// Canonical project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tsconfig(&self) -> &TsConfig {
        &self.tsconfig
    }

    pub fn resolver(&self) -> &ModuleResolver {
        &self.resolver
    }

    pub fn strict_null_checks(&self) -> bool {
        self.tsconfig.compiler_options.effective_strict_null_checks()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in sorted path order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (FileId(i as u32), file))
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.index()]
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.by_path.get(&normalize_path(path)).copied()
    }

    /// Where `specifier`, imported from `from`, leads.
    pub fn import_target(&self, from: FileId, specifier: &str) -> ImportTarget {
        self.imports
            .get(from.index())
            .and_then(|map| map.get(specifier))
            .copied()
            .unwrap_or(ImportTarget::Unresolved)
    }

    /// Global script files: no import or export syntax, so their top-level
    /// declarations are visible everywhere.
    pub fn global_scripts(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files().filter(|(_, file)| !file.is_module())
    }
}

fn parse_file(parser: &mut TsParser, path: &Path) -> Result<SourceFile, AnalysisError> {
    let bytes = std::fs::read(path).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let source = String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok(parser.parse(&source, path)?)
}

/// Every module specifier a file mentions in imports and re-exports.
fn module_specifiers(file: &SourceFile) -> impl Iterator<Item = &str> {
    file.items.iter().filter_map(|item| match item {
        Item::Import(import) => Some(import.source.as_str()),
        Item::Export(ExportDecl::Named {
            source: Some(source),
            ..
        }) => Some(source.as_str()),
        Item::Export(ExportDecl::All { source, .. }) => Some(source.as_str()),
        _ => None,
    })
}
