//! The endpoint error contract: classify endpoints, resolve their permitted
//! error identifiers, and check every throw site in their files.

pub mod classifier;
pub mod diagnostics;
pub mod metadata;
pub mod scanner;

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use errcontract_core::errors::AnalysisError;
use errcontract_core::ContractConfig;

use crate::context::AnalysisContext;

pub use classifier::{classify_file, EndpointDecl};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use metadata::ErrorIdSet;
pub use scanner::scan_file;

/// Result of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    /// In file path order, then source order.
    pub diagnostics: Vec<Diagnostic>,
    pub files_analyzed: usize,
    pub endpoints: usize,
}

impl AnalysisReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run the contract check over every loaded file in path order.
///
/// Any classification failure aborts the run without a partial report.
pub fn analyze(ctx: &AnalysisContext) -> Result<AnalysisReport, AnalysisError> {
    let start = Instant::now();
    let mut report = AnalysisReport::default();

    for (id, file) in ctx.project().files() {
        let endpoints = classify_file(ctx, id)?;
        if endpoints.is_empty() {
            continue;
        }
        tracing::debug!(file = %file.path.display(), endpoints = endpoints.len(), "checking");

        let resolved: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| {
                let ids = ctx.error_ids(&endpoint);
                (endpoint, ids)
            })
            .collect();
        report.files_analyzed += 1;
        report.endpoints += resolved.len();
        report.diagnostics.extend(scan_file(ctx, id, &resolved));
    }

    tracing::info!(
        files = ctx.project().len(),
        files_analyzed = report.files_analyzed,
        endpoints = report.endpoints,
        diagnostics = report.diagnostics.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "analysis complete"
    );
    Ok(report)
}

/// Load the project under `root` and analyze it.
pub fn run(root: &Path, config: ContractConfig) -> Result<AnalysisReport, AnalysisError> {
    let ctx = AnalysisContext::new(root, config)?;
    analyze(&ctx)
}
