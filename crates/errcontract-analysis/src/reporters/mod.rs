//! Reporters: output formats for analysis results.

pub mod console;
pub mod json;

use errcontract_core::config::ReportFormat;

use crate::contract::AnalysisReport;

/// Trait for report generation.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, report: &AnalysisReport) -> Result<String, String>;
}

/// Create the reporter for `format`.
pub fn create_reporter(format: ReportFormat) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Console => Box::new(console::ConsoleReporter),
        ReportFormat::Json => Box::new(json::JsonReporter),
    }
}

/// List all available reporter format names.
pub fn available_formats() -> &'static [&'static str] {
    &["console", "json"]
}

/// Process exit status for a completed run: 0 when clean, 1 otherwise.
pub fn exit_code(report: &AnalysisReport) -> i32 {
    if report.is_clean() {
        0
    } else {
        1
    }
}
