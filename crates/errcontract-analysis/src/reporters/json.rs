//! JSON reporter: structured output for tooling.

use serde_json::json;

use super::Reporter;
use crate::contract::AnalysisReport;

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, report: &AnalysisReport) -> Result<String, String> {
        let diagnostics: Vec<serde_json::Value> = report
            .diagnostics
            .iter()
            .map(|d| {
                json!({
                    "source_path": d.source_path.display().to_string(),
                    "start_line": d.start_line,
                    "end_line": d.end_line,
                    "start_offset": d.start_offset,
                    "end_offset": d.end_offset,
                    "kind": d.kind.code(),
                    "message": d.message,
                })
            })
            .collect();

        let output = json!({
            "total": report.diagnostics.len(),
            "files_analyzed": report.files_analyzed,
            "endpoints": report.endpoints,
            "diagnostics": diagnostics,
        });

        serde_json::to_string_pretty(&output).map_err(|e| e.to_string())
    }
}
