//! Console reporter: one `path:line : message` line per diagnostic.

use super::Reporter;
use crate::contract::AnalysisReport;

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn generate(&self, report: &AnalysisReport) -> Result<String, String> {
        let mut output = String::new();
        for d in &report.diagnostics {
            output.push_str(&format!(
                "{}:{} : {}\n",
                d.source_path.display(),
                d.start_line,
                d.message
            ));
        }
        Ok(output)
    }
}
