//! Reporter output formats and exit status.

use std::path::PathBuf;

use errcontract_analysis::contract::{AnalysisReport, Diagnostic};
use errcontract_analysis::reporters::{available_formats, create_reporter, exit_code};
use errcontract_analysis::syntax::Span;
use errcontract_core::config::ReportFormat;

fn span(line: u32) -> Span {
    Span {
        start_line: line,
        end_line: line,
        start_offset: 100,
        end_offset: 140,
    }
}

fn make_report() -> AnalysisReport {
    AnalysisReport {
        diagnostics: vec![
            Diagnostic::wrong_error_class(
                PathBuf::from("/p/src/server/api/endpoints/a.ts"),
                span(12),
                "Error",
                "ApiError",
            ),
            Diagnostic::undeclared_error_id(
                PathBuf::from("/p/src/server/api/endpoints/b.ts"),
                span(7),
            ),
        ],
        files_analyzed: 2,
        endpoints: 2,
    }
}

#[test]
fn test_console_format() {
    let output = create_reporter(ReportFormat::Console)
        .generate(&make_report())
        .unwrap();
    assert_eq!(
        output,
        "/p/src/server/api/endpoints/a.ts:12 : instance of Error is thrown instead of ApiError\n\
         /p/src/server/api/endpoints/b.ts:7 : invalid constructor argument: type of id is not declared in `meta.errors` section. consider add it.\n"
    );
}

#[test]
fn test_console_empty_report_prints_nothing() {
    let output = create_reporter(ReportFormat::Console)
        .generate(&AnalysisReport::default())
        .unwrap();
    assert!(output.is_empty());
}

#[test]
fn test_json_format() {
    let reporter = create_reporter(ReportFormat::Json);
    assert_eq!(reporter.name(), "json");
    let output = reporter.generate(&make_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["files_analyzed"], 2);
    let first = &value["diagnostics"][0];
    assert_eq!(first["kind"], "wrong_error_class");
    assert_eq!(first["source_path"], "/p/src/server/api/endpoints/a.ts");
    assert_eq!(first["start_line"], 12);
    assert_eq!(first["end_line"], 12);
    assert_eq!(first["start_offset"], 100);
    assert_eq!(first["end_offset"], 140);
    assert_eq!(value["diagnostics"][1]["kind"], "undeclared_error_id");
}

#[test]
fn test_exit_codes() {
    assert_eq!(exit_code(&AnalysisReport::default()), 0);
    assert_eq!(exit_code(&make_report()), 1);
}

#[test]
fn test_available_formats_match_factory() {
    for name in available_formats() {
        let format: ReportFormat = name.parse().unwrap();
        assert_eq!(create_reporter(format).name(), *name);
    }
}
