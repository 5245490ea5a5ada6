//! `errcontract` binary: checks a TypeScript backend's endpoint error
//! contract and reports violations.
//!
//! Exit status: 0 when no violation was found, 1 when at least one was,
//! 2 when the run aborted (configuration, project load, or an ambiguous
//! endpoint base symbol).

use std::path::PathBuf;
use std::process;

use clap::Parser;

use errcontract_analysis::reporters::{create_reporter, exit_code};
use errcontract_core::config::{CliOverrides, ReportFormat, ScopeMode};
use errcontract_core::{ContractConfig, ErrorCode};

const EXIT_FATAL: i32 = 2;

/// Verify that endpoints only throw errors their metadata declares.
#[derive(Parser, Debug)]
#[command(name = "errcontract", version, about)]
struct Cli {
    /// Project root directory.
    #[arg(long)]
    root: PathBuf,

    /// Configuration file (default: errcontract.toml in the project root).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Build configuration, relative to the root.
    #[arg(long)]
    tsconfig: Option<String>,

    /// File declaring the endpoint base class, relative to the root.
    #[arg(long)]
    endpoint_base: Option<String>,

    /// Name of the only error class endpoints may throw.
    #[arg(long)]
    error_class: Option<String>,

    /// Identifier set used for each throw: `class` or `file`.
    #[arg(long)]
    scope: Option<ScopeMode>,

    /// Output format: `console` or `json`.
    #[arg(long)]
    format: Option<ReportFormat>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            tsconfig: self.tsconfig.clone(),
            endpoint_base: self.endpoint_base.clone(),
            error_class: self.error_class.clone(),
            scope: self.scope,
            format: self.format,
        }
    }
}

fn main() {
    errcontract_core::tracing::init_tracing();
    let cli = Cli::parse();
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let config = match ContractConfig::load(&cli.root, cli.config.as_deref(), Some(&cli.overrides()))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e.coded_string());
            return EXIT_FATAL;
        }
    };
    let format = config.report.effective_format();
    tracing::debug!(root = %cli.root.display(), %format, "starting analysis");

    let report = match errcontract_analysis::run(&cli.root, config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e.coded_string());
            return EXIT_FATAL;
        }
    };

    let reporter = create_reporter(format);
    match reporter.generate(&report) {
        Ok(output) => match format {
            ReportFormat::Console => eprint!("{output}"),
            ReportFormat::Json => println!("{output}"),
        },
        Err(e) => {
            eprintln!("error: {} reporter failed: {e}", reporter.name());
            return EXIT_FATAL;
        }
    }
    exit_code(&report)
}
