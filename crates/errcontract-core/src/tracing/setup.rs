//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "ERRCONTRACT_LOG";

/// Default directives when `ERRCONTRACT_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "errcontract=warn";

/// Initialize the errcontract tracing/logging system.
///
/// Reads `ERRCONTRACT_LOG` for per-module log levels, e.g.
/// `ERRCONTRACT_LOG=errcontract_analysis::contract=debug,errcontract_analysis::project=info`.
///
/// Output goes to stderr so it never interleaves with JSON reports on stdout.
/// Calling this more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
