//! Structured logging for the binaries
//!
//! Filter directives come from `GARNET_LOG` (for example
//! `GARNET_LOG=garnet_runtime=debug`). Logs go to stderr so stdout stays
//! the program's output.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "GARNET_LOG";

/// Install the global subscriber; later calls are no-ops
pub fn init() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_writer(std::io::stderr)
        .try_init();
}
