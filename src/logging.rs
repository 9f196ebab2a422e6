//! Logging setup built on `tracing-subscriber`.
//!
//! `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
//! when verbose output is requested.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber for the binary.
///
/// Logs go to stderr so that stdout stays clean for `--json` output.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Subscriber for tests: debug level, captured by the test harness.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
