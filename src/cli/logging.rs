//! Diagnostic logging for the CLI
//!
//! The library emits `tracing` events; this installs a subscriber that writes
//! them to stderr so stdout stays clean for command output (and JSON).
//!
//! - `--verbose`: `debug` for this crate, `warn` for everything else
//! - otherwise `RUST_LOG` if set (e.g. `RUST_LOG=crease_cli=info`)
//! - otherwise `warn`

use tracing_subscriber::{fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(format!("{},crease_cli=debug", DEFAULT_LOG_LEVEL))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    // A subscriber may already be installed, e.g. by a test harness
    let _ = Registry::default().with(filter).with(layer).try_init();
}
