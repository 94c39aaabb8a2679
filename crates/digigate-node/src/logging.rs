//! Tracing subscriber configuration for the gateway node.
//!
//! Log levels follow these conventions:
//! - ERROR: Unrecoverable failures, configuration errors
//! - WARN: Dropped or oversized frames, failed transmissions
//! - INFO: Startup, messages addressed to this station, raw-frame log
//! - DEBUG: Gating decisions and per-packet dispatch
//! - TRACE: Wire-level data, raw bytes

use tracing_subscriber::EnvFilter;

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize the tracing subscriber.
///
/// Log level can be controlled via the `RUST_LOG` environment variable and
/// falls back to `default_level` (normally the `[logging]` config value).
/// Logs go to stderr; stdout carries the APRS-IS uplink lines.
pub fn init(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the tracing subscriber with JSON output.
///
/// Activated by setting `RUST_LOG_FORMAT=json`.
pub fn init_json(default_level: &str) {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter(default_level))
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` so that repeated calls are harmless.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("debug"))
        .with_test_writer()
        .try_init();
}
