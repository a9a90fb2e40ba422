//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset: quiet hosts, chatty engine.
///
/// The groups and view crates emit debug events at their mutation and
/// projection entry points; those are the ones worth seeing by default.
const DEFAULT_DIRECTIVES: &str = "info,splitledger_groups=debug,splitledger_view=debug";

/// Initialize tracing/logging for the process hosting the engine.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // Compact single-line output with targets, so engine events are easy to
    // grep out of a host's log stream. Override via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(true)
        .try_init();
}
