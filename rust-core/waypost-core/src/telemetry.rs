//! # Tracing Setup

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
const DEFAULT_DIRECTIVE: &str = "waypost_core=info";

/// Install a JSON `fmt` subscriber filtered by `RUST_LOG`
///
/// Safe to call more than once; later calls are no-ops. Returns whether
/// this call installed the subscriber.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init()
        .is_ok()
}
