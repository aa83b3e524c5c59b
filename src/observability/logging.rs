//! Structured logging.
//!
//! # Responsibilities
//! - Initialize a `tracing` subscriber for applications that want one
//! - Respect `RUST_LOG`, falling back to a caller supplied directive

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "cache_client=info";

/// Install a global fmt subscriber with an env filter.
///
/// Returns an error if a global subscriber is already installed.
pub fn init(default_directive: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
