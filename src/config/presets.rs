//! Ready-made configurations for common deployment environments.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Configuration;
use crate::middleware::MiddlewareChain;
use crate::resilience::{
    ExponentialBackoff, FixedCountRetryStrategy, NoRetryStrategy, TransportStrategy,
};

/// Client running on a developer machine talking to a remote region.
pub fn laptop() -> Configuration {
    Configuration::new(
        Arc::new(FixedCountRetryStrategy::new(3)),
        TransportStrategy::new(Duration::from_secs(5)),
        MiddlewareChain::default(),
    )
}

/// Client running in the same region as the service.
pub fn in_region() -> Configuration {
    Configuration::new(
        Arc::new(FixedCountRetryStrategy::new(3)),
        TransportStrategy::new(Duration::from_millis(1100)),
        MiddlewareChain::default(),
    )
}

/// In-region client that prefers failing fast over waiting.
pub fn low_latency() -> Configuration {
    let backoff = ExponentialBackoff::new(Duration::from_millis(20), Duration::from_millis(200));
    Configuration::new(
        Arc::new(FixedCountRetryStrategy::new(3).with_backoff(backoff)),
        TransportStrategy::new(Duration::from_millis(500)),
        MiddlewareChain::default(),
    )
}

/// Local development server: generous timeout, no retries.
pub fn local() -> Configuration {
    Configuration::new(
        Arc::new(NoRetryStrategy),
        TransportStrategy::new(Duration::from_secs(15)),
        MiddlewareChain::default(),
    )
}

pub fn default_configuration() -> Configuration {
    laptop()
}
