//! Configuration file schema.
//!
//! Every field has a default so a minimal (or empty) file is valid.
//! Durations are plain integers in milliseconds and may be negative on
//! input; the validator reports them instead of the parser.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::middleware::{LoggingMiddleware, MetricsMiddleware, Middleware, MiddlewareChain};
use crate::resilience::retries::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
use crate::resilience::timeouts::DEFAULT_CLIENT_TIMEOUT;
use crate::resilience::{
    ChannelConfig, ExponentialBackoff, FixedCountRetryStrategy, NoRetryStrategy, RetryStrategy,
    TransportStrategy,
};

/// Root of a client configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ClientConfigFile {
    pub retry: RetryConfig,
    pub transport: TransportConfig,
    pub middleware: MiddlewareConfig,
}

/// `[retry]` table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// When false, every call is attempted exactly once.
    pub enabled: bool,

    /// Total attempts per call, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY.as_millis() as u64,
            max_delay_ms: DEFAULT_MAX_DELAY.as_millis() as u64,
            jitter: true,
        }
    }
}

/// `[transport]` table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-call time budget in milliseconds.
    pub client_timeout_ms: i64,
    pub max_concurrent_streams: u32,
    pub keepalive_interval_ms: u64,
    pub keepalive_timeout_ms: u64,
    pub max_message_size_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        let channel = ChannelConfig::default();
        Self {
            client_timeout_ms: DEFAULT_CLIENT_TIMEOUT.as_millis() as i64,
            max_concurrent_streams: channel.max_concurrent_streams,
            keepalive_interval_ms: channel.keepalive_interval.as_millis() as u64,
            keepalive_timeout_ms: channel.keepalive_timeout.as_millis() as u64,
            max_message_size_bytes: channel.max_message_size_bytes,
        }
    }
}

/// `[middleware]` table: which built-in middlewares to install.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MiddlewareConfig {
    pub logging: bool,
    pub metrics: bool,
}

impl RetryConfig {
    pub fn strategy(&self) -> Arc<dyn RetryStrategy> {
        if !self.enabled {
            return Arc::new(NoRetryStrategy);
        }
        let backoff = ExponentialBackoff::new(
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
        .with_jitter(self.jitter);
        Arc::new(FixedCountRetryStrategy::new(self.max_attempts).with_backoff(backoff))
    }
}

impl TransportConfig {
    pub fn strategy(&self) -> TransportStrategy {
        let channel = ChannelConfig {
            max_concurrent_streams: self.max_concurrent_streams,
            keepalive_interval: Duration::from_millis(self.keepalive_interval_ms),
            keepalive_timeout: Duration::from_millis(self.keepalive_timeout_ms),
            max_message_size_bytes: self.max_message_size_bytes,
        };
        TransportStrategy::default()
            .with_client_timeout_millis(self.client_timeout_ms)
            .with_channel(channel)
    }
}

impl MiddlewareConfig {
    /// Logging runs outside metrics.
    pub fn chain(&self) -> MiddlewareChain {
        let mut middlewares: Vec<Arc<dyn Middleware>> = Vec::new();
        if self.logging {
            middlewares.push(Arc::new(LoggingMiddleware));
        }
        if self.metrics {
            middlewares.push(Arc::new(MetricsMiddleware::new()));
        }
        MiddlewareChain::new(middlewares)
    }
}

impl ClientConfigFile {
    /// Build the runtime configuration. Does not validate.
    pub fn into_configuration(&self) -> Configuration {
        Configuration::new(
            self.retry.strategy(),
            self.transport.strategy(),
            self.middleware.chain(),
        )
    }
}
