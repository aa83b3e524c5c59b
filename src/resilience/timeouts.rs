//! Timeout enforcement.
//!
//! # Responsibilities
//! - Hold the per-call client timeout and channel tuning parameters
//! - Turn the client timeout into a deadline fixed at call start
//! - Report the budget left for transport invocations and backoff sleeps
//!
//! # Design Decisions
//! - Uses Tokio's clock so paused-time tests drive deadlines deterministically
//! - One deadline per logical call; retries consume it and never reset it

use std::time::Duration;

use tokio::time::Instant;

/// Default per-call timeout.
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest accepted per-call timeout.
pub const MAX_CLIENT_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Channel-level tuning, passed through to the transport untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub max_concurrent_streams: u32,
    pub keepalive_interval: Duration,
    pub keepalive_timeout: Duration,
    pub max_message_size_bytes: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_concurrent_streams: 100,
            keepalive_interval: Duration::from_secs(5),
            keepalive_timeout: Duration::from_secs(1),
            max_message_size_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Per-call timeout plus channel tuning.
///
/// The `with_*` methods never fail; a non-positive timeout is rejected when
/// the owning configuration is validated at client construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportStrategy {
    client_timeout: Duration,
    channel: ChannelConfig,
}

impl TransportStrategy {
    /// Create a strategy with the given per-call timeout and default channel settings.
    pub fn new(client_timeout: Duration) -> Self {
        Self { client_timeout, channel: ChannelConfig::default() }
    }

    /// Total time budget for one logical call, shared by all its attempts.
    pub fn client_timeout(&self) -> Duration {
        self.client_timeout
    }

    pub fn channel(&self) -> &ChannelConfig {
        &self.channel
    }

    /// Copy with a different client timeout.
    pub fn with_client_timeout(&self, client_timeout: Duration) -> Self {
        Self { client_timeout, channel: self.channel.clone() }
    }

    /// Copy with a client timeout given in milliseconds.
    ///
    /// Negative values are recorded as zero so that validation rejects them.
    pub fn with_client_timeout_millis(&self, millis: i64) -> Self {
        self.with_client_timeout(Duration::from_millis(millis.max(0) as u64))
    }

    /// Copy with different channel settings.
    pub fn with_channel(&self, channel: ChannelConfig) -> Self {
        Self { client_timeout: self.client_timeout, channel }
    }

    /// Returns an error message if the timeout is not positive or exceeds
    /// [`MAX_CLIENT_TIMEOUT`].
    pub fn validate(&self) -> Result<(), String> {
        if self.client_timeout.is_zero() {
            return Err("client timeout must be a positive duration".to_string());
        }
        if self.client_timeout > MAX_CLIENT_TIMEOUT {
            return Err(format!(
                "client timeout must not exceed {}s",
                MAX_CLIENT_TIMEOUT.as_secs()
            ));
        }
        if self.channel.max_message_size_bytes == 0 {
            return Err("max message size must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for TransportStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_TIMEOUT)
    }
}

/// Fixed point in time by which a logical call must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    /// Start a deadline `budget` from now.
    ///
    /// Budgets above [`MAX_CLIENT_TIMEOUT`] are capped so the deadline is
    /// always representable.
    pub fn after(budget: Duration) -> Self {
        let started = Instant::now();
        let budget = budget.min(MAX_CLIENT_TIMEOUT);
        let at = started.checked_add(budget).unwrap_or(started);
        Self { started, at }
    }

    /// The instant the call must finish by.
    pub fn at(&self) -> Instant {
        self.at
    }

    /// When the call started.
    pub fn started(&self) -> Instant {
        self.started
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Shorten `delay` so that it does not run past the deadline.
    pub fn clip(&self, delay: Duration) -> Duration {
        delay.min(self.remaining())
    }
}
