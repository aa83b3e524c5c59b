//! Retry strategies.
//!
//! # Responsibilities
//! - Decide which error kinds are worth retrying
//! - Bound the number of transport invocations per logical call
//! - Compute the delay before the next attempt
//!
//! # Design Decisions
//! - Strategies are stateless; every call tracks its own attempt counter
//! - Only `Unavailable` and `Internal` are retried by default
//! - Idempotency is checked by the pipeline before a strategy is consulted
//! - Delays are clipped to the call's remaining deadline by the pipeline

use std::fmt;
use std::time::Duration;

use crate::errors::ErrorKind;
use crate::resilience::backoff::ExponentialBackoff;

/// Default number of transport invocations per call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default first retry delay.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default ceiling for a single retry delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Kinds retried by the built-in strategies.
pub fn is_transient(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Unavailable | ErrorKind::Internal)
}

/// Pure retry decision function.
pub trait RetryStrategy: Send + Sync + fmt::Debug {
    /// Total transport invocations allowed per call, including the first.
    fn max_attempts(&self) -> u32;

    /// Whether a failure of this kind may be retried.
    fn is_retryable(&self, kind: ErrorKind) -> bool {
        is_transient(kind)
    }

    /// Delay before the next attempt, given `attempt` failed attempts so far.
    fn backoff(&self, attempt: u32, kind: ErrorKind) -> Duration;
}

/// Retries transient failures up to a fixed attempt count with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCountRetryStrategy {
    max_attempts: u32,
    backoff: ExponentialBackoff,
}

impl FixedCountRetryStrategy {
    /// Create a strategy allowing `max_attempts` invocations with default backoff.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: ExponentialBackoff::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY),
        }
    }

    /// Replace the backoff curve.
    pub fn with_backoff(self, backoff: ExponentialBackoff) -> Self {
        Self { backoff, ..self }
    }

    pub fn backoff_curve(&self) -> &ExponentialBackoff {
        &self.backoff
    }
}

impl Default for FixedCountRetryStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl RetryStrategy for FixedCountRetryStrategy {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff(&self, attempt: u32, _kind: ErrorKind) -> Duration {
        self.backoff.delay(attempt)
    }
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRetryStrategy;

impl RetryStrategy for NoRetryStrategy {
    fn max_attempts(&self) -> u32 {
        1
    }

    fn is_retryable(&self, _kind: ErrorKind) -> bool {
        false
    }

    fn backoff(&self, _attempt: u32, _kind: ErrorKind) -> Duration {
        Duration::ZERO
    }
}
