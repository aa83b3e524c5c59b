//! Exponential backoff with jitter.
//!
//! The delay before retry number `n` (1-based count of failed attempts so far):
//!
//! ```text
//! nominal(n) = min(base * 2^(n-1), max)
//! delay(n)   = nominal(n) - U[0, nominal(n) / 10)
//! ```
//!
//! Jitter only ever shortens the nominal delay, so `max` is a hard ceiling.

use std::time::Duration;

use rand::Rng;

/// Capped exponential backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base: Duration,
    max: Duration,
    jitter: bool,
}

impl ExponentialBackoff {
    /// Create a backoff curve starting at `base` and capped at `max`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max, jitter: true }
    }

    /// Enable or disable jitter.
    pub fn with_jitter(self, jitter: bool) -> Self {
        Self { jitter, ..self }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn jitter(&self) -> bool {
        self.jitter
    }

    /// Delay to wait after `attempt` failed attempts.
    pub fn delay(&self, attempt: u32) -> Duration {
        let nominal = calculate_backoff(attempt, self.base, self.max);
        if !self.jitter {
            return nominal;
        }

        let jitter_range = nominal.as_millis() as u64 / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };
        nominal.saturating_sub(Duration::from_millis(jitter))
    }
}

/// Calculate the capped exponential delay without jitter.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponential_base = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(exponential_base).min(max)
}
