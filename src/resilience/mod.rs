//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical call:
//!     → timeouts.rs (client timeout → deadline fixed at call start)
//!     → transport invocation bounded by the remaining budget
//!     → On failure: retries.rs (retryable kind? attempts left? idempotent?)
//!     → backoff.rs (exponential delay with jitter, clipped to the deadline)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every call has a deadline
//! - Retries only for idempotent operations
//! - Retries share the original deadline instead of getting a fresh timeout

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::ExponentialBackoff;
pub use retries::{FixedCountRetryStrategy, NoRetryStrategy, RetryStrategy};
pub use timeouts::{ChannelConfig, Deadline, TransportStrategy, MAX_CLIENT_TIMEOUT};
