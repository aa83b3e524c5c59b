//! Metrics recording.
//!
//! # Responsibilities
//! - Define client metrics (calls, latency, retries)
//! - Record through the `metrics` facade; the application installs the recorder
//!
//! # Metrics
//! - `cache_client_requests_total` (counter): calls by operation, outcome
//! - `cache_client_request_duration_seconds` (histogram): end-to-end call latency
//! - `cache_client_retries_total` (counter): retries by operation, error kind

use tokio::time::Instant;

use crate::errors::ErrorKind;

/// Record a finished call. `outcome` is `"ok"` or an error kind label.
pub fn record_call(operation: &'static str, outcome: &'static str, started: Instant) {
    ::metrics::counter!(
        "cache_client_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!(
        "cache_client_request_duration_seconds",
        "operation" => operation
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record a retry about to be scheduled.
pub fn record_retry(operation: &'static str, kind: ErrorKind) {
    ::metrics::counter!(
        "cache_client_retries_total",
        "operation" => operation,
        "kind" => kind.as_str()
    )
    .increment(1);
}
