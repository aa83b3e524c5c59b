//! Call metrics middleware.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::errors::ErrorKind;
use crate::middleware::{InboundResponse, Middleware};
use crate::observability::metrics;
use crate::pipeline::RequestContext;

/// Per-operation counts observed by [`MetricsMiddleware`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationStats {
    /// Terminal responses observed.
    pub calls: u64,
    /// Terminal responses that were failures.
    pub failures: u64,
    /// Transport attempts across all calls.
    pub attempts: u64,
}

#[derive(Debug, Default)]
struct Tally {
    calls: AtomicU64,
    failures: AtomicU64,
    attempts: AtomicU64,
}

/// Records every terminal response to the `metrics` facade and to an
/// in-process tally that can be read back with [`MetricsMiddleware::snapshot`].
///
/// Clones share the same tally.
#[derive(Debug, Clone, Default)]
pub struct MetricsMiddleware {
    tallies: Arc<DashMap<&'static str, Tally>>,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts for one operation (zeroes if never seen).
    pub fn stats(&self, operation: &str) -> OperationStats {
        self.tallies.get(operation).map(|t| load(&t)).unwrap_or_default()
    }

    /// Counts for every operation seen so far.
    pub fn snapshot(&self) -> HashMap<String, OperationStats> {
        self.tallies
            .iter()
            .map(|entry| (entry.key().to_string(), load(entry.value())))
            .collect()
    }
}

fn load(tally: &Tally) -> OperationStats {
    OperationStats {
        calls: tally.calls.load(Ordering::Relaxed),
        failures: tally.failures.load(Ordering::Relaxed),
        attempts: tally.attempts.load(Ordering::Relaxed),
    }
}

impl Middleware for MetricsMiddleware {
    fn on_response(&self, ctx: &RequestContext, response: &mut InboundResponse) {
        let outcome = match response.error() {
            None => "ok",
            Some(error) => ErrorKind::from(error.status()).as_str(),
        };

        {
            let tally = self.tallies.entry(ctx.operation()).or_default();
            tally.calls.fetch_add(1, Ordering::Relaxed);
            tally.attempts.fetch_add(u64::from(ctx.attempt()), Ordering::Relaxed);
            if !response.is_ok() {
                tally.failures.fetch_add(1, Ordering::Relaxed);
            }
        }

        metrics::record_call(ctx.operation(), outcome, ctx.deadline().started());
    }
}
