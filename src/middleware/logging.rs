//! Structured request/response logging.

use crate::errors::ErrorKind;
use crate::middleware::{InboundResponse, Middleware};
use crate::pipeline::RequestContext;
use crate::transport::TransportRequest;

/// Emits one debug event per attempt and one event per terminal response.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn on_request(&self, ctx: &RequestContext, request: &mut TransportRequest) {
        tracing::debug!(
            request_id = %ctx.request_id(),
            operation = ctx.operation(),
            resource = %ctx.resource(),
            endpoint = %request.endpoint,
            attempt = ctx.attempt(),
            remaining = ?ctx.deadline().remaining(),
            "Sending request"
        );
    }

    fn on_response(&self, ctx: &RequestContext, response: &mut InboundResponse) {
        let elapsed = ctx.deadline().started().elapsed();
        match response.error() {
            None => tracing::debug!(
                request_id = %ctx.request_id(),
                operation = ctx.operation(),
                attempts = ctx.attempt(),
                elapsed = ?elapsed,
                "Request succeeded"
            ),
            Some(error) => tracing::warn!(
                request_id = %ctx.request_id(),
                operation = ctx.operation(),
                attempts = ctx.attempt(),
                elapsed = ?elapsed,
                status = %error.status(),
                kind = %ErrorKind::from(error.status()),
                detail = error.detail(),
                "Request failed"
            ),
        }
    }
}
