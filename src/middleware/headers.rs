//! Header injection middleware.

use crate::middleware::Middleware;
use crate::pipeline::RequestContext;
use crate::transport::TransportRequest;

/// Header carrying the auth token.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Header carrying the per-call request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header identifying the client library.
pub const AGENT_HEADER: &str = "agent";

/// Injects the auth token from the call's credential snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthHeaderMiddleware;

impl Middleware for AuthHeaderMiddleware {
    fn on_request(&self, ctx: &RequestContext, request: &mut TransportRequest) {
        request
            .metadata
            .insert(AUTHORIZATION_HEADER.to_string(), ctx.credentials().auth_token().to_string());
        request
            .metadata
            .entry(AGENT_HEADER.to_string())
            .or_insert_with(|| concat!("rust:", env!("CARGO_PKG_VERSION")).to_string());
    }
}

/// Propagates the call's request id; every attempt of a call carries the same id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl Middleware for RequestIdMiddleware {
    fn on_request(&self, ctx: &RequestContext, request: &mut TransportRequest) {
        request
            .metadata
            .insert(REQUEST_ID_HEADER.to_string(), ctx.request_id().to_string());
    }
}
