//! Request/response interceptors.
//!
//! # Responsibilities
//! - Define the [`Middleware`] capability (outbound transform, inbound observation)
//! - Compose an ordered, immutable [`MiddlewareChain`]
//! - Provide built-ins: auth and request id headers, logging, metrics
//!
//! # Ordering
//! ```text
//! registered: [A, B]
//!
//! request phase:   A.on_request → B.on_request → transport
//! response phase:  B.on_response → A.on_response → outcome
//! ```
//!
//! # Design Decisions
//! - Request phase runs once per attempt; response phase runs once, on the terminal result
//! - A failed result is read-only to middleware; error kinds are never converted
//! - Middleware holding state across calls must be safe for concurrent use

pub mod headers;
pub mod logging;
pub mod metrics;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::pipeline::RequestContext;
use crate::transport::{Metadata, TransportError, TransportRequest, TransportResponse};

pub use headers::{AuthHeaderMiddleware, RequestIdMiddleware};
pub use logging::LoggingMiddleware;
pub use metrics::{MetricsMiddleware, OperationStats};

/// Interceptor around the transport call.
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Transform the outbound request before it reaches the transport.
    fn on_request(&self, _ctx: &RequestContext, _request: &mut TransportRequest) {}

    /// Observe or augment the terminal response.
    fn on_response(&self, _ctx: &RequestContext, _response: &mut InboundResponse) {}
}

/// Terminal transport result as seen by the response phase.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundResponse {
    result: Result<TransportResponse, TransportError>,
}

impl InboundResponse {
    pub(crate) fn new(result: Result<TransportResponse, TransportError>) -> Self {
        Self { result }
    }

    pub fn result(&self) -> Result<&TransportResponse, &TransportError> {
        self.result.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure, if the call failed.
    pub fn error(&self) -> Option<&TransportError> {
        self.result.as_ref().err()
    }

    /// Mutable payload of a successful response.
    pub fn payload_mut(&mut self) -> Option<&mut Value> {
        self.result.as_mut().ok().map(|r| &mut r.payload)
    }

    /// Mutable metadata of a successful response.
    pub fn metadata_mut(&mut self) -> Option<&mut Metadata> {
        self.result.as_mut().ok().map(|r| &mut r.metadata)
    }

    pub(crate) fn into_result(self) -> Result<TransportResponse, TransportError> {
        self.result
    }
}

/// Ordered, immutable list of middleware.
///
/// Cloning is cheap; [`MiddlewareChain::with`] returns a new chain and
/// leaves the receiver untouched.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    /// Create a chain from middleware in registration order.
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self { middlewares: Arc::new(middlewares) }
    }

    /// A new chain with `middleware` appended.
    pub fn with(&self, middleware: Arc<dyn Middleware>) -> Self {
        let mut middlewares = self.middlewares.as_ref().clone();
        middlewares.push(middleware);
        Self::new(middlewares)
    }

    /// A new chain with `front` placed before every middleware of `self`.
    pub fn prepend(&self, front: &MiddlewareChain) -> Self {
        let middlewares =
            front.middlewares.iter().chain(self.middlewares.iter()).cloned().collect();
        Self::new(middlewares)
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Middleware>> {
        self.middlewares.iter()
    }

    /// Run the request phase in registration order.
    pub fn apply_request(&self, ctx: &RequestContext, request: &mut TransportRequest) {
        for middleware in self.middlewares.iter() {
            middleware.on_request(ctx, request);
        }
    }

    /// Run the response phase in reverse registration order.
    pub fn apply_response(&self, ctx: &RequestContext, response: &mut InboundResponse) {
        for middleware in self.middlewares.iter().rev() {
            middleware.on_response(ctx, response);
        }
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.middlewares.iter()).finish()
    }
}
