//! Request pipeline: one logical call, end to end.
//!
//! # Data Flow
//! ```text
//! client operation (validated arguments, method descriptor, decoder)
//!     → RequestContext (deadline fixed at call start)
//!     → loop per attempt:
//!         middleware request phase (registration order)
//!         → transport.invoke (bounded by the deadline)
//!         → on failure: classify → retry? → clipped backoff sleep
//!     → middleware response phase (reverse order, terminal result only)
//!     → decode payload into the operation's outcome family
//! ```
//!
//! # Design Decisions
//! - The deadline is a budget shared by all attempts, never reset per attempt
//! - Non-idempotent methods are attempted exactly once
//! - Backoff sleeps never run past the deadline; an exhausted budget ends the
//!   call with `DeadlineExceeded` and no further transport invocation
//! - Every call resolves to exactly one outcome value

pub mod context;

use std::sync::Arc;

use serde_json::Value;

pub use context::RequestContext;

use crate::auth::CredentialProvider;
use crate::config::{ConfigError, Configuration};
use crate::errors::{ErrorKind, SdkError};
use crate::middleware::{
    AuthHeaderMiddleware, InboundResponse, MiddlewareChain, RequestIdMiddleware,
};
use crate::observability::metrics;
use crate::outcome::OutcomeFamily;
use crate::transport::{
    Metadata, MethodDescriptor, StatusCode, Transport, TransportError, TransportRequest,
    TransportResponse,
};

/// Metadata key naming the cache (or index) a data plane call targets.
pub const RESOURCE_HEADER: &str = "cache";

/// Shared execution engine behind every client.
///
/// Immutable after construction; clones share the transport and
/// credentials and may run any number of calls concurrently.
#[derive(Debug, Clone)]
pub struct Pipeline {
    configuration: Configuration,
    credentials: Arc<CredentialProvider>,
    transport: Arc<dyn Transport>,
    chain: MiddlewareChain,
}

impl Pipeline {
    /// Validate `configuration` and assemble the middleware chain.
    ///
    /// Auth and request id headers are injected ahead of user middleware.
    pub fn new(
        configuration: Configuration,
        credentials: CredentialProvider,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        configuration.validate()?;

        let builtins = MiddlewareChain::new(vec![
            Arc::new(AuthHeaderMiddleware),
            Arc::new(RequestIdMiddleware),
        ]);
        let chain = configuration.middlewares().prepend(&builtins);

        tracing::debug!(
            control_endpoint = %credentials.control_endpoint(),
            cache_endpoint = %credentials.cache_endpoint(),
            client_timeout = ?configuration.client_timeout(),
            max_attempts = configuration.retry_strategy().max_attempts(),
            middlewares = chain.len(),
            "Pipeline initialized"
        );

        Ok(Self {
            configuration,
            credentials: Arc::new(credentials),
            transport,
            chain,
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    /// Run `method` against `resource` and lift the terminal result with `decode`.
    ///
    /// A payload `decode` rejects becomes the family's failure variant.
    pub async fn execute<R, F>(
        &self,
        method: MethodDescriptor,
        resource: &str,
        payload: Value,
        decode: F,
    ) -> R
    where
        R: OutcomeFamily,
        F: FnOnce(Value) -> Result<R, SdkError>,
    {
        let mut ctx = RequestContext::new(
            method,
            resource,
            self.configuration.client_timeout(),
            self.credentials.clone(),
        );

        let result = self.run_attempts(&mut ctx, payload).await;

        let mut response = InboundResponse::new(result);
        self.chain.apply_response(&ctx, &mut response);

        match response.into_result() {
            Ok(response) => decode(response.payload).unwrap_or_else(R::failure),
            Err(error) => R::from_transport_error(error),
        }
    }

    async fn run_attempts(
        &self,
        ctx: &mut RequestContext,
        payload: Value,
    ) -> Result<TransportResponse, TransportError> {
        let strategy = self.configuration.retry_strategy();
        let endpoint = self.credentials.endpoint_for(ctx.method().plane).to_string();

        let mut metadata = Metadata::new();
        if !ctx.resource().is_empty() {
            metadata.insert(RESOURCE_HEADER.to_string(), ctx.resource().to_string());
        }

        loop {
            let attempt = ctx.begin_attempt();

            let mut request = TransportRequest {
                endpoint: endpoint.clone(),
                method: *ctx.method(),
                metadata: metadata.clone(),
                payload: payload.clone(),
            };
            self.chain.apply_request(ctx, &mut request);

            let deadline = ctx.deadline().at();
            let invocation = self.transport.invoke(request, deadline);
            let error = match tokio::time::timeout_at(deadline, invocation).await {
                Ok(Ok(response)) => return Ok(response),
                Ok(Err(error)) => error,
                Err(_) => return Err(deadline_exceeded(ctx)),
            };

            let kind = ErrorKind::from(error.status());
            if !ctx.method().idempotent
                || !strategy.is_retryable(kind)
                || attempt >= strategy.max_attempts()
            {
                return Err(error);
            }
            if ctx.deadline().is_exhausted() {
                return Err(deadline_exceeded(ctx));
            }

            let delay = ctx.deadline().clip(strategy.backoff(attempt, kind));
            tracing::info!(
                request_id = %ctx.request_id(),
                operation = ctx.operation(),
                attempt = attempt,
                delay = ?delay,
                status = %error.status(),
                "Retrying request"
            );
            metrics::record_retry(ctx.operation(), kind);
            tokio::time::sleep(delay).await;

            if ctx.deadline().is_exhausted() {
                return Err(deadline_exceeded(ctx));
            }
        }
    }
}

fn deadline_exceeded(ctx: &RequestContext) -> TransportError {
    TransportError::new(
        StatusCode::DeadlineExceeded,
        format!(
            "{} exceeded its {:?} budget after {} attempt(s)",
            ctx.operation(),
            ctx.deadline().at() - ctx.deadline().started(),
            ctx.attempt()
        ),
    )
}
