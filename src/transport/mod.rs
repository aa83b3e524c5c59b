//! Transport collaborator interface.
//!
//! # Responsibilities
//! - Describe the remote method being invoked (path, plane, idempotency)
//! - Carry outbound metadata and the serialized request payload
//! - Report terminal status codes for failed calls
//!
//! # Design Decisions
//! - The channel, connection pool and codec live behind the [`Transport`] trait
//! - Payloads are `serde_json::Value`; the binary encoding is the transport's concern
//! - The transport receives the call deadline and must not run past it

pub mod status;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;

pub use status::StatusCode;

/// Key/value call metadata (headers).
pub type Metadata = BTreeMap<String, String>;

/// Which service endpoint a method is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plane {
    /// Administrative operations (create/delete/list caches and indexes).
    Control,
    /// Per-item read/write/search operations.
    Data,
}

/// Static description of one remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Fully qualified method path, e.g. `cache_client.Scs/Get`.
    pub path: &'static str,
    /// Endpoint the method is served by.
    pub plane: Plane,
    /// Whether repeating the call has the same effect as issuing it once.
    pub idempotent: bool,
}

impl MethodDescriptor {
    /// Describe a data plane method.
    pub const fn data(path: &'static str, idempotent: bool) -> Self {
        Self { path, plane: Plane::Data, idempotent }
    }

    /// Describe a control plane method.
    pub const fn control(path: &'static str, idempotent: bool) -> Self {
        Self { path, plane: Plane::Control, idempotent }
    }

    /// Short operation name (the segment after the final `/`).
    pub fn name(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }
}

/// One outbound call as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Host the call is routed to.
    pub endpoint: String,
    pub method: MethodDescriptor,
    pub metadata: Metadata,
    pub payload: Value,
}

/// A successful transport result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportResponse {
    pub payload: Value,
    pub metadata: Metadata,
}

impl TransportResponse {
    /// Create a response with no metadata.
    pub fn new(payload: Value) -> Self {
        Self { payload, metadata: Metadata::new() }
    }
}

/// A failed transport call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {detail}")]
pub struct TransportError {
    status: StatusCode,
    detail: String,
}

impl TransportError {
    /// Create a new transport error.
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self { status, detail: detail.into() }
    }

    /// Terminal status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Detail text reported alongside the status.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Generic unary RPC client.
///
/// Implementations own their channels and may be shared by any number of
/// concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Invoke `request.method` and resolve before `deadline`.
    async fn invoke(
        &self,
        request: TransportRequest,
        deadline: Instant,
    ) -> Result<TransportResponse, TransportError>;
}
