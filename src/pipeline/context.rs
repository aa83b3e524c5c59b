//! Per-call request context.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::auth::CredentialProvider;
use crate::resilience::Deadline;
use crate::transport::MethodDescriptor;

/// Ephemeral state of one logical call.
///
/// Owned by the pipeline for the duration of the call and discarded when it
/// resolves. Only the attempt counter changes between retries.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: MethodDescriptor,
    resource: String,
    request_id: Uuid,
    deadline: Deadline,
    attempt: u32,
    credentials: Arc<CredentialProvider>,
}

impl RequestContext {
    /// Start a call against `resource` with a deadline `timeout` from now.
    pub fn new(
        method: MethodDescriptor,
        resource: impl Into<String>,
        timeout: Duration,
        credentials: Arc<CredentialProvider>,
    ) -> Self {
        Self {
            method,
            resource: resource.into(),
            request_id: Uuid::new_v4(),
            deadline: Deadline::after(timeout),
            attempt: 0,
            credentials,
        }
    }

    /// Short operation name, e.g. `Get`.
    pub fn operation(&self) -> &'static str {
        self.method.name()
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Cache, index or leaderboard name the call targets.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    /// 1-based number of the attempt in flight (0 before the first attempt).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Credential snapshot taken when the call started.
    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    pub(crate) fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.attempt
    }
}
