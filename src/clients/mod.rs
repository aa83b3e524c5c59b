//! Capability clients.
//!
//! # Responsibilities
//! - Expose one async operation per remote capability
//! - Validate arguments before anything reaches the transport
//! - Hand validated calls to the [`Pipeline`] with the method's idempotency flag
//! - Lift wire responses into each operation's outcome family
//!
//! # Data Flow
//! ```text
//! ClientBuilder (configuration, credential source, transport)
//!     → credentials resolved, configuration validated (fail fast)
//!     → Pipeline
//!     → CacheClient / VectorIndexClient / TopicClient / LeaderboardClient
//! ```

pub mod cache;
pub mod leaderboard;
pub mod topic;
pub mod vector;

pub(crate) mod validation;
pub(crate) mod wire;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

pub use cache::CacheClient;
pub use leaderboard::LeaderboardClient;
pub use topic::TopicClient;
pub use vector::VectorIndexClient;

use crate::auth::{CredentialProvider, CredentialSource};
use crate::config::{presets, ConfigError, Configuration};
use crate::pipeline::Pipeline;
use crate::transport::Transport;

/// Builder shared by every client type.
///
/// Credentials are resolved and the configuration is validated by `build`,
/// so a missing environment variable or a zero timeout surfaces here and
/// never at the first call.
pub struct ClientBuilder<C> {
    configuration: Configuration,
    credentials: Option<CredentialSource>,
    endpoint_override: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    default_ttl: Option<Duration>,
    _client: PhantomData<fn() -> C>,
}

impl<C> ClientBuilder<C> {
    pub(crate) fn new() -> Self {
        Self {
            configuration: presets::default_configuration(),
            credentials: None,
            endpoint_override: None,
            transport: None,
            default_ttl: None,
            _client: PhantomData,
        }
    }

    pub fn configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn credentials(mut self, source: CredentialSource) -> Self {
        self.credentials = Some(source);
        self
    }

    /// Route both planes to `control.<base>` and `cache.<base>`.
    pub fn endpoint_override(mut self, base: impl Into<String>) -> Self {
        self.endpoint_override = Some(base.into());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub(crate) fn pipeline(self) -> Result<Pipeline, ConfigError> {
        let source = self.credentials.ok_or(ConfigError::MissingSetting("credentials"))?;
        let transport = self.transport.ok_or(ConfigError::MissingSetting("transport"))?;

        let mut credentials = CredentialProvider::resolve(source)?;
        if let Some(base) = self.endpoint_override {
            credentials = credentials.with_endpoint_override(&base)?;
        }

        Pipeline::new(self.configuration, credentials, transport)
    }
}

impl<C> fmt::Debug for ClientBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("configuration", &self.configuration)
            .field("credentials", &self.credentials)
            .field("endpoint_override", &self.endpoint_override)
            .field("transport", &self.transport)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}
