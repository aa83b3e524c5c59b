//! Immutable client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigError;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::resilience::{FixedCountRetryStrategy, RetryStrategy, TransportStrategy};

/// Retry strategy, transport strategy and middleware chain.
///
/// Never mutated in place: every `with_*` method returns a new value and
/// leaves the receiver as it was. Cloning shares the retry strategy and
/// middleware list.
#[derive(Clone)]
pub struct Configuration {
    retry_strategy: Arc<dyn RetryStrategy>,
    transport_strategy: TransportStrategy,
    middlewares: MiddlewareChain,
}

impl Configuration {
    /// Assemble a configuration without validating it.
    ///
    /// Clients validate their configuration at construction; use
    /// [`Configuration::builder`] to validate earlier.
    pub fn new(
        retry_strategy: Arc<dyn RetryStrategy>,
        transport_strategy: TransportStrategy,
        middlewares: MiddlewareChain,
    ) -> Self {
        Self { retry_strategy, transport_strategy, middlewares }
    }

    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn retry_strategy(&self) -> &Arc<dyn RetryStrategy> {
        &self.retry_strategy
    }

    pub fn transport_strategy(&self) -> &TransportStrategy {
        &self.transport_strategy
    }

    pub fn middlewares(&self) -> &MiddlewareChain {
        &self.middlewares
    }

    /// Per-call time budget.
    pub fn client_timeout(&self) -> Duration {
        self.transport_strategy.client_timeout()
    }

    pub fn with_retry_strategy(&self, retry_strategy: Arc<dyn RetryStrategy>) -> Self {
        Self { retry_strategy, ..self.clone() }
    }

    pub fn with_transport_strategy(&self, transport_strategy: TransportStrategy) -> Self {
        Self { transport_strategy, ..self.clone() }
    }

    pub fn with_client_timeout(&self, client_timeout: Duration) -> Self {
        self.with_transport_strategy(self.transport_strategy.with_client_timeout(client_timeout))
    }

    /// Append one middleware to the chain.
    pub fn with_middleware(&self, middleware: Arc<dyn Middleware>) -> Self {
        Self { middlewares: self.middlewares.with(middleware), ..self.clone() }
    }

    /// Replace the whole middleware chain.
    pub fn with_middlewares(&self, middlewares: MiddlewareChain) -> Self {
        Self { middlewares, ..self.clone() }
    }

    /// Check the invariants every client relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transport_strategy.validate().map_err(ConfigError::InvalidTransport)?;
        if self.retry_strategy.max_attempts() == 0 {
            return Err(ConfigError::InvalidRetry("max attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("retry_strategy", &self.retry_strategy)
            .field("transport_strategy", &self.transport_strategy)
            .field("middlewares", &self.middlewares)
            .finish()
    }
}

/// Validating builder for [`Configuration`].
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    retry_strategy: Option<Arc<dyn RetryStrategy>>,
    transport_strategy: Option<TransportStrategy>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ConfigurationBuilder {
    pub fn retry_strategy(mut self, retry_strategy: Arc<dyn RetryStrategy>) -> Self {
        self.retry_strategy = Some(retry_strategy);
        self
    }

    pub fn transport_strategy(mut self, transport_strategy: TransportStrategy) -> Self {
        self.transport_strategy = Some(transport_strategy);
        self
    }

    /// Register a middleware; registration order is chain order.
    pub fn middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let configuration = Configuration::new(
            self.retry_strategy
                .unwrap_or_else(|| Arc::new(FixedCountRetryStrategy::default())),
            self.transport_strategy.unwrap_or_default(),
            MiddlewareChain::new(self.middlewares),
        );
        configuration.validate()?;
        Ok(configuration)
    }
}
