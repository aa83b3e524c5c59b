//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (0 < timeout <= 24h, attempts >= 1, base <= max)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: ClientConfigFile → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::ClientConfigFile;
use crate::resilience::MAX_CLIENT_TIMEOUT;

/// One problem found in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `transport.client_timeout_ms`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ClientConfigFile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.transport.client_timeout_ms <= 0 {
        errors.push(ValidationError::new(
            "transport.client_timeout_ms",
            format!("must be positive, got {}", config.transport.client_timeout_ms),
        ));
    } else if config.transport.client_timeout_ms as u128 > MAX_CLIENT_TIMEOUT.as_millis() {
        errors.push(ValidationError::new(
            "transport.client_timeout_ms",
            format!("must not exceed {}ms", MAX_CLIENT_TIMEOUT.as_millis()),
        ));
    }
    if config.transport.max_message_size_bytes == 0 {
        errors.push(ValidationError::new("transport.max_message_size_bytes", "must be positive"));
    }

    let retry = &config.retry;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::new("retry.max_attempts", "must be at least 1"));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        errors.push(ValidationError::new(
            "retry.base_delay_ms",
            format!(
                "base delay {}ms exceeds max delay {}ms",
                retry.base_delay_ms, retry.max_delay_ms
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
