//! Construction-time errors.

use thiserror::Error;

use crate::auth::CredentialError;
use crate::config::validation::ValidationError;

/// Error building a configuration or a client.
///
/// Every variant is raised before the first call is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Client timeout is not a positive duration.
    #[error("invalid transport strategy: {0}")]
    InvalidTransport(String),

    /// Retry strategy allows no attempts.
    #[error("invalid retry strategy: {0}")]
    InvalidRetry(String),

    /// A client-level setting (e.g. default TTL) is out of range.
    #[error("invalid client setting: {0}")]
    InvalidArgument(String),

    /// A required builder input was never supplied.
    #[error("missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("credential resolution failed: {0}")]
    Credentials(#[from] CredentialError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
