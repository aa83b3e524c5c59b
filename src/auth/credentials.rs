//! Credential and endpoint resolution.

use std::env;
use std::fmt;

use base64::engine::general_purpose;
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

use crate::transport::Plane;

/// Errors raised while resolving credentials at client construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The token string was empty or whitespace.
    #[error("auth token must not be empty")]
    EmptyToken,

    /// The named environment variable is not set.
    #[error("environment variable '{0}' is not set")]
    EnvVarMissing(String),

    /// The named environment variable is set but blank.
    #[error("environment variable '{0}' is empty")]
    EnvVarEmpty(String),

    /// The token could not be decoded.
    #[error("malformed auth token: {0}")]
    Malformed(String),

    /// The token decoded, but an endpoint could not be derived from it.
    #[error("unable to determine {0} endpoint from auth token")]
    MissingEndpoint(&'static str),
}

/// Where a [`CredentialProvider`] gets its token from.
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// A token string held in memory.
    Literal(String),
    /// The name of an environment variable holding the token.
    EnvVar(String),
    /// Token and endpoints already known to the caller.
    Resolved {
        auth_token: String,
        control_endpoint: String,
        cache_endpoint: String,
    },
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Literal(_) => f.write_str("Literal(<redacted>)"),
            CredentialSource::EnvVar(name) => f.debug_tuple("EnvVar").field(name).finish(),
            CredentialSource::Resolved { control_endpoint, cache_endpoint, .. } => f
                .debug_struct("Resolved")
                .field("control_endpoint", control_endpoint)
                .field("cache_endpoint", cache_endpoint)
                .finish_non_exhaustive(),
        }
    }
}

/// Resolved auth token plus control and data plane endpoints.
///
/// Immutable once constructed. Every constructor validates that the token
/// and both endpoints are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialProvider {
    auth_token: String,
    control_endpoint: String,
    cache_endpoint: String,
}

/// Claims carried by a legacy JWT token.
#[derive(Debug, Deserialize)]
struct LegacyClaims {
    #[serde(rename = "cp")]
    control_endpoint: Option<String>,
    #[serde(rename = "c")]
    cache_endpoint: Option<String>,
}

/// Payload of a v1 API key.
#[derive(Debug, Deserialize)]
struct ApiKeyV1 {
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl CredentialProvider {
    /// Resolve credentials from any supported source.
    pub fn resolve(source: CredentialSource) -> Result<Self, CredentialError> {
        match source {
            CredentialSource::Literal(token) => Self::from_string(token),
            CredentialSource::EnvVar(name) => Self::from_env_var(&name),
            CredentialSource::Resolved { auth_token, control_endpoint, cache_endpoint } => {
                Self::from_parts(auth_token, control_endpoint, cache_endpoint)
            }
        }
    }

    /// Decode a token string (v1 API key or legacy JWT).
    pub fn from_string(token: impl Into<String>) -> Result<Self, CredentialError> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialError::EmptyToken);
        }

        if token.split('.').count() == 3 {
            decode_legacy_token(token)
        } else {
            decode_api_key(token)
        }
    }

    /// Read and decode a token from the named environment variable.
    pub fn from_env_var(name: &str) -> Result<Self, CredentialError> {
        let value = env::var(name).map_err(|_| CredentialError::EnvVarMissing(name.to_string()))?;
        if value.trim().is_empty() {
            return Err(CredentialError::EnvVarEmpty(name.to_string()));
        }
        Self::from_string(value)
    }

    /// Build from an already resolved token and endpoints.
    pub fn from_parts(
        auth_token: impl Into<String>,
        control_endpoint: impl Into<String>,
        cache_endpoint: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let provider = Self {
            auth_token: auth_token.into(),
            control_endpoint: control_endpoint.into(),
            cache_endpoint: cache_endpoint.into(),
        };
        provider.validate()?;
        Ok(provider)
    }

    /// Replace both endpoints with ones derived from `base_endpoint`.
    pub fn with_endpoint_override(self, base_endpoint: &str) -> Result<Self, CredentialError> {
        let base = base_endpoint.trim();
        if base.is_empty() {
            return Err(CredentialError::MissingEndpoint("override"));
        }
        Self::from_parts(self.auth_token, format!("control.{base}"), format!("cache.{base}"))
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// Endpoint for administrative operations.
    pub fn control_endpoint(&self) -> &str {
        &self.control_endpoint
    }

    /// Endpoint for per-item operations.
    pub fn cache_endpoint(&self) -> &str {
        &self.cache_endpoint
    }

    /// Endpoint serving the given plane.
    pub fn endpoint_for(&self, plane: Plane) -> &str {
        match plane {
            Plane::Control => &self.control_endpoint,
            Plane::Data => &self.cache_endpoint,
        }
    }

    fn validate(&self) -> Result<(), CredentialError> {
        if self.auth_token.trim().is_empty() {
            return Err(CredentialError::EmptyToken);
        }
        if self.control_endpoint.trim().is_empty() {
            return Err(CredentialError::MissingEndpoint("control"));
        }
        if self.cache_endpoint.trim().is_empty() {
            return Err(CredentialError::MissingEndpoint("cache"));
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("auth_token", &"<redacted>")
            .field("control_endpoint", &self.control_endpoint)
            .field("cache_endpoint", &self.cache_endpoint)
            .finish()
    }
}

fn decode_legacy_token(token: &str) -> Result<CredentialProvider, CredentialError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| CredentialError::Malformed("missing JWT payload".to_string()))?;
    let bytes = decode_base64(payload.trim_end_matches('='))?;
    let claims: LegacyClaims = serde_json::from_slice(&bytes)
        .map_err(|e| CredentialError::Malformed(format!("invalid JWT claims: {e}")))?;

    let control = claims.control_endpoint.ok_or(CredentialError::MissingEndpoint("control"))?;
    let cache = claims.cache_endpoint.ok_or(CredentialError::MissingEndpoint("cache"))?;
    CredentialProvider::from_parts(token, control, cache)
}

fn decode_api_key(token: &str) -> Result<CredentialProvider, CredentialError> {
    let bytes = decode_base64(token)?;
    let key: ApiKeyV1 = serde_json::from_slice(&bytes)
        .map_err(|e| CredentialError::Malformed(format!("invalid API key payload: {e}")))?;

    let api_key = key.api_key.filter(|k| !k.trim().is_empty()).ok_or(CredentialError::EmptyToken)?;
    let endpoint = key
        .endpoint
        .filter(|e| !e.trim().is_empty())
        .ok_or(CredentialError::MissingEndpoint("base"))?;
    CredentialProvider::from_parts(
        api_key,
        format!("control.{endpoint}"),
        format!("cache.{endpoint}"),
    )
}

fn decode_base64(input: &str) -> Result<Vec<u8>, CredentialError> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .or_else(|_| general_purpose::STANDARD.decode(input))
        .map_err(|e| CredentialError::Malformed(format!("invalid base64: {e}")))
}
