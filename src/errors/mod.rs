//! Error taxonomy for call-time failures.
//!
//! # Responsibilities
//! - Define the stable, enumerable [`ErrorKind`] set
//! - Classify transport status codes into error kinds
//! - Carry kind, display message and original cause in [`SdkError`]
//!
//! Construction-time failures (bad configuration, unresolvable credentials)
//! use [`crate::config::ConfigError`] and [`crate::auth::CredentialError`]
//! instead and are returned as `Err` before any call is made.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use crate::transport::{StatusCode, TransportError};

/// Coarse classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidArgument,
    AuthenticationFailed,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    LimitExceeded,
    DeadlineExceeded,
    Cancelled,
    Unavailable,
    Internal,
    Unknown,
}

impl ErrorKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::AuthenticationFailed => "authentication_failed",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::LimitExceeded => "limit_exceeded",
            ErrorKind::DeadlineExceeded => "deadline_exceeded",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
            ErrorKind::Unknown => "unknown",
        }
    }

    fn message_prefix(self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "Invalid argument passed to client",
            ErrorKind::AuthenticationFailed => {
                "Invalid authentication credentials to connect to the service"
            }
            ErrorKind::PermissionDenied => "Insufficient permissions to perform this operation",
            ErrorKind::NotFound => "The requested resource does not exist",
            ErrorKind::AlreadyExists => "A resource with the specified name already exists",
            ErrorKind::LimitExceeded => {
                "Request rate, bandwidth, or object size exceeded the limits for this account"
            }
            ErrorKind::DeadlineExceeded => {
                "The client's configured timeout was exceeded; you may need a configuration with more lenient timeouts"
            }
            ErrorKind::Cancelled => "The request was cancelled",
            ErrorKind::Unavailable => {
                "The server was unable to handle the request; consider retrying"
            }
            ErrorKind::Internal => {
                "An unexpected error occurred while trying to fulfill the request"
            }
            ErrorKind::Unknown => "Unknown error has occurred",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StatusCode> for ErrorKind {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::InvalidArgument
            | StatusCode::OutOfRange
            | StatusCode::Unimplemented
            | StatusCode::FailedPrecondition => ErrorKind::InvalidArgument,
            StatusCode::Unauthenticated => ErrorKind::AuthenticationFailed,
            StatusCode::PermissionDenied => ErrorKind::PermissionDenied,
            StatusCode::NotFound => ErrorKind::NotFound,
            StatusCode::AlreadyExists => ErrorKind::AlreadyExists,
            StatusCode::ResourceExhausted => ErrorKind::LimitExceeded,
            StatusCode::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            StatusCode::Cancelled => ErrorKind::Cancelled,
            StatusCode::Unavailable => ErrorKind::Unavailable,
            StatusCode::Internal | StatusCode::DataLoss | StatusCode::Aborted => {
                ErrorKind::Internal
            }
            StatusCode::Ok | StatusCode::Unknown => ErrorKind::Unknown,
        }
    }
}

/// A classified call-time failure.
///
/// Carried by the `Failure` variant of every outcome family. The original
/// transport error, when there is one, is available through
/// [`StdError::source`] and [`SdkError::transport_error`].
#[derive(Debug, Clone, PartialEq)]
pub struct SdkError {
    kind: ErrorKind,
    message: String,
    cause: Option<TransportError>,
}

impl SdkError {
    /// Create an error of the given kind from a detail string.
    pub fn new(kind: ErrorKind, detail: impl AsRef<str>) -> Self {
        Self {
            kind,
            message: format!("{}: {}", kind.message_prefix(), detail.as_ref()),
            cause: None,
        }
    }

    /// Local argument validation failure.
    pub fn invalid_argument(detail: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::InvalidArgument, detail)
    }

    /// Unexpected payload or other client-side defect.
    pub fn internal(detail: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::Internal, detail)
    }

    /// Classify a terminal transport failure.
    pub fn from_transport(error: TransportError) -> Self {
        let kind = ErrorKind::from(error.status());
        Self {
            kind,
            message: format!("{}: {}", kind.message_prefix(), error.detail()),
            cause: Some(error),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The transport error that caused this failure, if any.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.cause.as_ref()
    }
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.kind)
    }
}

impl StdError for SdkError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<TransportError> for SdkError {
    fn from(error: TransportError) -> Self {
        Self::from_transport(error)
    }
}
