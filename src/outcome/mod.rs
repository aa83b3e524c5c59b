//! Closed result families returned by every client operation.
//!
//! # Responsibilities
//! - Define one sum type per result shape ([`Outcome`], [`Lookup`],
//!   [`Creation`], [`Conditional`], [`TtlUpdate`])
//! - Keep domain states (`Miss`, `AlreadyExists`, `NotStored`) apart from `Failure`
//! - Let the pipeline build the `Failure` variant of any family generically
//!
//! # Design Decisions
//! - Operations return a type alias onto a family, so callers match exhaustively
//! - Constructors never fail; call-time errors are values, not panics
//! - A family may claim specific transport statuses as domain states
//!   (`Creation` treats `AlreadyExists` as a non-error result)

use std::fmt;

use crate::errors::SdkError;
use crate::transport::{StatusCode, TransportError};

/// Behaviour shared by every result family.
pub trait OutcomeFamily: Sized {
    /// The family's failure variant.
    fn failure(error: SdkError) -> Self;

    /// The carried error, if this is a failure.
    fn error(&self) -> Option<&SdkError>;

    fn is_failure(&self) -> bool {
        self.error().is_some()
    }

    /// Lift a terminal transport failure into the family.
    fn from_transport_error(error: TransportError) -> Self {
        Self::failure(SdkError::from_transport(error))
    }
}

/// Plain success or failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failure(SdkError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The payload, if successful.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, SdkError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(error) => Outcome::Failure(error),
        }
    }
}

impl<T> From<Result<T, SdkError>> for Outcome<T> {
    fn from(result: Result<T, SdkError>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(error) => Outcome::Failure(error),
        }
    }
}

impl<T> OutcomeFamily for Outcome<T> {
    fn failure(error: SdkError) -> Self {
        Outcome::Failure(error)
    }

    fn error(&self) -> Option<&SdkError> {
        match self {
            Outcome::Failure(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => f.write_str("Success"),
            Outcome::Failure(error) => write!(f, "Failure: {error}"),
        }
    }
}

/// Read of something that may not exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Hit(T),
    Miss,
    Failure(SdkError),
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Lookup::Miss)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Lookup::Hit(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Hit(value) => Lookup::Hit(f(value)),
            Lookup::Miss => Lookup::Miss,
            Lookup::Failure(error) => Lookup::Failure(error),
        }
    }
}

impl<T> OutcomeFamily for Lookup<T> {
    fn failure(error: SdkError) -> Self {
        Lookup::Failure(error)
    }

    fn error(&self) -> Option<&SdkError> {
        match self {
            Lookup::Failure(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> fmt::Display for Lookup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Hit(_) => f.write_str("Hit"),
            Lookup::Miss => f.write_str("Miss"),
            Lookup::Failure(error) => write!(f, "Failure: {error}"),
        }
    }
}

/// Creation of a named resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Creation {
    Created,
    AlreadyExists,
    Failure(SdkError),
}

impl OutcomeFamily for Creation {
    fn failure(error: SdkError) -> Self {
        Creation::Failure(error)
    }

    fn error(&self) -> Option<&SdkError> {
        match self {
            Creation::Failure(error) => Some(error),
            _ => None,
        }
    }

    fn from_transport_error(error: TransportError) -> Self {
        if error.status() == StatusCode::AlreadyExists {
            return Creation::AlreadyExists;
        }
        Creation::Failure(SdkError::from_transport(error))
    }
}

impl fmt::Display for Creation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Creation::Created => f.write_str("Created"),
            Creation::AlreadyExists => f.write_str("AlreadyExists"),
            Creation::Failure(error) => write!(f, "Failure: {error}"),
        }
    }
}

/// Write that only happens when a precondition holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Conditional<T> {
    Stored(T),
    NotStored,
    Failure(SdkError),
}

impl<T> Conditional<T> {
    pub fn is_stored(&self) -> bool {
        matches!(self, Conditional::Stored(_))
    }
}

impl<T> OutcomeFamily for Conditional<T> {
    fn failure(error: SdkError) -> Self {
        Conditional::Failure(error)
    }

    fn error(&self) -> Option<&SdkError> {
        match self {
            Conditional::Failure(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> fmt::Display for Conditional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conditional::Stored(_) => f.write_str("Stored"),
            Conditional::NotStored => f.write_str("NotStored"),
            Conditional::Failure(error) => write!(f, "Failure: {error}"),
        }
    }
}

/// Change to the remaining lifetime of an item.
#[derive(Debug, Clone, PartialEq)]
pub enum TtlUpdate {
    Set,
    /// The item does not exist, or the precondition on its TTL did not hold.
    Miss,
    Failure(SdkError),
}

impl OutcomeFamily for TtlUpdate {
    fn failure(error: SdkError) -> Self {
        TtlUpdate::Failure(error)
    }

    fn error(&self) -> Option<&SdkError> {
        match self {
            TtlUpdate::Failure(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for TtlUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtlUpdate::Set => f.write_str("Set"),
            TtlUpdate::Miss => f.write_str("Miss"),
            TtlUpdate::Failure(error) => write!(f, "Failure: {error}"),
        }
    }
}
