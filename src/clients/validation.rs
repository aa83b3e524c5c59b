//! Argument checks run before any transport call.

use std::time::Duration;

use crate::errors::SdkError;

pub(crate) fn validate_name(what: &str, name: &str) -> Result<(), SdkError> {
    if name.trim().is_empty() {
        return Err(SdkError::invalid_argument(format!("{what} name must not be empty")));
    }
    Ok(())
}

pub(crate) fn validate_cache_name(name: &str) -> Result<(), SdkError> {
    validate_name("cache", name)
}

pub(crate) fn validate_index_name(name: &str) -> Result<(), SdkError> {
    validate_name("index", name)
}

/// Checks a TTL and converts it to the whole milliseconds sent on the wire.
pub(crate) fn ttl_millis(ttl: Duration) -> Result<u64, SdkError> {
    if ttl < Duration::from_millis(1) {
        return Err(SdkError::invalid_argument("ttl must be at least one millisecond"));
    }
    u64::try_from(ttl.as_millis())
        .map_err(|_| SdkError::invalid_argument("ttl is too large"))
}

pub(crate) fn validate_non_empty<T>(what: &str, items: &[T]) -> Result<(), SdkError> {
    if items.is_empty() {
        return Err(SdkError::invalid_argument(format!("{what} must not be empty")));
    }
    Ok(())
}

pub(crate) fn validate_positive(what: &str, value: u32) -> Result<(), SdkError> {
    if value == 0 {
        return Err(SdkError::invalid_argument(format!("{what} must be greater than zero")));
    }
    Ok(())
}
