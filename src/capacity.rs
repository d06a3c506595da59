//! Room capacity validation
//!
//! Capacity arrives as free-form text from clients. Creation requests fall
//! back to a default; updates from the host are rejected instead.

use crate::error::AppError;

/// Why a requested capacity was replaced with the default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// No capacity was supplied
    Missing,
    /// Not an integer
    Unparsable,
    /// Zero or negative
    NonPositive,
}

/// Outcome of parsing a capacity for a new room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityRequest {
    Valid(usize),
    Defaulted { capacity: usize, reason: DefaultReason },
}

impl CapacityRequest {
    /// Parse a requested capacity, substituting `default` when it is unusable
    pub fn parse(raw: Option<&str>, default: usize) -> Self {
        let Some(raw) = raw else {
            return Self::defaulted(default, DefaultReason::Missing);
        };

        match parse_positive(raw) {
            Ok(capacity) => Self::Valid(capacity),
            Err(reason) => Self::defaulted(default, reason),
        }
    }

    fn defaulted(capacity: usize, reason: DefaultReason) -> Self {
        Self::Defaulted { capacity, reason }
    }

    /// The capacity to apply
    pub fn capacity(&self) -> usize {
        match *self {
            Self::Valid(capacity) | Self::Defaulted { capacity, .. } => capacity,
        }
    }
}

/// Validate a host's capacity change against the current member count
pub fn validate_update(raw: &str, member_count: usize) -> Result<usize, AppError> {
    let capacity = parse_positive(raw)
        .map_err(|_| AppError::InvalidCapacity(format!("'{}' is not a positive integer", raw)))?;

    if capacity < member_count {
        return Err(AppError::InvalidCapacity(format!(
            "{} is below the current member count {}",
            capacity, member_count
        )));
    }

    Ok(capacity)
}

fn parse_positive(raw: &str) -> Result<usize, DefaultReason> {
    let value: i64 = raw.trim().parse().map_err(|_| DefaultReason::Unparsable)?;
    if value < 1 {
        return Err(DefaultReason::NonPositive);
    }
    usize::try_from(value).map_err(|_| DefaultReason::Unparsable)
}
