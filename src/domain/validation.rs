//! Shape checks applied to caller-supplied fields before they reach storage.

use std::fmt;

/// A caller-supplied field failed a shape or enum membership check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field as it appears on the wire.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Creates a new validation error for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for an enum field holding a value outside its set.
    #[must_use]
    pub fn unknown_variant(field: &str, value: &str, allowed: &[&str]) -> Self {
        Self::new(
            field,
            format!("unknown value `{value}`, expected one of {}", allowed.join(", ")),
        )
    }
}

/// Rejects empty or whitespace-only strings.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when `value` is blank.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Rejects strings shorter than `min` characters (after trimming).
///
/// # Errors
///
/// Returns a [`ValidationError`] naming `field` when `value` is too short.
pub fn require_min_chars(field: &str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}
