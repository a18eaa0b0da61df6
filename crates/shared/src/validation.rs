//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Validates that a timestamp lies strictly after `now`.
pub fn validate_future_timestamp(
    timestamp: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if timestamp > now {
        Ok(())
    } else {
        let mut err = ValidationError::new("timestamp_not_in_future");
        err.message = Some("Timestamp must be in the future".into());
        Err(err)
    }
}

/// Validates that an optional text field is not blank when present.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Normalizes an email address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
