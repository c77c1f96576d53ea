//! Reusable field checks shared by the account forms

use crate::error::ValidationError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Fail with [`ValidationError::MissingFields`] if any value is blank
///
/// # Errors
///
/// Returns an error if at least one field is empty or whitespace only
pub fn require_all(fields: &[&str]) -> Result<(), ValidationError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`ValidationError::PasswordMismatch`] if the two entries differ
pub fn require_matching(password1: &str, password2: &str) -> Result<(), ValidationError> {
    if password1 != password2 {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Length is counted in characters, not bytes
///
/// # Errors
///
/// Returns [`ValidationError::PasswordTooShort`] below [`MIN_PASSWORD_LENGTH`]
pub fn require_min_length(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Extract a path token, treating blank values as absent
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
