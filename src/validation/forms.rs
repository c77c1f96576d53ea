//! Form validators
//!
//! Each validator runs before its flow issues any remote call. Checks run in
//! a fixed order so the first failing rule decides the message shown.

use crate::error::ValidationError;
use crate::validation::core::{non_blank, require_all, require_matching, require_min_length};

/// Validated login credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Validated registration data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterInput {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// Validated password reset data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordInput {
    pub token: String,
    pub password1: String,
    pub password2: String,
}

pub struct FormValidator;

impl FormValidator {
    /// # Errors
    ///
    /// Returns an error if either field is blank
    pub fn validate_login(email: &str, password: &str) -> Result<LoginInput, ValidationError> {
        require_all(&[email, password])?;
        Ok(LoginInput {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if any field is blank or the passwords differ
    pub fn validate_register(
        email: &str,
        password1: &str,
        password2: &str,
    ) -> Result<RegisterInput, ValidationError> {
        require_all(&[email, password1, password2])?;
        require_matching(password1, password2)?;
        Ok(RegisterInput {
            email: email.trim().to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error if the email is blank
    pub fn validate_forgot_password(email: &str) -> Result<String, ValidationError> {
        require_all(&[email])?;
        Ok(email.trim().to_string())
    }

    /// Mismatch is reported before length
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing, the passwords differ, or
    /// the password is too short
    pub fn validate_reset_password(
        token: Option<&str>,
        password1: &str,
        password2: &str,
    ) -> Result<ResetPasswordInput, ValidationError> {
        let token = non_blank(token).ok_or(ValidationError::MissingResetToken)?;
        require_matching(password1, password2)?;
        require_min_length(password1)?;
        Ok(ResetPasswordInput {
            token: token.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MissingActivationToken`] for a blank token
    pub fn validate_activation_token(token: Option<&str>) -> Result<String, ValidationError> {
        non_blank(token)
            .map(ToString::to_string)
            .ok_or(ValidationError::MissingActivationToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_every_field() {
        assert_eq!(
            FormValidator::validate_register("", "secret1", "secret1"),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            FormValidator::validate_register("a@b.com", "secret1", "secret2"),
            Err(ValidationError::PasswordMismatch)
        );
        let input = FormValidator::validate_register(" a@b.com ", "secret1", "secret1").unwrap();
        assert_eq!(input.email, "a@b.com");
    }

    #[test]
    fn test_reset_reports_mismatch_before_length() {
        assert_eq!(
            FormValidator::validate_reset_password(Some("tok"), "a", "b"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            FormValidator::validate_reset_password(Some("tok"), "abc", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            FormValidator::validate_reset_password(None, "secret1", "secret1"),
            Err(ValidationError::MissingResetToken)
        );
        assert!(FormValidator::validate_reset_password(Some("tok"), "secret1", "secret1").is_ok());
    }

    #[test]
    fn test_activation_token() {
        assert_eq!(
            FormValidator::validate_activation_token(Some("   ")),
            Err(ValidationError::MissingActivationToken)
        );
        assert_eq!(
            FormValidator::validate_activation_token(Some("abc123")).unwrap(),
            "abc123"
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            FormValidator::validate_login("a@b.com", ""),
            Err(ValidationError::MissingFields)
        );
    }
}
