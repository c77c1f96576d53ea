//! Error types shared across the storefront client
//!
//! Every failure is terminal for the operation that raised it. Flows turn
//! these into an error [`Alert`](crate::flows::Alert) with
//! [`StorefrontError::to_alert`].

use thiserror::Error;

use crate::flows::Alert;

/// Result alias used by the public API
pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Top-level error for every storefront operation
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Client-side form validation failed; no remote call was issued
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The GraphQL API rejected the operation or could not be reached
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An access token could not be decoded
    #[error(transparent)]
    MalformedToken(#[from] MalformedTokenError),

    /// Settings or client construction failed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl StorefrontError {
    /// Convert the error into the alert shown to the user
    #[must_use]
    pub fn to_alert(&self) -> Alert {
        Alert::error("Error", self.to_string())
    }

    /// True when the failure happened before any remote call
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Client-side validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Invalid activation link")]
    MissingActivationToken,

    #[error("Invalid or expired reset link")]
    MissingResetToken,

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("{title} is out of stock")]
    OutOfStock { title: String },

    #[error("Cart item cannot be updated")]
    ItemNotUpdatable,
}

/// Failures reported by the GraphQL layer
///
/// Transport failures and error envelopes are handled the same way by
/// callers; they are kept apart only for logging.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The API answered with an `errors` envelope
    #[error("{}", messages.join("\n"))]
    Operation { messages: Vec<String> },

    /// Network, HTTP status or body decoding failure
    #[error("{0}")]
    Transport(String),

    /// The envelope carried neither data nor errors
    #[error("Response for {operation} contained no data")]
    MissingData { operation: String },
}

impl ApiError {
    /// Build an operation error from a single message
    #[must_use]
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            messages: vec![message.into()],
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Raised when a token is not a three-part JWT with a JSON object payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed token: {reason}")]
pub struct MalformedTokenError {
    pub reason: String,
}

impl MalformedTokenError {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_joins_messages() {
        let err = ApiError::Operation {
            messages: vec!["Invalid credentials".to_string(), "Try again".to_string()],
        };
        assert_eq!(err.to_string(), "Invalid credentials\nTry again");
    }

    #[test]
    fn test_validation_messages_match_forms() {
        assert_eq!(
            ValidationError::PasswordTooShort { min: 6 }.to_string(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            StorefrontError::from(ValidationError::PasswordMismatch).to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_to_alert_surfaces_message_verbatim() {
        let err = StorefrontError::from(ApiError::operation("Email already registered"));
        let alert = err.to_alert();
        assert_eq!(alert.title, "Error");
        assert_eq!(alert.text, "Email already registered");
        assert!(!err.is_validation());
    }
}
