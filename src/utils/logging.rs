// Centralized logging utilities to reduce verbose logging patterns
use log::{debug, info, warn};

use crate::error::ApiError;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a GraphQL operation being sent
    pub fn log_operation_start(operation: &str) {
        debug!("🔄 Sending GraphQL operation {operation}");
    }

    /// Log a failed GraphQL operation, separating transport from API errors
    pub fn log_operation_failed(operation: &str, error: &ApiError) {
        match error {
            ApiError::Transport(msg) => warn!("❌ {operation} failed in transport: {msg}"),
            ApiError::Operation { messages } => {
                info!("❌ {operation} rejected by API: {messages:?}");
            }
            ApiError::MissingData { .. } => warn!("❌ {operation} returned no data"),
        }
    }

    /// Log queries re-fetched after a mutation
    pub fn log_invalidation(mutation: &str, keys: &[crate::api::QueryKey]) {
        if !keys.is_empty() {
            debug!("♻️  {mutation} invalidated {keys:?}");
        }
    }

    /// Log a session becoming authenticated
    pub fn log_session_authenticated(email: Option<&str>, reason: &str) {
        info!(
            "🔐 Session authenticated ({reason}) for {}",
            email.unwrap_or("<unknown email>")
        );
    }

    /// Log a session being cleared
    pub fn log_session_cleared(reason: &str) {
        info!("🔓 Session cleared ({reason})");
    }
}
