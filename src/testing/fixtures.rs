//! Test fixtures providing pre-built test objects

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::GraphQLTransport;
use crate::context::StorefrontContext;
use crate::models::{Money, Product};
use crate::session::{CookieTokenStorage, TokenStorage};
use crate::settings::StorefrontSettings;

use super::constants::{TEST_SIGNATURE, TEST_TOKEN_LIFETIME_SECS};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Build an unsigned-looking JWT carrying `payload`
    #[must_use]
    pub fn token_with_claims(payload: &Value) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.{TEST_SIGNATURE}")
    }

    /// Access token valid for one hour
    #[must_use]
    pub fn access_token(user_id: i64, email: &str) -> String {
        let now = Utc::now().timestamp();
        Self::token_with_claims(&json!({
            "user_id": user_id,
            "email": email,
            "type": "access",
            "iat": now,
            "exp": now + TEST_TOKEN_LIFETIME_SECS,
        }))
    }

    /// Access token whose `exp` lies in the past
    #[must_use]
    pub fn expired_access_token() -> String {
        let now = Utc::now().timestamp();
        Self::token_with_claims(&json!({
            "user_id": 1,
            "email": "expired@example.com",
            "type": "access",
            "iat": now - 2 * TEST_TOKEN_LIFETIME_SECS,
            "exp": now - TEST_TOKEN_LIFETIME_SECS,
        }))
    }

    /// Tokens the decoder must reject
    #[must_use]
    pub fn malformed_tokens() -> Vec<String> {
        vec![
            String::new(),
            "not-a-jwt".to_string(),
            "only.two".to_string(),
            "a.b.c.d".to_string(),
            "header.!!!not-base64!!!.sig".to_string(),
            format!(
                "header.{}.sig",
                general_purpose::URL_SAFE_NO_PAD.encode("not json")
            ),
        ]
    }

    /// Settings pointing at a local API, independent of the environment
    #[must_use]
    pub fn settings() -> StorefrontSettings {
        StorefrontSettings::default()
    }

    #[must_use]
    pub fn product(id: &str, title: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            title: title.to_string(),
            price: Money::new("10.00"),
            description: Some(format!("{title} from the test catalog")),
            image: None,
            stock,
            category: None,
        }
    }

    /// Context wired to `transport` with fresh in-memory token storage
    #[must_use]
    pub fn context_with(transport: Arc<dyn GraphQLTransport>) -> StorefrontContext {
        Self::context_with_storage(transport, Arc::new(CookieTokenStorage::default()))
    }

    #[must_use]
    pub fn context_with_storage(
        transport: Arc<dyn GraphQLTransport>,
        storage: Arc<dyn TokenStorage>,
    ) -> StorefrontContext {
        StorefrontContext::with_transport(Self::settings(), transport, storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::decode_token;

    #[test]
    fn test_fixture_tokens_decode() {
        let claims = decode_token(&TestFixtures::access_token(9, "x@y.com")).unwrap();
        assert_eq!(claims.user_id, Some(9));
        assert!(!claims.is_expired(Utc::now()));

        let expired = decode_token(&TestFixtures::expired_access_token()).unwrap();
        assert!(expired.is_expired(Utc::now()));
    }

    #[test]
    fn test_malformed_fixtures_are_rejected() {
        for token in TestFixtures::malformed_tokens() {
            assert!(decode_token(&token).is_err(), "accepted {token:?}");
        }
    }
}
