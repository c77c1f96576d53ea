//! Access token decoding
//!
//! Tokens are decoded without verifying their signature. The resulting
//! [`UserClaims`] drive display state only (who is signed in, when the
//! token lapses). They must never be used for authorization decisions;
//! the API re-validates every token it receives.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MalformedTokenError;

/// Identity claims carried by an access token
///
/// Claims are read leniently: numeric ids may arrive as strings, `sub` as a
/// number and timestamps as floats. A claim whose value cannot be read as
/// the modelled type is left `None` and kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct UserClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Any claim not modelled above, or modelled but of an unexpected type
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for UserClaims {
    fn from(mut extra: Map<String, Value>) -> Self {
        Self {
            user_id: take_claim(&mut extra, "user_id", integer_claim),
            email: take_claim(&mut extra, "email", text_claim),
            token_type: take_claim(&mut extra, "type", text_claim),
            sub: take_claim(&mut extra, "sub", text_claim),
            exp: take_claim(&mut extra, "exp", timestamp_claim),
            iat: take_claim(&mut extra, "iat", timestamp_claim),
            extra,
        }
    }
}

/// Remove `key` from `claims` if `read` understands it; otherwise leave it
fn take_claim<T>(
    claims: &mut Map<String, Value>,
    key: &str,
    read: fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = read(claims.get(key)?)?;
    claims.remove(key);
    Some(value)
}

fn integer_claim(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_claim(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn timestamp_claim(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    }
}

impl UserClaims {
    /// Expiry as a timestamp, if the token carries a valid `exp` claim
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    /// Issued-at as a timestamp
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| Utc.timestamp_opt(iat, 0).single())
    }

    /// Tokens without an `exp` claim never expire client-side
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// Best label for the signed-in user
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.email.as_deref().or(self.sub.as_deref())
    }
}

/// Decode the payload segment of a JWT into [`UserClaims`]
///
/// # Errors
///
/// Returns [`MalformedTokenError`] if the token does not have exactly three
/// dot-separated segments, the payload is not base64, or it is not a JSON
/// object.
pub fn decode_token(token: &str) -> Result<UserClaims, MalformedTokenError> {
    match decode_payload(token)? {
        Value::Object(claims) => Ok(UserClaims::from(claims)),
        _ => Err(MalformedTokenError::new("payload is not a JSON object")),
    }
}

/// Decode the payload segment of a JWT as raw JSON
///
/// # Errors
///
/// Same conditions as [`decode_token`], except that any JSON value is accepted.
pub fn decode_payload(token: &str) -> Result<Value, MalformedTokenError> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    // An empty signature segment is allowed (unsigned tokens)
    if parts.len() != 3 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(MalformedTokenError::new("expected three dot-separated segments"));
    }

    let payload_b64 = parts[1].trim_end_matches('=');
    let payload_bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(payload_b64))
        .map_err(|_| MalformedTokenError::new("payload is not valid base64"))?;

    serde_json::from_slice(&payload_bytes)
        .map_err(|_| MalformedTokenError::new("payload is not valid JSON"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn token_with_payload(payload: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn test_decode_access_token_claims() {
        let token = token_with_payload(
            &json!({
                "user_id": 7,
                "email": "a@b.com",
                "type": "access",
                "exp": 1_900_000_000,
                "role": "customer"
            })
            .to_string(),
        );

        let claims = decode_token(&token).unwrap();
        assert_eq!(claims.user_id, Some(7));
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.token_type.as_deref(), Some("access"));
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert_eq!(claims.extra.get("role"), Some(&json!("customer")));
        assert_eq!(claims.display_name(), Some("a@b.com"));
    }

    #[test]
    fn test_claims_of_other_types_are_read_leniently() {
        let claims = decode_token(&token_with_payload(
            r#"{"user_id":"u-123","email":"a@b.com"}"#,
        ))
        .unwrap();
        assert_eq!(claims.user_id, None);
        assert_eq!(claims.extra.get("user_id"), Some(&json!("u-123")));
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));

        let claims = decode_token(&token_with_payload(
            r#"{"sub":42,"user_id":"17","exp":1900000000.5,"iat":1899990000}"#,
        ))
        .unwrap();
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert_eq!(claims.user_id, Some(17));
        assert_eq!(claims.exp, Some(1_900_000_000));
        assert_eq!(claims.iat, Some(1_899_990_000));
        assert!(claims.extra.is_empty());
        assert_eq!(claims.display_name(), Some("42"));

        let claims = decode_token(&token_with_payload(
            r#"{"email":["x"],"exp":"soon","type":null}"#,
        ))
        .unwrap();
        assert_eq!(claims.email, None);
        assert_eq!(claims.exp, None);
        assert_eq!(claims.token_type, None);
        assert_eq!(claims.extra.get("exp"), Some(&json!("soon")));
        assert!(!claims.is_expired(Utc::now()));
    }

    #[test]
    fn test_claims_serialize_back_to_their_names() {
        let claims = decode_token(&token_with_payload(
            r#"{"user_id":7,"type":"access","role":"customer"}"#,
        ))
        .unwrap();
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value, json!({ "user_id": 7, "type": "access", "role": "customer" }));
        assert_eq!(serde_json::from_value::<UserClaims>(value).unwrap(), claims);
    }

    #[test]
    fn test_wrong_segment_count_is_malformed() {
        assert!(decode_token("not-a-token").is_err());
        assert!(decode_token("a.b").is_err());
        assert!(decode_token("a.b.c.d").is_err());
        assert!(decode_token("").is_err());
    }

    #[test]
    fn test_non_json_payload_is_malformed() {
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(b"plain text");
        let err = decode_token(&format!("h.{payload}.s")).unwrap_err();
        assert!(err.reason.contains("JSON"));

        let err = decode_token("h.!!!.s").unwrap_err();
        assert!(err.reason.contains("base64"));
    }

    #[test]
    fn test_non_object_payload_is_malformed() {
        let token = token_with_payload("[1,2,3]");
        assert!(decode_token(&token).is_err());
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let header = general_purpose::URL_SAFE.encode(br#"{"alg":"none"}"#);
        let payload = general_purpose::URL_SAFE.encode(br#"{"email":"x@y.z"}"#);
        let claims = decode_token(&format!("{header}.{payload}.")).unwrap();
        assert_eq!(claims.email.as_deref(), Some("x@y.z"));
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let claims = decode_token(&token_with_payload(
            &json!({ "exp": (now - Duration::minutes(1)).timestamp() }).to_string(),
        ))
        .unwrap();
        assert!(claims.is_expired(now));

        let claims = decode_token(&token_with_payload("{}")).unwrap();
        assert!(!claims.is_expired(now));
        assert_eq!(claims.display_name(), None);
    }
}
