//! GraphQL wire types and the operation traits
//!
//! Every request is a POST of `{ query, variables, operationName }` and
//! every response is an envelope carrying `data`, `errors`, or both.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Request body sent to the GraphQL endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    pub variables: Value,
    pub operation_name: String,
}

impl GraphQLRequest {
    /// Build the request for operation `O`
    ///
    /// # Errors
    ///
    /// Returns an error if the variables cannot be serialized
    pub fn for_operation<O: Operation>(variables: &O::Variables) -> Result<Self, ApiError> {
        let variables = serde_json::to_value(variables)
            .map_err(|e| ApiError::Transport(format!("Failed to encode variables: {e}")))?;
        Ok(Self {
            query: O::DOCUMENT.to_string(),
            variables,
            operation_name: O::NAME.to_string(),
        })
    }
}

/// One entry of the `errors` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLErrorMessage {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
}

/// Untyped response envelope
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLErrorMessage>>,
}

impl GraphQLResponse {
    #[must_use]
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: Some(vec![GraphQLErrorMessage {
                message: message.into(),
                path: None,
            }]),
        }
    }

    /// Reduce the envelope to its data, turning any error entry into
    /// [`ApiError::Operation`]
    ///
    /// # Errors
    ///
    /// Returns an error if the envelope lists errors or carries no data
    pub fn into_data(self, operation: &str) -> Result<Value, ApiError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(ApiError::Operation {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
        match self.data {
            Some(Value::Null) | None => Err(ApiError::MissingData {
                operation: operation.to_string(),
            }),
            Some(data) => Ok(data),
        }
    }
}

/// Decode a data object into an operation's typed result
///
/// # Errors
///
/// Returns an error if the data does not match the expected shape
pub fn decode_data<O: Operation>(data: Value) -> Result<O::Data, ApiError> {
    serde_json::from_value(data)
        .map_err(|e| ApiError::Transport(format!("Unexpected {} response: {e}", O::NAME)))
}

/// Queries whose cached results a mutation can invalidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products,
    Product,
    Cart,
}

/// A named GraphQL document with typed variables and result
pub trait Operation {
    const NAME: &'static str;
    const DOCUMENT: &'static str;
    type Variables: Serialize + Send + Sync;
    type Data: DeserializeOwned;
}

/// A read-only operation whose result is cached under [`Query::KEY`]
pub trait Query: Operation {
    const KEY: QueryKey;
}

/// A write operation that declares which cached queries it makes stale
pub trait Mutation: Operation {
    const INVALIDATES: &'static [QueryKey];
}

/// Operations without variables serialize as `{}`
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoVariables {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_errors_take_precedence_over_data() {
        let response: GraphQLResponse = serde_json::from_value(json!({
            "data": { "login": null },
            "errors": [
                { "message": "Invalid credentials", "path": ["login"] }
            ]
        }))
        .unwrap();

        let err = response.into_data("Login").unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_null_data_is_missing() {
        let response: GraphQLResponse = serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(matches!(
            response.into_data("Cart"),
            Err(ApiError::MissingData { ref operation }) if operation == "Cart"
        ));
    }

    #[test]
    fn test_empty_error_list_is_ignored() {
        let response = GraphQLResponse {
            data: Some(json!({ "ok": true })),
            errors: Some(vec![]),
        };
        assert_eq!(response.into_data("Ok").unwrap(), json!({ "ok": true }));
    }

    #[test]
    fn test_no_variables_serializes_as_empty_object() {
        assert_eq!(serde_json::to_value(NoVariables {}).unwrap(), json!({}));
    }
}
