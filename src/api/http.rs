//! HTTP transport for the GraphQL endpoint
//!
//! Cookies set by the API (the refresh credential, the guest cart session)
//! live in a shared cookie jar and are sent back on every request. The
//! access token, when stored, travels as a bearer header.

use async_trait::async_trait;
use reqwest::cookie::Jar;
use std::sync::Arc;
use url::Url;

use crate::api::graphql::{GraphQLRequest, GraphQLResponse};
use crate::error::ApiError;
use crate::session::cookie::TokenStorage;

/// Anything able to execute a GraphQL request
#[async_trait]
pub trait GraphQLTransport: Send + Sync {
    /// Send `request` and return the response envelope
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the endpoint cannot be reached or
    /// does not answer with an envelope
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, ApiError>;
}

pub struct HttpTransport {
    endpoint: Url,
    http_client: reqwest::Client,
    cookie_jar: Arc<Jar>,
    token_storage: Option<Arc<dyn TokenStorage>>,
}

impl HttpTransport {
    /// Create a transport for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| ApiError::Transport(format!("Invalid API URL '{endpoint}': {e}")))?;
        let cookie_jar = Arc::new(Jar::default());
        let http_client = reqwest::Client::builder()
            .cookie_provider(cookie_jar.clone())
            .build()?;

        Ok(Self {
            endpoint,
            http_client,
            cookie_jar,
            token_storage: None,
        })
    }

    /// Attach the storage the bearer token is read from
    #[must_use]
    pub fn with_token_storage(mut self, storage: Arc<dyn TokenStorage>) -> Self {
        self.token_storage = Some(storage);
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Cookie jar shared by every request
    #[must_use]
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookie_jar
    }
}

#[async_trait]
impl GraphQLTransport for HttpTransport {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, ApiError> {
        let mut builder = self.http_client.post(self.endpoint.clone()).json(request);
        if let Some(token) = self.token_storage.as_ref().and_then(|storage| storage.get()) {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // GraphQL servers often pair 4xx statuses with a regular error envelope
        match serde_json::from_str::<GraphQLResponse>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::Transport(format!(
                "{} failed with status {status}: {}",
                request.operation_name,
                body.chars().take(200).collect::<String>()
            ))),
            Err(e) => Err(ApiError::Transport(format!(
                "{} returned an invalid response: {e}",
                request.operation_name
            ))),
        }
    }
}
