use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::api::cache::QueryCache;
use crate::api::graphql::{
    decode_data, GraphQLRequest, Mutation, NoVariables, Operation, Query, QueryKey,
};
use crate::api::http::GraphQLTransport;
use crate::api::operations::{Logout, RefreshToken};
use crate::error::ApiError;
use crate::session::SessionRemote;
use crate::utils::logging::LoggingHelper;

/// Typed GraphQL client with a query cache
///
/// Mutations declare the queries they make stale; [`ApiClient::mutate`]
/// re-runs every cached entry of those kinds before returning, so readers
/// of the cache see the server's view right after a write.
pub struct ApiClient {
    transport: Arc<dyn GraphQLTransport>,
    cache: QueryCache,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn GraphQLTransport>) -> Self {
        Self {
            transport,
            cache: QueryCache::new(),
        }
    }

    async fn send(&self, request: &GraphQLRequest) -> Result<Value, ApiError> {
        LoggingHelper::log_operation_start(&request.operation_name);
        let response = self
            .transport
            .execute(request)
            .await
            .and_then(|envelope| envelope.into_data(&request.operation_name));
        if let Err(e) = &response {
            LoggingHelper::log_operation_failed(&request.operation_name, e);
        }
        response
    }

    /// Run query `Q` against the API and cache its result
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the query or cannot be reached
    pub async fn query<Q: Query>(&self, variables: &Q::Variables) -> Result<Q::Data, ApiError> {
        let request = GraphQLRequest::for_operation::<Q>(variables)?;
        let data = self.send(&request).await?;
        let decoded = decode_data::<Q>(data.clone())?;
        self.cache.store(Q::KEY, request, data);
        Ok(decoded)
    }

    /// Last cached result of `Q` for these variables
    #[must_use]
    pub fn cached<Q: Query>(&self, variables: &Q::Variables) -> Option<Q::Data> {
        let variables = serde_json::to_value(variables).ok()?;
        let data = self.cache.get(Q::KEY, &variables)?;
        decode_data::<Q>(data).ok()
    }

    /// Run mutation `M`, then refresh the queries it invalidates
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the mutation or cannot be reached.
    /// Refetch failures are logged and leave the entry evicted.
    pub async fn mutate<M: Mutation>(&self, variables: &M::Variables) -> Result<M::Data, ApiError> {
        let request = GraphQLRequest::for_operation::<M>(variables)?;
        let data = self.send(&request).await?;
        let decoded = decode_data::<M>(data)?;

        LoggingHelper::log_invalidation(M::NAME, M::INVALIDATES);
        self.invalidate(M::INVALIDATES).await;

        Ok(decoded)
    }

    /// Re-run every cached query of the given kinds
    ///
    /// A failed refetch is logged and leaves its entry evicted.
    pub async fn invalidate(&self, keys: &[QueryKey]) {
        for key in keys {
            for request in self.cache.evict(*key) {
                match self.send(&request).await {
                    Ok(data) => self.cache.store(*key, request, data),
                    Err(e) => log::warn!(
                        "Refetch of {} failed, dropping cached result: {e}",
                        request.operation_name
                    ),
                }
            }
        }
    }

    /// Drop every cached query result
    pub fn reset_cache(&self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }
}

#[async_trait]
impl SessionRemote for ApiClient {
    async fn logout(&self) -> Result<(), ApiError> {
        self.mutate::<Logout>(&NoVariables {}).await.map(|_| ())
    }

    async fn refresh_token(&self) -> Result<String, ApiError> {
        let data = self.mutate::<RefreshToken>(&NoVariables {}).await?;
        data.refresh_token
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::MissingData {
                operation: RefreshToken::NAME.to_string(),
            })
    }
}
