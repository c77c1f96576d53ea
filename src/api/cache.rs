//! Normalized-by-request cache of query results
//!
//! Entries are keyed by query kind plus the exact variables, and remember
//! the request that produced them so an invalidated entry can be re-run
//! without knowing its Rust type.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::graphql::{GraphQLRequest, QueryKey};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    key: QueryKey,
    variables: String,
}

impl CacheKey {
    fn new(key: QueryKey, variables: &Value) -> Self {
        Self {
            key,
            variables: variables.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedQuery {
    request: GraphQLRequest,
    data: Value,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, CachedQuery>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedQuery>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self, key: QueryKey, request: GraphQLRequest, data: Value) {
        let cache_key = CacheKey::new(key, &request.variables);
        self.lock().insert(cache_key, CachedQuery { request, data });
    }

    #[must_use]
    pub fn get(&self, key: QueryKey, variables: &Value) -> Option<Value> {
        self.lock()
            .get(&CacheKey::new(key, variables))
            .map(|entry| entry.data.clone())
    }

    /// Evict every entry of kind `key`, returning the requests that filled them
    pub fn evict(&self, key: QueryKey) -> Vec<GraphQLRequest> {
        let mut entries = self.lock();
        let stale: Vec<CacheKey> = entries.keys().filter(|k| k.key == key).cloned().collect();
        stale
            .into_iter()
            .filter_map(|k| entries.remove(&k))
            .map(|entry| entry.request)
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(name: &str, variables: Value) -> GraphQLRequest {
        GraphQLRequest {
            query: format!("query {name} {{ x }}"),
            variables,
            operation_name: name.to_string(),
        }
    }

    #[test]
    fn test_entries_are_keyed_by_variables() {
        let cache = QueryCache::new();
        cache.store(QueryKey::Product, request("GetProduct", json!({"id": "1"})), json!(1));
        cache.store(QueryKey::Product, request("GetProduct", json!({"id": "2"})), json!(2));

        assert_eq!(cache.get(QueryKey::Product, &json!({"id": "1"})), Some(json!(1)));
        assert_eq!(cache.get(QueryKey::Product, &json!({"id": "2"})), Some(json!(2)));
        assert_eq!(cache.get(QueryKey::Cart, &json!({})), None);
    }

    #[test]
    fn test_evict_only_touches_one_kind() {
        let cache = QueryCache::new();
        cache.store(QueryKey::Cart, request("Cart", json!({})), json!({"cart": null}));
        cache.store(QueryKey::Products, request("GetProducts", json!({})), json!([]));

        let evicted = cache.evict(QueryKey::Cart);

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].operation_name, "Cart");
        assert_eq!(cache.len(), 1);
        assert!(cache.evict(QueryKey::Cart).is_empty());
    }
}
