//! Mock objects and fake implementations for testing

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{GraphQLRequest, GraphQLResponse, GraphQLTransport};
use crate::error::ApiError;
use crate::session::SessionRemote;

type Scripted = Result<GraphQLResponse, ApiError>;

/// GraphQL transport answering from per-operation queues
///
/// Responses for an operation are consumed in the order they were added.
/// An operation with nothing queued fails with a transport error. Every
/// request is recorded, including failed ones.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<GraphQLRequest>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn responses(&self) -> MutexGuard<'_, HashMap<String, VecDeque<Scripted>>> {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn requests(&self) -> MutexGuard<'_, Vec<GraphQLRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Queue any scripted result for `operation`
    pub fn respond_with(&self, operation: &str, response: Scripted) {
        self.responses()
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue a `data` envelope
    pub fn respond_with_data(&self, operation: &str, data: Value) {
        self.respond_with(operation, Ok(GraphQLResponse::data(data)));
    }

    /// Queue an `errors` envelope with a single message
    pub fn respond_with_error(&self, operation: &str, message: &str) {
        self.respond_with(operation, Ok(GraphQLResponse::error(message)));
    }

    /// Queue a network-level failure
    pub fn fail_transport(&self, operation: &str, message: &str) {
        self.respond_with(operation, Err(ApiError::Transport(message.to_string())));
    }

    /// Every request received so far
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<GraphQLRequest> {
        self.requests().clone()
    }

    #[must_use]
    pub fn operation_names(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request.operation_name.clone())
            .collect()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl GraphQLTransport for MockTransport {
    async fn execute(&self, request: &GraphQLRequest) -> Result<GraphQLResponse, ApiError> {
        self.requests().push(request.clone());
        self.responses()
            .get_mut(&request.operation_name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ApiError::Transport(format!(
                    "No scripted response for {}",
                    request.operation_name
                )))
            })
    }
}

#[derive(Debug, Clone)]
enum RemoteBehaviour {
    Succeed,
    Fail(String),
    RefreshTo(String),
}

/// Session remote with fixed behaviour and call counters
///
/// Clones share their counters.
#[derive(Debug, Clone)]
pub struct MockSessionRemote {
    behaviour: RemoteBehaviour,
    logout_calls: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
}

impl MockSessionRemote {
    fn with(behaviour: RemoteBehaviour) -> Self {
        Self {
            behaviour,
            logout_calls: Arc::new(AtomicUsize::new(0)),
            refresh_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Logout succeeds; refresh fails because there is nothing to mint
    #[must_use]
    pub fn succeeding() -> Self {
        Self::with(RemoteBehaviour::Succeed)
    }

    /// Every call fails with `message`
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::with(RemoteBehaviour::Fail(message.to_string()))
    }

    /// Logout succeeds and refresh returns `token`
    #[must_use]
    pub fn refreshing_to(token: String) -> Self {
        Self::with(RemoteBehaviour::RefreshTo(token))
    }

    #[must_use]
    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRemote for MockSessionRemote {
    async fn logout(&self) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            RemoteBehaviour::Fail(message) => Err(ApiError::operation(message.clone())),
            RemoteBehaviour::Succeed | RemoteBehaviour::RefreshTo(_) => Ok(()),
        }
    }

    async fn refresh_token(&self) -> Result<String, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            RemoteBehaviour::RefreshTo(token) => Ok(token.clone()),
            RemoteBehaviour::Fail(message) => Err(ApiError::operation(message.clone())),
            RemoteBehaviour::Succeed => Err(ApiError::operation("Refresh token not found")),
        }
    }
}
