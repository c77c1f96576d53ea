//! Session Manager - client-side access token lifecycle
//!
//! The `SessionManager` is the only writer of the current [`Session`]. It
//! composes a [`TokenStorage`] (where the token lives), the token decoder
//! (who the token belongs to) and a [`SessionRemote`] (the API calls that
//! invalidate or mint tokens).
//!
//! ## State
//!
//! A session is either **Anonymous** or **Authenticated**. The current value
//! is published through a `tokio::sync::watch` channel; every publish
//! replaces the whole [`Session`], so observers always see a token and the
//! user decoded from that same token.
//!
//! ## Ordering
//!
//! Remote calls run without holding any lock. Only the local commit
//! (storage write, decode, publish) is serialized, so when a refresh and a
//! logout race, whichever commits last decides the final state.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::error::{ApiError, MalformedTokenError, StorefrontError, StorefrontResult};
use crate::session::cookie::{TokenCookieOptions, TokenStorage};
use crate::session::token_processor::{decode_token, UserClaims};
use crate::utils::logging::LoggingHelper;

// =============================================================================
// Types
// =============================================================================

/// Remote calls the session depends on
#[async_trait]
pub trait SessionRemote: Send + Sync {
    /// Invalidate the server-side refresh credential
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the call or cannot be reached
    async fn logout(&self) -> Result<(), ApiError>;

    /// Mint a new access token from the implicit refresh credential
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the call or cannot be reached
    async fn refresh_token(&self) -> Result<String, ApiError>;
}

/// Authentication state of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Current token and the identity decoded from it
///
/// `user` is present exactly when `token` is present; the constructors are
/// the only way to build a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserClaims>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn authenticated(token: String, user: UserClaims) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserClaims> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }
}

// =============================================================================
// Session Manager
// =============================================================================

pub struct SessionManager {
    storage: Arc<dyn TokenStorage>,
    remote: Arc<dyn SessionRemote>,
    cookie_options: TokenCookieOptions,
    state: watch::Sender<Session>,
    commit_lock: Mutex<()>,
}

impl SessionManager {
    /// Create a session manager, seeding its state from storage
    ///
    /// A stored token that fails to decode or has expired is removed and the
    /// session starts anonymous.
    #[must_use]
    pub fn new(
        storage: Arc<dyn TokenStorage>,
        remote: Arc<dyn SessionRemote>,
        cookie_options: TokenCookieOptions,
    ) -> Self {
        let initial = Self::restore(storage.as_ref());
        let (state, _) = watch::channel(initial);

        Self {
            storage,
            remote,
            cookie_options,
            state,
            commit_lock: Mutex::new(()),
        }
    }

    fn restore(storage: &dyn TokenStorage) -> Session {
        let Some(token) = storage.get() else {
            return Session::anonymous();
        };

        match decode_token(&token) {
            Ok(user) if user.is_expired(Utc::now()) => {
                log::info!("Stored access token has expired, starting anonymous");
                storage.remove();
                Session::anonymous()
            }
            Ok(user) => {
                LoggingHelper::log_session_authenticated(user.email.as_deref(), "restored");
                Session::authenticated(token, user)
            }
            Err(e) => {
                log::warn!("Discarding stored access token: {e}");
                storage.remove();
                Session::anonymous()
            }
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

impl SessionManager {
    /// Store `token` and publish the identity it carries
    ///
    /// Surrounding whitespace is stripped before the token is stored.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTokenError`] if the token cannot be decoded. The
    /// session is then anonymous and the token is not stored.
    pub async fn login(&self, token: &str) -> Result<UserClaims, MalformedTokenError> {
        self.commit_token(token, "login").await
    }

    /// Sign out, clearing local state whatever the API answers
    pub async fn logout(&self) {
        if let Err(e) = self.remote.logout().await {
            log::warn!("Remote logout failed, clearing local session anyway: {e}");
        }

        let _guard = self.commit_lock.lock().await;
        self.clear_locked("logout");
    }

    /// Replace the current token with a freshly minted one
    ///
    /// # Errors
    ///
    /// Returns the API or decoding error. The session is anonymous afterwards,
    /// so callers must stop issuing authenticated requests.
    pub async fn refresh_token(&self) -> StorefrontResult<String> {
        match self.remote.refresh_token().await {
            Ok(token) => {
                self.commit_token(&token, "refresh").await?;
                Ok(token.trim().to_string())
            }
            Err(e) => {
                log::warn!("Token refresh failed: {e}");
                let _guard = self.commit_lock.lock().await;
                self.clear_locked("refresh failed");
                Err(StorefrontError::Api(e))
            }
        }
    }

    async fn commit_token(
        &self,
        token: &str,
        reason: &str,
    ) -> Result<UserClaims, MalformedTokenError> {
        let token = token.trim();
        let _guard = self.commit_lock.lock().await;

        match decode_token(token) {
            Ok(user) => {
                self.storage.set(token, &self.cookie_options);
                LoggingHelper::log_session_authenticated(user.email.as_deref(), reason);
                self.state
                    .send_replace(Session::authenticated(token.to_string(), user.clone()));
                Ok(user)
            }
            Err(e) => {
                log::warn!("Rejecting token on {reason}: {e}");
                self.clear_locked(reason);
                Err(e)
            }
        }
    }

    /// Callers must hold `commit_lock`
    fn clear_locked(&self, reason: &str) {
        self.storage.remove();
        self.state.send_replace(Session::anonymous());
        LoggingHelper::log_session_cleared(reason);
    }
}

// =============================================================================
// Accessors
// =============================================================================

impl SessionManager {
    /// Snapshot of the current session
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Observe session changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<UserClaims> {
        self.state.borrow().user().cloned()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(ToString::to_string)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().state()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Storage backing this session
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.storage
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::cookie::CookieTokenStorage;
    use crate::testing::mock::MockSessionRemote;
    use crate::testing::TestFixtures;

    fn manager_with(
        storage: Arc<CookieTokenStorage>,
        remote: MockSessionRemote,
    ) -> SessionManager {
        SessionManager::new(storage, Arc::new(remote), TokenCookieOptions::default())
    }

    #[tokio::test]
    async fn test_login_stores_and_decodes() {
        let storage = Arc::new(CookieTokenStorage::default());
        let manager = manager_with(storage.clone(), MockSessionRemote::succeeding());
        let token = TestFixtures::access_token(7, "a@b.com");

        let user = manager.login(&token).await.unwrap();

        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert_eq!(storage.get().as_deref(), Some(token.as_str()));
        assert_eq!(manager.token().as_deref(), Some(token.as_str()));
        assert_eq!(manager.current_user().unwrap().user_id, Some(7));
        assert_eq!(manager.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn test_login_stores_trimmed_token() {
        let storage = Arc::new(CookieTokenStorage::default());
        let manager = manager_with(storage.clone(), MockSessionRemote::succeeding());
        let token = TestFixtures::access_token(7, "a@b.com");

        manager.login(&format!("  {token}\n")).await.unwrap();

        assert_eq!(storage.get().as_deref(), Some(token.as_str()));
        assert_eq!(manager.token().as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_malformed_login_returns_to_anonymous() {
        let storage = Arc::new(CookieTokenStorage::default());
        let manager = manager_with(storage.clone(), MockSessionRemote::succeeding());
        manager
            .login(&TestFixtures::access_token(1, "first@b.com"))
            .await
            .unwrap();

        let result = manager.login("definitely-not-a-jwt").await;

        assert!(result.is_err());
        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(storage.get(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_remote_fails() {
        let storage = Arc::new(CookieTokenStorage::default());
        let remote = MockSessionRemote::failing("Network error");
        let manager = manager_with(storage.clone(), remote.clone());
        manager
            .login(&TestFixtures::access_token(1, "a@b.com"))
            .await
            .unwrap();

        manager.logout().await;

        assert_eq!(remote.logout_calls(), 1);
        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(), None);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_and_propagates() {
        let storage = Arc::new(CookieTokenStorage::default());
        let manager = manager_with(storage.clone(), MockSessionRemote::failing("Token revoked"));
        manager
            .login(&TestFixtures::access_token(1, "a@b.com"))
            .await
            .unwrap();

        let err = manager.refresh_token().await.unwrap_err();

        assert_eq!(err.to_string(), "Token revoked");
        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(storage.get(), None);
    }

    #[tokio::test]
    async fn test_refresh_success_publishes_matching_pair() {
        let storage = Arc::new(CookieTokenStorage::default());
        let fresh = TestFixtures::access_token(1, "fresh@b.com");
        let manager = manager_with(
            storage.clone(),
            MockSessionRemote::refreshing_to(fresh.clone()),
        );
        manager
            .login(&TestFixtures::access_token(1, "stale@b.com"))
            .await
            .unwrap();
        let mut observer = manager.subscribe();

        let token = manager.refresh_token().await.unwrap();

        assert_eq!(token, fresh);
        assert!(observer.has_changed().unwrap());
        let seen = observer.borrow_and_update().clone();
        assert_eq!(seen.token(), Some(fresh.as_str()));
        assert_eq!(seen.user().unwrap().email.as_deref(), Some("fresh@b.com"));
        assert_eq!(storage.get().as_deref(), Some(fresh.as_str()));
    }

    #[test]
    fn test_restores_valid_stored_token() {
        let storage = Arc::new(CookieTokenStorage::default());
        let token = TestFixtures::access_token(3, "back@b.com");
        storage.set(&token, &TokenCookieOptions::default());

        let manager = manager_with(storage, MockSessionRemote::succeeding());

        assert!(manager.is_authenticated());
        assert_eq!(
            manager.current_user().unwrap().email.as_deref(),
            Some("back@b.com")
        );
    }

    #[test]
    fn test_discards_expired_or_malformed_stored_token() {
        let storage = Arc::new(CookieTokenStorage::default());
        storage.set(&TestFixtures::expired_access_token(), &TokenCookieOptions::default());
        let manager = manager_with(storage.clone(), MockSessionRemote::succeeding());
        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(), None);

        storage.set("garbage", &TokenCookieOptions::default());
        let manager = manager_with(storage.clone(), MockSessionRemote::succeeding());
        assert!(!manager.is_authenticated());
        assert_eq!(storage.get(), None);
    }
}
