// Integration tests for the session lifecycle over the in-memory shop
use std::sync::Arc;

use shopfront::flows::{LoginForm, Navbar};
use shopfront::session::{
    decode_token, CookieTokenStorage, SessionManager, SessionState, TokenCookieOptions,
    TokenStorage,
};
use shopfront::testing::{FakeShopServer, MockSessionRemote, TestFixtures};
use shopfront::{Route, StorefrontContext};

fn signed_up_shop() -> Arc<FakeShopServer> {
    let server = Arc::new(FakeShopServer::with_catalog());
    server.add_active_user("a@b.com", "secret1");
    server
}

async fn logged_in(server: &Arc<FakeShopServer>) -> StorefrontContext {
    let ctx = TestFixtures::context_with(server.clone());
    LoginForm {
        email: "a@b.com".to_string(),
        password: "secret1".to_string(),
    }
    .submit(&ctx)
    .await
    .expect("login should succeed");
    ctx
}

#[tokio::test]
async fn test_login_stores_token_matching_payload() {
    let server = signed_up_shop();
    let ctx = logged_in(&server).await;

    let token = ctx.session().token().expect("token stored");
    let claims = decode_token(&token).unwrap();

    assert_eq!(ctx.session().storage().get(), Some(token.clone()));
    assert_eq!(ctx.session().current_user(), Some(claims.clone()));
    assert_eq!(claims.email.as_deref(), Some("a@b.com"));
    assert_eq!(claims.user_id, server.user_id("a@b.com"));
}

#[tokio::test]
async fn test_every_malformed_token_is_rejected() {
    for token in TestFixtures::malformed_tokens() {
        let storage = Arc::new(CookieTokenStorage::default());
        let manager = SessionManager::new(
            storage.clone(),
            Arc::new(MockSessionRemote::succeeding()),
            TokenCookieOptions::default(),
        );

        assert!(manager.login(&token).await.is_err(), "accepted {token:?}");
        assert_eq!(manager.state(), SessionState::Anonymous);
        assert_eq!(storage.get(), None);
    }
}

#[tokio::test]
async fn test_refresh_replaces_token_for_same_user() {
    let server = signed_up_shop();
    let ctx = logged_in(&server).await;
    let before = ctx.session().current_user().unwrap();

    let fresh = ctx.session().refresh_token().await.unwrap();

    assert_eq!(ctx.session().token(), Some(fresh.clone()));
    assert_eq!(ctx.session().storage().get(), Some(fresh));
    assert_eq!(ctx.session().current_user().unwrap().user_id, before.user_id);
}

#[tokio::test]
async fn test_refresh_after_server_logout_clears_session() {
    let server = signed_up_shop();
    let ctx = logged_in(&server).await;
    // Another client signed out, so the refresh credential is gone
    let other = TestFixtures::context_with(server.clone());
    Navbar::logout(&other).await;

    let err = ctx.session().refresh_token().await.unwrap_err();

    assert_eq!(err.to_string(), "Refresh token not found");
    assert!(!ctx.session().is_authenticated());
    assert_eq!(ctx.session().storage().get(), None);
}

#[tokio::test]
async fn test_logout_always_clears_locally() {
    let server = signed_up_shop();
    let ctx = logged_in(&server).await;

    let outcome = Navbar::logout(&ctx).await;

    assert_eq!(outcome.redirect, Some(Route::Login));
    assert_eq!(ctx.session().state(), SessionState::Anonymous);
    assert_eq!(ctx.session().storage().get(), None);
    assert_eq!(server.signed_in(), None);
}

#[tokio::test]
async fn test_observers_only_see_matching_pairs() {
    let storage = Arc::new(CookieTokenStorage::default());
    let fresh = TestFixtures::access_token(2, "fresh@b.com");
    let manager = Arc::new(SessionManager::new(
        storage,
        Arc::new(MockSessionRemote::refreshing_to(fresh)),
        TokenCookieOptions::default(),
    ));
    let mut observer = manager.subscribe();

    let watcher = tokio::spawn(async move {
        let mut seen = 0;
        while observer.changed().await.is_ok() {
            let session = observer.borrow_and_update().clone();
            match (session.token(), session.user()) {
                (Some(token), Some(user)) => {
                    assert_eq!(&decode_token(token).unwrap(), user);
                }
                (None, None) => {}
                _ => panic!("torn session observed"),
            }
            seen += 1;
        }
        seen
    });

    manager
        .login(&TestFixtures::access_token(1, "a@b.com"))
        .await
        .unwrap();
    manager.refresh_token().await.unwrap();
    manager.logout().await;
    drop(manager);

    assert!(watcher.await.unwrap() >= 1);
}

#[tokio::test]
async fn test_racing_refresh_and_logout_converge() {
    let storage = Arc::new(CookieTokenStorage::default());
    let manager = Arc::new(SessionManager::new(
        storage.clone(),
        Arc::new(MockSessionRemote::refreshing_to(TestFixtures::access_token(
            1, "a@b.com",
        ))),
        TokenCookieOptions::default(),
    ));
    manager
        .login(&TestFixtures::access_token(1, "a@b.com"))
        .await
        .unwrap();

    let refreshing = manager.clone();
    let (refresh, ()) = tokio::join!(
        async move { refreshing.refresh_token().await },
        manager.logout()
    );
    assert!(refresh.is_ok());

    // Whichever committed last wins; the stored token and state always agree
    match manager.token() {
        Some(token) => {
            assert_eq!(storage.get(), Some(token));
            assert!(manager.is_authenticated());
        }
        None => {
            assert_eq!(storage.get(), None);
            assert!(!manager.is_authenticated());
        }
    }
}

#[test]
fn test_session_restores_from_set_cookie_header() {
    let token = TestFixtures::access_token(5, "back@b.com");
    let storage = Arc::new(CookieTokenStorage::from_set_cookie(
        "access_token",
        &format!("access_token={token}; Path=/; Max-Age=3600; SameSite=Lax"),
    ));

    let manager = SessionManager::new(
        storage,
        Arc::new(MockSessionRemote::succeeding()),
        TokenCookieOptions::default(),
    );

    assert!(manager.is_authenticated());
    assert_eq!(manager.token(), Some(token));
}
