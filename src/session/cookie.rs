use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::settings::CookieSettings;

/// Default cookie name for the access token
pub const TOKEN_COOKIE_NAME: &str = "access_token";

/// Options applied when the token cookie is written
#[derive(Debug, Clone)]
pub struct TokenCookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Duration,
}

impl Default for TokenCookieOptions {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: Duration::hours(1),
        }
    }
}

impl TokenCookieOptions {
    /// Build options from cookie settings
    #[must_use]
    pub fn from_settings(settings: &CookieSettings) -> Self {
        Self {
            secure: settings.secure,
            max_age: Duration::minutes(settings.token_lifetime_minutes),
            ..Default::default()
        }
    }
}

/// Client-side storage for the single access token
///
/// Implementations never fail: a missing or expired record reads as `None`.
pub trait TokenStorage: Send + Sync {
    /// Store `token`, replacing any previous one
    fn set(&self, token: &str, options: &TokenCookieOptions);

    /// Currently stored, unexpired token
    fn get(&self) -> Option<String>;

    /// Delete the stored token. Removing an absent token is a no-op.
    fn remove(&self);
}

/// Token storage backed by a single cookie record
///
/// The record can be exported as a `Set-Cookie` value with
/// [`CookieTokenStorage::to_set_cookie`] and restored with
/// [`CookieTokenStorage::from_set_cookie`] by embedders that need it to
/// outlive the process.
pub struct CookieTokenStorage {
    name: String,
    cookie: Mutex<Option<Cookie<'static>>>,
}

impl Default for CookieTokenStorage {
    fn default() -> Self {
        Self::new(TOKEN_COOKIE_NAME)
    }
}

impl CookieTokenStorage {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cookie: Mutex::new(None),
        }
    }

    /// Restore a previously exported record
    ///
    /// Values that do not parse, or that belong to another cookie name, are
    /// ignored and the storage starts empty.
    #[must_use]
    pub fn from_set_cookie(name: &str, set_cookie: &str) -> Self {
        let storage = Self::new(name);
        match Cookie::parse(set_cookie.to_string()) {
            Ok(cookie) if cookie.name() == name => {
                *storage.lock() = Some(cookie.into_owned());
            }
            Ok(cookie) => {
                log::warn!(
                    "Ignoring seeded cookie '{}', expected '{name}'",
                    cookie.name()
                );
            }
            Err(e) => log::warn!("Ignoring unparsable seeded token cookie: {e}"),
        }
        storage
    }

    /// Export the current record as a `Set-Cookie` value
    #[must_use]
    pub fn to_set_cookie(&self) -> Option<String> {
        self.lock().as_ref().map(ToString::to_string)
    }

    /// Cookie record currently held, expired or not
    #[must_use]
    pub fn cookie(&self) -> Option<Cookie<'static>> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Cookie<'static>>> {
        self.cookie.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(cookie: &Cookie<'_>, now: OffsetDateTime) -> bool {
        if let Some(expires) = cookie.expires_datetime() {
            return expires <= now;
        }
        cookie.max_age().is_some_and(|max_age| max_age <= Duration::ZERO)
    }
}

impl TokenStorage for CookieTokenStorage {
    fn set(&self, token: &str, options: &TokenCookieOptions) {
        let cookie = Cookie::build(self.name.clone(), token.to_string())
            .secure(options.secure)
            .same_site(options.same_site)
            .path(options.path.clone())
            .max_age(options.max_age)
            .expires(OffsetDateTime::now_utc() + options.max_age)
            .finish();

        log::debug!(
            "Storing token cookie: name={}, secure={}, max_age={}s",
            self.name,
            options.secure,
            options.max_age.whole_seconds()
        );
        *self.lock() = Some(cookie);
    }

    fn get(&self) -> Option<String> {
        let mut guard = self.lock();
        if guard
            .as_ref()
            .is_some_and(|cookie| Self::is_expired(cookie, OffsetDateTime::now_utc()))
        {
            log::debug!("Token cookie {} expired, evicting", self.name);
            *guard = None;
        }
        guard
            .as_ref()
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    fn remove(&self) {
        *self.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let storage = CookieTokenStorage::default();
        assert_eq!(storage.get(), None);

        storage.set("abc.def.ghi", &TokenCookieOptions::default());
        assert_eq!(storage.get().as_deref(), Some("abc.def.ghi"));

        let cookie = storage.cookie().unwrap();
        assert_eq!(cookie.name(), TOKEN_COOKIE_NAME);
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(Duration::hours(1)));
    }

    #[test]
    fn test_secure_flag_from_settings() {
        let settings = CookieSettings {
            secure: true,
            ..CookieSettings::default()
        };
        let storage = CookieTokenStorage::default();
        storage.set("t.o.k", &TokenCookieOptions::from_settings(&settings));
        assert_eq!(storage.cookie().unwrap().secure(), Some(true));
    }

    #[test]
    fn test_expired_token_reads_as_none() {
        let storage = CookieTokenStorage::default();
        let options = TokenCookieOptions {
            max_age: Duration::seconds(-1),
            ..Default::default()
        };
        storage.set("old.token.value", &options);
        assert_eq!(storage.get(), None);
        // Evicted on read
        assert!(storage.cookie().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let storage = CookieTokenStorage::default();
        storage.remove();
        storage.set("a.b.c", &TokenCookieOptions::default());
        storage.remove();
        storage.remove();
        assert_eq!(storage.get(), None);
    }

    #[test]
    fn test_export_and_restore() {
        let storage = CookieTokenStorage::default();
        storage.set("a.b.c", &TokenCookieOptions::default());
        let exported = storage.to_set_cookie().unwrap();
        assert!(exported.starts_with("access_token=a.b.c"));

        let restored = CookieTokenStorage::from_set_cookie(TOKEN_COOKIE_NAME, &exported);
        assert_eq!(restored.get().as_deref(), Some("a.b.c"));

        let other = CookieTokenStorage::from_set_cookie(TOKEN_COOKIE_NAME, "sessionid=xyz");
        assert_eq!(other.get(), None);
    }
}
