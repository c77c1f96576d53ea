//! The injected storefront context
//!
//! One [`StorefrontContext`] is built at startup and passed to every flow.
//! It owns the single [`SessionManager`] and the single [`ApiClient`], so no
//! flow reaches for global state.

use std::sync::Arc;

use crate::api::{ApiClient, GraphQLTransport, HttpTransport, QueryKey};
use crate::error::{StorefrontError, StorefrontResult};
use crate::session::{CookieTokenStorage, SessionManager, TokenCookieOptions, TokenStorage};
use crate::settings::StorefrontSettings;
use crate::utils::media::image_url;

/// Queries whose result depends on who is signed in
pub const SESSION_SCOPED_QUERIES: &[QueryKey] = &[QueryKey::Cart];

#[derive(Clone)]
pub struct StorefrontContext {
    settings: Arc<StorefrontSettings>,
    api: Arc<ApiClient>,
    session: Arc<SessionManager>,
    media_base_url: String,
}

impl StorefrontContext {
    /// Wire the HTTP transport, cookie storage and session from settings
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the HTTP client cannot
    /// be built
    pub fn from_settings(settings: StorefrontSettings) -> StorefrontResult<Self> {
        let storage: Arc<dyn TokenStorage> =
            Arc::new(CookieTokenStorage::new(&settings.cookies.token_cookie_name));
        let transport = HttpTransport::new(&settings.api.url)
            .map_err(|e| StorefrontError::Configuration(e.to_string()))?
            .with_token_storage(storage.clone());

        log::info!("Storefront API endpoint: {}", transport.endpoint());
        Ok(Self::with_transport(settings, Arc::new(transport), storage))
    }

    /// Wire a context around any transport and token storage
    #[must_use]
    pub fn with_transport(
        settings: StorefrontSettings,
        transport: Arc<dyn GraphQLTransport>,
        storage: Arc<dyn TokenStorage>,
    ) -> Self {
        let api = Arc::new(ApiClient::new(transport));
        let cookie_options = TokenCookieOptions::from_settings(&settings.cookies);
        let session = Arc::new(SessionManager::new(storage, api.clone(), cookie_options));
        let media_base_url = settings.media_base_url();

        Self {
            settings: Arc::new(settings),
            api,
            session,
            media_base_url,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &StorefrontSettings {
        &self.settings
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Absolute URL of a product image, or the placeholder
    #[must_use]
    pub fn image_url(&self, image: Option<&str>) -> String {
        image_url(&self.media_base_url, image)
    }

    /// Refresh cached queries after the signed-in identity changed
    pub async fn session_changed(&self) {
        self.api.invalidate(SESSION_SCOPED_QUERIES).await;
    }
}
