use serde::{Deserialize, Serialize};
use std::fs;

use crate::utils::media::strip_graphql_suffix;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorefrontSettings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub cookies: CookieSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// GraphQL endpoint, e.g. `http://localhost:8000/graphql/`
    pub url: String,
    /// Base URL for product images. Derived from `url` when absent.
    #[serde(default)]
    pub media_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    /// Send the token cookie over secure transport only
    pub secure: bool,
    pub token_cookie_name: String,
    /// Lifetime of the access token cookie in minutes
    pub token_lifetime_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000/graphql/".to_string(),
            media_base_url: None,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            token_cookie_name: "access_token".to_string(),
            token_lifetime_minutes: 60,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Logger filtered by `level`, in `RUST_LOG` directive syntax
    #[must_use]
    pub fn logger_builder(&self) -> env_logger::Builder {
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&self.level);
        builder
    }
}

impl StorefrontSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Logger initialization fails
    /// - Settings file cannot be read or parsed
    pub fn load() -> anyhow::Result<Self> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        settings.logging.logger_builder().try_init()?;
        log::debug!("Logging initialized at '{}'", settings.logging.level);

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (applied separately)
    /// 2. Settings.toml in `STOREFRONT_CONFIG_DIR`
    /// 3. Settings.toml in the current directory
    /// 4. Defaults
    fn load_base_settings() -> anyhow::Result<Self> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_file(&default_config_path)?;
            log::info!("Loaded base settings from {}", default_config_path.display());
        }

        if let Ok(config_dir) = std::env::var("STOREFRONT_CONFIG_DIR") {
            let config_path = std::path::Path::new(&config_dir).join("Settings.toml");
            if config_path.exists() {
                settings = Self::from_file(&config_path)?;
                log::info!("Overriding settings from {}", config_path.display());
            } else {
                log::info!(
                    "STOREFRONT_CONFIG_DIR set but no Settings.toml found at: {}",
                    config_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    fn apply_env_overrides(settings: &mut Self) {
        Self::apply_api_env_overrides(&mut settings.api);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    pub fn apply_api_env_overrides(api_settings: &mut ApiSettings) {
        if let Ok(url) = std::env::var("STOREFRONT_API_URL") {
            api_settings.url = url;
        }
        if let Ok(media_url) = std::env::var("STOREFRONT_MEDIA_URL") {
            api_settings.media_base_url = Some(media_url);
        }
    }

    pub fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(secure_str) = std::env::var("SECURE_COOKIES") {
            // Only the literal "true" enables secure cookies
            cookie_settings.secure = secure_str.trim() == "true";
        }
        if let Ok(name) = std::env::var("TOKEN_COOKIE_NAME") {
            if !name.is_empty() {
                cookie_settings.token_cookie_name = name;
            }
        }
        if let Ok(minutes_str) = std::env::var("TOKEN_LIFETIME_MINUTES") {
            match minutes_str.parse::<i64>() {
                Ok(minutes) if minutes > 0 => cookie_settings.token_lifetime_minutes = minutes,
                _ => log::warn!("Ignoring invalid TOKEN_LIFETIME_MINUTES: {minutes_str}"),
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                if line.trim_start().starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Base URL used to resolve product images
    #[must_use]
    pub fn media_base_url(&self) -> String {
        self.api
            .media_base_url
            .clone()
            .unwrap_or_else(|| strip_graphql_suffix(&self.api.url))
    }
}
