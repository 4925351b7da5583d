//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SPLICE_*)
//! 2. TOML config file (if SPLICE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SPLICE_*)
/// 2. TOML config file (if SPLICE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Extension root that `pages/`, `includes/` and `templates/` are
    /// resolved against. A directory path or an `http(s)://` base URL.
    ///
    /// Set via SPLICE_RESOURCE_ROOT environment variable.
    #[serde(default = "default_resource_root")]
    pub resource_root: String,

    /// SQLite file backing the session store. In-memory when unset.
    ///
    /// Set via SPLICE_STORE_PATH environment variable.
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Id of the element pages are spliced into.
    ///
    /// Set via SPLICE_ROOT_ELEMENT_ID environment variable.
    #[serde(default = "default_root_element_id")]
    pub root_element_id: String,

    /// Attribute on the root element recording the current page.
    ///
    /// Set via SPLICE_PAGE_ATTRIBUTE environment variable.
    #[serde(default = "default_page_attribute")]
    pub page_attribute: String,

    /// Locale used when the preferred language has no table.
    ///
    /// Set via SPLICE_FALLBACK_LOCALE environment variable.
    #[serde(default = "default_fallback_locale")]
    pub fallback_locale: String,

    /// Preferred language override (e.g. `fr-CA`). Follows the OS when unset.
    ///
    /// Set via SPLICE_LANGUAGE environment variable.
    #[serde(default)]
    pub language: Option<String>,

    /// Directory of `<code>.json` locale files.
    ///
    /// Set via SPLICE_LOCALES_DIR environment variable.
    #[serde(default)]
    pub locales_dir: Option<PathBuf>,

    /// Lifetime of request helper cache entries in seconds.
    ///
    /// Set via SPLICE_REQUEST_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_request_cache_ttl_secs")]
    pub request_cache_ttl_secs: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SPLICE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_resource_root() -> String {
    ".".into()
}

fn default_root_element_id() -> String {
    "_root".into()
}

fn default_page_attribute() -> String {
    "data-page".into()
}

fn default_fallback_locale() -> String {
    "en".into()
}

fn default_request_cache_ttl_secs() -> u64 {
    3600
}

fn default_user_agent() -> String {
    "splice/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            resource_root: default_resource_root(),
            store_path: None,
            root_element_id: default_root_element_id(),
            page_attribute: default_page_attribute(),
            fallback_locale: default_fallback_locale(),
            language: None,
            locales_dir: None,
            request_cache_ttl_secs: default_request_cache_ttl_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Request cache TTL as Duration.
    pub fn request_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.request_cache_ttl_secs)
    }

    /// Whether the resource root is a remote base URL rather than a directory.
    pub fn resource_root_is_remote(&self) -> bool {
        self.resource_root.starts_with("http://") || self.resource_root.starts_with("https://")
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SPLICE_`
    /// 2. TOML file from `SPLICE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SPLICE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SPLICE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The store path, required for commands that must persist the session.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no store path is configured.
    pub fn require_store_path(&self) -> Result<&PathBuf, ConfigError> {
        self.store_path.as_ref().ok_or_else(|| ConfigError::Missing {
            field: "store_path".into(),
            hint: "Set SPLICE_STORE_PATH environment variable".into(),
        })
    }
}
