//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `resource_root`, `root_element_id`, `page_attribute` or `user_agent` is empty
    /// - `fallback_locale` is not a two-letter code
    /// - `request_cache_ttl_secs` is 0 or exceeds one week
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("resource_root", &self.resource_root),
            ("root_element_id", &self.root_element_id),
            ("page_attribute", &self.page_attribute),
            ("user_agent", &self.user_agent),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        if self.fallback_locale.len() != 2 || !self.fallback_locale.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ConfigError::Invalid {
                field: "fallback_locale".into(),
                reason: "must be a lowercase two-letter language code".into(),
            });
        }

        if self.request_cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_cache_ttl_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.request_cache_ttl_secs > 7 * 24 * 3600 {
            return Err(ConfigError::Invalid {
                field: "request_cache_ttl_secs".into(),
                reason: "must not exceed one week (604800s)".into(),
            });
        }

        if self.language.is_some() && self.locales_dir.is_none() {
            tracing::warn!(
                language = self.language.as_deref(),
                "language override is set but no locales_dir is configured; \
                 translations will fall back to placeholders"
            );
        }

        Ok(())
    }
}
