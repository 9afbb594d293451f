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
    /// - `cache_version` is empty or contains whitespace
    /// - `origin` is not an absolute http(s) URL
    /// - any `precache` path is not root-relative
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `update_interval_secs` is under a minute
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_version.is_empty() {
            return Err(ConfigError::Missing {
                field: "cache_version".into(),
                hint: "Set SW_CACHE_CACHE_VERSION environment variable".into(),
            });
        }
        if self.cache_version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "cache_version".into(),
                reason: "must not contain whitespace".into(),
            });
        }

        self.origin_url()?;

        if let Some(path) = self.precache.iter().find(|p| !p.starts_with('/') || p.starts_with("//")) {
            return Err(ConfigError::Invalid {
                field: "precache".into(),
                reason: format!("{path} is not a root-relative path"),
            });
        }
        if self.precache.is_empty() {
            tracing::warn!("precache manifest is empty; install will cache nothing");
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.update_interval_secs < 60 {
            return Err(ConfigError::Invalid {
                field: "update_interval_secs".into(),
                reason: "must be at least 60 seconds".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_version() {
        let config = AppConfig { cache_version: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Missing { field, .. }) if field == "cache_version"));
    }

    #[test]
    fn test_validate_version_whitespace() {
        let config = AppConfig { cache_version: "v1 beta".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "cache_version"));
    }

    #[test]
    fn test_validate_relative_origin() {
        let config = AppConfig { origin: "site.example".into(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "origin"));
    }

    #[test]
    fn test_validate_precache_paths() {
        let config = AppConfig { precache: vec!["/".into(), "icon.png".into()], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "precache"));

        let config = AppConfig { precache: vec!["//cdn.example/x.js".into()], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "precache"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_update_interval() {
        let config = AppConfig { update_interval_secs: 59, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "update_interval_secs"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
