//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SW_CACHE_*)
//! 2. TOML config file (if SW_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::lifecycle::Deployment;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SW_CACHE_*)
/// 2. TOML config file (if SW_CACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deploy-time version tag; changing it rotates every namespace.
    ///
    /// Set via SW_CACHE_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// The site's own origin. Requests to other origins (except localhost)
    /// are never intercepted.
    ///
    /// Set via SW_CACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to the SQLite cache database. In-memory when unset.
    ///
    /// Set via SW_CACHE_DB_PATH environment variable.
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Root-relative paths cached at install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// User-Agent string for network requests.
    ///
    /// Set via SW_CACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Platform-level request timeout in milliseconds.
    ///
    /// Set via SW_CACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// How often the host checks for a new worker version, in seconds.
    ///
    /// Set via SW_CACHE_UPDATE_INTERVAL_SECS environment variable.
    #[serde(default = "default_update_interval_secs")]
    pub update_interval_secs: u64,
}

fn default_cache_version() -> String {
    "v1.0.0".into()
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/manifest.json", "/file.svg", "/globe.svg", "/next.svg", "/vercel.svg", "/window.svg"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_user_agent() -> String {
    "sw-cache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_update_interval_secs() -> u64 {
    60 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_version: default_cache_version(),
            origin: default_origin(),
            db_path: None,
            precache: default_precache(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            update_interval_secs: default_update_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Parsed site origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme {scheme}") }),
        }
    }

    /// The worker version this configuration declares.
    pub fn deployment(&self) -> Result<Deployment, ConfigError> {
        Ok(Deployment {
            version: self.cache_version.clone(),
            origin: self.origin_url()?,
            precache: self.precache.clone(),
        })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SW_CACHE_`
    /// 2. TOML file from `SW_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed or
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SW_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SW_CACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
