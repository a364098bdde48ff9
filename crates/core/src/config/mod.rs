//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (TETHER_*)
//! 2. TOML config file (if TETHER_CONFIG_FILE set)
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
/// 1. Environment variables (TETHER_*)
/// 2. TOML config file (if TETHER_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via TETHER_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin of the hosted application (scheme, host and port only).
    ///
    /// Requests to any other origin are passed through untouched.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Leading component of every partition name.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Generation tag embedded in partition names.
    ///
    /// Bumping it makes activation discard every older partition.
    #[serde(default = "default_version")]
    pub version: String,

    /// Path prefix that marks a request as an API call.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Document served to navigations when offline.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Paths preloaded into the static partition on install.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Age after which dynamic entries are evicted, in seconds.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,

    /// Interval of the built-in eviction timer in seconds (0 disables it).
    #[serde(default)]
    pub evict_interval_secs: u64,

    /// Sync tag that triggers replay of pending entries.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Message type that triggers eviction.
    #[serde(default = "default_clean_command")]
    pub clean_command: String,

    /// Application name, used as the notification title.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Icon path attached to notifications.
    #[serde(default = "default_icon")]
    pub icon: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via TETHER_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via TETHER_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via TETHER_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./tether-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_prefix() -> String {
    "tether".into()
}

fn default_version() -> String {
    "v1.0.0".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_entry_point() -> String {
    "/index.html".into()
}

fn default_manifest() -> Vec<String> {
    [
        "/",
        "/index.html",
        "/manifest.json",
        "/favicon.png",
        "/icons/Icon-192.png",
        "/icons/Icon-512.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_age_secs() -> u64 {
    60 * 60
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_clean_command() -> String {
    "CLEAN_CACHE".into()
}

fn default_app_name() -> String {
    "tether".into()
}

fn default_icon() -> String {
    "/icons/Icon-192.png".into()
}

fn default_user_agent() -> String {
    "tether/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            api_prefix: default_api_prefix(),
            entry_point: default_entry_point(),
            manifest: default_manifest(),
            max_age_secs: default_max_age_secs(),
            evict_interval_secs: 0,
            sync_tag: default_sync_tag(),
            clean_command: default_clean_command(),
            app_name: default_app_name(),
            icon: default_icon(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Maximum age of a dynamic entry before eviction.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Interval of the eviction timer, if enabled.
    pub fn evict_interval(&self) -> Option<Duration> {
        (self.evict_interval_secs > 0).then(|| Duration::from_secs(self.evict_interval_secs))
    }

    /// Name of the current static-assets partition.
    pub fn static_partition(&self) -> String {
        format!("{}-static-{}", self.cache_prefix, self.version)
    }

    /// Name of the current dynamic-runtime partition.
    pub fn dynamic_partition(&self) -> String {
        format!("{}-dynamic-{}", self.cache_prefix, self.version)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `TETHER_`
    /// 2. TOML file from `TETHER_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("TETHER_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("TETHER_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
