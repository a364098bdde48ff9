//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Upper bound on `max_age_secs`: one year.
pub const MAX_AGE_LIMIT_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not a bare http(s) origin
    /// - `version` or `cache_prefix` is empty
    /// - `api_prefix`, `entry_point`, `icon` or a manifest path is not absolute
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `max_age_secs` is 0 or exceeds one year
    /// - `user_agent`, `sync_tag` or `clean_command` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = url::Url::parse(&self.origin).map_err(|e| invalid("origin", e.to_string()))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", "scheme must be http or https"));
        }
        if origin.path() != "/" || origin.query().is_some() || origin.fragment().is_some() {
            return Err(invalid("origin", "must not carry a path, query or fragment"));
        }

        if self.version.is_empty() {
            return Err(invalid("version", "must not be empty"));
        }
        if self.cache_prefix.is_empty() {
            return Err(invalid("cache_prefix", "must not be empty"));
        }

        if !self.api_prefix.starts_with('/') {
            return Err(invalid("api_prefix", "must start with '/'"));
        }
        if !self.icon.starts_with('/') {
            return Err(invalid("icon", "must start with '/'"));
        }
        if !self.entry_point.starts_with('/') {
            return Err(invalid("entry_point", "must start with '/'"));
        }
        if let Some(path) = self.manifest.iter().find(|p| !p.starts_with('/')) {
            return Err(invalid("manifest", format!("path {path:?} must start with '/'")));
        }
        if !self.manifest.contains(&self.entry_point) {
            tracing::warn!(
                entry_point = %self.entry_point,
                "entry point is not in the manifest; offline navigations will only work once it is cached at runtime"
            );
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.max_age_secs == 0 {
            return Err(invalid("max_age_secs", "must be greater than 0"));
        }
        if self.max_age_secs > MAX_AGE_LIMIT_SECS {
            return Err(invalid("max_age_secs", format!("must not exceed one year ({MAX_AGE_LIMIT_SECS}s)")));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.sync_tag.is_empty() {
            return Err(invalid("sync_tag", "must not be empty"));
        }
        if self.clean_command.is_empty() {
            return Err(invalid("clean_command", "must not be empty"));
        }

        Ok(())
    }
}
