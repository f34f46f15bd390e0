//! Backend connection settings loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PANTRY_API_URL` - Base URL of the scheduling backend
//!
//! ## Optional
//! - `PANTRY_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `PANTRY_UTC_OFFSET` - Offset used to decide a shift's calendar day and to
//!   read `datetime-local` form input (default: +00:00)

use std::time::Duration;

use chrono::FixedOffset;
use pantry_shifts_core::parse_offset;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UTC_OFFSET: &str = "+00:00";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Connection settings for [`crate::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `http://127.0.0.1:5000`
    pub base_url: Url,
    /// Timeout applied to each request
    pub timeout: Duration,
    /// Offset for local calendar dates
    pub utc_offset: FixedOffset,
}

impl ApiConfig {
    /// Settings for `base_url` with default timeout and a UTC calendar.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("PANTRY_API_URL", base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            utc_offset: FixedOffset::east_opt(0)
                .ok_or_else(|| invalid("PANTRY_UTC_OFFSET", "zero offset"))?,
        })
    }

    /// Load settings from the environment.
    ///
    /// Does not read `.env`; binaries call `dotenvy::dotenv()` first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PANTRY_API_URL` is missing or any value is
    /// malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("PANTRY_API_URL")?;
        let timeout_secs = get_env_or_default(
            "PANTRY_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| invalid("PANTRY_API_TIMEOUT_SECS", e))?;
        let utc_offset = parse_offset(&get_env_or_default("PANTRY_UTC_OFFSET", DEFAULT_UTC_OFFSET))
            .map_err(|e| invalid("PANTRY_UTC_OFFSET", e))?;

        Ok(Self {
            base_url: parse_base_url("PANTRY_API_URL", &base_url)?,
            timeout: Duration::from_secs(timeout_secs),
            utc_offset,
        })
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }
}

fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| invalid(key, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(key, "must be an http or https URL"));
    }
    Ok(url)
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason.to_string())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if unset.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable; blank counts as unset.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
