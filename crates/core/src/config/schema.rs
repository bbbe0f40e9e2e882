//! Configuration schema definitions
//!
//! Every field has a default, so a file only needs the values it changes.

use crate::retry::EndpointOverride;
use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub cache: CacheSection,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default)]
    pub lookup: LookupSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// Primary API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    /// Base URL of the health-tracking REST API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Deployment environment (development, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Where front ends send the user after an authentication failure
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,

    /// Delay before that redirect, in milliseconds
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            environment: default_environment(),
            timeout_secs: default_api_timeout(),
            sign_in_path: default_sign_in_path(),
            redirect_delay_ms: default_redirect_delay(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.vitaltrack.app/api".to_string()
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_sign_in_path() -> String {
    "/signin".to_string()
}

fn default_redirect_delay() -> u64 {
    1500
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    /// Entry time-to-live in seconds
    #[serde(default = "default_cache_max_age")]
    pub max_age_secs: u64,

    /// Maximum number of entries
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_age_secs: default_cache_max_age(),
            max_entries: default_cache_max_entries(),
        }
    }
}

fn default_cache_max_age() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    100
}

/// Retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySection {
    /// Retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff unit in milliseconds
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,

    /// Upper bound for one delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,

    /// Endpoint-specific adjustments, applied on top of [`builtin_overrides`];
    /// an entry with the same path prefix takes precedence over a built-in one
    #[serde(default)]
    pub overrides: Vec<EndpointOverride>,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
            overrides: Vec::new(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

impl RetrySection {
    /// Built-in overrides followed by the configured ones
    #[must_use]
    pub fn effective_overrides(&self) -> Vec<EndpointOverride> {
        let mut overrides = builtin_overrides();
        overrides.extend(self.overrides.iter().cloned());
        overrides
    }
}

/// Overrides every client starts with
///
/// Nutritional goal reads fall back to local defaults, so server errors on
/// them are not retried. Writes have no fallback and keep the normal policy.
#[must_use]
pub fn builtin_overrides() -> Vec<EndpointOverride> {
    vec![EndpointOverride::no_server_retries("/nutritional-goals").for_methods(["GET"])]
}

/// Third-party food lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupSection {
    /// Base URL of the food data service
    #[serde(default = "default_lookup_url")]
    pub base_url: String,

    /// API key appended as the `api_key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

impl Default for LookupSection {
    fn default() -> Self {
        Self {
            base_url: default_lookup_url(),
            api_key: None,
            timeout_secs: default_lookup_timeout(),
        }
    }
}

fn default_lookup_url() -> String {
    "https://api.nal.usda.gov/fdc/v1".to_string()
}

fn default_lookup_timeout() -> u64 {
    10
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,

    /// Also write daily-rotated log files into this directory
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
