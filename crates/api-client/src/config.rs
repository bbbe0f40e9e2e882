//! Configuration for the VitalTrack API client
//!
//! Built from the shared TOML configuration, then overridden by environment
//! variables.

use crate::error::{ApiError, ApiResult};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vitaltrack_core::cache::CacheConfig;
use vitaltrack_core::config::ConfigSchema;
use vitaltrack_core::retry::{RetryConfig, RetryPolicy};

/// Environment variable overriding the API base URL
pub const ENV_API_URL: &str = "VITALTRACK_API_URL";
/// Environment variable selecting the deployment environment
pub const ENV_ENVIRONMENT: &str = "VITALTRACK_ENV";
/// Environment variable overriding the request timeout
pub const ENV_TIMEOUT_SECS: &str = "VITALTRACK_TIMEOUT_SECS";
/// Environment variable overriding the food lookup base URL
pub const ENV_LOOKUP_URL: &str = "VITALTRACK_LOOKUP_URL";
/// Environment variable holding the food lookup API key
pub const ENV_LOOKUP_API_KEY: &str = "VITALTRACK_LOOKUP_API_KEY";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development server
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    #[default]
    Production,
}

impl Environment {
    /// Parse a name, defaulting to production
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Third-party food lookup configuration
#[derive(Clone)]
pub struct LookupConfig {
    /// Base URL of the food data service
    pub base_url: String,
    /// Key sent as the `api_key` query parameter
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Retry policy, independent of the primary client
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for LookupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self::from_schema(&ConfigSchema::default())
    }
}

impl LookupConfig {
    fn from_schema(schema: &ConfigSchema) -> Self {
        Self {
            base_url: schema.lookup.base_url.clone(),
            api_key: schema.lookup.api_key.clone().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(schema.lookup.timeout_secs),
            retry: RetryPolicy::new(retry_config(schema)),
        }
    }

    /// Builder-style method to set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Builder-style method to set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        validate_url("lookup.base_url", &self.base_url)?;
        if self.timeout.is_zero() {
            return Err(ApiError::config("lookup timeout cannot be zero"));
        }
        Ok(())
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Current environment
    pub environment: Environment,
    /// Retry policy
    pub retry: RetryPolicy,
    /// Response cache settings
    pub cache: CacheConfig,
    /// Sign-in page for authentication failures
    pub sign_in_path: String,
    /// Delay before the sign-in redirect
    pub redirect_delay: Duration,
    /// Food lookup settings
    pub lookup: LookupConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_schema(&ConfigSchema::default())
    }
}

fn retry_config(schema: &ConfigSchema) -> RetryConfig {
    RetryConfig {
        max_retries: schema.retry.max_retries,
        base_delay: Duration::from_millis(schema.retry.base_delay_ms),
        max_delay: Duration::from_millis(schema.retry.max_delay_ms),
        ..RetryConfig::default()
    }
}

fn validate_url(field: &str, url: &str) -> ApiResult<()> {
    if url.is_empty() {
        return Err(ApiError::config(format!("{field} cannot be empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::config(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Url::parse(url).map_err(|e| ApiError::config(format!("{field} is not a valid URL: {e}")))?;
    Ok(())
}

impl ClientConfig {
    /// Build from a parsed configuration schema
    #[must_use]
    pub fn from_schema(schema: &ConfigSchema) -> Self {
        let mut retry = RetryPolicy::new(retry_config(schema));
        for endpoint in schema.retry.effective_overrides() {
            retry = retry.with_override(endpoint);
        }

        Self {
            base_url: schema.api.base_url.clone(),
            timeout: Duration::from_secs(schema.api.timeout_secs),
            environment: Environment::parse(&schema.api.environment),
            retry,
            cache: CacheConfig {
                max_age: Duration::from_secs(schema.cache.max_age_secs),
                max_entries: schema.cache.max_entries,
            },
            sign_in_path: schema.api.sign_in_path.clone(),
            redirect_delay: Duration::from_millis(schema.api.redirect_delay_ms),
            lookup: LookupConfig::from_schema(schema),
        }
    }

    /// Defaults plus environment variables
    ///
    /// Reads the following environment variables:
    /// - `VITALTRACK_API_URL`: Base URL of the REST API
    /// - `VITALTRACK_ENV`: Environment (development/staging/production)
    /// - `VITALTRACK_TIMEOUT_SECS`: Request timeout in seconds
    /// - `VITALTRACK_LOOKUP_URL`: Base URL of the food lookup service
    /// - `VITALTRACK_LOOKUP_API_KEY`: Food lookup API key
    pub fn from_env() -> ApiResult<Self> {
        let client = Self::default().apply_overrides(|key| std::env::var(key).ok());
        client.validate()?;
        Ok(client)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    ///
    /// The environment name is a label only; retry, cache and timeout
    /// settings keep their configured values.
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = Environment::parse(&env);
        }
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.is_empty()) {
            self.base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(url) = lookup(ENV_LOOKUP_URL).filter(|u| !u.is_empty()) {
            self.lookup.base_url = url;
        }
        if let Some(key) = lookup(ENV_LOOKUP_API_KEY).filter(|k| !k.is_empty()) {
            self.lookup.api_key = Some(key);
        }
        self
    }

    /// Create development configuration (local server)
    #[must_use]
    pub fn development() -> Self {
        let defaults = Self::default();
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout: Duration::from_secs(10),
            environment: Environment::Development,
            retry: RetryPolicy {
                config: RetryConfig::quick(),
                ..defaults.retry.clone()
            },
            ..defaults
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Builder-style method to set the cache settings
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Builder-style method to set the redirect delay
    #[must_use]
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Builder-style method to set the food lookup settings
    #[must_use]
    pub fn with_lookup(mut self, lookup: LookupConfig) -> Self {
        self.lookup = lookup;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        validate_url("base_url", &self.base_url)?;

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if !self.sign_in_path.starts_with('/') {
            return Err(ApiError::config("sign_in_path must start with /"));
        }

        self.lookup.validate()
    }
}
