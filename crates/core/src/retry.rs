//! Retry policy with exponential backoff
//!
//! Decides whether a failed request is worth repeating and how long to wait
//! before doing so:
//! - Network failures, timeouts and a fixed set of transient statuses
//!   (429, 502, 503) are retried
//! - Delay before retry *n* is `base_delay * multiplier^n`, i.e. 2s, 4s, ...
//!   with the defaults
//! - Endpoint overrides adjust the policy per path prefix and method, e.g. to
//!   stop retrying server errors on reads that have a local fallback
//!
//! # Example
//!
//! ```rust,no_run
//! use vitaltrack_core::retry::{retry, Classify, Endpoint, FailureClass, RetryPolicy};
//!
//! #[derive(Debug)]
//! struct Unavailable;
//!
//! impl std::fmt::Display for Unavailable {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         f.write_str("service unavailable")
//!     }
//! }
//!
//! impl Classify for Unavailable {
//!     fn failure_class(&self) -> Option<FailureClass> {
//!         Some(FailureClass::Status(503))
//!     }
//! }
//!
//! # async fn run() {
//! let policy = RetryPolicy::default();
//! let endpoint = Endpoint::get("/meals");
//! let context = policy.context_for(endpoint, None);
//! let result = retry(&policy, endpoint, context, |_ctx| async { Err::<(), _>(Unavailable) }).await;
//! assert!(result.is_err());
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Statuses that indicate a transient server-side condition
pub const DEFAULT_RETRY_STATUSES: [u16; 3] = [429, 502, 503];

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the initial attempt
    pub max_retries: u32,
    /// Delay unit; retry *n* waits `base_delay * backoff_multiplier^n`
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// Create a config for quick retries (local development)
    #[must_use]
    pub fn quick() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(1),
        }
    }

    /// Calculate the delay before a given retry (the initial attempt is 0)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay_secs = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

/// How an attempt failed, as far as the retry policy cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// No response reached us
    Network,
    /// The transport deadline expired
    Timeout,
    /// The server answered with a non-success status
    Status(u16),
}

/// Errors that can be classified for retry decisions
///
/// Returning `None` marks the failure as never retryable (e.g. a local
/// decoding error).
pub trait Classify {
    /// Classify this failure
    fn failure_class(&self) -> Option<FailureClass>;
}

/// The request a retry decision is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint<'a> {
    /// HTTP method, e.g. `GET`
    pub method: &'a str,
    /// Path relative to the API base URL
    pub path: &'a str,
}

impl<'a> Endpoint<'a> {
    /// Endpoint for `method` on `path`
    #[must_use]
    pub fn new(method: &'a str, path: &'a str) -> Self {
        Self { method, path }
    }

    /// Read of `path`
    #[must_use]
    pub fn get(path: &'a str) -> Self {
        Self::new("GET", path)
    }
}

impl Display for Endpoint<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Per-endpoint adjustment of the retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOverride {
    /// Path prefix the override applies to (e.g. `/nutritional-goals`)
    pub path_prefix: String,
    /// HTTP methods the override applies to; empty means all of them
    #[serde(default)]
    pub methods: Vec<String>,
    /// Whether 5xx statuses may be retried on this endpoint
    #[serde(default = "default_true")]
    pub retry_server_errors: bool,
    /// Retry budget replacing the global one
    #[serde(default)]
    pub max_retries: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl EndpointOverride {
    /// Override that never retries server errors on `path_prefix`
    pub fn no_server_retries(path_prefix: impl Into<String>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            methods: Vec::new(),
            retry_server_errors: false,
            max_retries: None,
        }
    }

    /// Restrict the override to the given HTTP methods
    #[must_use]
    pub fn for_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    fn matches(&self, endpoint: Endpoint<'_>) -> bool {
        let method_matches = self.methods.is_empty()
            || self
                .methods
                .iter()
                .any(|m| m.eq_ignore_ascii_case(endpoint.method));
        if !method_matches {
            return false;
        }

        let prefix = self.path_prefix.trim_end_matches('/');
        match endpoint.path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }
}

/// Per-request retry bookkeeping
///
/// Lives with a single request and is never shared, so concurrent requests
/// cannot disturb each other's accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryContext {
    /// Retries performed so far
    pub attempts_so_far: u32,
    /// Retries allowed after the initial attempt
    pub max_attempts: u32,
}

impl RetryContext {
    /// Create a fresh context allowing `max_attempts` retries
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts_so_far: 0,
            max_attempts,
        }
    }

    /// Whether another retry is allowed
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.attempts_so_far < self.max_attempts
    }
}

/// Retry decisions for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Backoff configuration
    pub config: RetryConfig,
    /// Statuses treated as transient
    pub retry_statuses: Vec<u16>,
    /// Endpoint-specific adjustments
    pub overrides: Vec<EndpointOverride>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Create a policy with the default transient statuses and no overrides
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            overrides: Vec::new(),
        }
    }

    /// Builder-style method to add an endpoint override
    #[must_use]
    pub fn with_override(mut self, endpoint: EndpointOverride) -> Self {
        self.overrides.push(endpoint);
        self
    }

    /// Most specific override matching `endpoint`
    #[must_use]
    pub fn override_for(&self, endpoint: Endpoint<'_>) -> Option<&EndpointOverride> {
        self.overrides
            .iter()
            .filter(|o| o.matches(endpoint))
            .max_by_key(|o| o.path_prefix.len())
    }

    /// Retry budget for `endpoint`; an explicit per-request value wins
    #[must_use]
    pub fn max_retries_for(&self, endpoint: Endpoint<'_>, requested: Option<u32>) -> u32 {
        requested
            .or_else(|| self.override_for(endpoint).and_then(|o| o.max_retries))
            .unwrap_or(self.config.max_retries)
    }

    /// Fresh retry context for a request to `endpoint`
    #[must_use]
    pub fn context_for(&self, endpoint: Endpoint<'_>, requested: Option<u32>) -> RetryContext {
        RetryContext::new(self.max_retries_for(endpoint, requested))
    }

    /// Whether a failure of the given class on `endpoint` should be retried
    #[must_use]
    pub fn should_retry(&self, endpoint: Endpoint<'_>, class: FailureClass) -> bool {
        match class {
            FailureClass::Network | FailureClass::Timeout => true,
            FailureClass::Status(status) => {
                if !self.retry_statuses.contains(&status) {
                    return false;
                }
                if status >= 500 {
                    return self
                        .override_for(endpoint)
                        .map_or(true, |o| o.retry_server_errors);
                }
                true
            }
        }
    }
}

/// Successful result with attempt information
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub value: T,
    /// Number of attempts made, including the first
    pub attempts: u32,
    /// Total time spent, including backoff delays
    pub total_duration: Duration,
}

/// Run `operation` until it succeeds, fails permanently, or exhausts the
/// retry budget in `context`
///
/// The last error is returned unchanged once retrying stops.
pub async fn retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    endpoint: Endpoint<'_>,
    mut context: RetryContext,
    mut operation: F,
) -> Result<RetryResult<T>, E>
where
    F: FnMut(RetryContext) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let start = Instant::now();

    loop {
        match operation(context).await {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: context.attempts_so_far + 1,
                    total_duration: start.elapsed(),
                });
            }
            Err(error) => {
                let retryable = error
                    .failure_class()
                    .is_some_and(|class| policy.should_retry(endpoint, class));

                if !retryable || !context.can_retry() {
                    debug!(
                        endpoint = %endpoint,
                        attempt = context.attempts_so_far + 1,
                        error = %error,
                        "Request failed, not retrying"
                    );
                    return Err(error);
                }

                context.attempts_so_far += 1;
                let delay = policy.config.delay_for_attempt(context.attempts_so_far);
                debug!(
                    endpoint = %endpoint,
                    attempt = context.attempts_so_far,
                    delay_ms = delay.as_millis(),
                    error = %error,
                    "Retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
