//! Main API client implementation

use crate::auth::TokenManager;
use crate::config::ClientConfig;
use crate::endpoints::{
    AppointmentsApi, AuthApi, FamilyApi, GroupsApi, MealsApi, NutritionalGoalsApi, RecipesApi,
    ReportsApi,
};
use crate::envelope::{decode, is_failure_envelope, ApiResponse};
use crate::error::{ApiError, ApiResult};
use crate::middleware::execute_with_retry;
use crate::navigation::{LogNavigator, Navigator, RedirectScheduler};
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, field, instrument, warn, Span};
use uuid::Uuid;
use vitaltrack_core::cache::ResponseCache;
use vitaltrack_core::storage::{FileStore, KeyValueStore};

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Where a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Served from the response cache without a network call
    Cache,
    /// Fetched from the server
    Network,
}

/// A value tagged with its source
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    /// The value
    pub value: T,
    /// Where it came from
    pub source: Source,
}

impl<T> Fetched<T> {
    /// Whether the value was served from the cache
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.source == Source::Cache
    }

    /// Transform the value, keeping the source
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            source: self.source,
        }
    }
}

/// Per-request knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Retry budget replacing the policy's
    pub max_retries: Option<u32>,
    /// Neither read nor populate the cache
    pub skip_cache: bool,
    /// Do not purge the token or redirect on 401/403
    pub skip_auth_redirect: bool,
}

impl RequestOptions {
    /// Options for credential submission (sign-in, sign-up)
    #[must_use]
    pub fn credentials() -> Self {
        Self {
            skip_auth_redirect: true,
            ..Self::default()
        }
    }

    /// Builder-style method to bypass the cache
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Builder-style method to set the retry budget
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Builder for [`ApiClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn KeyValueStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ClientBuilder {
    /// Start from a configuration
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            store: None,
            navigator: None,
        }
    }

    /// Use a custom transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use custom token storage
    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom navigator for sign-in redirects
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    ///
    /// Defaults: a reqwest transport, file-backed storage in the user data
    /// directory, and a navigator that only logs.
    pub fn build(self) -> ApiResult<ApiClient> {
        self.config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(self.config.timeout)?),
        };

        let store: Arc<dyn KeyValueStore> = match self.store {
            Some(s) => s,
            None => Arc::new(
                FileStore::default_location().map_err(|e| ApiError::storage(e.to_string()))?,
            ),
        };

        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));
        let redirect = RedirectScheduler::new(
            navigator,
            self.config.sign_in_path.clone(),
            self.config.redirect_delay,
        );

        Ok(ApiClient {
            transport,
            cache: ResponseCache::new(self.config.cache.clone()),
            tokens: TokenManager::new(store),
            redirect,
            config: Arc::new(self.config),
        })
    }
}

/// VitalTrack API client
///
/// Wraps a [`Transport`] and adds:
/// - A time-boxed response cache for GET requests
/// - Retry with exponential backoff for transient failures
/// - Bearer token validation and attachment
/// - Token purge, cache clear and a sign-in redirect on 401/403
/// - Request correlation IDs for tracing
///
/// Cloning is cheap; clones share the cache, token storage and transport.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    cache: ResponseCache<Value>,
    tokens: TokenManager,
    redirect: RedirectScheduler,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client configured from the environment
    pub fn new() -> ApiResult<Self> {
        Self::builder(ClientConfig::from_env()?).build()
    }

    /// Start building a client
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the response cache
    #[must_use]
    pub fn cache(&self) -> &ResponseCache<Value> {
        &self.cache
    }

    /// Get the token manager
    #[must_use]
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Validate the stored token, purging it if invalid
    pub fn validate_token(&self) -> bool {
        self.tokens.validate_token()
    }

    /// Raw stored token
    #[must_use]
    pub fn get_auth_token(&self) -> Option<String> {
        self.tokens.get_auth_token()
    }

    /// Drop every cached response
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// React to an authentication rejection
    ///
    /// Purges the token, clears the cache and schedules one redirect to the
    /// sign-in page. Returns whether a new redirect was scheduled.
    pub fn handle_auth_error(&self) -> bool {
        warn!("Authentication rejected, clearing session");
        self.tokens.clear();
        self.cache.clear();
        self.redirect.schedule()
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access authentication and profile endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access meal logging endpoints
    #[must_use]
    pub fn meals(&self) -> MealsApi {
        MealsApi::new(self.clone())
    }

    /// Access recipe endpoints
    #[must_use]
    pub fn recipes(&self) -> RecipesApi {
        RecipesApi::new(self.clone())
    }

    /// Access nutritional goal endpoints
    #[must_use]
    pub fn goals(&self) -> NutritionalGoalsApi {
        NutritionalGoalsApi::new(self.clone())
    }

    /// Access report endpoints
    #[must_use]
    pub fn reports(&self) -> ReportsApi {
        ReportsApi::new(self.clone())
    }

    /// Access appointment endpoints
    #[must_use]
    pub fn appointments(&self) -> AppointmentsApi {
        AppointmentsApi::new(self.clone())
    }

    /// Access group endpoints
    #[must_use]
    pub fn groups(&self) -> GroupsApi {
        GroupsApi::new(self.clone())
    }

    /// Access family endpoints
    #[must_use]
    pub fn family(&self) -> FamilyApi {
        FamilyApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Typed request helpers
    // -------------------------------------------------------------------------

    /// Perform a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        Ok(self.fetch(path, query, RequestOptions::default()).await?.value)
    }

    /// Perform a GET request, reporting whether the cache answered
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        options: RequestOptions,
    ) -> ApiResult<Fetched<T>> {
        let fetched = self.send(Method::GET, path, query, None, options).await?;
        Ok(Fetched {
            value: decode(fetched.value)?,
            source: fetched.source,
        })
    }

    /// Perform a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::POST, path, Some(body), RequestOptions::default())
            .await
    }

    /// Perform a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    /// Perform a PATCH request
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.request(Method::PATCH, path, Some(body), RequestOptions::default())
            .await
    }

    /// Perform a DELETE request; the response payload is discarded
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let fetched = self
            .send(Method::DELETE, path, &[], None, RequestOptions::default())
            .await?;
        ApiResponse::<Value>::from_value(fetched.value)?.into_result()?;
        Ok(())
    }

    /// Perform a request with a body and explicit options
    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::decode(format!("Failed to serialize request body: {e}")))?;

        let fetched = self.send(method, path, &[], body, options).await?;
        decode(fetched.value)
    }

    // -------------------------------------------------------------------------
    // Request pipeline
    // -------------------------------------------------------------------------

    /// Send a request through the cache, token, retry and error pipeline
    ///
    /// GET responses are cached under the full URL. Any other method clears
    /// the cache once it succeeds. Bodies reporting `success: false` are
    /// returned as-is and neither cached nor treated as a successful mutation.
    #[instrument(skip(self, query, body), fields(request_id = field::Empty))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        options: RequestOptions,
    ) -> ApiResult<Fetched<Value>> {
        let url = self.url_for(path, query)?;
        let is_read = method == Method::GET;
        let cache_key = (is_read && !options.skip_cache).then(|| url.to_string());

        if let Some(ref key) = cache_key {
            if let Some(value) = self.cache.get(key) {
                debug!(key = %key, "Serving response from cache");
                return Ok(Fetched {
                    value,
                    source: Source::Cache,
                });
            }
        }

        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        let mut request = HttpRequest::new(method, url).with_header(X_REQUEST_ID, &request_id)?;
        if let Some(token) = self.tokens.bearer() {
            request = request.with_bearer(&token)?;
        }
        if let Some(body) = body {
            request = request.with_json(body);
        }

        let result = execute_with_retry(
            self.transport.as_ref(),
            &self.config.retry,
            path,
            options.max_retries,
            request,
        )
        .await;

        match result {
            Ok(value) => {
                if !is_failure_envelope(&value) {
                    match cache_key {
                        Some(key) => self.cache.set(key, value.clone()),
                        None if !is_read => self.cache.clear(),
                        None => {}
                    }
                }
                Ok(Fetched {
                    value,
                    source: Source::Network,
                })
            }
            Err(err) => {
                if err.is_auth_error() && !options.skip_auth_redirect {
                    self.handle_auth_error();
                }
                Err(err)
            }
        }
    }

    fn url_for(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|e| ApiError::config(format!("Invalid request URL for {path}: {e}")))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}
