//! Third-party food data lookup
//!
//! A separate client for the nutrition database: its own base URL, a shorter
//! timeout and an `api_key` query parameter on every request. It shares the
//! retry policy shape with [`ApiClient`](crate::ApiClient) but never caches
//! and never sends the user's bearer token.

use crate::config::LookupConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::execute_with_retry;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Page size used when callers pass zero
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// One nutrient value reported by the lookup service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    /// Nutrient identifier
    #[serde(default)]
    pub nutrient_id: Option<u64>,
    /// Nutrient name (e.g. `Protein`)
    #[serde(default)]
    pub nutrient_name: String,
    /// Unit (e.g. `G`, `KCAL`)
    #[serde(default)]
    pub unit_name: String,
    /// Amount per 100 g or per serving, as reported
    #[serde(default, alias = "amount")]
    pub value: f64,
}

/// A search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    /// Database identifier
    pub fdc_id: u64,
    /// Food description
    #[serde(default)]
    pub description: String,
    /// Data source type (e.g. `Branded`, `Foundation`)
    #[serde(default)]
    pub data_type: Option<String>,
    /// Brand owner for branded foods
    #[serde(default)]
    pub brand_owner: Option<String>,
    /// Nutrients included in the search result
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
}

/// Search response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchResult {
    /// Total number of matches
    #[serde(default)]
    pub total_hits: u64,
    /// Page returned
    #[serde(default)]
    pub current_page: u32,
    /// Number of pages
    #[serde(default)]
    pub total_pages: u32,
    /// Matches on this page
    #[serde(default)]
    pub foods: Vec<FoodSummary>,
}

/// Full record for one food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetails {
    /// Database identifier
    pub fdc_id: u64,
    /// Food description
    #[serde(default)]
    pub description: String,
    /// Data source type
    #[serde(default)]
    pub data_type: Option<String>,
    /// Serving size, when the record has one
    #[serde(default)]
    pub serving_size: Option<f64>,
    /// Unit of the serving size
    #[serde(default)]
    pub serving_size_unit: Option<String>,
    /// Raw nutrient list; its shape differs between data types
    #[serde(default)]
    pub food_nutrients: Vec<Value>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FoodDetails {
    /// Find a nutrient amount by (case-insensitive) name
    #[must_use]
    pub fn nutrient(&self, name: &str) -> Option<f64> {
        self.food_nutrients.iter().find_map(|entry| {
            let entry_name = entry
                .get("nutrientName")
                .or_else(|| entry.get("nutrient").and_then(|n| n.get("name")))
                .and_then(Value::as_str)?;
            if !entry_name.eq_ignore_ascii_case(name) {
                return None;
            }
            entry
                .get("amount")
                .or_else(|| entry.get("value"))
                .and_then(Value::as_f64)
        })
    }
}

/// Client for the third-party food database
#[derive(Clone)]
pub struct FoodLookupClient {
    transport: Arc<dyn Transport>,
    config: Arc<LookupConfig>,
}

impl std::fmt::Debug for FoodLookupClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodLookupClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FoodLookupClient {
    /// Create a client with its own reqwest transport
    pub fn new(config: LookupConfig) -> ApiResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout)?);
        Self::with_transport(config, transport)
    }

    /// Create a client over a custom transport
    pub fn with_transport(config: LookupConfig, transport: Arc<dyn Transport>) -> ApiResult<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Search foods by free text
    ///
    /// GET /foods/search
    pub async fn search(&self, query: &str, page_size: u32) -> ApiResult<FoodSearchResult> {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self.get(
            "/foods/search",
            &[("query", query.to_string()), ("pageSize", page_size.to_string())],
        )
        .await
    }

    /// Get the full record for one food
    ///
    /// GET /food/{id}
    pub async fn food(&self, id: u64) -> ApiResult<FoodDetails> {
        self.get(&format!("/food/{id}"), &[]).await
    }

    #[instrument(skip(self, query))]
    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        let url = self.url_for(path, query)?;
        debug!(path = %path, "Food lookup request");

        let request = HttpRequest::new(Method::GET, url);
        let body = execute_with_retry(
            self.transport.as_ref(),
            &self.config.retry,
            path,
            None,
            request,
        )
        .await?;

        serde_json::from_value(body)
            .map_err(|e| ApiError::decode(format!("Unexpected food lookup response: {e}")))
    }

    fn url_for(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))
            .map_err(|e| ApiError::config(format!("Invalid lookup URL for {path}: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.extend_pairs(query);
            if let Some(ref key) = self.config.api_key {
                pairs.append_pair("api_key", key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }
}
