//! Nutritional goal endpoints
//!
//! Goals always have a usable value: when the server has none, or cannot be
//! reached, [`NutritionalGoalsApi::get`] answers with the standard daily
//! targets and marks them with `from_defaults`. The client's default retry
//! overrides skip server-error retries on this path so the fallback is fast.

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

const GOALS_PATH: &str = "/nutritional-goals";

/// Nutritional goals API interface
#[derive(Clone)]
pub struct NutritionalGoalsApi {
    client: ApiClient,
}

impl NutritionalGoalsApi {
    /// Create a new nutritional goals API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Get the user's daily goals, falling back to the standard targets
    ///
    /// GET /nutritional-goals
    ///
    /// Not-found, server, network and timeout failures yield
    /// [`NutritionalGoals::fallback`]. Authentication and other client errors
    /// are returned.
    pub async fn get(&self) -> ApiResult<NutritionalGoals> {
        match self.client.get::<Option<NutritionalGoals>>(GOALS_PATH, &[]).await {
            Ok(Some(goals)) => Ok(goals),
            Ok(None) => Ok(NutritionalGoals::fallback()),
            Err(err) if uses_fallback(&err) => {
                warn!(error = %err, status = ?err.status, "Using default nutritional goals");
                Ok(NutritionalGoals::fallback())
            }
            Err(err) => Err(err),
        }
    }

    /// Replace the user's daily goals
    ///
    /// PUT /nutritional-goals
    pub async fn update(&self, goals: &NutritionalGoals) -> ApiResult<NutritionalGoals> {
        self.client.put(GOALS_PATH, goals).await
    }
}

fn uses_fallback(err: &ApiError) -> bool {
    err.status == Some(404) || err.is_server_error() || err.is_network_error || err.is_timeout
}

/// Daily nutrition targets
///
/// Missing fields take the standard value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NutritionalGoals {
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein: f64,
    /// Carbohydrates in grams
    #[serde(alias = "carbohydrates")]
    pub carbs: f64,
    /// Fat in grams
    pub fat: f64,
    /// Fiber in grams
    pub fiber: f64,
    /// Sugar in grams
    pub sugar: f64,
    /// Sodium in milligrams
    pub sodium: f64,
    /// Water in millilitres
    pub water: f64,
    /// Not stored on the server; these are the standard targets
    #[serde(skip)]
    pub from_defaults: bool,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for NutritionalGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 50.0,
            carbs: 275.0,
            fat: 78.0,
            fiber: 28.0,
            sugar: 50.0,
            sodium: 2300.0,
            water: 2000.0,
            from_defaults: false,
            extra: Map::new(),
        }
    }
}

impl NutritionalGoals {
    /// The standard targets, flagged as not coming from the server
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            from_defaults: true,
            ..Self::default()
        }
    }
}
