//! Recipe endpoints

use super::item_path;
use super::meals::NutritionTotals;
use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const RECIPES_PATH: &str = "/recipes";

/// Recipes API interface
#[derive(Clone)]
pub struct RecipesApi {
    client: ApiClient,
}

impl RecipesApi {
    /// Create a new recipes API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List recipes, optionally filtered by a search term
    ///
    /// GET /recipes?search=...
    pub async fn list(&self, search: Option<&str>) -> ApiResult<Vec<Recipe>> {
        let query: Vec<(&str, String)> = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| ("search", s.to_string()))
            .into_iter()
            .collect();
        self.client.get(RECIPES_PATH, &query).await
    }

    /// Get a single recipe
    ///
    /// GET /recipes/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Recipe> {
        self.client.get(&item_path(RECIPES_PATH, id)?, &[]).await
    }

    /// Create a recipe
    ///
    /// POST /recipes
    pub async fn create(&self, recipe: &RecipeInput) -> ApiResult<Recipe> {
        self.client.post(RECIPES_PATH, recipe).await
    }

    /// Replace a recipe
    ///
    /// PUT /recipes/{id}
    pub async fn update(&self, id: &str, recipe: &RecipeInput) -> ApiResult<Recipe> {
        self.client.put(&item_path(RECIPES_PATH, id)?, recipe).await
    }

    /// Delete a recipe
    ///
    /// DELETE /recipes/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&item_path(RECIPES_PATH, id)?).await
    }
}

/// One ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Ingredient name
    pub name: String,
    /// Amount, when measured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Unit of the amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A stored recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Recipe ID
    #[serde(alias = "_id")]
    pub id: String,
    /// Recipe name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Ingredient list
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Preparation steps
    #[serde(default)]
    pub instructions: Vec<String>,
    /// Number of servings
    #[serde(default)]
    pub servings: Option<u32>,
    /// Preparation time in minutes
    #[serde(default)]
    pub prep_time: Option<u32>,
    /// Nutrition per serving
    #[serde(default)]
    pub nutrition: Option<NutritionTotals>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for creating or replacing a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    /// Recipe name
    pub name: String,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ingredient list
    pub ingredients: Vec<Ingredient>,
    /// Preparation steps
    pub instructions: Vec<String>,
    /// Number of servings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Preparation time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<u32>,
}
