//! Meal logging endpoints

use super::item_path;
use crate::client::ApiClient;
use crate::error::ApiResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const MEALS_PATH: &str = "/meals";

/// Meals API interface
#[derive(Clone)]
pub struct MealsApi {
    client: ApiClient,
}

impl MealsApi {
    /// Create a new meals API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List meals, optionally for a single day
    ///
    /// GET /meals?date=YYYY-MM-DD
    pub async fn list(&self, date: Option<NaiveDate>) -> ApiResult<Vec<Meal>> {
        let query: Vec<(&str, String)> = date
            .map(|d| ("date", d.format("%Y-%m-%d").to_string()))
            .into_iter()
            .collect();
        self.client.get(MEALS_PATH, &query).await
    }

    /// Get a single meal
    ///
    /// GET /meals/{id}
    pub async fn get(&self, id: &str) -> ApiResult<Meal> {
        self.client.get(&item_path(MEALS_PATH, id)?, &[]).await
    }

    /// Log a meal
    ///
    /// POST /meals
    pub async fn create(&self, meal: &MealInput) -> ApiResult<Meal> {
        self.client.post(MEALS_PATH, meal).await
    }

    /// Replace a logged meal
    ///
    /// PUT /meals/{id}
    pub async fn update(&self, id: &str, meal: &MealInput) -> ApiResult<Meal> {
        self.client.put(&item_path(MEALS_PATH, id)?, meal).await
    }

    /// Delete a logged meal
    ///
    /// DELETE /meals/{id}
    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&item_path(MEALS_PATH, id)?).await
    }
}

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Breakfast
    Breakfast,
    /// Lunch
    Lunch,
    /// Dinner
    Dinner,
    /// Snack
    Snack,
    /// Anything this client does not know yet
    #[serde(other)]
    Other,
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            other => Err(format!("unknown meal type: {other}")),
        }
    }
}

/// One food within a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    /// Food name
    pub name: String,
    /// Quantity eaten
    #[serde(default)]
    pub quantity: f64,
    /// Unit of the quantity (g, ml, piece)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Energy in kcal
    #[serde(default)]
    pub calories: f64,
    /// Protein in grams
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates in grams
    #[serde(default, alias = "carbohydrates")]
    pub carbs: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat: f64,
    /// Lookup database identifier, when picked from a search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fdc_id: Option<u64>,
}

/// Summed macronutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTotals {
    /// Energy in kcal
    #[serde(default)]
    pub calories: f64,
    /// Protein in grams
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates in grams
    #[serde(default, alias = "carbohydrates")]
    pub carbs: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat: f64,
}

impl NutritionTotals {
    /// Sum a list of foods
    #[must_use]
    pub fn from_items(items: &[FoodItem]) -> Self {
        items.iter().fold(Self::default(), |acc, item| Self {
            calories: acc.calories + item.calories,
            protein: acc.protein + item.protein,
            carbs: acc.carbs + item.carbs,
            fat: acc.fat + item.fat,
        })
    }
}

/// A logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Meal ID
    #[serde(alias = "_id")]
    pub id: String,
    /// Meal slot
    pub meal_type: MealType,
    /// Day the meal belongs to, as sent by the server
    #[serde(default)]
    pub date: Option<String>,
    /// Foods eaten
    #[serde(default)]
    pub foods: Vec<FoodItem>,
    /// Free-form notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Server-computed totals
    #[serde(default)]
    pub totals: Option<NutritionTotals>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meal {
    /// Totals from the server, or summed locally
    #[must_use]
    pub fn nutrition(&self) -> NutritionTotals {
        self.totals
            .unwrap_or_else(|| NutritionTotals::from_items(&self.foods))
    }
}

/// Body for creating or replacing a meal
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealInput {
    /// Meal slot
    pub meal_type: MealType,
    /// Day the meal belongs to
    pub date: NaiveDate,
    /// Foods eaten
    pub foods: Vec<FoodItem>,
    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn food(calories: f64, protein: f64) -> FoodItem {
        FoodItem {
            name: "Oats".into(),
            quantity: 40.0,
            unit: Some("g".into()),
            calories,
            protein,
            carbs: 27.0,
            fat: 2.8,
            fdc_id: None,
        }
    }

    #[test]
    fn test_meal_decodes() {
        let meal: Meal = serde_json::from_value(json!({
            "_id": "m1",
            "mealType": "breakfast",
            "date": "2024-01-01",
            "foods": [{"name": "Oats", "calories": 150, "protein": 5, "carbohydrates": 27}],
            "userId": "u1"
        }))
        .unwrap();

        assert_eq!(meal.id, "m1");
        assert_eq!(meal.meal_type, MealType::Breakfast);
        assert!((meal.foods[0].carbs - 27.0).abs() < f64::EPSILON);
        assert_eq!(meal.extra["userId"], "u1");
    }

    #[test]
    fn test_unknown_meal_type() {
        let meal_type: MealType = serde_json::from_value(json!("brunch")).unwrap();
        assert_eq!(meal_type, MealType::Other);
        assert!("brunch".parse::<MealType>().is_err());
        assert_eq!("Dinner".parse::<MealType>().unwrap(), MealType::Dinner);
    }

    #[test]
    fn test_totals_fall_back_to_sum() {
        let meal = Meal {
            id: "m1".into(),
            meal_type: MealType::Lunch,
            date: None,
            foods: vec![food(150.0, 5.0), food(100.0, 3.0)],
            notes: None,
            totals: None,
            extra: Map::new(),
        };
        let totals = meal.nutrition();
        assert!((totals.calories - 250.0).abs() < f64::EPSILON);
        assert!((totals.protein - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_input_serializes_date() {
        let input = MealInput {
            meal_type: MealType::Snack,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            foods: vec![],
            notes: None,
        };
        let value = serde_json::to_value(input).unwrap();
        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["mealType"], "snack");
    }
}
