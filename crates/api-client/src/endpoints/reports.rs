//! Report endpoints

use super::meals::NutritionTotals;
use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const COMPREHENSIVE_PATH: &str = "/reports/comprehensive";

/// Reports API interface
#[derive(Clone)]
pub struct ReportsApi {
    client: ApiClient,
}

impl ReportsApi {
    /// Create a new reports API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Aggregated report for an inclusive date range
    ///
    /// GET /reports/comprehensive?startDate=...&endDate=...
    pub async fn comprehensive(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<ComprehensiveReport> {
        if start > end {
            return Err(ApiError::invalid_input(format!(
                "Report start {start} is after end {end}"
            )));
        }

        let query = [
            ("startDate", start.format("%Y-%m-%d").to_string()),
            ("endDate", end.format("%Y-%m-%d").to_string()),
        ];
        self.client.get(COMPREHENSIVE_PATH, &query).await
    }
}

/// Per-day nutrition entry in a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNutrition {
    /// Day
    pub date: String,
    /// Totals for that day
    #[serde(flatten)]
    pub totals: NutritionTotals,
}

/// Aggregated health report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveReport {
    /// First day covered
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day covered
    #[serde(default)]
    pub end_date: Option<String>,
    /// Number of meals logged in the range
    #[serde(default)]
    pub meals_logged: u32,
    /// Average daily intake
    #[serde(default)]
    pub average_daily: Option<NutritionTotals>,
    /// Intake per day
    #[serde(default)]
    pub daily: Vec<DailyNutrition>,
    /// Appointments in the range
    #[serde(default)]
    pub appointments: Vec<Value>,
    /// Remaining sections
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_decodes() {
        let report: ComprehensiveReport = serde_json::from_value(json!({
            "startDate": "2024-01-01",
            "endDate": "2024-01-07",
            "mealsLogged": 18,
            "averageDaily": {"calories": 1950, "protein": 70, "carbs": 230, "fat": 60},
            "daily": [{"date": "2024-01-01", "calories": 2100, "protein": 80, "carbs": 250, "fat": 65}],
            "sleep": {"averageHours": 7.2}
        }))
        .unwrap();

        assert_eq!(report.meals_logged, 18);
        assert_eq!(report.daily.len(), 1);
        assert!((report.daily[0].totals.calories - 2100.0).abs() < f64::EPSILON);
        assert!(report.extra.contains_key("sleep"));
    }
}
