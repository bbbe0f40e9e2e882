//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for one resource of the backend.
//!
//! | Module | Paths | Description |
//! |--------|-------|-------------|
//! | `auth` | `/auth/login`, `/auth/register`, `/users/profile` | Sign-in, sign-up, profile |
//! | `meals` | `/meals` | Meal logging |
//! | `recipes` | `/recipes` | Recipe library |
//! | `goals` | `/nutritional-goals` | Daily targets, with local defaults |
//! | `reports` | `/reports/comprehensive` | Aggregated health report |
//! | `appointments` | `/appointments` | Medical appointments |
//! | `groups` | `/groups` | Community groups |
//! | `family` | `/family` | Family members sharing an account |

pub mod appointments;
pub mod auth;
pub mod family;
pub mod goals;
pub mod groups;
pub mod meals;
pub mod recipes;
pub mod reports;

pub use appointments::AppointmentsApi;
pub use auth::AuthApi;
pub use family::FamilyApi;
pub use goals::NutritionalGoalsApi;
pub use groups::GroupsApi;
pub use meals::MealsApi;
pub use recipes::RecipesApi;
pub use reports::ReportsApi;

use crate::error::{ApiError, ApiResult};

/// `{collection}/{id}`, rejecting ids that would change the path
pub(crate) fn item_path(collection: &str, id: &str) -> ApiResult<String> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ApiError::invalid_input(format!("Invalid resource id: {id:?}")));
    }
    Ok(format!("{collection}/{id}"))
}
