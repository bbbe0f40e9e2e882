//! API gateway client for the VitalTrack backend
//!
//! This crate provides the resilient HTTP client that front ends use to talk
//! to the VitalTrack REST API and to the third-party food database.
//!
//! # Features
//!
//! - **Response cache**: GET responses are cached for a fixed time and
//!   cleared after every successful mutation
//! - **Retry with exponential backoff**: network failures, timeouts and
//!   429/502/503 are retried, with per-endpoint overrides
//! - **Token lifecycle**: bearer tokens are validated before each request
//!   and purged on expiry or rejection, followed by one sign-in redirect
//! - **Error normalization**: every failure becomes one [`ApiError`]
//! - **Request correlation**: each request carries a unique `X-Request-ID`
//!
//! # Example
//!
//! ```rust,no_run
//! use vitaltrack_api_client::{ApiClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder(ClientConfig::from_env()?).build()?;
//!
//!     client.auth().sign_in("ada@example.com", "correct horse").await?;
//!
//!     let goals = client.goals().get().await?;
//!     println!("Daily target: {} kcal", goals.calories);
//!
//!     let meals = client.meals().list(None).await?;
//!     println!("{} meals logged", meals.len());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod lookup;
pub mod middleware;
pub mod navigation;
pub mod transport;

pub use auth::{TokenClaims, TokenManager, TokenState};
pub use client::{ApiClient, ClientBuilder, Fetched, RequestOptions, Source};
pub use config::{ClientConfig, Environment, LookupConfig};
pub use envelope::ApiResponse;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use lookup::FoodLookupClient;
pub use navigation::{LogNavigator, Navigator};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::{ApiClient, Fetched, RequestOptions, Source};
    pub use crate::config::{ClientConfig, Environment, LookupConfig};
    pub use crate::endpoints::{
        AppointmentsApi, AuthApi, FamilyApi, GroupsApi, MealsApi, NutritionalGoalsApi, RecipesApi,
        ReportsApi,
    };
    pub use crate::error::{ApiError, ApiResult, ErrorKind};
    pub use crate::lookup::FoodLookupClient;
}
