//! Authentication and profile endpoints
//!
//! Sign-in and sign-up store the returned token; logout forgets it locally.
//! Credential submissions opt out of the sign-in redirect, so a wrong
//! password surfaces as an authentication error instead.

use crate::client::{ApiClient, RequestOptions};
use crate::error::{ApiError, ApiResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const PROFILE_PATH: &str = "/users/profile";

/// Authentication API interface
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Create a new authentication API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and store the session token
    ///
    /// POST /auth/login
    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<AuthSession> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.authenticate(LOGIN_PATH, &credentials).await
    }

    /// Create an account and store the session token
    ///
    /// POST /auth/register
    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<AuthSession> {
        self.authenticate(REGISTER_PATH, request).await
    }

    /// Forget the session locally: token and cached responses
    pub fn logout(&self) {
        self.client.tokens().clear();
        self.client.clear_cache();
        info!("Signed out");
    }

    /// Get the signed-in user's profile
    ///
    /// GET /users/profile
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.client.get(PROFILE_PATH, &[]).await
    }

    /// Update the signed-in user's profile
    ///
    /// PUT /users/profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        self.client.put(PROFILE_PATH, update).await
    }

    async fn authenticate<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<AuthSession> {
        let session: AuthSession = self
            .client
            .request(Method::POST, path, Some(body), RequestOptions::credentials())
            .await?;

        if session.token.is_empty() {
            return Err(ApiError::decode("Authentication response did not include a token"));
        }

        self.client.tokens().set_token(&session.token)?;
        Ok(session)
    }
}

/// Sign-in request body
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up request body
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
    /// Date of birth (YYYY-MM-DD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Successful authentication
#[derive(Clone, Deserialize)]
pub struct AuthSession {
    /// Bearer token
    #[serde(default)]
    pub token: String,
    /// Signed-in user, when the server includes it
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// User profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User ID
    #[serde(alias = "_id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Account email
    #[serde(default)]
    pub email: String,
    /// Date of birth
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Gender, as entered by the user
    #[serde(default)]
    pub gender: Option<String>,
    /// Height in centimetres
    #[serde(default)]
    pub height: Option<f64>,
    /// Weight in kilograms
    #[serde(default)]
    pub weight: Option<f64>,
    /// Remaining fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial profile update; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// New gender
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// New height in centimetres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}
