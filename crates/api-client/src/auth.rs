//! Bearer token lifecycle
//!
//! The stored token moves through
//! `Absent -> PresentUnvalidated -> PresentValid -> PresentExpired -> Absent`.
//! A token is checked structurally (three dot-separated segments) and its
//! `exp` claim decoded before every authenticated request; any failure
//! purges it from storage.

use crate::error::{ApiError, ApiResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use vitaltrack_core::storage::KeyValueStore;

/// Storage key holding the bearer token
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Observable state of the stored token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    /// Nothing stored
    Absent,
    /// Something is stored but it cannot be validated (malformed or undecodable)
    PresentUnvalidated,
    /// Well-formed and not yet expired
    PresentValid,
    /// Well-formed but past its expiry
    PresentExpired,
}

/// Why a token was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not three non-empty dot-separated segments
    #[error("token does not have three dot-separated segments")]
    Malformed,
    /// Payload segment is not base64url
    #[error("token payload is not valid base64url: {0}")]
    Encoding(String),
    /// Payload is not JSON with a numeric `exp` claim
    #[error("token payload has no readable expiry claim: {0}")]
    Claims(String),
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch
    #[serde(default)]
    pub iat: Option<i64>,
    /// Remaining claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Expiry as a timestamp
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Whether the token is expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Subject claim rendered as a string
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        match self.extra.get("sub")? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Decode the claims of a `header.payload.signature` token
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(TokenError::Malformed);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1].trim_end_matches('='))
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    serde_json::from_slice(&payload).map_err(|e| TokenError::Claims(e.to_string()))
}

/// Single source of truth for the stored bearer token
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a manager over the given storage
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Raw stored token, without validation
    #[must_use]
    pub fn get_auth_token(&self) -> Option<String> {
        match self.store.get(TOKEN_STORAGE_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored auth token");
                None
            }
        }
    }

    /// Store a token, replacing any previous one
    pub fn set_token(&self, token: &str) -> ApiResult<()> {
        self.store
            .set(TOKEN_STORAGE_KEY, token)
            .map_err(|e| ApiError::storage(format!("Failed to store auth token: {e}")))?;
        debug!("Stored new auth token");
        Ok(())
    }

    /// Delete the stored token
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(TOKEN_STORAGE_KEY) {
            warn!(error = %e, "Failed to delete stored auth token");
        }
    }

    /// Current state of the stored token (read-only, never purges)
    #[must_use]
    pub fn state(&self) -> TokenState {
        let Some(token) = self.get_auth_token() else {
            return TokenState::Absent;
        };

        match decode_claims(&token) {
            Err(_) => TokenState::PresentUnvalidated,
            Ok(claims) if claims.is_expired_at(Utc::now()) => TokenState::PresentExpired,
            Ok(_) => TokenState::PresentValid,
        }
    }

    /// Claims of the stored token, if it decodes
    #[must_use]
    pub fn claims(&self) -> Option<TokenClaims> {
        self.get_auth_token()
            .and_then(|token| decode_claims(&token).ok())
    }

    /// Validate the stored token, purging it if malformed or expired
    pub fn validate_token(&self) -> bool {
        self.bearer().is_some()
    }

    /// The stored token if it is valid; invalid tokens are purged
    pub fn bearer(&self) -> Option<String> {
        let token = self.get_auth_token()?;

        match decode_claims(&token) {
            Ok(claims) if claims.is_expired_at(Utc::now()) => {
                warn!(expired_at = ?claims.expires_at(), "Auth token expired, removing it");
                self.clear();
                None
            }
            Ok(_) => Some(token),
            Err(e) => {
                warn!(error = %e, "Stored auth token is invalid, removing it");
                self.clear();
                None
            }
        }
    }
}
