//! Normalized error type for the API client
//!
//! Every failure, whether the request never left the machine or the server
//! answered with an error status, ends up as one [`ApiError`]. Callers branch
//! on [`ApiError::kind`] and show [`ApiError::message`]; they never look at
//! transport-specific error objects.

use crate::transport::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use vitaltrack_core::retry::{Classify, FailureClass};

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Message used when no response reached the server
pub const NETWORK_ERROR_MESSAGE: &str = "Connectivity error: unable to reach the server";

/// Message used when the transport deadline expired
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response reached the server
    Network,
    /// Transport deadline exceeded
    Timeout,
    /// 4xx other than authentication and validation failures
    Client,
    /// 5xx
    Server,
    /// 401 or 403
    Auth,
    /// 4xx carrying a structured list of field errors
    Validation,
    /// A response or request body could not be (de)serialized
    Decode,
    /// Invalid client configuration
    Config,
    /// Durable token storage failed
    Storage,
}

/// Fixed status-to-message table
#[must_use]
pub fn status_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Bad request"),
        401 => Some("Authentication required"),
        403 => Some("Access denied"),
        404 => Some("Not found"),
        429 => Some("Rate limited: too many requests"),
        500 | 502 | 503 => Some("Server unavailable"),
        _ => None,
    }
}

/// A single field error from a validation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field, empty when the server did not name one
    pub field: String,
    /// Server-provided explanation
    pub message: String,
}

/// Normalized API error
#[derive(Error, Debug, Clone, Serialize)]
#[error("{message}")]
pub struct ApiError {
    /// Error class
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// HTTP status, if a response was received
    pub status: Option<u16>,
    /// Raw response body, if any
    pub data: Option<Value>,
    /// No response reached the server
    pub is_network_error: bool,
    /// The transport deadline expired
    pub is_timeout: bool,
}

impl ApiError {
    fn local(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            data: None,
            is_network_error: false,
            is_timeout: false,
        }
    }

    /// Create a network error
    pub fn network(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            is_network_error: true,
            data: (!detail.is_empty()).then(|| Value::String(detail)),
            ..Self::local(ErrorKind::Network, NETWORK_ERROR_MESSAGE)
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            is_timeout: true,
            ..Self::local(ErrorKind::Timeout, TIMEOUT_MESSAGE)
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::local(ErrorKind::Config, msg)
    }

    /// Create a (de)serialization error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::local(ErrorKind::Decode, msg)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::local(ErrorKind::Storage, msg)
    }

    /// Arguments rejected before a request was sent
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::local(ErrorKind::Validation, msg)
    }

    /// A success status whose body reports `success: false`
    pub fn rejected(message: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::local(ErrorKind::Client, message)
        }
    }

    /// Normalize an error response
    #[must_use]
    pub fn from_response(status: u16, body: Value) -> Self {
        let data = (!body.is_null()).then_some(body);

        let kind = match status {
            401 | 403 => ErrorKind::Auth,
            400..=499 if data.as_ref().is_some_and(has_field_errors) => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Client,
        };

        let message = status_message(status)
            .map(str::to_string)
            .or_else(|| data.as_ref().and_then(server_message))
            .unwrap_or_else(|| format!("Unexpected response (status {status})"));

        Self {
            kind,
            message,
            status: Some(status),
            data,
            is_network_error: false,
            is_timeout: false,
        }
    }

    /// Check if this is an authentication failure (401/403)
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        self.kind == ErrorKind::Auth
    }

    /// Check if this is a client error (4xx)
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_some_and(|s| (400..500).contains(&s))
    }

    /// Check if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_some_and(|s| s >= 500)
    }

    /// Message supplied by the server, if the body carried one
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        self.data.as_ref().and_then(server_message)
    }

    /// Field errors from a validation response, passed through as-is
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        let Some(errors) = self
            .data
            .as_ref()
            .and_then(|d| d.get("errors"))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        errors.iter().filter_map(parse_field_error).collect()
    }
}

fn has_field_errors(data: &Value) -> bool {
    data.get("errors")
        .and_then(Value::as_array)
        .is_some_and(|errors| !errors.is_empty())
}

fn server_message(data: &Value) -> Option<String> {
    match data {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Object(map) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn parse_field_error(item: &Value) -> Option<FieldError> {
    match item {
        Value::String(message) => Some(FieldError {
            field: String::new(),
            message: message.clone(),
        }),
        Value::Object(map) => {
            let field = ["field", "param", "path"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string();
            let message = ["message", "msg"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))?
                .to_string();
            Some(FieldError { field, message })
        }
        _ => None,
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::timeout(),
            TransportError::Network(detail) => Self::network(detail),
        }
    }
}

impl Classify for ApiError {
    fn failure_class(&self) -> Option<FailureClass> {
        match self.kind {
            ErrorKind::Network => Some(FailureClass::Network),
            ErrorKind::Timeout => Some(FailureClass::Timeout),
            _ => self.status.map(FailureClass::Status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_table() {
        assert_eq!(ApiError::from_response(400, Value::Null).message, "Bad request");
        assert_eq!(ApiError::from_response(401, Value::Null).message, "Authentication required");
        assert_eq!(ApiError::from_response(403, Value::Null).message, "Access denied");
        assert_eq!(ApiError::from_response(404, Value::Null).message, "Not found");
        assert_eq!(
            ApiError::from_response(429, Value::Null).message,
            "Rate limited: too many requests"
        );
        for status in [500, 502, 503] {
            assert_eq!(ApiError::from_response(status, Value::Null).message, "Server unavailable");
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(ApiError::from_response(401, Value::Null).kind, ErrorKind::Auth);
        assert_eq!(ApiError::from_response(403, Value::Null).kind, ErrorKind::Auth);
        assert_eq!(ApiError::from_response(404, Value::Null).kind, ErrorKind::Client);
        assert_eq!(ApiError::from_response(504, Value::Null).kind, ErrorKind::Server);
    }

    #[test]
    fn test_unlisted_status_uses_server_message() {
        let err = ApiError::from_response(409, json!({"message": "Meal already logged"}));
        assert_eq!(err.message, "Meal already logged");
        assert_eq!(err.status, Some(409));

        let err = ApiError::from_response(418, Value::Null);
        assert_eq!(err.message, "Unexpected response (status 418)");
        assert!(err.data.is_none());
    }

    #[test]
    fn test_validation_errors_pass_through() {
        let body = json!({
            "errors": [
                {"param": "email", "msg": "Email is invalid"},
                {"field": "password", "message": "Too short"},
                "Name is required"
            ]
        });
        let err = ApiError::from_response(422, body);

        assert_eq!(err.kind, ErrorKind::Validation);
        let fields = err.field_errors();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[1].message, "Too short");
        assert_eq!(fields[2].field, "");
    }

    #[test]
    fn test_transport_errors() {
        let err: ApiError = TransportError::Network("connection refused".into()).into();
        assert!(err.is_network_error);
        assert!(!err.is_timeout);
        assert_eq!(err.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(err.failure_class(), Some(FailureClass::Network));

        let err: ApiError = TransportError::Timeout.into();
        assert!(err.is_timeout);
        assert_eq!(err.kind, ErrorKind::Timeout);
        assert_eq!(err.status, None);
    }

    #[test]
    fn test_local_errors_are_unclassified() {
        assert_eq!(ApiError::decode("bad json").failure_class(), None);
        assert_eq!(ApiError::config("no url").failure_class(), None);
    }

    #[test]
    fn test_serializes_for_callers() {
        let json = serde_json::to_value(ApiError::from_response(404, Value::Null)).unwrap();
        assert_eq!(json["kind"], "client");
        assert_eq!(json["status"], 404);
        assert_eq!(json["is_network_error"], false);
    }
}
