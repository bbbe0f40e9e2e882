//! Response envelope decoding
//!
//! The backend wraps most payloads as `{ "success": true, "data": ... }` and
//! reports logical failures as `{ "success": false, "message": ... }` with a
//! 2xx status. Some endpoints return the bare payload. Both shapes are
//! unwrapped here, once, so endpoint code only ever sees typed data.

use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    /// The request succeeded
    Success {
        /// Typed payload
        data: T,
    },
    /// A 2xx response whose body reports `success: false`
    Failure {
        /// Server-provided message
        message: String,
        /// Raw body
        body: Value,
    },
}

/// Whether a body is an explicit `success: false` envelope
#[must_use]
pub fn is_failure_envelope(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode a response body
    pub fn from_value(body: Value) -> ApiResult<Self> {
        if is_failure_envelope(&body) {
            let message = body
                .get("message")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("Request was not successful")
                .to_string();
            return Ok(Self::Failure { message, body });
        }

        let payload = match body {
            Value::Object(mut map) if map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            other => other,
        };

        serde_json::from_value(payload)
            .map(|data| Self::Success { data })
            .map_err(|e| ApiError::decode(format!("Unexpected response shape: {e}")))
    }

    /// Convert into a result, turning `Failure` into an error
    pub fn into_result(self) -> ApiResult<T> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { message, body } => Err(ApiError::rejected(message, body)),
        }
    }
}

/// Decode a body straight into `T`
pub fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
    ApiResponse::from_value(body)?.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn test_wrapped_payload() {
        let item: Item = decode(json!({"success": true, "data": {"id": "m1"}})).unwrap();
        assert_eq!(item.id, "m1");
    }

    #[test]
    fn test_bare_payload() {
        let items: Vec<Item> = decode(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_failure_envelope() {
        let response: ApiResponse<Item> =
            ApiResponse::from_value(json!({"success": false, "message": "Meal not found"})).unwrap();
        assert!(matches!(response, ApiResponse::Failure { ref message, .. } if message == "Meal not found"));

        let err = response.into_result().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Client);
        assert_eq!(err.message, "Meal not found");
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let err = decode::<Item>(json!({"data": {"name": "x"}})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Decode);
    }

    #[test]
    fn test_empty_body_decodes_to_unit() {
        decode::<()>(Value::Null).unwrap();
        decode::<Option<Item>>(json!({"success": true, "data": null})).unwrap();
    }
}
