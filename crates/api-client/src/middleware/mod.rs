//! Middleware components for request/response processing
//!
//! Re-exports the resilience components from `vitaltrack-core` and runs a
//! single request through the retry policy.

pub use vitaltrack_core::cache::{CacheConfig, CacheStats, ResponseCache};
pub use vitaltrack_core::retry::{
    retry, Endpoint, EndpointOverride, FailureClass, RetryConfig, RetryContext, RetryPolicy, RetryResult,
};

use crate::error::{ApiError, ApiResult};
use crate::transport::{HttpRequest, Transport};
use serde_json::Value;
use tracing::{debug, warn};

/// Send `request` to `path` until it succeeds or the policy gives up
///
/// Non-2xx statuses are normalized into [`ApiError`] before the retry
/// decision, so the policy sees the same classification callers do.
pub(crate) async fn execute_with_retry(
    transport: &dyn Transport,
    policy: &RetryPolicy,
    path: &str,
    max_retries: Option<u32>,
    request: HttpRequest,
) -> ApiResult<Value> {
    let method = request.method.clone();
    let endpoint = Endpoint::new(method.as_str(), path);
    let context = policy.context_for(endpoint, max_retries);

    let result = retry(policy, endpoint, context, |ctx| {
        let request = request.clone();
        async move {
            if ctx.attempts_so_far > 0 {
                debug!(endpoint = %endpoint, attempt = ctx.attempts_so_far + 1, "Retrying request");
            }
            let response = transport.send(request).await.map_err(ApiError::from)?;
            if response.is_success() {
                Ok(response.body)
            } else {
                Err(ApiError::from_response(response.status, response.body))
            }
        }
    })
    .await;

    match result {
        Ok(outcome) => {
            if outcome.attempts > 1 {
                debug!(
                    endpoint = %endpoint,
                    attempts = outcome.attempts,
                    elapsed_ms = outcome.total_duration.as_millis(),
                    "Request succeeded after retries"
                );
            }
            Ok(outcome.value)
        }
        Err(err) => {
            warn!(endpoint = %endpoint, status = ?err.status, kind = ?err.kind, "Request failed");
            Err(err)
        }
    }
}
