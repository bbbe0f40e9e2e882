//! Core building blocks for the VitalTrack client
//!
//! This crate provides the transport-independent pieces the API client is
//! assembled from:
//!
//! - **Response cache**: time-boxed, size-bounded, insertion-order eviction
//! - **Retry policy**: exponential backoff with per-endpoint overrides
//! - **Storage**: durable key-value storage for the bearer token
//! - **Configuration**: TOML-based configuration with defaults
//! - **Error handling**: errors with codes, context, and recovery suggestions
//!
//! # Example
//!
//! ```rust
//! use vitaltrack_core::retry::{Endpoint, FailureClass, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! assert!(policy.should_retry(Endpoint::get("/meals"), FailureClass::Status(503)));
//! assert!(!policy.should_retry(Endpoint::get("/meals"), FailureClass::Status(404)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
#[allow(missing_docs)]
pub mod config;
pub mod error;
pub mod retry;
pub mod storage;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheConfig, CacheStats, ResponseCache};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::{
        retry, Classify, Endpoint, EndpointOverride, FailureClass, RetryConfig, RetryContext,
        RetryPolicy,
    };
    pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
}
