//! CLI utilities for VitalTrack tools
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Text or JSON result output
//! - Status messages

#![warn(missing_docs)]

pub mod output;

pub use output::{print_json, OutputFormat, Status};
