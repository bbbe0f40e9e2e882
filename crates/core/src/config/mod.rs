//! Configuration file loading and schema definitions
//!
//! Shared by the API client and the command-line front end.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
