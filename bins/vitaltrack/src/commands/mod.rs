//! Subcommand implementations

pub mod auth;
pub mod food;
pub mod goals;
pub mod meals;
pub mod report;
