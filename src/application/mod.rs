//! Application layer: services and use cases
//!
//! This layer orchestrates the domain pipeline for callers such as the CLI.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
