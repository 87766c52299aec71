//! # empsync Common Library
//!
//! Shared code for the employee record reconciliation engine:
//! - Record, edit-payload, and career-event models
//! - Patch tri-state (keep / clear / set) for partial updates
//! - Error types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
