//! Error handling module
//!
//! Provides the error types and result alias for the crate.

pub mod types;

pub use types::{Error, Result};
