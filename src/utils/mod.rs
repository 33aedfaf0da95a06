//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the application.

pub mod cookies;
pub mod version;

pub use cookies::{filter_cookies, parse_query_params, pattern_matches};
pub use version::{VERSION, get_version};
