//! Version information helpers.

/// Crate version from Cargo metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the crate version string
pub fn get_version() -> &'static str {
    VERSION
}
