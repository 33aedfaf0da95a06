//! Configuration module
//!
//! Settings structures and loading logic for the sign-in automation.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{
    BrowserSettings, DiagnosticsSettings, LoggingSettings, ProviderSettings, Settings,
    TimeoutSettings,
};
