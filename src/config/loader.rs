//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from various sources
//! with proper error handling and validation.

use crate::{Result, config::Settings};
use std::path::Path;
use tracing::{debug, info, warn};

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        // Load from config file if provided
        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        // Override with environment variables
        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env()?;

        // Validate final configuration
        settings.validate()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load configuration from environment only
    pub fn from_env_only(&self) -> Result<Settings> {
        let settings = Settings::from_env()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader.load(None).unwrap();

        assert_eq!(settings.provider.display_name, "Linux.do");
        assert_eq!(settings.timeouts.redirect_wait_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[provider]
display_name = "Test IdP"
origin = "https://rp.test"

[timeouts]
approve_wait_secs = 12

[browser]
headless = false
        "#
        )
        .unwrap();

        let loader = ConfigLoader::new();
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(settings.provider.display_name, "Test IdP");
        assert_eq!(settings.provider.origin, "https://rp.test");
        assert_eq!(settings.timeouts.approve_wait_secs, 12);
        assert!(!settings.browser.headless);
        // Unset sections keep their defaults
        assert_eq!(settings.provider.login_url, "https://linux.do/login");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new();
        let settings = loader
            .load(Some(Path::new("/nonexistent/config.toml")))
            .unwrap();
        assert_eq!(settings.provider.display_name, "Linux.do");
    }

    #[test]
    fn test_env_var_override() {
        unsafe {
            std::env::set_var("LINUXDO_SIGNIN_ORIGIN", "https://override.test");
        }

        let loader = ConfigLoader::new();
        let settings = loader.from_env_only().unwrap();

        assert_eq!(settings.provider.origin, "https://override.test");

        unsafe {
            std::env::remove_var("LINUXDO_SIGNIN_ORIGIN");
        }
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "provider = \"not a table\"").unwrap();

        let loader = ConfigLoader::new();
        assert!(loader.load(Some(temp_file.path())).is_err());
    }
}
