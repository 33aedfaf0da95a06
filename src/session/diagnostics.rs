//! Diagnostic artifact capture
//!
//! Saves page content and screenshots at flow checkpoints. Every operation
//! here is best effort: a failed capture logs a warning and never affects
//! the sign-in outcome.

use crate::browser::PageDriver;
use crate::config::DiagnosticsSettings;
use chrono::Utc;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Side channel for page dumps and screenshots.
#[derive(Debug, Clone)]
pub struct DiagnosticsSink {
    enabled: bool,
    dir: PathBuf,
    account: String,
}

impl DiagnosticsSink {
    /// Create a sink for one account's sign-in attempt
    pub fn new(settings: &DiagnosticsSettings, account: impl Into<String>) -> Self {
        Self {
            enabled: settings.enabled,
            dir: settings.dir.clone(),
            account: account.into(),
        }
    }

    fn artifact_path(&self, label: &str, extension: &str) -> PathBuf {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.dir.join(format!(
            "linuxdo_{}_{label}_{timestamp}.{extension}",
            self.account
        ))
    }

    fn ensure_dir(&self) -> bool {
        match std::fs::create_dir_all(&self.dir) {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot create diagnostics dir {:?}: {e}", self.dir);
                false
            }
        }
    }

    /// Save the rendered page content under a labeled filename
    pub async fn save_page_content(&self, page: &dyn PageDriver, label: &str) {
        if !self.enabled || !self.ensure_dir() {
            return;
        }
        let content = match page.content().await {
            Ok(content) => content,
            Err(e) => {
                warn!("Page content capture failed ({label}): {e}");
                return;
            }
        };
        let path = self.artifact_path(label, "html");
        match std::fs::write(&path, content) {
            Ok(()) => debug!("Saved page content to {path:?}"),
            Err(e) => warn!("Page content write failed ({label}): {e}"),
        }
    }

    /// Save a screenshot under a labeled filename
    pub async fn capture_screenshot(&self, page: &dyn PageDriver, label: &str) {
        if !self.enabled || !self.ensure_dir() {
            return;
        }
        let png = match page.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!("Screenshot capture failed ({label}): {e}");
                return;
            }
        };
        let path = self.artifact_path(label, "png");
        match std::fs::write(&path, png) {
            Ok(()) => debug!("Saved screenshot to {path:?}"),
            Err(e) => warn!("Screenshot write failed ({label}): {e}"),
        }
    }
}
