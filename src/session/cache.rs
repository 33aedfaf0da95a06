//! Cached session storage
//!
//! Persists the browser storage snapshot of a successful fresh login so later
//! runs can skip the credential form. The cache is best effort on write and
//! on read: a corrupt or missing file only means a fresh login.

use crate::types::CachedSessionState;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk session state cache for one account.
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
}

impl SessionCache {
    /// Create a cache handle for a given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a cached snapshot exists.
    ///
    /// An empty path is treated as "no cache configured".
    pub fn exists(&self) -> bool {
        !self.path.as_os_str().is_empty() && self.path.exists()
    }

    /// Load the cached snapshot
    pub fn load(&self) -> Result<CachedSessionState> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::cache(format!("read {:?}: {e}", self.path)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::cache(format!("parse {:?}: {e}", self.path)))
    }

    /// Persist a snapshot atomically.
    ///
    /// Writes to a sibling temp file and renames it over the target so a
    /// crash mid-write never leaves a truncated cache.
    pub fn store(&self, state: &CachedSessionState) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::cache("no cache path configured"));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::cache(format!("create dir {parent:?}: {e}")))?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| Error::cache(format!("write {tmp:?}: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Error::cache(format!("rename to {:?}: {e}", self.path)))?;

        debug!("Session state cached to {:?}", self.path);
        Ok(())
    }
}
