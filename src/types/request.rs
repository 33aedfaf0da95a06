//! Request type definitions
//!
//! Defines the immutable input to one sign-in attempt.

use crate::types::CookieRecord;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input to a single sign-in attempt.
///
/// One request flows through exactly one attempt and produces exactly one
/// [`AuthzOutcome`](crate::types::AuthzOutcome).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    /// OAuth client identifier of the relying party
    pub client_id: String,

    /// OAuth state token for this authorization
    pub auth_state: String,

    /// Pre-authenticated cookies supplied by the relying party, applied to
    /// the browser context before any navigation
    #[serde(default)]
    pub auth_cookies: Vec<CookieRecord>,

    /// Path of the session-state cache artifact. Empty path means no cache.
    #[serde(default)]
    pub cache_file_path: PathBuf,
}

impl SessionRequest {
    /// Create a new request for a client id and state token
    pub fn new(client_id: impl Into<String>, auth_state: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            auth_state: auth_state.into(),
            auth_cookies: Vec::new(),
            cache_file_path: PathBuf::new(),
        }
    }

    /// Set pre-authenticated cookies
    pub fn with_auth_cookies(mut self, cookies: Vec<CookieRecord>) -> Self {
        self.auth_cookies = cookies;
        self
    }

    /// Set the cache artifact path
    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file_path = path.into();
        self
    }

    /// Whether a cache artifact currently exists at the configured path.
    ///
    /// Existence is the only signal consulted before reading.
    pub fn cache_exists(&self) -> bool {
        !self.cache_file_path.as_os_str().is_empty() && self.cache_file_path.exists()
    }
}
