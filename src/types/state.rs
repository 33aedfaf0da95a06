//! Session state types
//!
//! Cookie records and the persisted browser-storage snapshot that lets a
//! later sign-in attempt skip the credential form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of network-identifying request headers.
///
/// Collected only when an anti-bot challenge was observed during an attempt,
/// for downstream diagnostic replay. Ordered so serialized output is stable.
pub type BrowserHeaders = BTreeMap<String, String>;

/// A single browser cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieRecord {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Cookie domain, possibly with a leading dot
    #[serde(default)]
    pub domain: String,
    /// Cookie path
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Secure attribute
    #[serde(default)]
    pub secure: bool,
    /// HttpOnly attribute
    #[serde(default)]
    pub http_only: bool,
    /// Expiry as seconds since the Unix epoch, if not a session cookie
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    /// SameSite attribute as reported by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_cookie_path() -> String {
    "/".to_string()
}

impl CookieRecord {
    /// Create a cookie with just a name and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: default_cookie_path(),
            secure: false,
            http_only: false,
            expires: None,
            same_site: None,
        }
    }

    /// Set the cookie domain
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the cookie path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the Secure attribute
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

/// Persisted browser storage snapshot (cookies + local storage).
///
/// Written once, atomically, after a fresh login reaches a stable
/// post-login point; read back at the start of the next attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CachedSessionState {
    /// Cookie jar at capture time
    #[serde(default)]
    pub cookies: Vec<CookieRecord>,
    /// localStorage entries at capture time
    #[serde(default)]
    pub local_storage: BTreeMap<String, String>,
    /// When this snapshot was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl CachedSessionState {
    /// Create a snapshot from a cookie jar and localStorage map, stamped now
    pub fn new(cookies: Vec<CookieRecord>, local_storage: BTreeMap<String, String>) -> Self {
        Self {
            cookies,
            local_storage,
            captured_at: Some(Utc::now()),
        }
    }

    /// Whether the snapshot holds any session material at all
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.local_storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_builder() {
        let cookie = CookieRecord::new("_t", "abc123")
            .with_domain(".linux.do")
            .with_path("/")
            .with_secure(true);

        assert_eq!(cookie.name, "_t");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, ".linux.do");
        assert!(cookie.secure);
        assert!(!cookie.http_only);
    }

    #[test]
    fn test_cookie_deserialize_defaults() {
        let cookie: CookieRecord =
            serde_json::from_str(r#"{"name":"session","value":"v"}"#).unwrap();
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.domain, "");
        assert!(cookie.expires.is_none());
    }

    #[test]
    fn test_state_roundtrip() {
        let mut storage = BTreeMap::new();
        storage.insert("user".to_string(), r#"{"id":42}"#.to_string());
        let state = CachedSessionState::new(vec![CookieRecord::new("_t", "x")], storage);

        let json = serde_json::to_string(&state).unwrap();
        let back: CachedSessionState = serde_json::from_str(&json).unwrap();

        assert_eq!(back.cookies.len(), 1);
        assert_eq!(back.local_storage.get("user").unwrap(), r#"{"id":42}"#);
        assert!(back.captured_at.is_some());
    }

    #[test]
    fn test_state_is_empty() {
        assert!(CachedSessionState::default().is_empty());

        let state = CachedSessionState::new(vec![CookieRecord::new("a", "b")], BTreeMap::new());
        assert!(!state.is_empty());
    }
}
