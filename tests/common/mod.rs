//! Common test utilities and helpers
//!
//! Provides a scripted page driver that simulates the identity provider and
//! relying party, plus settings presets with all waits collapsed.

use async_trait::async_trait;
use linuxdo_signin::Result;
use linuxdo_signin::browser::PageDriver;
use linuxdo_signin::config::Settings;
use linuxdo_signin::types::{BrowserHeaders, CachedSessionState, CookieRecord};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Settings with every wait and settle collapsed so tests run instantly
pub fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.timeouts.approve_wait_secs = 0;
    settings.timeouts.form_field_wait_secs = 0;
    settings.timeouts.form_retry_pause_secs = 0;
    settings.timeouts.fill_pause_ms = 0;
    settings.timeouts.submit_settle_secs = 0;
    settings.timeouts.challenge_clear_wait_secs = 0;
    settings.timeouts.token_path_probe_secs = 0;
    settings.timeouts.redirect_wait_secs = 0;
    settings.timeouts.redirect_settle_secs = 0;
    settings.timeouts.post_click_settle_secs = 0;
    settings.timeouts.storage_key_wait_secs = 0;
    settings.timeouts.storage_grace_secs = 0;
    settings.timeouts.resolver_delay_secs = 0;
    settings.timeouts.resolve_settle_secs = 0;
    settings.timeouts.poll_interval_ms = 10;
    settings.diagnostics.enabled = false;
    settings
}

/// Scripted simulation of the provider's login page, the authorize page, and
/// the relying party's landing page.
///
/// The page tracks one piece of hidden state, `authenticated`, flipped by
/// submitting the login form or by restoring a session snapshot. Element
/// presence and URL transitions derive from it.
pub struct ScriptedPage {
    /// Whether the login form renders on the login page
    pub form_available: bool,
    /// Whether the approve affordance renders once authenticated
    pub approve_available: bool,
    /// Whether restoring a snapshot authenticates the session
    pub restore_authenticates: bool,
    /// Whether an authenticated authorize navigation lands straight on the
    /// relying party (the provider skipped the approve page)
    pub authorize_redirects: bool,
    /// URL the approve click lands on
    pub post_approve_url: String,
    /// Relying-party user object in client-side storage
    pub stored_user: Option<String>,
    /// Cookie jar visible at extraction time
    pub jar: Vec<CookieRecord>,
    /// Number of title reads that report a challenge before it clears
    pub challenge_title_reads: Mutex<u32>,
    /// Panic if the login form is filled (cache-hit runs must never fill)
    pub forbid_fill: bool,
    pub state: Mutex<PageState>,
}

#[derive(Default)]
pub struct PageState {
    url: String,
    authenticated: bool,
    navigations: Vec<String>,
    fills: Vec<(String, String)>,
    title_reads: u32,
    restored: bool,
    closed: bool,
}

impl Default for ScriptedPage {
    fn default() -> Self {
        Self {
            form_available: true,
            approve_available: true,
            restore_authenticates: false,
            authorize_redirects: false,
            post_approve_url: "https://anyrouter.top/console/token".to_string(),
            stored_user: None,
            jar: Vec::new(),
            challenge_title_reads: Mutex::new(0),
            forbid_fill: false,
            state: Mutex::new(PageState::default()),
        }
    }
}

impl ScriptedPage {
    pub fn fill_count(&self) -> usize {
        self.state.lock().unwrap().fills.len()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn title_reads(&self) -> u32 {
        self.state.lock().unwrap().title_reads
    }

    pub fn was_restored(&self) -> bool {
        self.state.lock().unwrap().restored
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn on_login_page(&self, url: &str) -> bool {
        url.starts_with("https://linux.do/login")
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        if self.authorize_redirects && state.authenticated && url.contains("/oauth2/authorize") {
            state.url = self.post_approve_url.clone();
        } else {
            state.url = url.to_string();
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn title(&self) -> Result<String> {
        self.state.lock().unwrap().title_reads += 1;
        let mut reads = self.challenge_title_reads.lock().unwrap();
        if *reads > 0 {
            *reads -= 1;
            Ok("Just a moment...".to_string())
        } else {
            Ok("LINUX DO".to_string())
        }
    }

    async fn content(&self) -> Result<String> {
        Ok("<html><body></body></html>".to_string())
    }

    async fn element_exists(&self, selector: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        if selector.contains("oauth2/approve") {
            return Ok(state.authenticated && self.approve_available);
        }
        if selector.starts_with("#login-") {
            return Ok(self.form_available
                && !state.authenticated
                && self.on_login_page(&state.url));
        }
        Ok(false)
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        assert!(!self.forbid_fill, "credential form filled on a cached run");
        self.state
            .lock()
            .unwrap()
            .fills
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if selector == "#login-button" {
            state.authenticated = true;
        } else if selector.contains("oauth2/approve") {
            state.url = self.post_approve_url.clone();
        }
        Ok(())
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }

    async fn local_storage_get(&self, key: &str) -> Result<Option<String>> {
        if key == "user" {
            Ok(self.stored_user.clone())
        } else {
            Ok(None)
        }
    }

    async fn cookies(&self) -> Result<Vec<CookieRecord>> {
        Ok(self.jar.clone())
    }

    async fn set_cookies(&self, _cookies: &[CookieRecord]) -> Result<()> {
        Ok(())
    }

    async fn storage_snapshot(&self) -> Result<CachedSessionState> {
        let mut storage = BTreeMap::new();
        if let Some(user) = &self.stored_user {
            storage.insert("user".to_string(), user.clone());
        }
        Ok(CachedSessionState::new(self.jar.clone(), storage))
    }

    async fn restore_storage(&self, _state: &CachedSessionState) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.restored = true;
        if self.restore_authenticates {
            state.authenticated = true;
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(vec![0x89, 0x50, 0x4e, 0x47])
    }

    async fn browser_headers(&self) -> Result<BrowserHeaders> {
        let mut headers = BrowserHeaders::new();
        headers.insert("user-agent".to_string(), "Mozilla/5.0 (Test)".to_string());
        Ok(headers)
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}
