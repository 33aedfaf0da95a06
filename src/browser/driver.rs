//! Page capability trait
//!
//! The sign-in flow drives an opaque rendering/automation engine through
//! [`PageDriver`]. Production runs use the chromiumoxide-backed
//! [`ChromiumDriver`](crate::browser::ChromiumDriver); tests inject scripted
//! drivers.
//!
//! Every wait on this trait is a bounded condition poll: it checks an
//! observable condition at a fixed interval and times out with a recoverable
//! [`Error::WaitTimeout`](crate::Error::WaitTimeout) rather than blocking
//! forever.

use crate::utils::pattern_matches;
use crate::{
    Result,
    types::{BrowserHeaders, CachedSessionState, CookieRecord},
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Live page handle abstraction.
///
/// Owned exclusively by one sign-in attempt and closed at attempt end
/// regardless of outcome.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the document to load
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Current page URL
    async fn current_url(&self) -> Result<String>;

    /// Current page title
    async fn title(&self) -> Result<String>;

    /// Rendered page content
    async fn content(&self) -> Result<String>;

    /// Whether an element matching the selector is present
    async fn element_exists(&self, selector: &str) -> Result<bool>;

    /// Fill a form field, dispatching input/change events
    async fn fill(&self, selector: &str, value: &str) -> Result<()>;

    /// Click an element
    async fn click(&self, selector: &str) -> Result<()>;

    /// Evaluate a script in the page and return its JSON value
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Read a localStorage entry
    async fn local_storage_get(&self, key: &str) -> Result<Option<String>>;

    /// Cookie jar of the page context
    async fn cookies(&self) -> Result<Vec<CookieRecord>>;

    /// Add cookies to the page context
    async fn set_cookies(&self, cookies: &[CookieRecord]) -> Result<()>;

    /// Snapshot cookies and localStorage
    async fn storage_snapshot(&self) -> Result<CachedSessionState>;

    /// Restore a previously captured snapshot onto the context
    async fn restore_storage(&self, state: &CachedSessionState) -> Result<()>;

    /// Capture a PNG screenshot of the page
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Snapshot of network-identifying request headers
    async fn browser_headers(&self) -> Result<BrowserHeaders>;

    /// Release the page and its context
    async fn close(&self) -> Result<()>;

    /// Poll until an element matching the selector is present.
    ///
    /// Errors with a wait timeout when the deadline passes first.
    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.element_exists(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(crate::Error::wait_timeout(
                    format!("selector {selector}"),
                    timeout,
                ));
            }
            sleep(poll).await;
        }
    }

    /// Poll until the current URL matches a glob pattern.
    async fn wait_for_url(&self, pattern: &str, timeout: Duration, poll: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let url = self.current_url().await?;
            if pattern_matches(pattern, &url) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(crate::Error::wait_timeout(
                    format!("url pattern {pattern}"),
                    timeout,
                ));
            }
            sleep(poll).await;
        }
    }

    /// Poll until a localStorage key exists.
    ///
    /// Returns `false` on deadline instead of an error; a missing key is a
    /// soft condition the caller falls back from.
    async fn wait_for_storage_key(
        &self,
        key: &str,
        timeout: Duration,
        poll: Duration,
    ) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.local_storage_get(key).await?.is_some() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(poll).await;
        }
    }
}
