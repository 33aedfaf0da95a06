//! Challenge resolution strategies
//!
//! [`ChallengeResolver`] is the seam for pluggable interstitial handling.
//! The built-in [`WaitingResolver`] never interacts with the challenge
//! widget itself; it gives the browser engine's own handling a bounded
//! number of settle periods and checks whether the interstitial markers
//! have cleared.

use crate::browser::PageDriver;
use crate::config::Settings;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Strategy for clearing an anti-bot interstitial on a live page.
#[async_trait]
pub trait ChallengeResolver: Send + Sync {
    /// Attempt to get the page past the interstitial.
    ///
    /// Returns `Ok(())` once the page no longer shows challenge markers,
    /// or an error if the interstitial persisted.
    async fn resolve(&self, page: &dyn PageDriver) -> Result<()>;
}

/// Resolver that waits for the interstitial to clear on its own.
///
/// Each attempt sleeps for the configured delay and then re-reads the page
/// title and content. The interstitial counts as cleared when neither
/// marker substring is present anymore.
#[derive(Debug, Clone)]
pub struct WaitingResolver {
    max_attempts: u32,
    delay: Duration,
    title_marker: String,
    content_marker: String,
}

impl WaitingResolver {
    /// Create a resolver with explicit bounds and markers
    pub fn new(
        max_attempts: u32,
        delay: Duration,
        title_marker: impl Into<String>,
        content_marker: impl Into<String>,
    ) -> Self {
        Self {
            max_attempts,
            delay,
            title_marker: title_marker.into(),
            content_marker: content_marker.into(),
        }
    }

    /// Create a resolver from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.timeouts.resolver_attempts,
            settings.timeouts.resolver_delay(),
            settings.provider.challenge_title_marker.clone(),
            settings.provider.challenge_content_marker.clone(),
        )
    }

    fn cleared(&self, title: &str, content: &str) -> bool {
        !title.contains(&self.title_marker) && !content.contains(&self.content_marker)
    }
}

#[async_trait]
impl ChallengeResolver for WaitingResolver {
    async fn resolve(&self, page: &dyn PageDriver) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            tokio::time::sleep(self.delay).await;

            let title = page.title().await?;
            let content = page.content().await?;
            if self.cleared(&title, &content) {
                debug!("Interstitial cleared after {attempt} attempt(s)");
                return Ok(());
            }
            debug!(
                "Interstitial still present (attempt {attempt}/{})",
                self.max_attempts
            );
        }

        Err(Error::challenge(format!(
            "interstitial persisted after {} attempts",
            self.max_attempts
        )))
    }
}
