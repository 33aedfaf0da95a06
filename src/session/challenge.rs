//! Anti-bot interstitial detection
//!
//! A challenge interstitial can appear at any navigation boundary of the
//! sign-in flow. Detection is marker based: page title, page content, and
//! optionally the URL are checked against configured substrings. Resolution
//! is delegated to a [`ChallengeResolver`](crate::browser::ChallengeResolver);
//! a resolver failure is recorded but never aborts the flow, since the next
//! step's own waits will surface the real failure if the page stayed blocked.

use crate::browser::{ChallengeResolver, PageDriver};
use crate::config::{ProviderSettings, Settings};
use tracing::{debug, info, warn};

/// Challenge marker substrings for one identity provider.
#[derive(Debug, Clone)]
pub struct ChallengeMarkers {
    /// Substring expected in the page title of an interstitial
    pub title: String,
    /// Substring expected in the page content of an interstitial
    pub content: String,
    /// Token embedded in interstitial redirect URLs
    pub url_token: String,
    /// Path fragment of the provider's dedicated challenge page
    pub path: String,
}

impl ChallengeMarkers {
    /// Build markers from provider settings
    pub fn from_provider(provider: &ProviderSettings) -> Self {
        Self {
            title: provider.challenge_title_marker.clone(),
            content: provider.challenge_content_marker.clone(),
            url_token: provider.challenge_url_marker.clone(),
            path: provider.challenge_path_marker.clone(),
        }
    }

    /// Whether a title/content pair looks like an interstitial
    pub fn matches_page(&self, title: &str, content: &str) -> bool {
        title.contains(&self.title) || content.contains(&self.content)
    }

    /// Whether a URL carries an interstitial token or points at the
    /// provider's challenge page
    pub fn matches_url(&self, url: &str) -> bool {
        url.contains(&self.url_token) || url.contains(&self.path)
    }
}

/// Check the page for a challenge interstitial and, if present, run the
/// resolver.
///
/// Returns `true` when a challenge was detected, whether or not resolution
/// succeeded. Detection errors on the page itself propagate; resolver
/// failures do not.
pub async fn ensure_not_challenged<R: ChallengeResolver + ?Sized>(
    page: &dyn PageDriver,
    resolver: &R,
    settings: &Settings,
    check_url: bool,
    scope: &str,
) -> crate::Result<bool> {
    let markers = ChallengeMarkers::from_provider(&settings.provider);

    let title = page.title().await?;
    let content = page.content().await?;
    let mut challenged = markers.matches_page(&title, &content);

    if !challenged && check_url {
        let url = page.current_url().await?;
        challenged = markers.matches_url(&url);
    }

    if !challenged {
        debug!("No challenge interstitial at {scope}");
        return Ok(false);
    }

    info!("Challenge interstitial detected at {scope}, invoking resolver");
    match resolver.resolve(page).await {
        Ok(()) => {
            info!("Challenge resolved at {scope}");
            tokio::time::sleep(settings.timeouts.resolve_settle()).await;
        }
        Err(e) => {
            // The flow continues regardless; downstream waits will fail
            // with their own timeouts if the page is still blocked.
            warn!("Challenge resolution failed at {scope}: {e}");
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> ChallengeMarkers {
        ChallengeMarkers::from_provider(&ProviderSettings::default())
    }

    #[test]
    fn test_title_marker_detected() {
        let m = markers();
        assert!(m.matches_page("Just a moment...", "<html></html>"));
    }

    #[test]
    fn test_content_marker_detected() {
        let m = markers();
        assert!(m.matches_page("linux.do", "<p>Checking your browser before accessing</p>"));
    }

    #[test]
    fn test_clean_page_not_detected() {
        let m = markers();
        assert!(!m.matches_page("Sign in", "<form id=\"login\"></form>"));
    }

    #[test]
    fn test_url_token_detected() {
        let m = markers();
        assert!(m.matches_url("https://linux.do/login?__cf_chl_rt_tk=abc"));
        assert!(m.matches_url("https://linux.do/challenge?return=/login"));
        assert!(!m.matches_url("https://linux.do/login"));
    }
}
