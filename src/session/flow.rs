//! Sign-in flow orchestration
//!
//! Drives one sign-in attempt from cached-session probe through fresh login,
//! authorization grant, redirect, and identity extraction. The attempt is a
//! linear state progression; states are skipped when an earlier signal shows
//! they are unnecessary (a cached session that still authenticates skips the
//! credential form entirely).
//!
//! [`SigninOrchestrator::signin`] never returns an error: every terminal
//! condition, fatal or not, is folded into an [`AuthzOutcome`], and the page
//! is closed before returning regardless of how the attempt ended.

use crate::browser::{ChallengeResolver, PageDriver};
use crate::config::Settings;
use crate::session::cache::SessionCache;
use crate::session::challenge::ensure_not_challenged;
use crate::session::diagnostics::DiagnosticsSink;
use crate::session::identity::{Identity, IdentityExtractor};
use crate::session::login::{Credentials, FormOutcome, LoginFormDriver};
use crate::types::{AuthzOutcome, SessionRequest};
use crate::utils::{filter_cookies, parse_query_params};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Mutable state accumulated across one attempt.
#[derive(Debug, Default)]
struct FlowContext {
    /// Whether an anti-bot challenge was observed at any checkpoint
    challenge_seen: bool,
    /// Whether this attempt went through the credential form
    fresh_login: bool,
}

/// Orchestrates a complete sign-in attempt for one account.
pub struct SigninOrchestrator<R: ChallengeResolver> {
    account_name: String,
    settings: Arc<Settings>,
    credentials: Credentials,
    resolver: R,
    diagnostics: DiagnosticsSink,
}

impl<R: ChallengeResolver> SigninOrchestrator<R> {
    /// Create an orchestrator for one account
    pub fn new(
        account_name: impl Into<String>,
        settings: Arc<Settings>,
        credentials: Credentials,
        resolver: R,
    ) -> Self {
        let account_name = account_name.into();
        let diagnostics = DiagnosticsSink::new(&settings.diagnostics, &account_name);
        Self {
            account_name,
            settings,
            credentials,
            resolver,
            diagnostics,
        }
    }

    /// Run one sign-in attempt to completion.
    ///
    /// Always produces an outcome. On success with a challenge observed
    /// during the attempt, a browser-fingerprint snapshot is attached for
    /// the caller's diagnostics. The page is closed before returning.
    pub async fn signin(&self, page: &dyn PageDriver, request: &SessionRequest) -> AuthzOutcome {
        info!(account = %self.account_name, "Starting sign-in attempt");

        let mut ctx = FlowContext::default();
        let mut outcome = match self.run(page, request, &mut ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(account = %self.account_name, "Sign-in attempt failed: {e}");
                self.diagnostics.capture_screenshot(page, "flow_error").await;
                AuthzOutcome::failure(format!(
                    "{} sign-in error: {e}",
                    self.settings.provider.display_name
                ))
            }
        };

        if outcome.success && ctx.challenge_seen {
            // Best effort; the session result stands even if the snapshot
            // cannot be taken.
            match page.browser_headers().await {
                Ok(headers) => outcome.fingerprint = Some(headers),
                Err(e) => warn!("Fingerprint snapshot failed: {e}"),
            }
        }

        if let Err(e) = page.close().await {
            warn!("Page close failed: {e}");
        }

        info!(
            account = %self.account_name,
            success = outcome.success,
            fresh_login = ctx.fresh_login,
            challenge_seen = ctx.challenge_seen,
            "Sign-in attempt finished"
        );
        outcome
    }

    async fn run(
        &self,
        page: &dyn PageDriver,
        request: &SessionRequest,
        ctx: &mut FlowContext,
    ) -> Result<AuthzOutcome> {
        let provider = &self.settings.provider;
        let cache = SessionCache::new(&request.cache_file_path);
        let authorize_url = provider.authorize_url(&request.client_id, &request.auth_state);

        if !request.auth_cookies.is_empty() {
            debug!("Applying {} pre-authenticated cookies", request.auth_cookies.len());
            page.set_cookies(&request.auth_cookies).await?;
        }

        // A prior session snapshot is the only signal worth probing for;
        // without one the attempt goes straight to the credential form.
        let mut already_redirected = false;
        let mut authenticated = false;
        if cache.exists() {
            match cache.load() {
                Ok(state) => {
                    info!("Restoring cached session state");
                    page.restore_storage(&state).await?;
                }
                Err(e) => warn!("Ignoring unreadable session cache: {e}"),
            }

            // Probe the authorize endpoint. With a live session the provider
            // either redirects straight back to the relying party or shows
            // the approve affordance without a login form.
            let mut authorize_reached = true;
            if let Err(e) = page.navigate(&authorize_url).await {
                warn!("Authorize probe navigation failed, assuming unauthenticated: {e}");
                authorize_reached = false;
            }

            if authorize_reached {
                ctx.challenge_seen |= ensure_not_challenged(
                    page,
                    &self.resolver,
                    &self.settings,
                    false,
                    "authorize probe",
                )
                .await?;
            }

            self.diagnostics.save_page_content(page, "sign_in_check").await;

            already_redirected =
                authorize_reached && page.current_url().await?.starts_with(&provider.origin);
            authenticated = already_redirected
                || (authorize_reached && page.element_exists(&provider.approve_selector).await?);
        }

        if !authenticated {
            info!("No live session, signing in with credentials");
            self.fresh_login(page, &cache, ctx).await?;

            // Back to the authorize endpoint with the fresh session
            if let Err(e) = page.navigate(&authorize_url).await {
                warn!("Authorize navigation failed after login: {e}");
                return Ok(AuthzOutcome::failure(format!(
                    "{} authorization page navigation failed",
                    provider.display_name
                )));
            }
            already_redirected = page.current_url().await?.starts_with(&provider.origin);
        }

        if !already_redirected {
            if let Some(failure) = self.authorize(page, ctx).await? {
                return Ok(failure);
            }
        }
        // A grant that skipped the approve click still settles through the
        // redirect wait and its interstitial re-check.
        self.await_redirect(page, ctx).await?;

        self.extract_outcome(page).await
    }

    /// Credential login on the identity provider.
    ///
    /// Best effort throughout: a form that never appears and a session that
    /// turns out to be already authenticated both fall through to the
    /// authorize re-navigation, where the real state of the session shows.
    async fn fresh_login(
        &self,
        page: &dyn PageDriver,
        cache: &SessionCache,
        ctx: &mut FlowContext,
    ) -> Result<()> {
        let provider = &self.settings.provider;
        let timeouts = &self.settings.timeouts;
        ctx.fresh_login = true;

        page.navigate(&provider.login_url).await?;
        ctx.challenge_seen |= ensure_not_challenged(
            page,
            &self.resolver,
            &self.settings,
            false,
            "login page",
        )
        .await?;

        let form = LoginFormDriver::new(&self.settings, &self.credentials);
        match form.fill_and_submit(page).await? {
            FormOutcome::Submitted => {}
            FormOutcome::AlreadyAuthenticated => {
                debug!("Credential form skipped, session already live");
            }
            FormOutcome::Unavailable => {
                warn!("Credential form never appeared, proceeding without it");
                self.diagnostics.capture_screenshot(page, "login_error").await;
            }
        }

        self.diagnostics.save_page_content(page, "sign_in_result").await;

        // The provider sometimes parks fresh logins on its challenge
        // sub-path; give it a longer window to clear before moving on.
        let url = page.current_url().await?;
        if url.contains(&provider.challenge_path_marker) {
            ctx.challenge_seen = true;
            info!("Login landed on the challenge sub-path, waiting for it to clear");
            if let Err(e) = page
                .wait_for_selector(
                    &provider.approve_selector,
                    timeouts.challenge_clear_wait(),
                    timeouts.poll_interval(),
                )
                .await
            {
                if !e.is_wait_timeout() {
                    return Err(e);
                }
                warn!("Challenge sub-path did not clear in time, continuing");
            }
        }

        // The only write path for the cache; cache-hit runs never rewrite
        // it.
        if !cache.path().as_os_str().is_empty() {
            match page.storage_snapshot().await {
                Ok(state) => {
                    if let Err(e) = cache.store(&state) {
                        warn!("Session cache write failed, continuing: {e}");
                    }
                }
                Err(e) => warn!("Session snapshot failed, cache not updated: {e}"),
            }
        }
        Ok(())
    }

    /// Wait for and click the approve affordance.
    async fn authorize(
        &self,
        page: &dyn PageDriver,
        ctx: &mut FlowContext,
    ) -> Result<Option<AuthzOutcome>> {
        let provider = &self.settings.provider;
        let timeouts = &self.settings.timeouts;

        if let Err(e) = page
            .wait_for_selector(
                &provider.approve_selector,
                timeouts.approve_wait(),
                timeouts.poll_interval(),
            )
            .await
        {
            if !e.is_wait_timeout() {
                return Err(e);
            }
            error!("Approve affordance never appeared");
            self.diagnostics.capture_screenshot(page, "authorize_error").await;
            return Ok(Some(AuthzOutcome::failure(format!(
                "{} allow button not found",
                provider.display_name
            ))));
        }

        info!("Granting authorization");
        page.click(&provider.approve_selector).await?;
        tokio::time::sleep(timeouts.post_click_settle()).await;

        ctx.challenge_seen |= ensure_not_challenged(
            page,
            &self.resolver,
            &self.settings,
            true,
            "post approve",
        )
        .await?;

        Ok(None)
    }

    /// Wait for the redirect back onto the relying party.
    ///
    /// A short probe for the token page runs first; most grants land there
    /// within a couple of seconds. Failing both waits is not terminal when
    /// the callback URL already carries an authorization code.
    async fn await_redirect(&self, page: &dyn PageDriver, ctx: &mut FlowContext) -> Result<()> {
        let provider = &self.settings.provider;
        let timeouts = &self.settings.timeouts;
        let poll = timeouts.poll_interval();

        let probed = page
            .wait_for_url(&provider.token_url_pattern(), timeouts.token_path_probe(), poll)
            .await;
        match probed {
            Ok(()) => {}
            Err(e) if e.is_wait_timeout() => {
                debug!("Token page probe missed, waiting for the redirect pattern");
                match page
                    .wait_for_url(&provider.redirect_pattern(), timeouts.redirect_wait(), poll)
                    .await
                {
                    Ok(()) => tokio::time::sleep(timeouts.redirect_settle()).await,
                    Err(e) if e.is_wait_timeout() => {
                        let url = page.current_url().await?;
                        if parse_query_params(&url).contains_key("code") {
                            debug!("Redirect pattern missed but callback code is present");
                        } else {
                            warn!("Redirect never matched, proceeding with current page");
                            self.diagnostics
                                .capture_screenshot(page, "redirect_timeout")
                                .await;
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }

        ctx.challenge_seen |= ensure_not_challenged(
            page,
            &self.resolver,
            &self.settings,
            true,
            "post redirect",
        )
        .await?;
        Ok(())
    }

    /// Extract the identity and build the terminal outcome.
    async fn extract_outcome(&self, page: &dyn PageDriver) -> Result<AuthzOutcome> {
        let provider = &self.settings.provider;

        let extractor = IdentityExtractor::new(&self.settings);
        match extractor.extract(page).await? {
            Some(Identity::Stored { api_user }) => {
                let cookies = page.cookies().await?;
                let filtered = filter_cookies(&cookies, &provider.origin);
                info!(
                    "Session established for api_user {api_user} ({} cookies)",
                    filtered.len()
                );
                Ok(AuthzOutcome::session(filtered, api_user, None))
            }
            Some(Identity::AuthorizationCode { .. }) => {
                let url = page.current_url().await?;
                info!("Authorization completed, returning raw callback parameters");
                Ok(AuthzOutcome::callback(parse_query_params(&url), None))
            }
            None => {
                error!("No identity recoverable from storage or callback URL");
                self.diagnostics.capture_screenshot(page, "oauth_error").await;
                Ok(AuthzOutcome::failure(format!(
                    "{} OAuth failed - no code in callback",
                    provider.display_name
                )))
            }
        }
    }
}
