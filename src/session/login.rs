//! Credential form handling
//!
//! Locates and submits the identity provider's login form. The form may be
//! hidden behind an interstitial or skipped entirely when the cached session
//! already authenticates the user, so every wait here is bounded and the
//! outcome distinguishes "filled", "turned out unnecessary", and "never
//! appeared".

use crate::browser::PageDriver;
use crate::config::Settings;
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// Login credentials for the identity provider.
///
/// Deliberately not `Debug`-derived with values; the password never appears
/// in logs.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Read credentials from `LINUXDO_USERNAME` / `LINUXDO_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let username = std::env::var("LINUXDO_USERNAME")
            .map_err(|_| Error::config("LINUXDO_USERNAME is not set"))?;
        let password = std::env::var("LINUXDO_PASSWORD")
            .map_err(|_| Error::config("LINUXDO_PASSWORD is not set"))?;
        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// What happened while trying to find the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Both fields were found and the form was submitted
    Submitted,
    /// The session was already authenticated; no form needed
    AlreadyAuthenticated,
    /// The form never became available within the attempt budget
    Unavailable,
}

/// Drives the credential form on the identity provider's login page.
pub struct LoginFormDriver<'a> {
    settings: &'a Settings,
    credentials: &'a Credentials,
}

impl<'a> LoginFormDriver<'a> {
    pub fn new(settings: &'a Settings, credentials: &'a Credentials) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    /// Whether the page shows signs of an already-authenticated session:
    /// the approve affordance is present or the page already sits on the
    /// relying-party origin.
    async fn already_authenticated(&self, page: &dyn PageDriver) -> Result<bool> {
        if page
            .element_exists(&self.settings.provider.approve_selector)
            .await?
        {
            return Ok(true);
        }
        let url = page.current_url().await?;
        Ok(url.starts_with(&self.settings.provider.origin))
    }

    /// Wait for one form field with the per-attempt budget
    async fn field_available(&self, page: &dyn PageDriver, selector: &str) -> Result<bool> {
        match page
            .wait_for_selector(
                selector,
                self.settings.timeouts.form_field_wait(),
                self.settings.timeouts.poll_interval(),
            )
            .await
        {
            Ok(()) => Ok(true),
            Err(e) if e.is_wait_timeout() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Locate the credential form, fill it, and submit.
    ///
    /// Polls for the username and password fields over a bounded number of
    /// attempts, reloading the login page between attempts. Before giving an
    /// attempt up it checks whether the session turned out to be already
    /// authenticated, which ends the search successfully without a form.
    pub async fn fill_and_submit(&self, page: &dyn PageDriver) -> Result<FormOutcome> {
        let provider = &self.settings.provider;
        let timeouts = &self.settings.timeouts;

        let mut form_ready = false;
        for attempt in 1..=timeouts.form_attempts {
            debug!(
                "Looking for credential form (attempt {attempt}/{})",
                timeouts.form_attempts
            );

            let username_found = self.field_available(page, &provider.username_selector).await?;
            let password_found = username_found
                && self.field_available(page, &provider.password_selector).await?;

            if username_found && password_found {
                form_ready = true;
                break;
            }

            if self.already_authenticated(page).await? {
                info!("Session already authenticated, skipping credential form");
                return Ok(FormOutcome::AlreadyAuthenticated);
            }

            if attempt < timeouts.form_attempts {
                warn!("Credential form not ready, reloading login page");
                page.navigate(&provider.login_url).await?;
                tokio::time::sleep(timeouts.form_retry_pause()).await;
            }
        }

        if !form_ready {
            // One last shortcut check before reporting the form missing
            if self.already_authenticated(page).await? {
                info!("Session already authenticated, skipping credential form");
                return Ok(FormOutcome::AlreadyAuthenticated);
            }
            return Ok(FormOutcome::Unavailable);
        }

        info!("Credential form found, submitting");
        page.fill(&provider.username_selector, &self.credentials.username)
            .await?;
        tokio::time::sleep(timeouts.fill_pause()).await;
        page.fill(&provider.password_selector, &self.credentials.password)
            .await?;
        tokio::time::sleep(timeouts.fill_pause()).await;
        page.click(&provider.submit_selector).await?;

        // Credential verification and the post-login redirect have no
        // observable completion signal on this page.
        tokio::time::sleep(timeouts.submit_settle()).await;

        Ok(FormOutcome::Submitted)
    }
}
