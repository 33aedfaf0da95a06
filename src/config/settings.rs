//! Configuration settings structure
//!
//! Defines the main settings structure and loading logic for the sign-in
//! automation. Defaults reproduce the Linux.do delegated-login flow; every
//! provider-specific string can be overridden from a TOML file or the
//! environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identity-provider and relying-party configuration
    pub provider: ProviderSettings,
    /// Bounded waits and settle pauses used by the flow
    pub timeouts: TimeoutSettings,
    /// Browser engine configuration
    pub browser: BrowserSettings,
    /// Diagnostics side channel configuration
    pub diagnostics: DiagnosticsSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Identity provider and relying party URLs, selectors, and markers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Display name used in log lines and error payloads
    pub display_name: String,
    /// Relying-party origin the OAuth flow redirects back to
    pub origin: String,
    /// Identity provider credential login page
    pub login_url: String,
    /// OAuth authorize endpoint template; `{client_id}` and `{state}` are
    /// substituted per request
    pub authorize_url_template: String,
    /// Selector of the affordance that finalizes the authorization grant
    pub approve_selector: String,
    /// Selector of the username field on the login form
    pub username_selector: String,
    /// Selector of the password field on the login form
    pub password_selector: String,
    /// Selector of the login submit button
    pub submit_selector: String,
    /// localStorage key holding the relying party's user object
    pub storage_user_key: String,
    /// Relying-party path reached right after a completed authorization
    pub token_path: String,
    /// Glob pattern for the post-authorization redirect; `{origin}` is
    /// substituted with the configured origin
    pub redirect_pattern_template: String,
    /// Substring of the identity provider's challenge sub-path
    pub challenge_path_marker: String,
    /// Page-title phrase indicating an interstitial challenge
    pub challenge_title_marker: String,
    /// Page-content phrase indicating an interstitial challenge
    pub challenge_content_marker: String,
    /// URL token indicating an interstitial challenge after authorization
    pub challenge_url_marker: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            display_name: "Linux.do".to_string(),
            origin: "https://anyrouter.top".to_string(),
            login_url: "https://linux.do/login".to_string(),
            authorize_url_template: "https://connect.linux.do/oauth2/authorize?\
                                     response_type=code&client_id={client_id}&state={state}"
                .to_string(),
            approve_selector: r#"a[href^="/oauth2/approve"]"#.to_string(),
            username_selector: "#login-account-name".to_string(),
            password_selector: "#login-account-password".to_string(),
            submit_selector: "#login-button".to_string(),
            storage_user_key: "user".to_string(),
            token_path: "/console/token".to_string(),
            redirect_pattern_template: "**{origin}/console/token**".to_string(),
            challenge_path_marker: "linux.do/challenge".to_string(),
            challenge_title_marker: "Just a moment".to_string(),
            challenge_content_marker: "Checking your browser".to_string(),
            challenge_url_marker: "__cf_chl_rt_tk".to_string(),
        }
    }
}

impl ProviderSettings {
    /// Build the OAuth authorize URL for a client id and state token
    pub fn authorize_url(&self, client_id: &str, auth_state: &str) -> String {
        self.authorize_url_template
            .replace("{client_id}", client_id)
            .replace("{state}", auth_state)
    }

    /// Redirect pattern with the origin substituted in
    pub fn redirect_pattern(&self) -> String {
        self.redirect_pattern_template
            .replace("{origin}", &self.origin)
    }

    /// Full URL of the relying party's token page
    pub fn token_url_pattern(&self) -> String {
        format!("**{}{}**", self.origin, self.token_path)
    }
}

/// Bounded waits and fixed settle pauses.
///
/// Condition waits poll until true or deadline; settle pauses cover
/// client-side script execution that has no observable completion signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Wait for the approve affordance in the Authorize state (seconds)
    pub approve_wait_secs: u64,
    /// Wait per credential-form field, per attempt (seconds)
    pub form_field_wait_secs: u64,
    /// Credential-form poll attempts
    pub form_attempts: u32,
    /// Pause after reloading the login page between form attempts (seconds)
    pub form_retry_pause_secs: u64,
    /// Pause between filling the two credential fields (milliseconds)
    pub fill_pause_ms: u64,
    /// Settle after submitting the credential form (seconds)
    pub submit_settle_secs: u64,
    /// Wait for the approve affordance while the provider's challenge
    /// sub-path clears (seconds)
    pub challenge_clear_wait_secs: u64,
    /// Short probe for the token path before the configured redirect wait
    /// (seconds)
    pub token_path_probe_secs: u64,
    /// Wait for the configured redirect pattern (seconds)
    pub redirect_wait_secs: u64,
    /// Settle after the redirect pattern matched (seconds)
    pub redirect_settle_secs: u64,
    /// Settle after clicking the approve affordance (seconds)
    pub post_click_settle_secs: u64,
    /// Wait for the user key to appear in client-side storage (seconds)
    pub storage_key_wait_secs: u64,
    /// Grace pause when the storage key never appeared (seconds)
    pub storage_grace_secs: u64,
    /// Challenge resolver attempts per invocation
    pub resolver_attempts: u32,
    /// Delay between resolver attempts (seconds)
    pub resolver_delay_secs: u64,
    /// Settle after a successful challenge resolution (seconds)
    pub resolve_settle_secs: u64,
    /// Selector poll interval for all condition waits (milliseconds)
    pub poll_interval_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            approve_wait_secs: 30,
            form_field_wait_secs: 10,
            form_attempts: 3,
            form_retry_pause_secs: 5,
            fill_pause_ms: 2000,
            submit_settle_secs: 10,
            challenge_clear_wait_secs: 60,
            token_path_probe_secs: 3,
            redirect_wait_secs: 30,
            redirect_settle_secs: 5,
            post_click_settle_secs: 3,
            storage_key_wait_secs: 10,
            storage_grace_secs: 5,
            resolver_attempts: 5,
            resolver_delay_secs: 3,
            resolve_settle_secs: 10,
            poll_interval_ms: 250,
        }
    }
}

impl TimeoutSettings {
    /// Approve-affordance wait as a [`Duration`]
    pub fn approve_wait(&self) -> Duration {
        Duration::from_secs(self.approve_wait_secs)
    }

    /// Per-field form wait as a [`Duration`]
    pub fn form_field_wait(&self) -> Duration {
        Duration::from_secs(self.form_field_wait_secs)
    }

    /// Form retry pause as a [`Duration`]
    pub fn form_retry_pause(&self) -> Duration {
        Duration::from_secs(self.form_retry_pause_secs)
    }

    /// Fill pause as a [`Duration`]
    pub fn fill_pause(&self) -> Duration {
        Duration::from_millis(self.fill_pause_ms)
    }

    /// Submit settle as a [`Duration`]
    pub fn submit_settle(&self) -> Duration {
        Duration::from_secs(self.submit_settle_secs)
    }

    /// Challenge-clear wait as a [`Duration`]
    pub fn challenge_clear_wait(&self) -> Duration {
        Duration::from_secs(self.challenge_clear_wait_secs)
    }

    /// Token-path probe as a [`Duration`]
    pub fn token_path_probe(&self) -> Duration {
        Duration::from_secs(self.token_path_probe_secs)
    }

    /// Redirect wait as a [`Duration`]
    pub fn redirect_wait(&self) -> Duration {
        Duration::from_secs(self.redirect_wait_secs)
    }

    /// Redirect settle as a [`Duration`]
    pub fn redirect_settle(&self) -> Duration {
        Duration::from_secs(self.redirect_settle_secs)
    }

    /// Post-click settle as a [`Duration`]
    pub fn post_click_settle(&self) -> Duration {
        Duration::from_secs(self.post_click_settle_secs)
    }

    /// Storage-key wait as a [`Duration`]
    pub fn storage_key_wait(&self) -> Duration {
        Duration::from_secs(self.storage_key_wait_secs)
    }

    /// Storage grace pause as a [`Duration`]
    pub fn storage_grace(&self) -> Duration {
        Duration::from_secs(self.storage_grace_secs)
    }

    /// Resolver inter-attempt delay as a [`Duration`]
    pub fn resolver_delay(&self) -> Duration {
        Duration::from_secs(self.resolver_delay_secs)
    }

    /// Post-resolve settle as a [`Duration`]
    pub fn resolve_settle(&self) -> Duration {
        Duration::from_secs(self.resolve_settle_secs)
    }

    /// Condition-wait poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

/// Browser engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run the browser without a visible window
    pub headless: bool,
    /// Explicit Chrome/Chromium executable path
    pub executable: Option<String>,
    /// Persistent profile directory; a temp profile is used when unset
    pub user_data_dir: Option<PathBuf>,
    /// Browser locale
    pub locale: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            user_data_dir: None,
            locale: "en-US".to_string(),
        }
    }
}

/// Diagnostics side channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Enable screenshot and page-content capture
    pub enabled: bool,
    /// Directory for diagnostic artifacts
    pub dir: PathBuf,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        let dir = dirs::cache_dir()
            .map(|d| d.join("linuxdo-signin").join("diagnostics"))
            .unwrap_or_else(|| PathBuf::from("diagnostics"));
        Self { enabled: true, dir }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::config(format!("Invalid config file {path:?}: {e}")))
    }

    /// Load settings from environment variables only
    pub fn from_env() -> crate::Result<Self> {
        Self::default().merge_with_env()
    }

    /// Override settings with `LINUXDO_SIGNIN_*` environment variables
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(origin) = std::env::var("LINUXDO_SIGNIN_ORIGIN") {
            self.provider.origin = origin;
        }
        if let Ok(login_url) = std::env::var("LINUXDO_SIGNIN_LOGIN_URL") {
            self.provider.login_url = login_url;
        }
        if let Ok(pattern) = std::env::var("LINUXDO_SIGNIN_REDIRECT_PATTERN") {
            self.provider.redirect_pattern_template = pattern;
        }
        if let Ok(headless) = std::env::var("LINUXDO_SIGNIN_HEADLESS") {
            self.browser.headless = headless
                .parse()
                .map_err(|e| crate::Error::config(format!("Invalid headless flag: {e}")))?;
        }
        if let Ok(dir) = std::env::var("LINUXDO_SIGNIN_DIAG_DIR") {
            self.diagnostics.dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("LINUXDO_SIGNIN_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(self)
    }

    /// Validate the final configuration
    pub fn validate(&self) -> crate::Result<()> {
        url::Url::parse(&self.provider.origin)
            .map_err(|e| crate::Error::config(format!("Invalid provider origin: {e}")))?;
        url::Url::parse(&self.provider.login_url)
            .map_err(|e| crate::Error::config(format!("Invalid login URL: {e}")))?;

        if !self.provider.authorize_url_template.contains("{client_id}")
            || !self.provider.authorize_url_template.contains("{state}")
        {
            return Err(crate::Error::config(
                "authorize_url_template must contain {client_id} and {state}",
            ));
        }
        if self.timeouts.form_attempts == 0 {
            return Err(crate::Error::config("form_attempts must be at least 1"));
        }
        Ok(())
    }
}
