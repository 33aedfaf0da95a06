//! Linux.do Sign-In Automation
//!
//! Browser-driven session acquisition for relying parties that delegate
//! login to Linux.do over OAuth. One run takes a client id and state token,
//! walks the authorize handshake in a real browser, and returns the
//! established session (cookies plus user identifier) or the raw OAuth
//! callback parameters.
//!
//! # Architecture
//!
//! The flow is a linear state progression with skippable states:
//! - **Cache probe**: a previously cached session is restored and the
//!   authorize endpoint is probed; a live session skips the credential form
//! - **Fresh login**: the credential form on the identity provider is
//!   located, filled, and submitted
//! - **Authorize**: the approve affordance finalizes the OAuth grant
//! - **Redirect**: the flow waits for the redirect back onto the relying
//!   party
//! - **Identity extraction**: storage-first, with the callback `code`
//!   parameter as fallback
//!
//! Anti-bot interstitials can appear at any navigation boundary; a single
//! detection step runs at each checkpoint and delegates resolution to a
//! pluggable [`ChallengeResolver`](browser::ChallengeResolver).
//!
//! The browser engine sits behind the [`PageDriver`](browser::PageDriver)
//! trait; production runs use the chromiumoxide-backed
//! [`ChromiumDriver`](browser::ChromiumDriver).
//!
//! # Examples
//!
//! ```rust,no_run
//! use linuxdo_signin::browser::{ChromiumDriver, WaitingResolver};
//! use linuxdo_signin::session::{Credentials, SigninOrchestrator};
//! use linuxdo_signin::types::SessionRequest;
//! use linuxdo_signin::Settings;
//! use std::sync::Arc;
//!
//! # async fn example() -> linuxdo_signin::Result<()> {
//! let settings = Arc::new(Settings::default());
//! let credentials = Credentials::from_env()?;
//! let resolver = WaitingResolver::from_settings(&settings);
//!
//! let driver = ChromiumDriver::launch(&settings.browser).await?;
//! let orchestrator = SigninOrchestrator::new("alice", settings, credentials, resolver);
//!
//! let request = SessionRequest::new("client-id", "state-token")
//!     .with_cache_file("/tmp/alice_session.json");
//! let outcome = orchestrator.signin(&driver, &request).await;
//! println!("{}", serde_json::to_string(&outcome)?);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod secrets;
pub mod session;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, Result};
pub use session::SigninOrchestrator;
pub use types::{AuthzOutcome, AuthzPayload, SessionRequest};
