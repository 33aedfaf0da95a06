//! Script mode binary for one sign-in attempt
//!
//! Runs the full sign-in flow for one account and prints the outcome as
//! JSON to stdout. Logs go to stderr so the stdout payload stays machine
//! readable.
//!
//! # Usage
//!
//! ```bash
//! LINUXDO_USERNAME=alice LINUXDO_PASSWORD=... \
//!   linuxdo-signin --account alice --client-id abc --auth-state xyz
//! ```
//!
//! # Output
//!
//! A JSON object with the attempt result:
//! ```json
//! {
//!   "success": true,
//!   "payload": { "cookies": [], "api_user": "42" }
//! }
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linuxdo_signin::{
    Result,
    browser::{ChromiumDriver, WaitingResolver},
    config::ConfigLoader,
    session::{Credentials, SigninOrchestrator},
    types::{CookieRecord, SessionRequest},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "linuxdo-signin")]
struct Cli {
    /// Account name, used for log lines and diagnostic artifact names
    #[arg(short, long, value_name = "ACCOUNT")]
    account: String,

    /// OAuth client identifier of the relying party
    #[arg(short, long, value_name = "CLIENT_ID")]
    client_id: String,

    /// OAuth state token for this authorization
    #[arg(short = 's', long, value_name = "AUTH_STATE")]
    auth_state: String,

    /// Session-state cache file; omit to disable caching
    #[arg(long, value_name = "FILE")]
    cache_file: Option<PathBuf>,

    /// Pre-authenticated cookies as a JSON array
    #[arg(long, value_name = "JSON")]
    auth_cookies: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run the browser with a visible window
    #[arg(long)]
    headed: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries only the outcome JSON
    if cli.verbose {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let loader = ConfigLoader::new();
    let mut settings = loader.load(cli.config.as_deref())?;
    if cli.headed {
        settings.browser.headless = false;
    }
    let settings = Arc::new(settings);

    let credentials = Credentials::from_env()?;
    let request = build_request(&cli)?;
    debug!(
        "Starting sign-in: account={}, client_id={}, cache_file={:?}",
        cli.account, request.client_id, request.cache_file_path
    );

    let driver = ChromiumDriver::launch(&settings.browser).await?;
    let resolver = WaitingResolver::from_settings(&settings);
    let orchestrator = SigninOrchestrator::new(&cli.account, settings, credentials, resolver);

    let outcome = orchestrator.signin(&driver, &request).await;

    println!("{}", serde_json::to_string(&outcome)?);
    if !outcome.success {
        std::process::exit(1);
    }

    Ok(())
}

/// Build the session request from CLI arguments
fn build_request(cli: &Cli) -> Result<SessionRequest> {
    let mut request = SessionRequest::new(&cli.client_id, &cli.auth_state);

    if let Some(ref path) = cli.cache_file {
        request = request.with_cache_file(path);
    }

    if let Some(ref json) = cli.auth_cookies {
        let cookies: Vec<CookieRecord> = serde_json::from_str(json)
            .map_err(|e| linuxdo_signin::Error::config(format!("Invalid --auth-cookies: {e}")))?;
        request = request.with_auth_cookies(cookies);
    }

    Ok(request)
}
