//! GitHub environment secrets client
//!
//! Pushes refreshed session material (cookies, cache blobs) into GitHub
//! environment secrets so downstream workflows pick up the new session.
//! Unlike the sign-in flow, every step here is fail-fast: a secret that did
//! not land is a hard error.

use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::{debug, info};

/// Asymmetric sealing of a secret value against a repository public key.
///
/// GitHub expects libsodium sealed boxes; the implementation is supplied by
/// the caller so this crate stays free of cryptographic primitives.
pub trait SecretSealer: Send + Sync {
    /// Seal `plaintext` against the given public key bytes
    fn seal(&self, public_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;
}

/// Public key of a repository environment, as served by the secrets API.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentPublicKey {
    /// Opaque key identifier, echoed back when storing a secret
    pub key_id: String,
    /// Base64-encoded public key
    pub key: String,
}

/// Client for the GitHub environment secrets API.
pub struct SecretsClient<S: SecretSealer> {
    http: reqwest::Client,
    base_url: String,
    repo: String,
    token: String,
    sealer: S,
}

impl<S: SecretSealer> SecretsClient<S> {
    /// Create a client for `owner/name` authenticated with a token
    pub fn new(repo: impl Into<String>, token: impl Into<String>, sealer: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.github.com".to_string(),
            repo: repo.into(),
            token: token.into(),
            sealer,
        }
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header(
                "User-Agent",
                format!("linuxdo-signin/{}", crate::utils::get_version()),
            )
    }

    /// Create the environment if it does not exist yet
    pub async fn ensure_environment(&self, environment: &str) -> Result<()> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/repos/{}/environments/{environment}", self.repo),
            )
            .send()
            .await?;

        match response.status().as_u16() {
            200 | 201 => {
                debug!("Environment {environment} is present");
                Ok(())
            }
            status => Err(Error::secrets(format!(
                "environment {environment} setup failed with HTTP {status}"
            ))),
        }
    }

    /// Fetch the environment's secrets public key
    pub async fn public_key(&self, environment: &str) -> Result<EnvironmentPublicKey> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!(
                    "/repos/{}/environments/{environment}/secrets/public-key",
                    self.repo
                ),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::secrets(format!(
                "public key fetch for {environment} failed with HTTP {}",
                response.status().as_u16()
            )));
        }
        Ok(response.json().await?)
    }

    /// Seal and store one secret in the environment
    pub async fn put_secret(&self, environment: &str, name: &str, value: &str) -> Result<()> {
        let public_key = self.public_key(environment).await?;
        let key_bytes = BASE64
            .decode(&public_key.key)
            .map_err(|e| Error::secrets(format!("public key is not valid base64: {e}")))?;

        let sealed = self.sealer.seal(&key_bytes, value.as_bytes())?;
        let encrypted_value = BASE64.encode(sealed);

        let response = self
            .request(
                reqwest::Method::PUT,
                &format!(
                    "/repos/{}/environments/{environment}/secrets/{name}",
                    self.repo
                ),
            )
            .json(&serde_json::json!({
                "encrypted_value": encrypted_value,
                "key_id": public_key.key_id,
            }))
            .send()
            .await?;

        match response.status().as_u16() {
            201 | 204 => {
                info!("Secret {name} stored in environment {environment}");
                Ok(())
            }
            status => Err(Error::secrets(format!(
                "secret {name} store failed with HTTP {status}"
            ))),
        }
    }
}
