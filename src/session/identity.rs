//! Identity extraction after authorization
//!
//! Once the OAuth redirect lands back on the relying party, the user
//! identity is read storage-first: the relying party's user object in
//! localStorage is authoritative, and the `code` parameter of the callback
//! URL is the fallback when client-side storage never materializes.

use crate::Result;
use crate::browser::PageDriver;
use crate::config::Settings;
use crate::utils::parse_query_params;
use tracing::{debug, info, warn};

/// Where the extracted identity came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// User id from the relying party's client-side storage
    Stored { api_user: String },
    /// Authorization code from the callback URL
    AuthorizationCode { code: String },
}

/// Extracts the signed-in identity from the landed page.
pub struct IdentityExtractor<'a> {
    settings: &'a Settings,
}

impl<'a> IdentityExtractor<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Pull the user id out of the stored user object.
    ///
    /// Numeric ids are rendered as their decimal string so callers always
    /// see a string.
    fn user_id_from_json(raw: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        match value.get("id")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Try the storage-first extraction, falling back to the callback URL.
    ///
    /// Returns `None` when neither source yields an identity. Never fails
    /// the flow itself; page read errors degrade to the next source.
    pub async fn extract(&self, page: &dyn PageDriver) -> Result<Option<Identity>> {
        let key = &self.settings.provider.storage_user_key;
        let timeouts = &self.settings.timeouts;

        let appeared = page
            .wait_for_storage_key(key, timeouts.storage_key_wait(), timeouts.poll_interval())
            .await?;
        if !appeared {
            // Grace pause for late client-side hydration
            debug!("Storage key {key:?} not yet present, granting grace period");
            tokio::time::sleep(timeouts.storage_grace()).await;
        }

        if let Some(raw) = page.local_storage_get(key).await? {
            if let Some(api_user) = Self::user_id_from_json(&raw) {
                info!("Identity extracted from client-side storage");
                return Ok(Some(Identity::Stored { api_user }));
            }
            warn!("Stored user object has no usable id field");
        }

        let url = page.current_url().await?;
        let params = parse_query_params(&url);
        if let Some(code) = params.get("code").and_then(|values| values.first()) {
            info!("Identity extracted from callback authorization code");
            return Ok(Some(Identity::AuthorizationCode { code: code.clone() }));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BrowserHeaders, CachedSessionState, CookieRecord};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    fn fast_settings() -> Settings {
        let mut settings = Settings::default();
        settings.timeouts.storage_key_wait_secs = 0;
        settings.timeouts.storage_grace_secs = 0;
        settings.timeouts.poll_interval_ms = 10;
        settings
    }

    struct LandedPage {
        stored_user: Option<String>,
        url: String,
    }

    #[async_trait]
    impl PageDriver for LandedPage {
        async fn navigate(&self, _url: &str) -> crate::Result<()> {
            Ok(())
        }
        async fn current_url(&self) -> crate::Result<String> {
            Ok(self.url.clone())
        }
        async fn title(&self) -> crate::Result<String> {
            Ok(String::new())
        }
        async fn content(&self) -> crate::Result<String> {
            Ok(String::new())
        }
        async fn element_exists(&self, _selector: &str) -> crate::Result<bool> {
            Ok(false)
        }
        async fn fill(&self, _selector: &str, _value: &str) -> crate::Result<()> {
            Ok(())
        }
        async fn click(&self, _selector: &str) -> crate::Result<()> {
            Ok(())
        }
        async fn evaluate(&self, _script: &str) -> crate::Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
        async fn local_storage_get(&self, _key: &str) -> crate::Result<Option<String>> {
            Ok(self.stored_user.clone())
        }
        async fn cookies(&self) -> crate::Result<Vec<CookieRecord>> {
            Ok(Vec::new())
        }
        async fn set_cookies(&self, _cookies: &[CookieRecord]) -> crate::Result<()> {
            Ok(())
        }
        async fn storage_snapshot(&self) -> crate::Result<CachedSessionState> {
            Ok(CachedSessionState::new(Vec::new(), BTreeMap::new()))
        }
        async fn restore_storage(&self, _state: &CachedSessionState) -> crate::Result<()> {
            Ok(())
        }
        async fn screenshot(&self) -> crate::Result<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn browser_headers(&self) -> crate::Result<BrowserHeaders> {
            Ok(BrowserHeaders::new())
        }
        async fn close(&self) -> crate::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_storage_identity_wins_over_callback_code() {
        let settings = fast_settings();
        let page = LandedPage {
            stored_user: Some(r#"{"id": 42, "name": "alice"}"#.to_string()),
            url: "https://anyrouter.top/console/token?code=abc123".to_string(),
        };

        let identity = IdentityExtractor::new(&settings)
            .extract(&page)
            .await
            .unwrap();
        assert_eq!(
            identity,
            Some(Identity::Stored {
                api_user: "42".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_string_id_kept_verbatim() {
        let settings = fast_settings();
        let page = LandedPage {
            stored_user: Some(r#"{"id": "u-7"}"#.to_string()),
            url: "https://anyrouter.top/console/token".to_string(),
        };

        let identity = IdentityExtractor::new(&settings)
            .extract(&page)
            .await
            .unwrap();
        assert_eq!(
            identity,
            Some(Identity::Stored {
                api_user: "u-7".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_callback_code_fallback() {
        let settings = fast_settings();
        let page = LandedPage {
            stored_user: None,
            url: "https://anyrouter.top/oauth/callback?code=abc123&state=xyz".to_string(),
        };

        let identity = IdentityExtractor::new(&settings)
            .extract(&page)
            .await
            .unwrap();
        assert_eq!(
            identity,
            Some(Identity::AuthorizationCode {
                code: "abc123".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_unusable_user_object_falls_back_to_code() {
        let settings = fast_settings();
        let page = LandedPage {
            stored_user: Some("not json".to_string()),
            url: "https://anyrouter.top/cb?code=zzz".to_string(),
        };

        let identity = IdentityExtractor::new(&settings)
            .extract(&page)
            .await
            .unwrap();
        assert_eq!(
            identity,
            Some(Identity::AuthorizationCode {
                code: "zzz".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_no_identity_anywhere() {
        let settings = fast_settings();
        let page = LandedPage {
            stored_user: None,
            url: "https://anyrouter.top/console/token".to_string(),
        };

        let identity = IdentityExtractor::new(&settings)
            .extract(&page)
            .await
            .unwrap();
        assert_eq!(identity, None);
    }
}
