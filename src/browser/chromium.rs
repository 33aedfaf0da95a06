//! Chromium-backed page driver
//!
//! Wraps a chromiumoxide [`Browser`] and a single [`Page`] behind the
//! [`PageDriver`] trait. DOM interaction goes through injected scripts so the
//! same code paths work on any page the flow lands on, including interstitial
//! pages that block higher-level automation APIs.

use crate::browser::PageDriver;
use crate::config::BrowserSettings;
use crate::{
    Error, Result,
    types::{BrowserHeaders, CachedSessionState, CookieRecord},
};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::collections::BTreeMap;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A launched Chromium instance with one page attached.
pub struct ChromiumDriver {
    _browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl ChromiumDriver {
    /// Launch a browser per the given settings and open a blank page.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg(format!("--lang={}", settings.locale));

        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(exe) = &settings.executable {
            builder = builder.chrome_executable(exe);
        }
        if let Some(dir) = &settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }

        let config = builder.build().map_err(Error::browser)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::browser(format!("Failed to launch browser: {e}")))?;

        // The handler stream must be drained for the CDP connection to make
        // progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {e}");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::browser(format!("Failed to open page: {e}")))?;

        Ok(Self {
            _browser: browser,
            handler_task,
            page,
        })
    }

    async fn eval_value(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| Error::browser(format!("Script evaluation failed: {e}")))?;
        result
            .into_value()
            .map_err(|e| Error::browser(format!("Script result decode failed: {e}")))
    }

    async fn eval_string(&self, script: &str) -> Result<String> {
        match self.eval_value(script).await? {
            serde_json::Value::String(s) => Ok(s),
            serde_json::Value::Null => Ok(String::new()),
            other => Ok(other.to_string()),
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(|e| Error::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.eval_string("window.location.href").await
    }

    async fn title(&self) -> Result<String> {
        self.eval_string("document.title").await
    }

    async fn content(&self) -> Result<String> {
        self.eval_string(
            "document.documentElement ? document.documentElement.outerHTML : ''",
        )
        .await
    }

    async fn element_exists(&self, selector: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        match self.eval_value(&script).await? {
            serde_json::Value::Bool(b) => Ok(b),
            _ => Ok(false),
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.focus();
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = serde_json::to_string(selector)?,
            val = serde_json::to_string(value)?,
        );
        match self.eval_value(&script).await? {
            serde_json::Value::Bool(true) => Ok(()),
            _ => Err(Error::browser(format!("No element to fill: {selector}"))),
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            sel = serde_json::to_string(selector)?,
        );
        match self.eval_value(&script).await? {
            serde_json::Value::Bool(true) => Ok(()),
            _ => Err(Error::browser(format!("No element to click: {selector}"))),
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.eval_value(script).await
    }

    async fn local_storage_get(&self, key: &str) -> Result<Option<String>> {
        let script = format!("localStorage.getItem({})", serde_json::to_string(key)?);
        match self.eval_value(&script).await? {
            serde_json::Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    async fn cookies(&self) -> Result<Vec<CookieRecord>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| Error::browser(format!("Failed to read cookies: {e}")))?;

        Ok(cookies
            .into_iter()
            .map(|c| CookieRecord {
                name: c.name,
                value: c.value,
                domain: c.domain,
                path: c.path,
                secure: c.secure,
                http_only: c.http_only,
                expires: None,
                same_site: c.same_site.map(|s| format!("{s:?}")),
            })
            .collect())
    }

    async fn set_cookies(&self, cookies: &[CookieRecord]) -> Result<()> {
        let mut params = Vec::with_capacity(cookies.len());
        for cookie in cookies {
            if cookie.domain.is_empty() {
                warn!("Skipping cookie without domain: {}", cookie.name);
                continue;
            }
            let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
            param.domain = Some(cookie.domain.clone());
            param.path = Some(cookie.path.clone());
            param.secure = Some(cookie.secure);
            param.http_only = Some(cookie.http_only);
            params.push(param);
        }
        if params.is_empty() {
            return Ok(());
        }
        self.page
            .set_cookies(params)
            .await
            .map_err(|e| Error::browser(format!("Failed to set cookies: {e}")))?;
        Ok(())
    }

    async fn storage_snapshot(&self) -> Result<CachedSessionState> {
        let cookies = self.cookies().await?;
        let value = self
            .eval_value(
                r#"(function() {
                    const entries = {};
                    for (let i = 0; i < localStorage.length; i++) {
                        const key = localStorage.key(i);
                        entries[key] = localStorage.getItem(key);
                    }
                    return entries;
                })()"#,
            )
            .await?;
        let local_storage: BTreeMap<String, String> =
            serde_json::from_value(value).unwrap_or_default();

        Ok(CachedSessionState::new(cookies, local_storage))
    }

    async fn restore_storage(&self, state: &CachedSessionState) -> Result<()> {
        self.set_cookies(&state.cookies).await?;

        // localStorage is origin scoped, so entries only land on whatever
        // document is currently loaded. Cookies carry the session in
        // practice.
        if !state.local_storage.is_empty() {
            let script = format!(
                r#"(function(entries) {{
                    for (const [key, value] of Object.entries(entries)) {{
                        try {{ localStorage.setItem(key, value); }} catch (e) {{}}
                    }}
                    return true;
                }})({})"#,
                serde_json::to_string(&state.local_storage)?,
            );
            if let Err(e) = self.eval_value(&script).await {
                warn!("localStorage restore failed: {e}");
            }
        }
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(true)
                    .build(),
            )
            .await
            .map_err(|e| Error::browser(format!("Screenshot failed: {e}")))
    }

    async fn browser_headers(&self) -> Result<BrowserHeaders> {
        let value = self
            .eval_value(
                r#"(function() {
                    return {
                        'user-agent': navigator.userAgent || '',
                        'accept-language':
                            (navigator.languages || []).join(',')
                                || navigator.language || '',
                        'platform': navigator.platform || '',
                    };
                })()"#,
            )
            .await?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    async fn close(&self) -> Result<()> {
        if let Err(e) = self.page.clone().close().await {
            debug!("Page close reported: {e}");
        }
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
