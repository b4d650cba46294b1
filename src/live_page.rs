//! Live Notion page driven through Chrome
//!
//! Opens the page in a browser with a persistent profile so an existing
//! Notion login is reused, then exposes the pieces the pipeline needs: an
//! HTML snapshot for context, the session cookie for backend calls, and the
//! page handle for clipboard and download delivery.

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::{Browser, Page};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser_setup::launch_browser;
use crate::config::ExtractorConfig;
use crate::page_context::{PageSnapshot, SnapshotContext};
use crate::utils::SESSION_COOKIE_NAME;

const READY_STATE_SCRIPT: &str = r"
    (function() {
        return {
            readyState: document.readyState,
            hasMain: document.querySelector('main') !== null,
            imagesLoaded: Array.from(document.images).every(img => img.complete)
        };
    })()
";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A browser tab showing one Notion page
pub struct LivePage {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    context: Arc<SnapshotContext>,
    profile_dir: PathBuf,
}

impl LivePage {
    /// Launch the browser, open `url`, and take the first snapshot
    pub async fn open(config: &ExtractorConfig, url: &str) -> Result<Self> {
        let origin = url::Url::parse(url)
            .with_context(|| format!("Invalid page URL: {url}"))?
            .origin()
            .ascii_serialization();

        let (browser, handler, profile_dir) = launch_browser(
            config.headless(),
            config.chrome_data_dir().cloned(),
            config.user_agent(),
        )
        .await?;

        let grant = GrantPermissionsParams::builder()
            .permission(PermissionType::ClipboardReadWrite)
            .permission(PermissionType::ClipboardSanitizedWrite)
            .origin(origin)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build permission grant: {e}"))?;
        if let Err(e) = browser.execute(grant).await {
            warn!("Clipboard permission grant failed, copies may be rejected: {e}");
        }

        let page = browser
            .new_page(url)
            .await
            .with_context(|| format!("Failed to open {url}"))?;

        wait_for_page_load(&page, config.request_timeout()).await;

        let html = page.content().await.context("Failed to read page HTML")?;
        info!("Opened {url} ({} bytes of HTML)", html.len());

        Ok(Self {
            browser,
            handler,
            page,
            context: Arc::new(SnapshotContext::new(html)),
            profile_dir,
        })
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Context provider backed by this page's latest snapshot
    #[must_use]
    pub fn context(&self) -> Arc<SnapshotContext> {
        Arc::clone(&self.context)
    }

    #[must_use]
    pub fn profile_dir(&self) -> &PathBuf {
        &self.profile_dir
    }

    /// Re-read the DOM after client-side rendering changed it
    pub async fn refresh(&self) -> Result<PageSnapshot> {
        let html = self
            .page
            .content()
            .await
            .context("Failed to read page HTML")?;
        self.context.refresh(html);
        Ok(self.context.snapshot())
    }

    /// The `token_v2` cookie of the logged-in user, if any
    pub async fn session_token(&self) -> Result<Option<String>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .context("Failed to read page cookies")?;
        let token = session_token_from(cookies.iter().map(|c| (c.name.as_str(), c.value.as_str())));
        if token.is_none() {
            warn!("No {SESSION_COOKIE_NAME} cookie; backend calls will be anonymous");
        }
        Ok(token)
    }

    /// Close the browser and wait for its handler to finish
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .context("Failed to close browser")?;
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process wait failed: {e}");
        }
        self.handler.abort();
        Ok(())
    }
}

/// Pick the session cookie out of `(name, value)` pairs
pub fn session_token_from<'a>(
    cookies: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Option<String> {
    cookies
        .into_iter()
        .find(|(name, value)| *name == SESSION_COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Whether a readiness probe result says the page has rendered
#[must_use]
pub fn is_page_ready(probe: &serde_json::Value) -> bool {
    probe.get("readyState").and_then(|v| v.as_str()) == Some("complete")
        && probe
            .get("hasMain")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
}

/// Poll until the document is complete and Notion has mounted its `<main>`
///
/// Gives up silently after `max_wait`; a partial snapshot is still usable.
async fn wait_for_page_load(page: &Page, max_wait: Duration) {
    let start = Instant::now();

    while start.elapsed() < max_wait {
        match page.evaluate(READY_STATE_SCRIPT).await {
            Ok(result) => {
                if let Ok(probe) = result.into_value::<serde_json::Value>()
                    && is_page_ready(&probe)
                {
                    debug!("Page ready after {:.2}s", start.elapsed().as_secs_f64());
                    return;
                }
            }
            Err(e) => debug!("Readiness probe failed: {e}, retrying"),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    warn!(
        "Page not ready after {}s, continuing with what has rendered",
        max_wait.as_secs()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_non_empty_session_cookie() {
        let cookies = [("notion_browser_id", "abc"), ("token_v2", ""), ("token_v2", "secret")];
        assert_eq!(session_token_from(cookies), Some("secret".to_string()));
        assert_eq!(session_token_from([("other", "x")]), None);
    }

    #[test]
    fn ready_requires_main() {
        assert!(is_page_ready(&json!({"readyState": "complete", "hasMain": true})));
        assert!(!is_page_ready(&json!({"readyState": "complete", "hasMain": false})));
        assert!(!is_page_ready(&json!({"readyState": "interactive", "hasMain": true})));
    }
}
