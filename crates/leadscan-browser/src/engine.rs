use crate::actions::{BrowserActions, FieldQuery};
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromiumConfig};
use chromiumoxide::Page;
use futures::stream::StreamExt;
use leadscan_core::BrowserConfig;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout, Instant};

/// How often `wait_for_any` re-checks its selectors.
const SELECTOR_POLL_MS: u64 = 250;

/// Pixels scrolled per `scroll_feed` call.
const FEED_SCROLL_PX: u32 = 5000;

/// Chromium-backed implementation of [`BrowserActions`].
pub struct BrowserEngine {
    browser: Browser,
    page: Mutex<Option<Page>>,
}

impl BrowserEngine {
    /// Launch Chromium with default settings and open a first session.
    pub async fn new() -> Result<Self> {
        Self::launch(&BrowserConfig::default()).await
    }

    /// Launch Chromium with the given settings and open a first session.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let mut builder = ChromiumConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height)
            .request_timeout(config.navigation_timeout());
        if !config.headless {
            builder = builder.with_head();
        }
        let chromium_config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(chromium_config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {}", e);
                }
            }
        });

        let engine = Self {
            browser,
            page: Mutex::new(None),
        };
        engine.new_session().await?;

        tracing::info!(headless = config.headless, "browser launched");
        Ok(engine)
    }

    /// Close the session and shut the browser down.
    pub async fn shutdown(mut self) -> Result<()> {
        self.close_session().await?;
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn current_page(&self) -> Result<Page> {
        self.page.lock().await.clone().ok_or(BrowserError::NoSession)
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T> {
        let page = self.current_page().await?;
        page.evaluate(script)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::ChromiumError(format!("unexpected script result: {e}")))
    }
}

/// Quote a selector as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str, limit: Duration) -> Result<()> {
        let page = self.current_page().await?;
        match timeout(limit, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::NavigationError(format!("{url}: {e}"))),
            Err(_) => Err(BrowserError::Timeout {
                action: format!("goto {url}"),
                timeout: limit,
            }),
        }
    }

    async fn wait_for_any(&self, selectors: &[String], limit: Duration) -> Result<Option<usize>> {
        let deadline = Instant::now() + limit;
        loop {
            for (idx, selector) in selectors.iter().enumerate() {
                let script = format!("document.querySelector({}) !== null", js_string(selector));
                if self.evaluate::<bool>(&script).await? {
                    return Ok(Some(idx));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
            sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }

    async fn read_field(&self, query: &FieldQuery) -> Result<Option<String>> {
        let page = self.current_page().await?;
        let elements = page
            .find_elements(query.selector.as_str())
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let Some(element) = elements.into_iter().next() else {
            return Ok(None);
        };

        let value = match &query.attribute {
            Some(name) => element.attribute(name.as_str()).await,
            None => element.inner_text().await,
        };
        value.map_err(|e| BrowserError::ChromiumError(e.to_string()))
    }

    async fn count_matches(&self, selector: &str) -> Result<usize> {
        let script = format!("document.querySelectorAll({}).length", js_string(selector));
        self.evaluate(&script).await
    }

    async fn click(&self, selector: &str, index: usize) -> Result<()> {
        let page = self.current_page().await?;
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let element = elements
            .get(index)
            .ok_or_else(|| BrowserError::SelectorNotFound(format!("{selector} [{index}]")))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        Ok(())
    }

    async fn scroll_feed(&self, feed_selector: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const feed = document.querySelector({}); \
             if (!feed) return false; feed.scrollBy(0, {FEED_SCROLL_PX}); return true; }})()",
            js_string(feed_selector)
        );
        if self.evaluate::<bool>(&script).await? {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(feed_selector.to_string()))
        }
    }

    async fn new_session(&self) -> Result<()> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        let previous = self.page.lock().await.replace(page);
        if let Some(old) = previous {
            if let Err(e) = old.close().await {
                tracing::debug!("closing replaced page failed: {}", e);
            }
        }
        Ok(())
    }

    async fn close_session(&self) -> Result<()> {
        let page = self.page.lock().await.take();
        if let Some(page) = page {
            page.close()
                .await
                .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes_quotes() {
        assert_eq!(
            js_string("a[href*='/place/']"),
            r#""a[href*='/place/']""#
        );
        assert_eq!(js_string(r#"div[title="x"]"#), r#""div[title=\"x\"]""#);
    }

    #[test]
    fn test_poll_constants() {
        const _: () = assert!(SELECTOR_POLL_MS > 0);
        const _: () = assert!(FEED_SCROLL_PX >= 1000);
    }
}
