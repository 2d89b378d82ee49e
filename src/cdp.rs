//! Chrome DevTools Protocol implementation of the driver seam.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use tokio::time::sleep;
use tracing::debug;

use crate::driver::ListDriver;
use crate::error::ScraperError;

const WAIT_POLL_MS: u64 = 500;

/// Driver over one chromiumoxide page. The page is released (closed) exactly
/// once via `close`; the owning harvester drops the browser afterwards.
pub struct CdpDriver {
    page: Option<Page>,
    debug: bool,
}

impl CdpDriver {
    pub fn new(page: Page, debug: bool) -> Self {
        Self {
            page: Some(page),
            debug,
        }
    }

    fn page(&self) -> Result<&Page, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::Session("page already closed".into()))
    }

    async fn eval_i64(&self, script: &str) -> Result<i64, ScraperError> {
        let result = self
            .page()?
            .evaluate(script)
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(result.into_value::<i64>().unwrap_or(0))
    }

    /// Full-page screenshot logged as a base64 data URL, for debugging
    /// navigation failures in headless runs.
    async fn debug_screenshot(&self, context: &str) {
        let Ok(page) = self.page() else { return };
        if let Ok(shot) = page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            use base64::Engine;
            let encoded = base64::engine::general_purpose::STANDARD.encode(&shot);
            debug!("{} screenshot: data:image/png;base64,{}", context, encoded);
        }
    }
}

#[async_trait]
impl ListDriver for CdpDriver {
    type Handle = Element;

    async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
        let page = self.page()?;
        if let Err(e) = page.goto(url).await {
            if self.debug {
                self.debug_screenshot("navigation failure").await;
            }
            return Err(ScraperError::Navigation(e.to_string()));
        }
        page.wait_for_navigation()
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn wait_for(&self, locator: &str, timeout: Duration) -> Result<(), ScraperError> {
        let start = std::time::Instant::now();
        loop {
            if self.page()?.find_element(locator).await.is_ok() {
                return Ok(());
            }
            if start.elapsed() > timeout {
                return Err(ScraperError::Timeout(format!(
                    "'{}' not present after {:?}",
                    locator, timeout
                )));
            }
            sleep(Duration::from_millis(WAIT_POLL_MS)).await;
        }
    }

    async fn query_all(&self, locator: &str) -> Result<Vec<Element>, ScraperError> {
        match self.page()?.find_elements(locator).await {
            Ok(elements) => Ok(elements),
            // An empty match set is not a session failure.
            Err(e) if e.to_string().contains("not found") => Ok(Vec::new()),
            Err(e) => Err(ScraperError::Session(e.to_string())),
        }
    }

    async fn read_text(
        &self,
        handle: &Element,
        sub: Option<&str>,
    ) -> Result<String, ScraperError> {
        let text = match sub {
            Some(locator) => {
                let child = handle
                    .find_element(locator)
                    .await
                    .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", locator, e)))?;
                child
                    .inner_text()
                    .await
                    .map_err(|e| ScraperError::Extraction(e.to_string()))?
            }
            None => handle
                .inner_text()
                .await
                .map_err(|e| ScraperError::Extraction(e.to_string()))?,
        };
        Ok(text.unwrap_or_default())
    }

    async fn read_texts(&self, handle: &Element, sub: &str) -> Result<Vec<String>, ScraperError> {
        let children = handle
            .find_elements(sub)
            .await
            .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", sub, e)))?;
        let mut texts = Vec::with_capacity(children.len());
        for child in &children {
            let text = child
                .inner_text()
                .await
                .map_err(|e| ScraperError::Extraction(e.to_string()))?;
            texts.push(text.unwrap_or_default());
        }
        Ok(texts)
    }

    async fn read_attribute(
        &self,
        handle: &Element,
        sub: Option<&str>,
        name: &str,
    ) -> Result<Option<String>, ScraperError> {
        let value = match sub {
            Some(locator) => {
                let child = handle
                    .find_element(locator)
                    .await
                    .map_err(|e| ScraperError::ElementNotFound(format!("{}: {}", locator, e)))?;
                child
                    .attribute(name)
                    .await
                    .map_err(|e| ScraperError::Extraction(e.to_string()))?
            }
            None => handle
                .attribute(name)
                .await
                .map_err(|e| ScraperError::Extraction(e.to_string()))?,
        };
        Ok(value)
    }

    async fn reveal(&self, handle: &Element) -> Result<(), ScraperError> {
        handle
            .scroll_into_view()
            .await
            .map_err(|e| ScraperError::Extraction(e.to_string()))?;
        // Hover triggers overlays (e.g. thumbnail duration badges) that only
        // render on pointer interaction.
        handle
            .hover()
            .await
            .map_err(|e| ScraperError::Extraction(e.to_string()))?;
        Ok(())
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), ScraperError> {
        let script = format!("window.scrollBy(0, {});", dy);
        self.page()?
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
        self.page()?
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await
            .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
        Ok(())
    }

    async fn click_next(&self, locator: &str) -> Result<bool, ScraperError> {
        let page = self.page()?;
        let control = match page.find_element(locator).await {
            Ok(control) => control,
            Err(_) => return Ok(false),
        };
        match control.click().await {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!(%locator, error = %e, "next control present but not clickable");
                Ok(false)
            }
        }
    }

    async fn current_extent(&self) -> Result<i64, ScraperError> {
        self.eval_i64("document.body.scrollHeight").await
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("failed to close page: {}", e);
            }
        }
        Ok(())
    }
}
