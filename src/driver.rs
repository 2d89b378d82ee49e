//! The browser driver seam.
//!
//! `ListDriver` is the opaque capability the collector consumes: render a
//! page, enumerate list entries, read text/attributes, trigger growth
//! actions. The production implementation is `CdpDriver` (chromiumoxide);
//! tests inject a fake growing list.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

/// Blocking-style view of one rendered, dynamically growing list.
///
/// Handles are transient: a handle obtained before a growth action or
/// navigation may be stale afterward. Any method may fail with a
/// session-level error; the collector treats that as fatal for the run while
/// preserving records collected so far.
#[async_trait]
pub trait ListDriver: Send + Sync {
    /// Opaque reference to one rendered list entry.
    type Handle: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), ScraperError>;

    /// Wait until an element matching `locator` is present.
    async fn wait_for(&self, locator: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// All currently rendered entries matching `locator`.
    async fn query_all(&self, locator: &str) -> Result<Vec<Self::Handle>, ScraperError>;

    /// Text of a sub-element (or of the entry itself when `sub` is `None`).
    async fn read_text(
        &self,
        handle: &Self::Handle,
        sub: Option<&str>,
    ) -> Result<String, ScraperError>;

    /// Texts of every sub-element matching `sub`.
    async fn read_texts(
        &self,
        handle: &Self::Handle,
        sub: &str,
    ) -> Result<Vec<String>, ScraperError>;

    /// Attribute of a sub-element (or of the entry itself).
    async fn read_attribute(
        &self,
        handle: &Self::Handle,
        sub: Option<&str>,
        name: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// Scroll the entry into view and hover it, so overlay sub-elements
    /// render before being read.
    async fn reveal(&self, handle: &Self::Handle) -> Result<(), ScraperError>;

    async fn scroll_by(&self, dy: i64) -> Result<(), ScraperError>;

    async fn scroll_to_bottom(&self) -> Result<(), ScraperError>;

    /// Click the "next" control if present and enabled. `Ok(false)` means the
    /// control is gone, i.e. the source is exhausted.
    async fn click_next(&self, locator: &str) -> Result<bool, ScraperError>;

    /// Comparable page-extent signal (e.g. scroll height) for stall
    /// detection.
    async fn current_extent(&self) -> Result<i64, ScraperError>;

    /// Release the underlying session. Called exactly once per run.
    async fn close(&mut self) -> Result<(), ScraperError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory driver over a scripted growing list, for collector and
    //! pipeline tests.

    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// One scripted list entry. Keys are sub-locators (`""` for the entry
    /// itself); attribute keys are `"locator@name"`.
    #[derive(Debug, Clone, Default)]
    pub struct FakeItem {
        pub texts: HashMap<String, String>,
        pub attrs: HashMap<String, String>,
        pub multi: HashMap<String, Vec<String>>,
    }

    impl FakeItem {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_text(mut self, sub: &str, text: &str) -> Self {
            self.texts.insert(sub.to_string(), text.to_string());
            self
        }

        pub fn with_attr(mut self, sub: &str, name: &str, value: &str) -> Self {
            self.attrs
                .insert(format!("{}@{}", sub, name), value.to_string());
            self
        }

        pub fn with_multi(mut self, sub: &str, values: &[&str]) -> Self {
            self.multi.insert(
                sub.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
            self
        }
    }

    #[derive(Debug, Default)]
    struct FakeState {
        items: Vec<FakeItem>,
        visible: usize,
        /// Items revealed per growth action. Zero models a list that never
        /// grows.
        grow_step: usize,
        /// Remaining successful "next" clicks.
        next_clicks: usize,
        current_url: String,
        /// Detail pages: url -> locator -> matching elements.
        pages: HashMap<String, HashMap<String, Vec<FakeItem>>>,
        /// URLs whose navigation fails.
        broken_urls: HashSet<String>,
        /// Fail `query_all` from this call count on (session death).
        fail_query_from: Option<usize>,
        query_calls: usize,
        close_calls: usize,
    }

    #[derive(Debug, Default)]
    pub struct FakeDriver {
        item_locator: String,
        state: Arc<Mutex<FakeState>>,
    }

    /// Observer surviving the driver itself, so tests can assert release
    /// behavior after a pipeline consumed the driver.
    #[derive(Debug, Clone)]
    pub struct CloseProbe(Arc<Mutex<FakeState>>);

    impl CloseProbe {
        pub fn closes(&self) -> usize {
            self.0.lock().unwrap().close_calls
        }
    }

    impl FakeDriver {
        pub fn new(item_locator: &str, items: Vec<FakeItem>, initially_visible: usize) -> Self {
            let visible = initially_visible.min(items.len());
            Self {
                item_locator: item_locator.to_string(),
                state: Arc::new(Mutex::new(FakeState {
                    items,
                    visible,
                    ..FakeState::default()
                })),
            }
        }

        pub fn probe(&self) -> CloseProbe {
            CloseProbe(self.state.clone())
        }

        pub fn with_grow_step(self, grow_step: usize) -> Self {
            self.state.lock().unwrap().grow_step = grow_step;
            self
        }

        pub fn with_next_clicks(self, next_clicks: usize) -> Self {
            self.state.lock().unwrap().next_clicks = next_clicks;
            self
        }

        pub fn with_detail_page(self, url: &str, locator: &str, elements: Vec<FakeItem>) -> Self {
            self.state
                .lock()
                .unwrap()
                .pages
                .entry(url.to_string())
                .or_default()
                .insert(locator.to_string(), elements);
            self
        }

        pub fn with_broken_url(self, url: &str) -> Self {
            self.state.lock().unwrap().broken_urls.insert(url.to_string());
            self
        }

        /// Make `query_all` fail from the n-th call (1-based) onward.
        pub fn failing_query_from(self, call: usize) -> Self {
            self.state.lock().unwrap().fail_query_from = Some(call);
            self
        }

        /// Generate `n` uniform items keyed `item-0..n`, for large scripted
        /// lists.
        pub fn generated_items(n: usize) -> Vec<FakeItem> {
            (0..n)
                .map(|i| {
                    FakeItem::new()
                        .with_attr("a.link", "href", &format!("https://x.test/item-{}", i))
                        .with_text("h3.title", &format!("Item {}", i))
                })
                .collect()
        }
    }

    #[async_trait]
    impl ListDriver for FakeDriver {
        type Handle = FakeItem;

        async fn navigate(&self, url: &str) -> Result<(), ScraperError> {
            let mut state = self.state.lock().unwrap();
            if state.broken_urls.contains(url) {
                return Err(ScraperError::Navigation(format!("broken link: {}", url)));
            }
            state.current_url = url.to_string();
            Ok(())
        }

        async fn wait_for(&self, _locator: &str, _timeout: Duration) -> Result<(), ScraperError> {
            Ok(())
        }

        async fn query_all(&self, locator: &str) -> Result<Vec<FakeItem>, ScraperError> {
            let mut state = self.state.lock().unwrap();
            if locator == self.item_locator {
                state.query_calls += 1;
                if let Some(from) = state.fail_query_from {
                    if state.query_calls >= from {
                        return Err(ScraperError::Session("browser gone".to_string()));
                    }
                }
                let visible = state.visible;
                return Ok(state.items[..visible].to_vec());
            }
            // Page-level query against the current detail page.
            let found = state
                .pages
                .get(&state.current_url)
                .and_then(|page| page.get(locator))
                .cloned()
                .unwrap_or_default();
            Ok(found)
        }

        async fn read_text(
            &self,
            handle: &FakeItem,
            sub: Option<&str>,
        ) -> Result<String, ScraperError> {
            handle
                .texts
                .get(sub.unwrap_or(""))
                .cloned()
                .ok_or_else(|| ScraperError::ElementNotFound(sub.unwrap_or("<self>").to_string()))
        }

        async fn read_texts(
            &self,
            handle: &FakeItem,
            sub: &str,
        ) -> Result<Vec<String>, ScraperError> {
            handle
                .multi
                .get(sub)
                .cloned()
                .ok_or_else(|| ScraperError::ElementNotFound(sub.to_string()))
        }

        async fn read_attribute(
            &self,
            handle: &FakeItem,
            sub: Option<&str>,
            name: &str,
        ) -> Result<Option<String>, ScraperError> {
            let key = format!("{}@{}", sub.unwrap_or(""), name);
            Ok(handle.attrs.get(&key).cloned())
        }

        async fn reveal(&self, _handle: &FakeItem) -> Result<(), ScraperError> {
            Ok(())
        }

        async fn scroll_by(&self, _dy: i64) -> Result<(), ScraperError> {
            let mut state = self.state.lock().unwrap();
            state.visible = (state.visible + state.grow_step).min(state.items.len());
            Ok(())
        }

        async fn scroll_to_bottom(&self) -> Result<(), ScraperError> {
            self.scroll_by(0).await
        }

        async fn click_next(&self, _locator: &str) -> Result<bool, ScraperError> {
            let mut state = self.state.lock().unwrap();
            if state.next_clicks == 0 {
                return Ok(false);
            }
            state.next_clicks -= 1;
            let step = state.grow_step;
            state.visible = (state.visible + step).min(state.items.len());
            Ok(true)
        }

        async fn current_extent(&self) -> Result<i64, ScraperError> {
            Ok(self.state.lock().unwrap().visible as i64)
        }

        async fn close(&mut self) -> Result<(), ScraperError> {
            self.state.lock().unwrap().close_calls += 1;
            Ok(())
        }
    }
}
