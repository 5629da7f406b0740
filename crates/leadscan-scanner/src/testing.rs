//! Scripted stand-in for the browser, driven by search URL.

use leadscan_browser::{BrowserActions, BrowserError, FieldQuery, Result};
use leadscan_core::SelectorsConfig;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// One result listing as the detail panel would render it.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub title: Option<String>,
    pub phone_label: Option<String>,
    pub panel: Option<String>,
    pub category: Option<String>,
    pub address_label: Option<String>,
}

impl Listing {
    pub fn new(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn phone(mut self, label: &str) -> Self {
        self.phone_label = Some(label.to_string());
        self
    }

    pub fn panel(mut self, text: &str) -> Self {
        self.panel = Some(text.to_string());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn address(mut self, label: &str) -> Self {
        self.address_label = Some(label.to_string());
        self
    }
}

#[derive(Debug, Default)]
struct Page {
    url: String,
    listings: Vec<Listing>,
    scrolls: usize,
    selected: Option<usize>,
}

#[derive(Debug, Default)]
struct Recorded {
    page: Option<Page>,
    navigations: Vec<String>,
    clicks: Vec<usize>,
    sessions_opened: usize,
    sessions_closed: usize,
}

pub struct FakeBrowser {
    selectors: SelectorsConfig,
    results: HashMap<String, Vec<Listing>>,
    no_results: HashSet<String>,
    failing_urls: HashSet<String>,
    failing_clicks: HashSet<usize>,
    page_size: usize,
    recorded: Mutex<Recorded>,
}

impl FakeBrowser {
    pub fn new(selectors: SelectorsConfig) -> Self {
        Self {
            selectors,
            results: HashMap::new(),
            no_results: HashSet::new(),
            failing_urls: HashSet::new(),
            failing_clicks: HashSet::new(),
            page_size: usize::MAX,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    pub fn with_results(mut self, url: &str, listings: Vec<Listing>) -> Self {
        self.results.insert(url.to_string(), listings);
        self
    }

    pub fn with_no_results_marker(mut self, url: &str) -> Self {
        self.no_results.insert(url.to_string());
        self
    }

    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    pub fn failing_click(mut self, index: usize) -> Self {
        self.failing_clicks.insert(index);
        self
    }

    /// Listings revealed per scroll; all are visible at once by default.
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn clicks(&self) -> Vec<usize> {
        self.lock().clicks.clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().expect("fake browser state poisoned")
    }

    fn visible(&self, page: &Page) -> usize {
        let revealed = self.page_size.saturating_mul(page.scrolls + 1);
        page.listings.len().min(revealed)
    }
}

#[async_trait::async_trait]
impl BrowserActions for FakeBrowser {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        let mut recorded = self.lock();
        recorded.navigations.push(url.to_string());
        if self.failing_urls.contains(url) {
            return Err(BrowserError::NavigationError(format!("{url}: net::ERR_FAILED")));
        }

        recorded.page = Some(Page {
            url: url.to_string(),
            listings: self.results.get(url).cloned().unwrap_or_default(),
            ..Page::default()
        });
        Ok(())
    }

    async fn wait_for_any(&self, selectors: &[String], _timeout: Duration) -> Result<Option<usize>> {
        let recorded = self.lock();
        let page = recorded.page.as_ref().ok_or(BrowserError::NoSession)?;

        Ok(selectors.iter().position(|selector| {
            if *selector == self.selectors.result_link {
                !page.listings.is_empty()
            } else if Some(selector) == self.selectors.no_results.as_ref() {
                self.no_results.contains(&page.url)
            } else if *selector == self.selectors.detail_title {
                page.selected.is_some()
            } else {
                false
            }
        }))
    }

    async fn read_field(&self, query: &FieldQuery) -> Result<Option<String>> {
        let recorded = self.lock();
        let page = recorded.page.as_ref().ok_or(BrowserError::NoSession)?;
        let Some(listing) = page.selected.and_then(|i| page.listings.get(i)) else {
            return Ok(None);
        };

        let selector = &query.selector;
        let value = if *selector == self.selectors.detail_title {
            listing.title.clone()
        } else if self.selectors.phone_buttons.first() == Some(selector) {
            listing.phone_label.clone()
        } else if *selector == self.selectors.panel {
            listing.panel.clone()
        } else if *selector == self.selectors.category_button {
            listing.category.clone()
        } else if *selector == self.selectors.address_button {
            listing.address_label.clone()
        } else {
            None
        };
        Ok(value)
    }

    async fn count_matches(&self, selector: &str) -> Result<usize> {
        let recorded = self.lock();
        let page = recorded.page.as_ref().ok_or(BrowserError::NoSession)?;
        if selector == self.selectors.result_link {
            Ok(self.visible(page))
        } else {
            Ok(0)
        }
    }

    async fn click(&self, selector: &str, index: usize) -> Result<()> {
        let mut recorded = self.lock();
        recorded.clicks.push(index);
        let visible = {
            let page = recorded.page.as_ref().ok_or(BrowserError::NoSession)?;
            self.visible(page)
        };

        if self.failing_clicks.contains(&index) || index >= visible {
            return Err(BrowserError::SelectorNotFound(format!("{selector} [{index}]")));
        }
        if let Some(page) = recorded.page.as_mut() {
            page.selected = Some(index);
        }
        Ok(())
    }

    async fn scroll_feed(&self, feed_selector: &str) -> Result<()> {
        let mut recorded = self.lock();
        let page = recorded
            .page
            .as_mut()
            .ok_or_else(|| BrowserError::SelectorNotFound(feed_selector.to_string()))?;
        page.scrolls += 1;
        Ok(())
    }

    async fn new_session(&self) -> Result<()> {
        let mut recorded = self.lock();
        recorded.sessions_opened += 1;
        recorded.page = Some(Page::default());
        Ok(())
    }

    async fn close_session(&self) -> Result<()> {
        let mut recorded = self.lock();
        recorded.sessions_closed += 1;
        recorded.page = None;
        Ok(())
    }
}
