use crate::error::Result;
use std::time::Duration;

/// What to read from the first element matching a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldQuery {
    pub selector: String,
    /// Attribute to read; `None` reads the rendered inner text.
    pub attribute: Option<String>,
}

impl FieldQuery {
    /// Read the inner text of `selector`.
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attribute: None,
        }
    }

    /// Read `attribute` of `selector`.
    pub fn attribute(selector: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attribute: Some(attribute.into()),
        }
    }
}

/// Page capabilities consumed by the discovery pipeline.
///
/// Implementations own a single browsing session (page) at a time. Methods
/// take `&self`; implementations guard the session internally.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Navigate the current session to a URL
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait until any selector matches; returns the index of the first match,
    /// or `None` on timeout
    async fn wait_for_any(&self, selectors: &[String], timeout: Duration) -> Result<Option<usize>>;

    /// Read text or an attribute from the first match; `None` when nothing matches
    async fn read_field(&self, query: &FieldQuery) -> Result<Option<String>>;

    /// Count elements matching a selector
    async fn count_matches(&self, selector: &str) -> Result<usize>;

    /// Click the `index`-th element matching a selector
    async fn click(&self, selector: &str, index: usize) -> Result<()>;

    /// Scroll the result feed to load more listings
    async fn scroll_feed(&self, feed_selector: &str) -> Result<()>;

    /// Open a fresh browsing session
    async fn new_session(&self) -> Result<()>;

    /// Close the current browsing session
    async fn close_session(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_query_constructors() {
        let text = FieldQuery::text("div[role='main'] h1");
        assert_eq!(text.selector, "div[role='main'] h1");
        assert!(text.attribute.is_none());

        let attr = FieldQuery::attribute("button[data-item-id='address']", "aria-label");
        assert_eq!(attr.attribute.as_deref(), Some("aria-label"));
    }
}
