//! Turns a best-effort detail panel into a normalized [`BusinessRecord`].
//!
//! Reading and extraction are split: [`read_detail_view`] gathers every field
//! through the browser, keeping each read's outcome, and [`extract_record`]
//! composes those outcomes into a record. A failed or empty read only ever
//! leaves its field at the sentinel.

use leadscan_browser::{BrowserActions, BrowserError, FieldQuery};
use leadscan_core::normalize::{location_from_address, normalize_phone};
use leadscan_core::types::{NOT_AVAILABLE, NOT_FOUND};
use leadscan_core::{BusinessRecord, PincodeMatcher, SelectorsConfig, Zone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// A whole digit run in free text, optionally `+`-prefixed, with spaces or
/// hyphens allowed between digits.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d[\d\s-]*\d").expect("phone regex is hardcoded and valid")
});

/// Outcome of reading one field: a value, nothing there, or a read fault.
pub type FieldRead = std::result::Result<Option<String>, BrowserError>;

/// Logical fields of a listing's detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Title,
    Phone,
    PanelText,
    Category,
    Address,
}

/// Raw reads for one listing, keyed by field.
#[derive(Debug, Default)]
pub struct DetailView {
    reads: HashMap<DetailField, FieldRead>,
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`DetailView::set`].
    #[must_use]
    pub fn with(mut self, field: DetailField, read: FieldRead) -> Self {
        self.set(field, read);
        self
    }

    pub fn set(&mut self, field: DetailField, read: FieldRead) {
        self.reads.insert(field, read);
    }

    /// The trimmed value of `field`, if it was read and is non-empty.
    pub fn value(&self, field: DetailField) -> Option<&str> {
        match self.reads.get(&field)? {
            Ok(Some(value)) => Some(value.trim()).filter(|v| !v.is_empty()),
            Ok(None) => None,
            Err(e) => {
                debug!(?field, "field read failed: {}", e);
                None
            }
        }
    }
}

/// Field policies that do not depend on the page.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    title_placeholders: Vec<String>,
    address_label: String,
    pincode: PincodeMatcher,
}

impl ExtractionRules {
    pub fn new(selectors: &SelectorsConfig, pincode: PincodeMatcher) -> Self {
        Self {
            title_placeholders: selectors.title_placeholders.clone(),
            address_label: selectors.address_label.clone(),
            pincode,
        }
    }

    fn is_placeholder(&self, title: &str) -> bool {
        self.title_placeholders.iter().any(|p| p.trim() == title)
    }

    fn strip_label<'a>(&self, address: &'a str) -> &'a str {
        let label = self.address_label.trim();
        if label.is_empty() {
            return address;
        }
        address.strip_prefix(label).unwrap_or(address).trim()
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::new(&SelectorsConfig::default(), PincodeMatcher::default())
    }
}

/// Read every detail field of the currently open listing.
///
/// Never fails: each read's error is kept in the view.
pub async fn read_detail_view(
    browser: &dyn BrowserActions,
    selectors: &SelectorsConfig,
) -> DetailView {
    let mut view = DetailView::new();

    view.set(
        DetailField::Title,
        browser
            .read_field(&FieldQuery::text(selectors.detail_title.as_str()))
            .await,
    );
    view.set(
        DetailField::Phone,
        read_first_phone_button(browser, selectors).await,
    );
    view.set(
        DetailField::PanelText,
        browser
            .read_field(&FieldQuery::text(selectors.panel.as_str()))
            .await,
    );
    view.set(
        DetailField::Category,
        browser
            .read_field(&FieldQuery::text(selectors.category_button.as_str()))
            .await,
    );
    view.set(
        DetailField::Address,
        browser
            .read_field(&FieldQuery::attribute(
                selectors.address_button.as_str(),
                selectors.address_attribute.as_str(),
            ))
            .await,
    );

    view
}

async fn read_first_phone_button(
    browser: &dyn BrowserActions,
    selectors: &SelectorsConfig,
) -> FieldRead {
    let mut last_error = None;
    for selector in &selectors.phone_buttons {
        let query = FieldQuery::attribute(selector.as_str(), selectors.phone_attribute.as_str());
        match browser.read_field(&query).await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(e) => last_error = Some(e),
        }
    }
    last_error.map_or(Ok(None), Err)
}

/// Build a record from `view`, found while scanning `zone`.
///
/// Always returns a record; anything unreadable keeps its sentinel and the
/// pincode falls back to `zone`.
pub fn extract_record(view: &DetailView, zone: &Zone, rules: &ExtractionRules) -> BusinessRecord {
    let mut record = BusinessRecord::unknown(zone);

    if let Some(title) = view.value(DetailField::Title) {
        if !rules.is_placeholder(title) {
            record.name = title.to_string();
        }
    }

    if let Some(phone) = phone_from_button(view).or_else(|| phone_from_text(view)) {
        record.contact_number = phone;
    }

    if let Some(category) = view.value(DetailField::Category) {
        record.category = category.to_string();
    }

    if let Some(raw) = view.value(DetailField::Address) {
        let address = rules.strip_label(raw);
        if !address.is_empty() {
            record.address = address.to_string();
            record.location = location_from_address(address);
            record.pincode = rules.pincode.extract(address, zone.as_str());
        }
    }

    record
}

fn phone_from_button(view: &DetailView) -> Option<String> {
    let phone = normalize_phone(view.value(DetailField::Phone)?);
    (!phone.is_empty()).then_some(phone)
}

fn phone_from_text(view: &DetailView) -> Option<String> {
    let text = view.value(DetailField::PanelText)?;
    PHONE_PATTERN
        .find_iter(text)
        .map(|m| normalize_phone(m.as_str()))
        .find(|digits| digits.len() >= 10)
}

/// True when `record` carries no extracted data at all.
pub fn is_blank(record: &BusinessRecord) -> bool {
    record.name == NOT_AVAILABLE
        && record.category == NOT_AVAILABLE
        && record.address == NOT_AVAILABLE
        && record.contact_number == NOT_FOUND
}
