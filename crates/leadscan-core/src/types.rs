//! Shared types used across the leadscan pipeline.
//!
//! This module defines the business record emitted by the extractor, the
//! zone and search-unit newtypes that drive a scan, and the dedup identity
//! used to suppress repeated leads.

use crate::error::LeadscanError;
use crate::normalize::{is_valid_phone, normalize_name, normalize_phone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a field that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

/// Sentinel for a contact number that could not be determined.
pub const NOT_FOUND: &str = "Not Found";

/// Fixed column order of the leads file.
pub const LEAD_COLUMNS: [&str; 6] = [
    "Name",
    "Category",
    "Address",
    "Location",
    "Pincode",
    "Contact_Number",
];

/// Newtype for a search zone (a postal code drawn from the zones list).
///
/// Zones are trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Zone(String);

impl Zone {
    /// Create a new `Zone` from a string.
    ///
    /// # Errors
    /// Returns error if the value is empty after trimming or contains a comma
    /// (which would corrupt the progress ledger line format).
    pub fn new(code: impl Into<String>) -> Result<Self, LeadscanError> {
        let code = code.into();
        let code = code.trim();

        if code.is_empty() {
            return Err(LeadscanError::Validation(
                "invalid zone: must not be empty".to_string(),
            ));
        }

        if code.contains(',') {
            return Err(LeadscanError::Validation(format!(
                "invalid zone: must not contain a comma, got '{code}'"
            )));
        }

        Ok(Self(code.to_string()))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One query to execute: a (zone, category) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchUnit {
    /// Postal-code scope of the query
    pub zone: Zone,
    /// Business category or keyword
    pub category: String,
}

impl SearchUnit {
    /// Create a new search unit.
    #[must_use]
    pub fn new(zone: Zone, category: impl Into<String>) -> Self {
        Self {
            zone,
            category: category.into(),
        }
    }

    /// Expand zones and categories into units, zone-major.
    #[must_use]
    pub fn plan(zones: &[Zone], categories: &[String]) -> Vec<Self> {
        zones
            .iter()
            .flat_map(|zone| {
                categories
                    .iter()
                    .map(move |category| Self::new(zone.clone(), category.clone()))
            })
            .collect()
    }

    /// The `zone,category` line recorded in the progress ledger.
    #[must_use]
    pub fn ledger_line(&self) -> String {
        format!("{},{}", self.zone, self.category)
    }
}

impl fmt::Display for SearchUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.category, self.zone)
    }
}

/// A normalized business lead.
///
/// Every field is populated; unavailable values carry the [`NOT_AVAILABLE`]
/// or [`NOT_FOUND`] sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// Business name
    pub name: String,
    /// Category label shown on the listing
    pub category: String,
    /// Full address without its label prefix
    pub address: String,
    /// First comma-delimited segment of the address
    pub location: String,
    /// 6-digit postal code
    pub pincode: String,
    /// 10-digit phone, a shorter digit run, or [`NOT_FOUND`]
    pub contact_number: String,
}

impl BusinessRecord {
    /// An all-sentinel record for a listing found while scanning `zone`.
    #[must_use]
    pub fn unknown(zone: &Zone) -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            category: NOT_AVAILABLE.to_string(),
            address: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
            pincode: zone.as_str().to_string(),
            contact_number: NOT_FOUND.to_string(),
        }
    }

    /// Whether the name identifies a specific business.
    #[must_use]
    pub fn has_known_name(&self) -> bool {
        let name = self.name.trim();
        !name.is_empty() && name != NOT_AVAILABLE
    }

    /// Whether the contact number is exactly 10 digits.
    #[must_use]
    pub fn has_valid_phone(&self) -> bool {
        is_valid_phone(&self.contact_number)
    }

    /// Whether the location segment is known.
    #[must_use]
    pub fn has_known_location(&self) -> bool {
        let location = self.location.trim();
        !location.is_empty() && location != NOT_AVAILABLE
    }

    /// Fields in [`LEAD_COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> [&str; 6] {
        [
            self.name.as_str(),
            self.category.as_str(),
            self.address.as_str(),
            self.location.as_str(),
            self.pincode.as_str(),
            self.contact_number.as_str(),
        ]
    }
}

/// Normalized identity tuple used to suppress duplicate leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    name: String,
    discriminator: String,
}

impl DedupKey {
    /// Build a key from a raw name and discriminator (phone or location).
    #[must_use]
    pub fn new(name: &str, discriminator: &str) -> Self {
        Self {
            name: normalize_name(name),
            discriminator: normalize_name(discriminator),
        }
    }

    /// The normalized name component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized phone or location component.
    #[must_use]
    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }
}

/// Which identity a run deduplicates on, and which records it accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Key on (name, phone); a record needs a known name and a 10-digit phone.
    #[default]
    Phone,
    /// Key on (name, location); a record needs a known name and location.
    Location,
}

impl DedupPolicy {
    /// Whether `record` may be persisted under this policy.
    #[must_use]
    pub fn accepts(self, record: &BusinessRecord) -> bool {
        if !record.has_known_name() {
            return false;
        }
        match self {
            Self::Phone => record.has_valid_phone(),
            Self::Location => record.has_known_location(),
        }
    }

    /// The dedup key for an accepted record.
    #[must_use]
    pub fn key_for(self, record: &BusinessRecord) -> Option<DedupKey> {
        if !self.accepts(record) {
            return None;
        }
        Some(match self {
            Self::Phone => DedupKey::new(&record.name, &record.contact_number),
            Self::Location => DedupKey::new(&record.name, &record.location),
        })
    }

    /// The dedup key for a row read back from a leads file.
    ///
    /// Phone-keyed rows are normalized first and skipped unless exactly 10
    /// digits remain; location-keyed rows are skipped when the location is
    /// empty.
    #[must_use]
    pub fn key_for_row(self, name: &str, contact_number: &str, location: &str) -> Option<DedupKey> {
        match self {
            Self::Phone => {
                let phone = normalize_phone(contact_number);
                is_valid_phone(&phone).then(|| DedupKey::new(name, &phone))
            }
            Self::Location => {
                let location = location.trim();
                (!location.is_empty() && location != NOT_AVAILABLE)
                    .then(|| DedupKey::new(name, location))
            }
        }
    }
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phone => write!(f, "phone"),
            Self::Location => write!(f, "location"),
        }
    }
}
