//! Operational zones loading.

use crate::error::{Result, StoreError};
use leadscan_core::Zone;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// Load the deduplicated, order-preserving list of zones from a CSV file.
///
/// The pincode column is the first header containing `pincode`
/// (case-insensitive); without one, the first column is used. Empty values
/// are dropped and a trailing `.0` left by spreadsheet exports is stripped.
///
/// # Errors
/// Returns [`StoreError::MissingInput`] if the file doesn't exist and
/// [`StoreError::NoZones`] if no usable value remains.
pub fn load_zones(path: &Path) -> Result<Vec<Zone>> {
    if !path.exists() {
        return Err(StoreError::MissingInput {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h.trim().to_lowercase().contains("pincode"))
        .unwrap_or(0);

    let mut seen = HashSet::new();
    let mut zones = Vec::new();

    for row in reader.records() {
        let row = row?;
        let Some(raw) = row.get(column) else {
            continue;
        };

        let value = clean_zone_value(raw);
        if value.is_empty() || !seen.insert(value.clone()) {
            continue;
        }

        match Zone::new(value) {
            Ok(zone) => zones.push(zone),
            Err(e) => warn!("skipping zone value {:?}: {}", raw, e),
        }
    }

    if zones.is_empty() {
        return Err(StoreError::NoZones {
            path: path.display().to_string(),
        });
    }

    info!(
        count = zones.len(),
        column = headers.get(column).unwrap_or_default(),
        "loaded operational zones"
    );
    Ok(zones)
}

fn clean_zone_value(raw: &str) -> String {
    let value = raw.trim();
    value.strip_suffix(".0").unwrap_or(value).trim().to_string()
}
