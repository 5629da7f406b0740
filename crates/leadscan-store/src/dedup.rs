//! In-memory dedup index seeded from previously persisted leads.

use crate::error::{Result, StoreError};
use leadscan_core::types::LEAD_COLUMNS;
use leadscan_core::{DedupKey, DedupPolicy};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Process-wide set of dedup keys.
///
/// Grows monotonically for the lifetime of a run; there is no eviction.
/// Not synchronized: owned by the single scan loop.
#[derive(Debug, Default)]
pub struct DedupIndex {
    policy: DedupPolicy,
    keys: HashSet<DedupKey>,
}

impl DedupIndex {
    /// Create an empty index for `policy`.
    #[must_use]
    pub fn new(policy: DedupPolicy) -> Self {
        Self {
            policy,
            keys: HashSet::new(),
        }
    }

    /// Create an index seeded from an existing leads file.
    ///
    /// A missing file, or one whose header lacks the key columns, is treated
    /// as holding no leads. Unreadable rows are skipped.
    #[must_use]
    pub fn bootstrap(path: &Path, policy: DedupPolicy) -> Self {
        let mut index = Self::new(policy);
        if !path.exists() {
            info!("no existing leads at {}, starting empty", path.display());
            return index;
        }

        match read_existing_keys(path, policy) {
            Ok(keys) => index.keys = keys,
            Err(e) => warn!(
                "ignoring unreadable leads file {}: {}",
                path.display(),
                e
            ),
        }

        info!(
            count = index.len(),
            policy = %policy,
            "loaded existing contacts to avoid duplicates"
        );
        index
    }

    /// The identity this index deduplicates on.
    #[must_use]
    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Whether `key` has been seen.
    #[must_use]
    pub fn contains(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// Record `key`; returns `false` if it was already present.
    pub fn insert(&mut self, key: DedupKey) -> bool {
        self.keys.insert(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn read_existing_keys(path: &Path, policy: DedupPolicy) -> Result<HashSet<DedupKey>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| StoreError::MissingColumn {
                path: path.display().to_string(),
                column: name.to_string(),
            })
    };

    let [name_col, _, _, location_col, _, phone_col] = LEAD_COLUMNS;
    let name_idx = column(name_col)?;
    let (phone_idx, location_idx) = match policy {
        DedupPolicy::Phone => (Some(column(phone_col)?), None),
        DedupPolicy::Location => (None, Some(column(location_col)?)),
    };

    let mut keys = HashSet::new();
    let mut skipped = 0usize;
    for row in reader.byte_records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("skipping unreadable row in {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(String::from_utf8_lossy)
                .unwrap_or_default()
        };

        if let Some(key) = policy.key_for_row(
            &field(Some(name_idx)),
            &field(phone_idx),
            &field(location_idx),
        ) {
            keys.insert(key);
        }
    }
    if skipped > 0 {
        debug!(skipped, "leads rows skipped during bootstrap");
    }

    Ok(keys)
}
