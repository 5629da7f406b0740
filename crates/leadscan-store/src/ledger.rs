//! Durable progress ledger of completed search units.
//!
//! The backing file holds one `zone,category` line per completed unit and is
//! only ever appended to. Zones never contain commas, so the first comma on a
//! line separates the two fields and categories may contain commas.

use crate::error::Result;
use leadscan_core::SearchUnit;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Completion tracking for search units.
pub trait CompletionLedger {
    /// Whether `unit` finished in this or an earlier run.
    fn is_complete(&self, unit: &SearchUnit) -> bool;

    /// Durably record `unit` as finished.
    fn mark_complete(&mut self, unit: &SearchUnit) -> Result<()>;
}

/// File-backed [`CompletionLedger`].
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    completed: HashSet<(String, String)>,
}

impl ProgressLedger {
    /// Open the ledger at `path`, loading every recorded unit.
    ///
    /// A missing file is an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let completed: HashSet<_> = contents
            .lines()
            .filter_map(|line| line.trim().split_once(','))
            .map(|(zone, category)| (zone.to_string(), category.to_string()))
            .collect();

        info!(
            count = completed.len(),
            "resuming: skipping previously finished searches"
        );
        Ok(Self { path, completed })
    }

    /// Whether the exact `(zone, category)` pair is recorded.
    #[must_use]
    pub fn contains(&self, zone: &str, category: &str) -> bool {
        self.completed
            .contains(&(zone.to_string(), category.to_string()))
    }

    /// Number of recorded units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    /// Whether no units are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CompletionLedger for ProgressLedger {
    fn is_complete(&self, unit: &SearchUnit) -> bool {
        self.contains(unit.zone.as_str(), &unit.category)
    }

    fn mark_complete(&mut self, unit: &SearchUnit) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", unit.ledger_line())?;
        file.flush()?;

        self.completed
            .insert((unit.zone.as_str().to_string(), unit.category.clone()));
        debug!(unit = %unit, "marked search complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadscan_core::Zone;
    use tempfile::TempDir;

    fn unit(zone: &str, category: &str) -> SearchUnit {
        SearchUnit::new(Zone::new(zone).expect("valid zone"), category)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().expect("create temp dir");
        let ledger = ProgressLedger::open(tmp.path().join("progress.txt")).expect("open ledger");
        assert!(ledger.is_empty());
        assert!(!ledger.is_complete(&unit("576101", "Bakery")));
    }

    #[test]
    fn test_mark_complete_persists() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("results").join("progress.txt");

        let mut ledger = ProgressLedger::open(&path).expect("open ledger");
        ledger
            .mark_complete(&unit("576101", "Bakery"))
            .expect("mark complete");
        assert!(ledger.is_complete(&unit("576101", "Bakery")));

        let contents = fs::read_to_string(&path).expect("read ledger file");
        assert_eq!(contents, "576101,Bakery\n");

        let reopened = ProgressLedger::open(&path).expect("reopen ledger");
        assert!(reopened.is_complete(&unit("576101", "Bakery")));
        assert!(!reopened.is_complete(&unit("576101", "Hospital")));
        assert!(!reopened.is_complete(&unit("576102", "Bakery")));
    }

    #[test]
    fn test_bootstrap_reads_all_lines() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("progress.txt");
        fs::write(
            &path,
            "576101,Bakery\r\n576101,Agro Product Trader\n\nno-comma-line\n576102,Tiles, Ceramics\n",
        )
        .expect("write ledger");

        let ledger = ProgressLedger::open(&path).expect("open ledger");
        assert_eq!(ledger.len(), 3);
        assert!(ledger.contains("576101", "Bakery"));
        assert!(ledger.contains("576101", "Agro Product Trader"));
        assert!(ledger.contains("576102", "Tiles, Ceramics"));
    }

    #[test]
    fn test_keys_are_exact() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("progress.txt");
        fs::write(&path, "576101,Bakery\n").expect("write ledger");

        let ledger = ProgressLedger::open(&path).expect("open ledger");
        assert!(!ledger.contains("576101", "bakery"));
    }
}
