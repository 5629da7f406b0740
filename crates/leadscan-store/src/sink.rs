//! Append-only leads CSV.

use crate::error::Result;
use leadscan_core::types::LEAD_COLUMNS;
use leadscan_core::BusinessRecord;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Append-only persistence of accepted records.
pub trait RecordSink {
    /// Append `records` in order; returns how many were written.
    fn append(&mut self, records: &[BusinessRecord]) -> Result<usize>;
}

/// CSV-file [`RecordSink`] with the fixed [`LEAD_COLUMNS`] layout.
///
/// The header is written only when the file is missing or empty. Each row is
/// flushed as it is written, so an interrupted batch loses at most its
/// unwritten tail.
#[derive(Debug)]
pub struct LeadSink {
    path: PathBuf,
    header_written: bool,
}

impl LeadSink {
    /// Open the sink at `path`, creating parent directories as needed.
    ///
    /// A partial last row left by an interrupted write is cut off, so the
    /// next append starts on a clean line.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let len = if path.exists() {
            truncate_torn_tail(&path)?
        } else {
            0
        };

        Ok(Self {
            path,
            header_written: len > 0,
        })
    }

    /// Location of the leads file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the header row is already present.
    #[must_use]
    pub fn header_written(&self) -> bool {
        self.header_written
    }
}

impl RecordSink for LeadSink {
    fn append(&mut self, records: &[BusinessRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !self.header_written {
            writer.write_record(LEAD_COLUMNS)?;
            writer.flush()?;
            self.header_written = true;
        }

        let mut written = 0;
        for record in records {
            writer.write_record(record.to_row())?;
            writer.flush()?;
            written += 1;
        }

        debug!(count = written, path = %self.path.display(), "appended leads");
        Ok(written)
    }
}

/// Drop any bytes after the last newline; returns the kept length.
fn truncate_torn_tail(path: &Path) -> Result<u64> {
    let bytes = fs::read(path)?;
    let keep = bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    if keep < bytes.len() {
        warn!(
            dropped = bytes.len() - keep,
            "{} ends mid-row, discarding the partial row",
            path.display()
        );
        OpenOptions::new().write(true).open(path)?.set_len(keep as u64)?;
    }
    Ok(keep as u64)
}
