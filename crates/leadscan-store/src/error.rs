//! Store error types.

use leadscan_core::LeadscanError;
use thiserror::Error;

/// Errors raised while reading or writing scan state files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required input file does not exist.
    #[error("required input file missing: {path}")]
    MissingInput {
        /// Expected location
        path: String,
    },

    /// The zones file yielded no usable pincodes.
    #[error("no zones found in {path}")]
    NoZones {
        /// Zones file
        path: String,
    },

    /// A required column is absent from a tabular file.
    #[error("column {column} not found in {path}")]
    MissingColumn {
        /// Tabular file
        path: String,
        /// Expected header
        column: String,
    },

    /// CSV parse or write failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Core validation error.
    #[error(transparent)]
    Core(#[from] LeadscanError),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
