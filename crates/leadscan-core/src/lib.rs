//! Leadscan Core - Foundation crate for the leadscan lead-generation pipeline.
//!
//! This crate provides the business record model, the field normalizer used
//! to canonicalize phone numbers and pincodes, error types, and TOML-based
//! configuration that all other leadscan crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Business records, zones, search units and dedup keys
//! - [`normalize`] - Phone and pincode normalization
//!
//! # Example
//!
//! ```rust
//! use leadscan_core::normalize::{extract_pincode, normalize_phone};
//!
//! assert_eq!(normalize_phone("Phone: +91 98765 43210"), "9876543210");
//! assert_eq!(extract_pincode("Main Rd, Udupi 576102", "576101"), "576102");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, PathsConfig, ScanningConfig, SearchConfig, SelectorsConfig,
};
pub use error::{ConfigError, ConfigResult, LeadscanError, Result};
pub use normalize::PincodeMatcher;
pub use types::{BusinessRecord, DedupKey, DedupPolicy, SearchUnit, Zone};
