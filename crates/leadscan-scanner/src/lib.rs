//! Leadscan Scanner - resumable map discovery.
//!
//! This crate turns search units into leads: it builds the search URL,
//! drives the browser through the result feed, extracts each listing's
//! detail panel into a normalized record, and hands accepted records to the
//! store while keeping the progress ledger current.
//!
//! # Features
//!
//! - Field-by-field extraction where a failed read only leaves a sentinel
//! - Phone-button first, free-text regex second phone discovery
//! - Navigation retry with linear backoff
//! - Bounded scroll-until-stable result paging
//! - Periodic browser session recycling
//!
//! # Example
//!
//! ```rust,ignore
//! use leadscan_scanner::{DiscoveryOrchestrator, ScanState};
//! use std::sync::Arc;
//!
//! let orchestrator = DiscoveryOrchestrator::new(Arc::new(browser_engine), &config)?;
//! let mut state = ScanState::new(dedup, ledger, sink);
//! let summary = orchestrator.run(&units, &mut state).await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod extractor;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod url_builder;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{Result, ScanError};
pub use extractor::{extract_record, read_detail_view, DetailField, DetailView, ExtractionRules};
pub use orchestrator::{DiscoveryOrchestrator, ScanState, ScanSummary, UnitOutcome};
pub use url_builder::build_search_url;
