//! Leadscan Store - durable state behind a resumable scan.
//!
//! Every file here is append-only or read-once:
//!
//! - [`zones`] - operational pincode list (read once at startup)
//! - [`dedup`] - in-memory dedup index seeded from the leads file
//! - [`ledger`] - append-only log of completed search units
//! - [`sink`] - append-only leads CSV with header management
//! - [`export`] - contact list export from the leads file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod dedup;
pub mod error;
pub mod export;
pub mod ledger;
pub mod sink;
pub mod zones;

pub use dedup::DedupIndex;
pub use error::{Result, StoreError};
pub use export::export_contacts;
pub use ledger::{CompletionLedger, ProgressLedger};
pub use sink::{LeadSink, RecordSink};
pub use zones::load_zones;
