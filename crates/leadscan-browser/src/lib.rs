//! Browser automation for the map application.
//!
//! Defines the page capability set the discovery pipeline consumes
//! ([`BrowserActions`]) and a chromiumoxide-backed implementation
//! ([`BrowserEngine`]).

pub mod actions;
pub mod engine;
pub mod error;

pub use actions::{BrowserActions, FieldQuery};
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
