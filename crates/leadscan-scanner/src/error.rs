use leadscan_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("navigation to {url} failed after {attempts} attempts: {reason}")]
    Navigation {
        url: String,
        attempts: usize,
        reason: String,
    },

    #[error("cannot build search URL from {base}: {reason}")]
    InvalidSearchUrl { base: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] leadscan_browser::BrowserError),

    #[error("Store error: {0}")]
    Store(#[from] leadscan_store::StoreError),
}

pub type Result<T> = std::result::Result<T, ScanError>;
