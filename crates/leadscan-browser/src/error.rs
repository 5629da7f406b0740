use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Failures of the page collaborator. Callers decide whether one is
/// field-, candidate- or unit-level.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout after {timeout:?}: {action}")]
    Timeout { action: String, timeout: Duration },

    #[error("no open browsing session")]
    NoSession,
}
