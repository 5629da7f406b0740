//! Error types for leadscan core.

use thiserror::Error;

/// Errors raised while building core values.
#[derive(Error, Debug)]
pub enum LeadscanError {
    /// A value was rejected while constructing a zone, matcher or similar type
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while loading, checking or saving `config.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No home directory, so no default config location
    #[error("no config directory available on this platform")]
    NoConfigDir,

    /// The file is not valid TOML for [`AppConfig`](crate::AppConfig)
    #[error("config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Rendering the config as TOML failed
    #[error("cannot render config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Reading or writing the file failed
    #[error("config file I/O: {0}")]
    Io(#[from] std::io::Error),

    /// A setting is out of range
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted setting name, e.g. `scanning.restart_every`
        field: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, LeadscanError>;

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
