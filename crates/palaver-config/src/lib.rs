//! # palaver-config
//!
//! Configuration for the Palaver board core: which database engine and cache
//! provider to run, the cacheable table list, and the authentication/lockout
//! policy. Loaded from a TOML file with serde defaults; validation failures
//! are fatal at startup.

mod settings;
mod tables;

pub use settings::{
    AppConfig, AuthSettings, CacheKind, CacheSettings, CookieSettings, DatabaseKind,
    DatabaseSettings, LockoutSettings, SessionSettings,
};
pub use tables::DEFAULT_CACHEABLE_TABLES;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
