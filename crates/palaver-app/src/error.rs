//! Boot error types.

use palaver_config::{ConfigError, DatabaseKind};
use palaver_storage::StorageError;

/// Errors that can occur while booting the application context.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// Configuration was missing or inconsistent.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The configured engine has no shipped provider.
    #[error("No provider is available for the {kind:?} engine")]
    Unsupported { kind: DatabaseKind },

    /// Connecting or building the cache failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl BootError {
    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(kind: DatabaseKind) -> Self {
        Self::Unsupported { kind }
    }
}
