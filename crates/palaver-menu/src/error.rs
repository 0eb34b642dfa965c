//! Menu error types.

use palaver_core::DomainError;
use palaver_storage::StorageError;

/// Errors that can occur while reading or updating a member's menu state.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// A database or cache operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A tracker row or its data blob could not be decoded.
    #[error("Decode error: {0}")]
    Domain(#[from] DomainError),
}
