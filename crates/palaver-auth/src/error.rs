//! Authentication error types.

use palaver_core::DomainError;
use palaver_storage::StorageError;

/// Errors that can occur during authentication operations.
///
/// Denied credentials and locked accounts are not errors; see
/// [`crate::AuthOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// A database or cache operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cached row could not be decoded.
    #[error("Decode error: {0}")]
    Domain(#[from] DomainError),

    /// The underlying session could not be destroyed on sign-out.
    /// Fatal for the request.
    #[error("Failed to destroy session: {message}")]
    SessionDestroy {
        /// The underlying cause.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `SessionDestroy` error.
    #[must_use]
    pub fn session_destroy(message: impl Into<String>) -> Self {
        Self::SessionDestroy {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_destroy_includes_cause() {
        let err = AuthError::session_destroy("store unreachable");
        assert!(err.to_string().contains("store unreachable"));
    }
}
