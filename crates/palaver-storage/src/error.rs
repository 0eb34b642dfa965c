//! Storage error types.

/// Errors that can occur during database or cache operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to establish or use a database connection.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// No connection is active for an operation that requires one.
    #[error("Not connected")]
    NotConnected,

    /// A query failed to execute.
    #[error("Query error: {message}")]
    Query {
        /// Description of the query failure.
        message: String,
    },

    /// The statement is outside the engine's supported grammar.
    #[error("Unsupported statement: {message}")]
    Unsupported {
        /// Description of what was not supported.
        message: String,
    },

    /// A result could not be decoded into the expected shape.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Query` error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

impl From<palaver_core::DomainError> for StorageError {
    fn from(err: palaver_core::DomainError) -> Self {
        Self::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::query("syntax error near WHERE");
        assert!(err.to_string().contains("Query error"));

        assert_eq!(StorageError::NotConnected.to_string(), "Not connected");
    }
}
