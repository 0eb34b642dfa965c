//! Domain error types.
//!
//! These are the error kinds the request boundary maps to HTTP responses.
//! "Not found" from a read path is `Ok(None)`, not an error; `NotFound` here
//! is for callers that require the entity to exist.

/// Errors that can occur in domain-level operations.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// The requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity that was looked up.
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The member is not allowed to perform the operation.
    #[error("Invalid permissions: {message}")]
    InvalidPermissions {
        /// User-facing description of the denial.
        message: String,
    },

    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// The name of the missing field.
        field: String,
    },

    /// A stored column could not be decoded into its entity representation.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl DomainError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a new `InvalidPermissions` error.
    #[must_use]
    pub fn invalid_permissions(message: impl Into<String>) -> Self {
        Self::InvalidPermissions {
            message: message.into(),
        }
    }

    /// Creates a new `RequiredField` error.
    #[must_use]
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// The HTTP status code the request boundary should render this as.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::InvalidPermissions { .. } => 403,
            Self::RequiredField { .. } => 400,
            Self::Decode { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(DomainError::not_found("calendar", 7).status_code(), 404);
        assert_eq!(
            DomainError::invalid_permissions("cannot edit").status_code(),
            403
        );
        assert_eq!(DomainError::required_field("title").status_code(), 400);
        assert_eq!(DomainError::decode("bad json").status_code(), 500);
    }

    #[test]
    fn test_display_includes_context() {
        let err = DomainError::not_found("member", 42);
        assert_eq!(err.to_string(), "member not found: 42");
    }
}
