//! Query request and result types shared by all database engines.

use palaver_core::Row;
use serde_json::Value;

use crate::{StorageError, StorageResult};

/// A parameter value bound into a parametrized statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// JSON-encoded column payload, bound as text.
    Json(String),
}

impl SqlValue {
    /// The JSON value this parameter materializes as in a raw row.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::Text(s) | Self::Json(s) => Value::String(s.clone()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A parametrized statement: SQL text plus positional values (`$1`, `$2`, …).
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub query: String,
    pub values: Vec<SqlValue>,
}

impl QueryRequest {
    /// Creates a request with no bound values.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            values: Vec::new(),
        }
    }

    /// Binds the next positional value.
    #[must_use]
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// The full-table SELECT used to mirror one table into the cache.
    ///
    /// Table names come from the deployment's fixed cacheable list, never
    /// from request input; `is_identifier` guards against anything else
    /// reaching the formatted statement.
    ///
    /// # Errors
    ///
    /// Returns an `Unsupported` error if `table` is not a bare identifier.
    pub fn select_all(table: &str) -> StorageResult<Self> {
        if !is_identifier(table) {
            return Err(StorageError::unsupported(format!(
                "invalid table name `{table}`"
            )));
        }
        Ok(Self::new(format!("SELECT * FROM {table}")))
    }
}

/// Whether `name` is a bare SQL identifier (letters, digits, underscore).
#[must_use]
pub(crate) fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Result of a write statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    pub rows_affected: u64,
    /// Identifier assigned by an INSERT, when the engine can report one.
    pub insert_id: Option<i64>,
}

/// Result of executing a [`QueryRequest`]: rows for reads, a write summary
/// for mutations.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    Rows(Vec<Row>),
    Write(WriteResult),
}

impl QueryOutput {
    /// Unwraps the row set of a read.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the statement produced a write result.
    pub fn into_rows(self) -> StorageResult<Vec<Row>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Write(_) => Err(StorageError::decode("expected rows, got a write result")),
        }
    }

    /// Unwraps the write summary of a mutation.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the statement produced rows.
    pub fn into_write(self) -> StorageResult<WriteResult> {
        match self {
            Self::Write(result) => Ok(result),
            Self::Rows(_) => Err(StorageError::decode("expected a write result, got rows")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_builder_orders_values() {
        let request = QueryRequest::new("UPDATE members SET lockout = $1 WHERE id = $2")
            .bind("{}")
            .bind(7i64);
        assert_eq!(request.values.len(), 2);
        assert_eq!(request.values[1], SqlValue::Integer(7));
    }

    #[test]
    fn test_select_all_rejects_non_identifier() {
        assert!(QueryRequest::select_all("members").is_ok());
        assert!(QueryRequest::select_all("members; DROP TABLE members").is_err());
        assert!(QueryRequest::select_all("").is_err());
        assert!(QueryRequest::select_all("1members").is_err());
    }

    #[test]
    fn test_option_binding() {
        let none: Option<i64> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(3i64)), SqlValue::Integer(3));
    }

    #[test]
    fn test_output_unwrap_mismatch() {
        let output = QueryOutput::Write(WriteResult::default());
        assert!(output.into_rows().is_err());
        let output = QueryOutput::Rows(Vec::new());
        assert!(output.into_write().is_err());
    }
}
