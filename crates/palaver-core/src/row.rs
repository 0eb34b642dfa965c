//! Raw row representation.
//!
//! The cache stores full tables as sequences of raw rows: one JSON object per
//! database row, column name to value. Entities are decoded from these on
//! demand and never cached themselves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::DomainError;

/// One raw database row: a mapping of column name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Map<String, Value>);

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builds a row from a JSON object value.
    ///
    /// # Errors
    ///
    /// Returns a decode error if `value` is not a JSON object.
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DomainError::decode(format!(
                "expected row object, got {other}"
            ))),
        }
    }

    /// Returns the raw value of a column, if present.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Sets a column value, replacing any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.0.insert(column.into(), value);
    }

    /// Decodes an integer column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing, null, or not an
    /// integer.
    pub fn get_i64(&self, column: &str) -> Result<i64, DomainError> {
        self.get(column)
            .and_then(Value::as_i64)
            .ok_or_else(|| DomainError::decode(format!("column `{column}` is not an integer")))
    }

    /// Decodes a nullable integer column. Null and missing both decode to
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column holds a non-null, non-integer
    /// value.
    pub fn get_opt_i64(&self, column: &str) -> Result<Option<i64>, DomainError> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                DomainError::decode(format!("column `{column}` is not an integer"))
            }),
        }
    }

    /// Decodes a text column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing, null, or not a
    /// string.
    pub fn get_str(&self, column: &str) -> Result<&str, DomainError> {
        self.get(column)
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::decode(format!("column `{column}` is not a string")))
    }

    /// Decodes a nullable text column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column holds a non-null, non-string
    /// value.
    pub fn get_opt_str(&self, column: &str) -> Result<Option<&str>, DomainError> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| DomainError::decode(format!("column `{column}` is not a string"))),
        }
    }

    /// Decodes a boolean column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing, null, or not a
    /// boolean.
    pub fn get_bool(&self, column: &str) -> Result<bool, DomainError> {
        self.get(column)
            .and_then(Value::as_bool)
            .ok_or_else(|| DomainError::decode(format!("column `{column}` is not a boolean")))
    }

    /// Decodes an epoch-seconds column into a date/time value.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is not an integer or is outside
    /// the representable timestamp range.
    pub fn get_epoch(&self, column: &str) -> Result<OffsetDateTime, DomainError> {
        let secs = self.get_i64(column)?;
        OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|e| DomainError::decode(format!("column `{column}`: {e}")))
    }

    /// Decodes a nullable epoch-seconds column.
    ///
    /// # Errors
    ///
    /// Returns a decode error for non-null values that are not valid epoch
    /// seconds.
    pub fn get_opt_epoch(&self, column: &str) -> Result<Option<OffsetDateTime>, DomainError> {
        match self.get_opt_i64(column)? {
            None => Ok(None),
            Some(secs) => OffsetDateTime::from_unix_timestamp(secs)
                .map(Some)
                .map_err(|e| DomainError::decode(format!("column `{column}`: {e}"))),
        }
    }

    /// Decodes a JSON-encoded text column into a typed value.
    ///
    /// A null or missing column decodes to `None` — it is passed through, not
    /// parsed. The column may hold either a JSON string (legacy storage) or
    /// an already-structured value.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column text is not valid JSON for `T`.
    pub fn get_json<T>(&self, column: &str) -> Result<Option<T>, DomainError>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = match self.get(column) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(text)) => serde_json::from_str(text)
                .map_err(|e| DomainError::decode(format!("column `{column}`: {e}")))?,
            Some(value) => value.clone(),
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| DomainError::decode(format!("column `{column}`: {e}")))
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
