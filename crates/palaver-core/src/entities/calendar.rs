//! Calendar entity.

use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::{DomainResult, Row};

/// A calendar visible to one or more members.
///
/// `assigned_to` and `shared_with` are member-id lists; `permissions` is a
/// nested mapping of role name to capability flags. All three are stored as
/// JSON text columns and decode to `None` when the column is null.
#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: String,
    pub created_by: i64,
    pub created_at: OffsetDateTime,
    pub assigned_to: Option<Vec<i64>>,
    pub permissions: Option<Map<String, Value>>,
    pub shared_with: Option<Vec<i64>>,
}

impl Calendar {
    /// Builds a calendar from its raw row.
    ///
    /// # Errors
    ///
    /// Returns a decode error if any column has an unexpected shape.
    pub fn from_row(row: &Row) -> DomainResult<Self> {
        Ok(Self {
            id: row.get_i64("id")?,
            title: row.get_str("title")?.to_string(),
            description: row.get_opt_str("description")?.map(str::to_string),
            kind: row.get_str("type")?.to_string(),
            created_by: row.get_i64("createdBy")?,
            created_at: row.get_epoch("createdAt")?,
            assigned_to: row.get_json("assignedTo")?,
            permissions: row.get_json("permissions")?,
            shared_with: row.get_json("sharedWith")?,
        })
    }
}
