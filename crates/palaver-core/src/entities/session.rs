//! Session row entity.

use crate::{DomainResult, Row};

/// A persisted session row linking a session identifier to a member.
///
/// `member_id` is null until sign-in completes for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub member_id: Option<i64>,
}

impl SessionRecord {
    /// Builds a session record from its raw row.
    ///
    /// # Errors
    ///
    /// Returns a decode error if any column has an unexpected shape.
    pub fn from_row(row: &Row) -> DomainResult<Self> {
        Ok(Self {
            id: row.get_str("id")?.to_string(),
            member_id: row.get_opt_i64("memberId")?,
        })
    }
}
