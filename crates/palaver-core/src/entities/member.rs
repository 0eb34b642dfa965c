//! Member entity and its embedded lockout record.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DomainResult, Row};

/// Failed sign-in tracking, stored as a JSON column on the member row.
///
/// Invariants: `attempts` only grows while failures continue; `locked`
/// implies `attempts` reached the configured maximum; `expires` is set only
/// when the lockout-expiration policy is enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockoutRecord {
    pub locked: bool,
    pub attempts: u32,
    pub expires: Option<i64>,
}

impl LockoutRecord {
    /// Whether the lockout has an expiry that has already passed.
    #[must_use]
    pub fn expired(&self, now: OffsetDateTime) -> bool {
        self.expires
            .is_some_and(|at| at <= now.unix_timestamp())
    }
}

/// A registered board member.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub password_hash: Option<String>,
    pub lockout: Option<LockoutRecord>,
    pub total_posts: i64,
    pub last_online: Option<OffsetDateTime>,
}

impl Member {
    /// Builds a member from its raw row.
    ///
    /// # Errors
    ///
    /// Returns a decode error if any column has an unexpected shape.
    pub fn from_row(row: &Row) -> DomainResult<Self> {
        Ok(Self {
            id: row.get_i64("id")?,
            name: row.get_str("name")?.to_string(),
            password_hash: row.get_opt_str("passwordHash")?.map(str::to_string),
            lockout: row.get_json("lockout")?,
            total_posts: row.get_i64("totalPosts")?,
            last_online: row.get_opt_epoch("lastOnline")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_row_with_lockout() {
        let row = Row::from_value(json!({
            "id": 8,
            "name": "imogen",
            "passwordHash": "$argon2id$stub",
            "lockout": "{\"locked\": true, \"attempts\": 3, \"expires\": 1700000300}",
            "totalPosts": 154,
            "lastOnline": 1_700_000_000,
        }))
        .unwrap();

        let member = Member::from_row(&row).unwrap();
        let lockout = member.lockout.unwrap();
        assert!(lockout.locked);
        assert_eq!(lockout.attempts, 3);
        assert_eq!(lockout.expires, Some(1_700_000_300));
    }

    #[test]
    fn test_from_row_without_lockout() {
        let row = Row::from_value(json!({
            "id": 9,
            "name": "tom",
            "passwordHash": null,
            "lockout": null,
            "totalPosts": 0,
            "lastOnline": null,
        }))
        .unwrap();

        let member = Member::from_row(&row).unwrap();
        assert!(member.lockout.is_none());
        assert!(member.password_hash.is_none());
        assert!(member.last_online.is_none());
    }

    #[test]
    fn test_lockout_round_trip() {
        let record = LockoutRecord {
            locked: true,
            attempts: 5,
            expires: None,
        };
        let encoded = serde_json::to_string(&record).unwrap();
        let decoded: LockoutRecord = serde_json::from_str(&encoded).unwrap();
        assert_eq!(record, decoded);
    }

    #[test]
    fn test_lockout_expiry() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let permanent = LockoutRecord {
            locked: true,
            attempts: 3,
            expires: None,
        };
        assert!(!permanent.expired(now));

        let expired = LockoutRecord {
            locked: true,
            attempts: 3,
            expires: Some(1_699_999_999),
        };
        assert!(expired.expired(now));

        let pending = LockoutRecord {
            locked: true,
            attempts: 3,
            expires: Some(1_700_000_001),
        };
        assert!(!pending.expired(now));
    }
}
