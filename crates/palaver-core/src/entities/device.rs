//! Member device entity.

use time::OffsetDateTime;

use crate::{DomainResult, Row};

/// A long-lived device record binding a hashed device identifier to a member
/// and a rotating bearer token.
///
/// The device row is the anchor the short-lived auth-token cookie points at:
/// a valid cookie must map to exactly one non-revoked device whose token
/// matches. A null `token` means the device has been signed out.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDevice {
    /// Hashed device identifier (also the row id).
    pub id: String,
    pub member_id: i64,
    pub token: Option<String>,
    pub user_agent: Option<String>,
    pub last_used_at: OffsetDateTime,
}

impl MemberDevice {
    /// Builds a device from its raw row.
    ///
    /// # Errors
    ///
    /// Returns a decode error if any column has an unexpected shape.
    pub fn from_row(row: &Row) -> DomainResult<Self> {
        Ok(Self {
            id: row.get_str("id")?.to_string(),
            member_id: row.get_i64("memberId")?,
            token: row.get_opt_str("token")?.map(str::to_string),
            user_agent: row.get_opt_str("userAgent")?.map(str::to_string),
            last_used_at: row.get_epoch("lastUsedAt")?,
        })
    }

    /// Whether the device currently holds a live bearer token.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_row() {
        let row = Row::from_value(json!({
            "id": "9f2c1a",
            "memberId": 4,
            "token": "abc123",
            "userAgent": "Mozilla/5.0",
            "lastUsedAt": 1_700_000_000,
        }))
        .unwrap();

        let device = MemberDevice::from_row(&row).unwrap();
        assert_eq!(device.id, "9f2c1a");
        assert!(device.is_active());
    }

    #[test]
    fn test_revoked_device_is_inactive() {
        let row = Row::from_value(json!({
            "id": "9f2c1a",
            "memberId": 4,
            "token": null,
            "userAgent": null,
            "lastUsedAt": 1_700_000_000,
        }))
        .unwrap();

        let device = MemberDevice::from_row(&row).unwrap();
        assert!(!device.is_active());
    }
}
