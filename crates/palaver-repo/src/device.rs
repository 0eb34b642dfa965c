//! Member device repository.

use palaver_core::{DomainResult, Row, entities::MemberDevice};
use palaver_storage::CacheProvider;
use serde_json::Value;

use crate::find_row;

/// Looks up the raw device row by its hashed identifier.
#[must_use]
pub fn load_device_data_by_id(cache: &dyn CacheProvider, id: &str) -> Option<Row> {
    find_row(cache, "member_devices", "id", &Value::from(id))
}

/// Looks up the raw device row holding `token`.
///
/// A valid auth-token cookie maps to exactly one non-revoked device, so the
/// first match is the match.
#[must_use]
pub fn load_device_data_by_token(cache: &dyn CacheProvider, token: &str) -> Option<Row> {
    find_row(cache, "member_devices", "token", &Value::from(token))
}

/// Builds a device entity from its raw row, passing `None` through.
///
/// # Errors
///
/// Returns a decode error if the row has an unexpected shape.
pub fn build_device_from_data(data: Option<&Row>) -> DomainResult<Option<MemberDevice>> {
    data.map(MemberDevice::from_row).transpose()
}

/// Loads and builds a device by hashed identifier.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_device_by_id(cache: &dyn CacheProvider, id: &str) -> DomainResult<Option<MemberDevice>> {
    build_device_from_data(load_device_data_by_id(cache, id).as_ref())
}

/// Loads and builds a device by bearer token.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_device_by_token(
    cache: &dyn CacheProvider,
    token: &str,
) -> DomainResult<Option<MemberDevice>> {
    build_device_from_data(load_device_data_by_token(cache, token).as_ref())
}
