//! Member repository.

use palaver_core::{DomainResult, Row, entities::Member};
use palaver_storage::CacheProvider;
use serde_json::Value;

use crate::find_row;

/// Looks up the raw member row by id.
#[must_use]
pub fn load_member_data_by_id(cache: &dyn CacheProvider, id: i64) -> Option<Row> {
    find_row(cache, "members", "id", &Value::from(id))
}

/// Looks up the raw member row by account name.
#[must_use]
pub fn load_member_data_by_name(cache: &dyn CacheProvider, name: &str) -> Option<Row> {
    find_row(cache, "members", "name", &Value::from(name))
}

/// Builds a member entity from its raw row, passing `None` through.
///
/// # Errors
///
/// Returns a decode error if the row has an unexpected shape.
pub fn build_member_from_data(data: Option<&Row>) -> DomainResult<Option<Member>> {
    data.map(Member::from_row).transpose()
}

/// Loads and builds a member by id.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_member_by_id(cache: &dyn CacheProvider, id: i64) -> DomainResult<Option<Member>> {
    build_member_from_data(load_member_data_by_id(cache, id).as_ref())
}

/// Loads and builds a member by account name.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_member_by_name(cache: &dyn CacheProvider, name: &str) -> DomainResult<Option<Member>> {
    build_member_from_data(load_member_data_by_name(cache, name).as_ref())
}
