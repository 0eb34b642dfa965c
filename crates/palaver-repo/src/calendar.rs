//! Calendar repository.

use palaver_core::{DomainResult, Row, entities::Calendar};
use palaver_storage::CacheProvider;
use serde_json::Value;

use crate::find_row;

/// Looks up the raw calendar row by id.
#[must_use]
pub fn load_calendar_data_by_id(cache: &dyn CacheProvider, id: i64) -> Option<Row> {
    find_row(cache, "calendars", "id", &Value::from(id))
}

/// Builds a calendar entity from its raw row, passing `None` through.
///
/// # Errors
///
/// Returns a decode error if the row has an unexpected shape.
pub fn build_calendar_from_data(data: Option<&Row>) -> DomainResult<Option<Calendar>> {
    data.map(Calendar::from_row).transpose()
}

/// Loads and builds a calendar by id.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_calendar_by_id(cache: &dyn CacheProvider, id: i64) -> DomainResult<Option<Calendar>> {
    build_calendar_from_data(load_calendar_data_by_id(cache, id).as_ref())
}
