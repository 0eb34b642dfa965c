//! Menu tracker repository.

use palaver_core::{DomainResult, Row, entities::MenuTracker};
use palaver_storage::CacheProvider;
use serde_json::Value;

use crate::find_row;

/// Looks up the raw tracker row for a member. The tracker is unique per
/// member.
#[must_use]
pub fn load_tracker_data_by_member(cache: &dyn CacheProvider, member_id: i64) -> Option<Row> {
    find_row(cache, "menu_tracker", "memberId", &Value::from(member_id))
}

/// Builds a tracker entity from its raw row, passing `None` through.
///
/// # Errors
///
/// Returns a decode error if the row has an unexpected shape.
pub fn build_tracker_from_data(data: Option<&Row>) -> DomainResult<Option<MenuTracker>> {
    data.map(MenuTracker::from_row).transpose()
}

/// Loads and builds a member's tracker.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_tracker_by_member(
    cache: &dyn CacheProvider,
    member_id: i64,
) -> DomainResult<Option<MenuTracker>> {
    build_tracker_from_data(load_tracker_data_by_member(cache, member_id).as_ref())
}
