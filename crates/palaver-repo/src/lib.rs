//! # palaver-repo
//!
//! The repository layer: per-entity translation from raw cached rows to
//! typed entities. Every repository follows the same triple:
//!
//! - `load_x_data_…` — find the raw row in the cache mirror; `None` for
//!   not-found, never an error.
//! - `build_x_from_data` — construct the typed entity; `None` passes
//!   through, decode failures are real errors.
//! - `get_x_…` — the composition of the two.
//!
//! Repositories never write. All mutation happens in the service layers,
//! which write to the database provider and refresh the touched mirror.

mod calendar;
mod device;
mod member;
mod menu;
mod session;

pub use calendar::{build_calendar_from_data, get_calendar_by_id, load_calendar_data_by_id};
pub use device::{
    build_device_from_data, get_device_by_id, get_device_by_token, load_device_data_by_id,
    load_device_data_by_token,
};
pub use member::{
    build_member_from_data, get_member_by_id, get_member_by_name, load_member_data_by_id,
    load_member_data_by_name,
};
pub use menu::{build_tracker_from_data, get_tracker_by_member, load_tracker_data_by_member};
pub use session::{build_session_from_data, get_session_by_id, load_session_data_by_id};

use palaver_core::Row;
use palaver_storage::CacheProvider;
use serde_json::Value;

/// Finds the first row of `table` whose `column` equals `value`.
///
/// The row is cloned out of the snapshot: entities are built fresh per call
/// and the snapshot stays shared and immutable.
fn find_row(
    cache: &dyn CacheProvider,
    table: &str,
    column: &str,
    value: &Value,
) -> Option<Row> {
    cache
        .get(table)
        .iter()
        .find(|row| row.get(column) == Some(value))
        .cloned()
}
