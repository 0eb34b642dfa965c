//! Typed entities decoded from cached rows.
//!
//! Each entity is a projection of one raw row: identifiers are integers,
//! epoch-seconds columns become [`time::OffsetDateTime`], and JSON-encoded
//! columns are parsed into nested structures. Entities are built fresh on
//! every repository call and discarded after use.

mod calendar;
mod device;
mod member;
mod menu;
mod session;

pub use calendar::Calendar;
pub use device::MemberDevice;
pub use member::{LockoutRecord, Member};
pub use menu::{MenuCategory, MenuData, MenuItem, MenuTracker};
pub use session::SessionRecord;
