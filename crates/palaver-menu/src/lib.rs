//! # palaver-menu
//!
//! Persisted admin-menu UI state, one tracker row per member. The tracker is
//! created lazily on first access from the built-in legend, and every
//! read-modify-write runs under a per-member async mutex so concurrent
//! requests cannot clobber each other's toggles.
//!
//! At most one item is selected across the whole menu at any time; selecting
//! an item clears every other selection in the same write.

mod error;
mod legend;
mod service;

pub use error::MenuError;
pub use legend::default_menu;
pub use service::{MenuService, unselect_items_except};

/// Type alias for a menu operation result.
pub type MenuResult<T> = Result<T, MenuError>;
