//! Menu tracker entity: per-member persisted admin-menu UI state.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{DomainResult, Row};

/// One selectable entry inside a menu category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub selected: bool,
}

/// One expandable menu category with its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: String,
    pub expanded: bool,
    pub items: Vec<MenuItem>,
}

/// The persisted menu state blob: `{ categories: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuData {
    pub categories: Vec<MenuCategory>,
}

impl MenuData {
    /// Returns a mutable handle to a category by id.
    pub fn category_mut(&mut self, category: &str) -> Option<&mut MenuCategory> {
        self.categories.iter_mut().find(|c| c.id == category)
    }

    /// Returns a mutable handle to an item within a category.
    pub fn item_mut(&mut self, category: &str, item: &str) -> Option<&mut MenuItem> {
        self.category_mut(category)?
            .items
            .iter_mut()
            .find(|i| i.id == item)
    }

    /// Count of items currently marked selected across all categories.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .filter(|i| i.selected)
            .count()
    }
}

/// A member's tracker row: unique per member, created lazily on first access.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuTracker {
    pub id: i64,
    pub member_id: i64,
    pub data: MenuData,
    pub last_updated: OffsetDateTime,
}

impl MenuTracker {
    /// Builds a tracker from its raw row.
    ///
    /// # Errors
    ///
    /// Returns a decode error if any column has an unexpected shape, or if
    /// the data blob is null (the tracker is always written with data).
    pub fn from_row(row: &Row) -> DomainResult<Self> {
        let data: Option<MenuData> = row.get_json("data")?;
        Ok(Self {
            id: row.get_i64("id")?,
            member_id: row.get_i64("memberId")?,
            data: data.unwrap_or_default(),
            last_updated: row.get_epoch("lastUpdated")?,
        })
    }
}
