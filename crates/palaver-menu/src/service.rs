//! The menu service.

use std::sync::Arc;

use palaver_core::DomainError;
use palaver_core::entities::{MenuData, MenuTracker};
use palaver_repo::get_tracker_by_member;
use palaver_storage::{Backend, KeyedMutex, QueryRequest, SqlValue};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::legend::default_menu;
use crate::MenuResult;

/// Clears the selected flag on every item except the named one.
///
/// The named item's own flag is left untouched; callers set it afterwards.
pub fn unselect_items_except(data: &mut MenuData, category: &str, item: &str) {
    for c in &mut data.categories {
        let keep_category = c.id == category;
        for i in &mut c.items {
            if !(keep_category && i.id == item) {
                i.selected = false;
            }
        }
    }
}

/// Reads and updates per-member menu trackers.
pub struct MenuService {
    backend: Backend,
    locks: Arc<KeyedMutex>,
}

impl MenuService {
    /// Creates a service over the process's backend.
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            locks: Arc::new(KeyedMutex::new()),
        }
    }

    /// Returns the member's tracker, creating it from the legend on first
    /// access. Idempotent: a second call finds the row the first one wrote.
    ///
    /// # Errors
    ///
    /// Returns an error for storage or decode failures.
    pub async fn get_menu_settings(&self, member_id: i64) -> MenuResult<MenuTracker> {
        let _guard = self.locks.lock(member_id).await;
        self.ensure_tracker(member_id).await
    }

    /// Expands or collapses one category.
    ///
    /// An unknown category id leaves the tracker untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for storage or decode failures.
    pub async fn update_category_toggle(
        &self,
        member_id: i64,
        category: &str,
        expanded: bool,
    ) -> MenuResult<MenuTracker> {
        let _guard = self.locks.lock(member_id).await;
        let mut tracker = self.ensure_tracker(member_id).await?;

        let Some(target) = tracker.data.category_mut(category) else {
            warn!(member_id, category, "toggle for unknown menu category");
            return Ok(tracker);
        };
        target.expanded = expanded;

        self.persist(&mut tracker).await?;
        debug!(member_id, category, expanded, "menu category toggled");
        Ok(tracker)
    }

    /// Marks one item as selected and clears every other selection, keeping
    /// at most one item selected across the whole menu.
    ///
    /// An unknown category/item pair leaves the tracker untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for storage or decode failures.
    pub async fn update_selected_item(
        &self,
        member_id: i64,
        category: &str,
        item: &str,
    ) -> MenuResult<MenuTracker> {
        let _guard = self.locks.lock(member_id).await;
        let mut tracker = self.ensure_tracker(member_id).await?;

        if tracker.data.item_mut(category, item).is_none() {
            warn!(member_id, category, item, "selection of unknown menu item");
            return Ok(tracker);
        }

        unselect_items_except(&mut tracker.data, category, item);
        if let Some(target) = tracker.data.item_mut(category, item) {
            target.selected = true;
        }

        self.persist(&mut tracker).await?;
        debug!(member_id, category, item, "menu item selected");
        Ok(tracker)
    }

    /// Loads the tracker, writing the legend-default row when none exists.
    /// Callers hold the member's lock.
    async fn ensure_tracker(&self, member_id: i64) -> MenuResult<MenuTracker> {
        if let Some(tracker) = get_tracker_by_member(self.backend.cache.as_ref(), member_id)? {
            return Ok(tracker);
        }

        let data = default_menu();
        let now = OffsetDateTime::now_utc();
        let blob = encode_data(&data)?;
        self.backend
            .write_then_refresh(
                QueryRequest::new(
                    "INSERT INTO menu_tracker (memberId, data, lastUpdated) VALUES ($1, $2, $3)",
                )
                .bind(member_id)
                .bind(SqlValue::Json(blob))
                .bind(now.unix_timestamp()),
                "menu_tracker",
            )
            .await?;
        info!(member_id, "menu tracker created");

        get_tracker_by_member(self.backend.cache.as_ref(), member_id)?
            .ok_or_else(|| DomainError::not_found("menu_tracker", member_id).into())
    }

    /// Writes the tracker's data blob back and stamps `lastUpdated`.
    async fn persist(&self, tracker: &mut MenuTracker) -> MenuResult<()> {
        let now = OffsetDateTime::now_utc();
        let blob = encode_data(&tracker.data)?;
        self.backend
            .write_then_refresh(
                QueryRequest::new(
                    "UPDATE menu_tracker SET data = $1, lastUpdated = $2 WHERE memberId = $3",
                )
                .bind(SqlValue::Json(blob))
                .bind(now.unix_timestamp())
                .bind(tracker.member_id),
                "menu_tracker",
            )
            .await?;
        tracker.last_updated = now;
        Ok(())
    }
}

fn encode_data(data: &MenuData) -> MenuResult<String> {
    serde_json::to_string(data)
        .map_err(|e| DomainError::decode(format!("menu data: {e}")).into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use palaver_storage::{
        CacheProvider, DatabaseProvider, MemoryCacheProvider, MemoryDatabase,
    };

    async fn service() -> (MenuService, Arc<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::new());
        db.connect().await.unwrap();
        db.seed("menu_tracker", Vec::new()).await;

        let cache = Arc::new(MemoryCacheProvider::new(
            db.clone(),
            vec!["menu_tracker".to_string()],
        ));
        cache.build().await.unwrap();

        (MenuService::new(Backend::new(db.clone(), cache)), db)
    }

    #[tokio::test]
    async fn test_first_access_creates_default_tracker() {
        let (service, db) = service().await;

        let tracker = service.get_menu_settings(7).await.unwrap();
        assert_eq!(tracker.member_id, 7);
        assert_eq!(tracker.data, default_menu());

        let rows = db.snapshot("menu_tracker").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64("memberId").unwrap(), 7);
    }

    #[tokio::test]
    async fn test_repeated_access_is_idempotent() {
        let (service, db) = service().await;

        let first = service.get_menu_settings(7).await.unwrap();
        let second = service.get_menu_settings(7).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.snapshot("menu_tracker").await.len(), 1);
    }

    #[tokio::test]
    async fn test_category_toggle_persists() {
        let (service, _db) = service().await;

        let tracker = service
            .update_category_toggle(7, "general", true)
            .await
            .unwrap();
        assert!(tracker.data.categories[0].expanded);

        // A fresh read sees the toggled state.
        let reloaded = service.get_menu_settings(7).await.unwrap();
        assert!(reloaded.data.categories[0].expanded);
        assert!(!reloaded.data.categories[1].expanded);
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_no_op() {
        let (service, _db) = service().await;

        let before = service.get_menu_settings(7).await.unwrap();
        let after = service
            .update_category_toggle(7, "nonsense", true)
            .await
            .unwrap();
        assert_eq!(before.data, after.data);
        assert_eq!(before.last_updated, after.last_updated);
    }

    #[tokio::test]
    async fn test_selecting_item_clears_previous_selection() {
        let (service, _db) = service().await;

        let tracker = service
            .update_selected_item(7, "general", "dashboard")
            .await
            .unwrap();
        assert_eq!(tracker.data.selected_count(), 1);

        let tracker = service
            .update_selected_item(7, "forum-management", "topics")
            .await
            .unwrap();
        assert_eq!(tracker.data.selected_count(), 1);
        let selected: Vec<_> = tracker
            .data
            .categories
            .iter()
            .flat_map(|c| c.items.iter())
            .filter(|i| i.selected)
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(selected, vec!["topics"]);
    }

    #[tokio::test]
    async fn test_reselecting_same_item_keeps_single_selection() {
        let (service, _db) = service().await;

        service
            .update_selected_item(7, "general", "calendar")
            .await
            .unwrap();
        let tracker = service
            .update_selected_item(7, "general", "calendar")
            .await
            .unwrap();
        assert_eq!(tracker.data.selected_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_item_leaves_selection_alone() {
        let (service, _db) = service().await;

        service
            .update_selected_item(7, "general", "members")
            .await
            .unwrap();
        let mut tracker = service
            .update_selected_item(7, "general", "missing")
            .await
            .unwrap();
        assert_eq!(tracker.data.selected_count(), 1);
        assert!(tracker.data.item_mut("general", "members").unwrap().selected);
    }

    #[tokio::test]
    async fn test_trackers_are_per_member() {
        let (service, db) = service().await;

        service.update_category_toggle(7, "general", true).await.unwrap();
        let other = service.get_menu_settings(8).await.unwrap();
        assert!(!other.data.categories[0].expanded);
        assert_eq!(db.snapshot("menu_tracker").await.len(), 2);
    }

    #[test]
    fn test_unselect_helper_spares_only_named_item() {
        let mut data = default_menu();
        for category in &mut data.categories {
            for item in &mut category.items {
                item.selected = true;
            }
        }

        unselect_items_except(&mut data, "general", "dashboard");
        assert_eq!(data.selected_count(), 1);
        assert!(data.item_mut("general", "dashboard").unwrap().selected);
    }
}
