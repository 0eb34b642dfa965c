//! The cache provider contract and its implementations.
//!
//! The cache mirrors a fixed, deployment-wide list of tables and serves as
//! the system of record for all reads. Every write the application performs
//! goes to the database first and is followed by `update(table)` on the
//! touched table, so the mirror is eventually consistent with this process's
//! own writes (writes from other processes are not observed until the next
//! refresh).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use palaver_core::Row;
use tracing::{debug, info, warn};

use crate::{DynDatabase, QueryRequest, StorageResult};

/// In-memory mirror of a fixed set of database tables.
///
/// `get` is synchronous and infallible: unknown tables yield an empty
/// snapshot. `build` and `update` suspend on the underlying full-table
/// SELECT and propagate its failure.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Populates the mirror for every cacheable table.
    ///
    /// # Errors
    ///
    /// Propagates the first table-load failure; the application cannot serve
    /// requests with a missing table.
    async fn build(&self) -> StorageResult<()>;

    /// Re-fetches exactly one table and replaces its snapshot atomically
    /// from the reader's perspective.
    ///
    /// # Errors
    ///
    /// Propagates the underlying query failure.
    async fn update(&self, table: &str) -> StorageResult<()>;

    /// Sequentially refreshes several tables.
    ///
    /// # Errors
    ///
    /// Propagates the first refresh failure.
    async fn update_all(&self, tables: &[String]) -> StorageResult<()> {
        for table in tables {
            self.update(table).await?;
        }
        Ok(())
    }

    /// Returns the current snapshot for `table`, or an empty snapshot for
    /// unknown tables. Never fails.
    fn get(&self, table: &str) -> Arc<Vec<Row>>;

    /// Resolves a mapping of logical key to table name into a mapping of
    /// logical key to snapshot.
    fn get_all(&self, tables: &HashMap<String, String>) -> HashMap<String, Arc<Vec<Row>>> {
        tables
            .iter()
            .map(|(key, table)| (key.clone(), self.get(table)))
            .collect()
    }
}

/// Type alias for a shared cache provider handle.
pub type DynCache = Arc<dyn CacheProvider>;

/// The standard full-mirror cache.
///
/// Snapshots are `Arc<Vec<Row>>` values in a [`DashMap`]; a refresh installs
/// a new `Arc` in one map insert, so readers holding the previous snapshot
/// never observe a partially replaced collection.
pub struct MemoryCacheProvider {
    db: DynDatabase,
    tables: Vec<String>,
    mirror: DashMap<String, Arc<Vec<Row>>>,
}

impl MemoryCacheProvider {
    /// Creates a provider mirroring `tables` through `db`.
    #[must_use]
    pub fn new(db: DynDatabase, tables: Vec<String>) -> Self {
        Self {
            db,
            tables,
            mirror: DashMap::new(),
        }
    }

    async fn fetch(&self, table: &str) -> StorageResult<Vec<Row>> {
        let request = QueryRequest::select_all(table)?;
        self.db.query(request).await?.into_rows()
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn build(&self) -> StorageResult<()> {
        for table in &self.tables {
            let rows = self.fetch(table).await?;
            debug!(table = %table, rows = rows.len(), "cached table");
            self.mirror.insert(table.clone(), Arc::new(rows));
        }
        info!(tables = self.tables.len(), "cache mirror built");
        Ok(())
    }

    async fn update(&self, table: &str) -> StorageResult<()> {
        let rows = self.fetch(table).await?;
        if rows.is_empty() {
            // Ambiguous between an empty table and a query problem; the
            // refreshed snapshot is installed either way.
            warn!(table = %table, "cache refresh returned zero rows");
        }
        self.mirror.insert(table.to_string(), Arc::new(rows));
        Ok(())
    }

    fn get(&self, table: &str) -> Arc<Vec<Row>> {
        self.mirror
            .get(table)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_default()
    }
}

/// Cache provider that caches nothing.
///
/// `get` always returns an empty snapshot. As observed upstream, `build` and
/// `update` still issue the full-table fetches and discard the result; set
/// `eager_fetch` to `false` to skip them.
pub struct NoCacheProvider {
    db: DynDatabase,
    tables: Vec<String>,
    eager_fetch: bool,
}

impl NoCacheProvider {
    /// Creates a no-op provider over `tables`.
    #[must_use]
    pub fn new(db: DynDatabase, tables: Vec<String>, eager_fetch: bool) -> Self {
        Self {
            db,
            tables,
            eager_fetch,
        }
    }
}

#[async_trait]
impl CacheProvider for NoCacheProvider {
    async fn build(&self) -> StorageResult<()> {
        if !self.eager_fetch {
            return Ok(());
        }
        for table in &self.tables {
            let request = QueryRequest::select_all(table)?;
            let _ = self.db.query(request).await?.into_rows()?;
        }
        Ok(())
    }

    async fn update(&self, table: &str) -> StorageResult<()> {
        if !self.eager_fetch {
            return Ok(());
        }
        let request = QueryRequest::select_all(table)?;
        let _ = self.db.query(request).await?.into_rows()?;
        Ok(())
    }

    fn get(&self, _table: &str) -> Arc<Vec<Row>> {
        Arc::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DatabaseProvider, MemoryDatabase};
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        Row::from_value(value).unwrap()
    }

    async fn seeded_db() -> Arc<MemoryDatabase> {
        let db = Arc::new(MemoryDatabase::new());
        db.connect().await.unwrap();
        db.seed(
            "members",
            vec![
                row(json!({"id": 1, "name": "ada"})),
                row(json!({"id": 2, "name": "brin"})),
            ],
        )
        .await;
        db.seed("sessions", vec![row(json!({"id": "s1", "memberId": 1}))])
            .await;
        db
    }

    fn table_list() -> Vec<String> {
        vec!["members".to_string(), "sessions".to_string()]
    }

    #[tokio::test]
    async fn test_get_is_empty_before_build() {
        let cache = MemoryCacheProvider::new(seeded_db().await, table_list());
        assert!(cache.get("members").is_empty());
    }

    #[tokio::test]
    async fn test_build_mirrors_all_tables() {
        let cache = MemoryCacheProvider::new(seeded_db().await, table_list());
        cache.build().await.unwrap();
        assert_eq!(cache.get("members").len(), 2);
        assert_eq!(cache.get("sessions").len(), 1);
    }

    #[tokio::test]
    async fn test_update_reflects_database_exactly() {
        let db = seeded_db().await;
        let cache = MemoryCacheProvider::new(db.clone(), table_list());
        cache.build().await.unwrap();

        db.seed(
            "members",
            vec![
                row(json!({"id": 1, "name": "ada"})),
                row(json!({"id": 2, "name": "brin"})),
                row(json!({"id": 3, "name": "cleo"})),
            ],
        )
        .await;

        // Mirror is stale until refreshed.
        assert_eq!(cache.get("members").len(), 2);
        cache.update("members").await.unwrap();
        let mirrored = cache.get("members");
        assert_eq!(*mirrored, db.snapshot("members").await);
    }

    #[tokio::test]
    async fn test_readers_keep_old_snapshot_across_refresh() {
        let db = seeded_db().await;
        let cache = MemoryCacheProvider::new(db.clone(), table_list());
        cache.build().await.unwrap();

        let held = cache.get("members");
        db.seed("members", Vec::new()).await;
        cache.update("members").await.unwrap();

        assert_eq!(held.len(), 2);
        assert!(cache.get("members").is_empty());
    }

    #[tokio::test]
    async fn test_zero_row_refresh_installs_empty_snapshot() {
        let db = seeded_db().await;
        let cache = MemoryCacheProvider::new(db.clone(), table_list());
        cache.build().await.unwrap();

        db.seed("members", Vec::new()).await;
        cache.update("members").await.unwrap();
        assert!(cache.get("members").is_empty());
    }

    #[tokio::test]
    async fn test_update_all_refreshes_in_sequence() {
        let db = seeded_db().await;
        let cache = MemoryCacheProvider::new(db.clone(), table_list());
        cache.build().await.unwrap();

        db.seed("members", vec![row(json!({"id": 9, "name": "zed"}))])
            .await;
        db.seed("sessions", Vec::new()).await;
        cache.update_all(&table_list()).await.unwrap();

        assert_eq!(cache.get("members").len(), 1);
        assert!(cache.get("sessions").is_empty());
    }

    #[tokio::test]
    async fn test_get_all_maps_logical_keys() {
        let cache = MemoryCacheProvider::new(seeded_db().await, table_list());
        cache.build().await.unwrap();

        let mut wanted = HashMap::new();
        wanted.insert("people".to_string(), "members".to_string());
        wanted.insert("live".to_string(), "sessions".to_string());

        let resolved = cache.get_all(&wanted);
        assert_eq!(resolved["people"].len(), 2);
        assert_eq!(resolved["live"].len(), 1);
    }

    #[tokio::test]
    async fn test_no_cache_provider_never_serves_rows() {
        let cache = NoCacheProvider::new(seeded_db().await, table_list(), true);
        cache.build().await.unwrap();
        cache.update("members").await.unwrap();
        assert!(cache.get("members").is_empty());
    }

    #[tokio::test]
    async fn test_no_cache_provider_lazy_mode_skips_fetches() {
        let db = Arc::new(MemoryDatabase::new());
        // Never connected: an eager fetch would fail, lazy mode must not.
        let cache = NoCacheProvider::new(db.clone(), table_list(), false);
        cache.build().await.unwrap();
        cache.update("members").await.unwrap();

        let eager = NoCacheProvider::new(db, table_list(), true);
        assert!(eager.build().await.is_err());
    }
}
