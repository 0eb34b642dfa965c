//! The database/cache pair every service writes through.

use crate::{DynCache, DynDatabase, QueryRequest, StorageResult, WriteResult};

/// Shared handles to the process's database and cache providers.
///
/// Owned by the application context and passed by reference into
/// request-scoped code. The one mutation protocol the whole system uses
/// lives here: write to the database, then refresh the touched table's
/// mirror. Within one call the refresh never begins before the write's
/// result is observed.
#[derive(Clone)]
pub struct Backend {
    pub db: DynDatabase,
    pub cache: DynCache,
}

impl Backend {
    /// Creates a backend from provider handles.
    #[must_use]
    pub fn new(db: DynDatabase, cache: DynCache) -> Self {
        Self { db, cache }
    }

    /// Executes a mutation and refreshes the mirror of the touched table.
    ///
    /// # Errors
    ///
    /// Propagates the write failure without refreshing, or the refresh
    /// failure after a successful write.
    pub async fn write_then_refresh(
        &self,
        request: QueryRequest,
        table: &str,
    ) -> StorageResult<WriteResult> {
        let result = self.db.query(request).await?.into_write()?;
        self.cache.update(table).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{CacheProvider, DatabaseProvider, MemoryCacheProvider, MemoryDatabase, SqlValue};
    use palaver_core::Row;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_then_refresh_sequences_mirror_update() {
        let db = Arc::new(MemoryDatabase::new());
        db.connect().await.unwrap();
        db.seed(
            "members",
            vec![Row::from_value(json!({"id": 1, "totalPosts": 2})).unwrap()],
        )
        .await;

        let cache = Arc::new(MemoryCacheProvider::new(
            db.clone(),
            vec!["members".to_string()],
        ));
        cache.build().await.unwrap();

        let backend = Backend::new(db, cache.clone());
        let result = backend
            .write_then_refresh(
                QueryRequest::new("UPDATE members SET totalPosts = $1 WHERE id = $2")
                    .bind(SqlValue::Integer(3))
                    .bind(SqlValue::Integer(1)),
                "members",
            )
            .await
            .unwrap();

        assert_eq!(result.rows_affected, 1);
        let mirrored = cache.get("members");
        assert_eq!(mirrored[0].get_i64("totalPosts").unwrap(), 3);
    }
}
