//! Session row repository.

use palaver_core::{DomainResult, Row, entities::SessionRecord};
use palaver_storage::CacheProvider;
use serde_json::Value;

use crate::find_row;

/// Looks up the raw session row by session identifier.
#[must_use]
pub fn load_session_data_by_id(cache: &dyn CacheProvider, id: &str) -> Option<Row> {
    find_row(cache, "sessions", "id", &Value::from(id))
}

/// Builds a session record from its raw row, passing `None` through.
///
/// # Errors
///
/// Returns a decode error if the row has an unexpected shape.
pub fn build_session_from_data(data: Option<&Row>) -> DomainResult<Option<SessionRecord>> {
    data.map(SessionRecord::from_row).transpose()
}

/// Loads and builds a session record by identifier.
///
/// # Errors
///
/// Returns a decode error if the cached row has an unexpected shape.
pub fn get_session_by_id(
    cache: &dyn CacheProvider,
    id: &str,
) -> DomainResult<Option<SessionRecord>> {
    build_session_from_data(load_session_data_by_id(cache, id).as_ref())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use palaver_storage::{CacheProvider, DatabaseProvider, MemoryCacheProvider, MemoryDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn test_lookup() {
        let db = Arc::new(MemoryDatabase::new());
        db.connect().await.unwrap();
        db.seed(
            "sessions",
            vec![Row::from_value(json!({"id": "s-1", "memberId": null})).unwrap()],
        )
        .await;
        let cache = MemoryCacheProvider::new(db, vec!["sessions".to_string()]);
        cache.build().await.unwrap();

        let session = get_session_by_id(&cache, "s-1").unwrap().unwrap();
        assert_eq!(session.member_id, None);
        assert!(get_session_by_id(&cache, "s-2").unwrap().is_none());
    }
}
