//! PostgreSQL implementation of the database provider contract.

use async_trait::async_trait;
use palaver_storage::{
    DatabaseProvider, QueryOutput, QueryRequest, SqlValue, StorageError, StorageResult,
    WriteResult,
};
use sqlx_postgres::{PgPool, Postgres};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::PostgresConfig;
use crate::decode::row_to_raw;
use crate::pool;

/// PostgreSQL database provider.
///
/// Constructed once at boot; `connect` creates the process-wide pool.
pub struct PostgresProvider {
    config: PostgresConfig,
    pool: RwLock<Option<PgPool>>,
}

impl PostgresProvider {
    /// Creates an unconnected provider from configuration.
    #[must_use]
    pub fn new(config: PostgresConfig) -> Self {
        Self {
            config,
            pool: RwLock::new(None),
        }
    }

    async fn pool(&self) -> StorageResult<PgPool> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or(StorageError::NotConnected)
    }
}

#[async_trait]
impl DatabaseProvider for PostgresProvider {
    async fn connect(&self) -> StorageResult<()> {
        let pool = pool::create_pool(&self.config).await?;
        *self.pool.write().await = Some(pool);
        Ok(())
    }

    async fn query(&self, request: QueryRequest) -> StorageResult<QueryOutput> {
        let pool = self.pool().await?;

        let mut query = sqlx_core::query::query::<Postgres>(&request.query);
        for value in &request.values {
            query = match value {
                SqlValue::Null => query.bind(None::<String>),
                SqlValue::Boolean(b) => query.bind(*b),
                SqlValue::Integer(i) => query.bind(*i),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Text(s) | SqlValue::Json(s) => query.bind(s.clone()),
            };
        }

        if is_read(&request.query) {
            let rows = query.fetch_all(&pool).await.map_err(|e| {
                warn!(error = %e, sql = %request.query, "query failed");
                StorageError::query(e.to_string())
            })?;
            let rows = rows
                .iter()
                .map(row_to_raw)
                .collect::<StorageResult<Vec<_>>>()?;
            Ok(QueryOutput::Rows(rows))
        } else if has_returning(&request.query) {
            let rows = query.fetch_all(&pool).await.map_err(|e| {
                warn!(error = %e, sql = %request.query, "query failed");
                StorageError::query(e.to_string())
            })?;
            let insert_id = rows
                .first()
                .map(row_to_raw)
                .transpose()?
                .and_then(|row| row.get("id").and_then(serde_json::Value::as_i64));
            Ok(QueryOutput::Write(WriteResult {
                rows_affected: rows.len() as u64,
                insert_id,
            }))
        } else {
            let result = query.execute(&pool).await.map_err(|e| {
                warn!(error = %e, sql = %request.query, "query failed");
                StorageError::query(e.to_string())
            })?;
            debug!(sql = %request.query, rows = result.rows_affected(), "write executed");
            Ok(QueryOutput::Write(WriteResult {
                rows_affected: result.rows_affected(),
                insert_id: None,
            }))
        }
    }

    async fn disconnect(&self) -> StorageResult<()> {
        let pool = self
            .pool
            .write()
            .await
            .take()
            .ok_or(StorageError::NotConnected)?;
        pool.close().await;
        debug!("PostgreSQL pool closed");
        Ok(())
    }
}

fn is_read(sql: &str) -> bool {
    sql.trim_start()
        .split_whitespace()
        .next()
        .is_some_and(|word| word.eq_ignore_ascii_case("SELECT"))
}

fn has_returning(sql: &str) -> bool {
    sql.to_ascii_uppercase().contains(" RETURNING ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_classification() {
        assert!(is_read("SELECT * FROM members"));
        assert!(is_read("  select * from members"));
        assert!(!is_read("UPDATE members SET name = $1 WHERE id = $2"));
        assert!(has_returning(
            "INSERT INTO menu_tracker (memberId) VALUES ($1) RETURNING id"
        ));
        assert!(!has_returning("DELETE FROM sessions WHERE id = $1"));
    }

    #[tokio::test]
    async fn test_unconnected_provider_rejects_queries() {
        let provider = PostgresProvider::new(PostgresConfig::new("postgres://localhost/palaver"));
        let err = provider
            .query(QueryRequest::new("SELECT * FROM members"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotConnected));
        assert!(provider.disconnect().await.is_err());
    }
}
