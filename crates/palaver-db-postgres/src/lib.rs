//! # palaver-db-postgres
//!
//! PostgreSQL implementation of the [`palaver_storage::DatabaseProvider`]
//! contract, backed by a sqlx connection pool. Rows come back as raw JSON
//! objects (column name to value), which is the shape the cache mirror
//! stores and the repositories decode.

mod config;
mod decode;
mod pool;
mod provider;

pub use config::PostgresConfig;
pub use provider::PostgresProvider;
