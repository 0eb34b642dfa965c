//! # palaver-storage
//!
//! Storage abstraction layer for the Palaver board.
//!
//! This crate defines the two provider contracts every deployment is built
//! on:
//!
//! - [`DatabaseProvider`] — uniform parametrized query execution
//!   (connect / query / disconnect) across SQL engines.
//! - [`CacheProvider`] — an in-memory mirror of a fixed set of database
//!   tables. The cache is the system of record for all reads; every write
//!   goes to the database and is followed by a refresh of the touched table.
//!
//! It also ships the embedded [`MemoryDatabase`] engine (the baseline and
//! test engine), the [`MemoryCacheProvider`] and [`NoCacheProvider`]
//! implementations, the [`Backend`] pair that encodes the write-then-refresh
//! protocol, and [`KeyedMutex`] for per-member read-modify-write exclusion.
//!
//! ## Example
//!
//! ```ignore
//! use palaver_storage::{Backend, QueryRequest, SqlValue};
//!
//! async fn touch_last_online(backend: &Backend, member_id: i64, now: i64) -> palaver_storage::StorageResult<()> {
//!     let request = QueryRequest::new("UPDATE members SET lastOnline = $1 WHERE id = $2")
//!         .bind(SqlValue::Integer(now))
//!         .bind(SqlValue::Integer(member_id));
//!     backend.write_then_refresh(request, "members").await?;
//!     Ok(())
//! }
//! ```

mod backend;
mod cache;
mod database;
mod error;
mod memory;
mod sync;
mod types;

pub use backend::Backend;
pub use cache::{CacheProvider, DynCache, MemoryCacheProvider, NoCacheProvider};
pub use database::{DatabaseProvider, DynDatabase};
pub use error::StorageError;
pub use memory::MemoryDatabase;
pub use sync::KeyedMutex;
pub use types::{QueryOutput, QueryRequest, SqlValue, WriteResult};

pub use palaver_core::Row;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;
