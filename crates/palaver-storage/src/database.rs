//! The database provider contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{QueryOutput, QueryRequest, StorageResult};

/// Uniform query execution across SQL engines.
///
/// One provider instance exists per process, constructed at boot from the
/// configured engine kind and owned by the application context. All
/// implementations must be thread-safe (`Send + Sync`).
///
/// # Failure policy
///
/// Query failures propagate to the immediate caller and are never retried
/// here. A connection failure at boot is fatal: the process does not start.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Establishes the process-wide connection (or pool).
    ///
    /// # Errors
    ///
    /// Returns a connection error if the engine cannot be reached.
    async fn connect(&self) -> StorageResult<()>;

    /// Executes one parametrized statement.
    ///
    /// Reads return [`QueryOutput::Rows`]; mutations return
    /// [`QueryOutput::Write`] carrying the affected-row count and, where the
    /// engine reports one, the inserted identifier.
    ///
    /// # Errors
    ///
    /// Returns a query error on any driver failure, and `NotConnected` if
    /// `connect` has not succeeded.
    async fn query(&self, request: QueryRequest) -> StorageResult<QueryOutput>;

    /// Releases the connection.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if no connection is active.
    async fn disconnect(&self) -> StorageResult<()>;
}

/// Type alias for a shared database provider handle.
pub type DynDatabase = Arc<dyn DatabaseProvider>;
