//! # palaver-core
//!
//! Core domain types for the Palaver board.
//!
//! This crate defines the raw [`Row`] representation shared with the storage
//! layer, the typed entities built from cached rows, and the domain error
//! taxonomy. It contains no I/O: rows come in from the cache, entities go out
//! to callers, and every entity is rebuilt fresh on each call.

mod error;
mod row;

pub mod entities;

pub use error::DomainError;
pub use row::Row;

/// Type alias for a domain result.
pub type DomainResult<T> = Result<T, DomainError>;
