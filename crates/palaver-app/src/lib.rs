//! # palaver-app
//!
//! Boots the Palaver board core: resolves the configured database engine and
//! cache provider into concrete instances, connects, builds the cache mirror
//! and hands out services over the resulting backend.
//!
//! Provider resolution happens exactly once, at boot. A configured engine
//! without a shipped provider fails here, not at first query.

mod context;
mod error;

pub use context::AppContext;
pub use error::BootError;

/// Type alias for a boot result.
pub type BootResult<T> = Result<T, BootError>;
