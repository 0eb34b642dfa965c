//! # palaver-auth
//!
//! Authentication for the Palaver board: credential validation, the account
//! lockout state machine, sign-in completion (device record, bearer token,
//! cookies, session row) and sign-out teardown.
//!
//! Expected outcomes — wrong password, locked account — are data
//! ([`AuthOutcome`]), not errors. [`AuthError`] is reserved for the genuinely
//! exceptional: storage failures, decode failures, and a session that cannot
//! be destroyed on sign-out.
//!
//! Every lockout read-modify-write runs under a per-member async mutex, so
//! two concurrent sign-in attempts for the same account cannot lose an
//! attempt count.

mod boundary;
mod error;
mod outcome;
mod service;
mod token;

pub use boundary::{
    CookieJar, CookieOptions, MemoryCookieJar, MemorySessionStore, SessionStore,
};
pub use error::AuthError;
pub use outcome::{AuthOutcome, Denial, DenyReason};
pub use service::{AuthService, Redirect, SESSION_TOKEN_KEY};
pub use token::{hash_password, new_bearer_token, new_device_id, verify_password};

/// Type alias for an authentication result.
pub type AuthResult<T> = Result<T, AuthError>;
