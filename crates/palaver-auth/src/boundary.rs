//! Cookie and session boundaries.
//!
//! The HTTP layer above the core owns the actual response; these traits are
//! the slice of it the auth subsystem needs. The in-memory implementations
//! back tests and embedded deployments.

use std::collections::HashMap;

pub use cookie::SameSite;
use time::Duration;

/// Attributes applied when setting a cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub path: String,
    pub domain: Option<String>,
    /// `None` makes a browser-session cookie.
    pub max_age: Option<Duration>,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            path: "/".to_string(),
            domain: None,
            max_age: None,
            same_site: SameSite::Lax,
        }
    }
}

/// The cookie jar of the current request/response pair.
pub trait CookieJar: Send {
    /// Sets (or replaces) a cookie.
    fn set(&mut self, name: &str, value: &str, options: &CookieOptions);

    /// Returns the current value of a cookie.
    fn get(&self, name: &str) -> Option<String>;

    /// Expires a cookie.
    fn delete(&mut self, name: &str);

    /// Whether the cookie is present.
    fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Per-request key/value store scoped to a browser session.
pub trait SessionStore: Send {
    /// The session identifier, which is also the `sessions` row id.
    fn id(&self) -> &str;

    /// Reads a session value.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a session value.
    fn set(&mut self, key: &str, value: &str);

    /// Removes a session value.
    fn remove(&mut self, key: &str);

    /// Destroys the underlying session and clears its cookie.
    ///
    /// # Errors
    ///
    /// Returns the underlying store failure; the caller treats it as fatal.
    fn destroy(&mut self) -> Result<(), String>;
}

/// In-memory cookie jar.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, (String, CookieOptions)>,
}

impl MemoryCookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The options a cookie was last set with.
    #[must_use]
    pub fn options(&self, name: &str) -> Option<&CookieOptions> {
        self.cookies.get(name).map(|(_, options)| options)
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&mut self, name: &str, value: &str, options: &CookieOptions) {
        self.cookies
            .insert(name.to_string(), (value.to_string(), options.clone()));
    }

    fn get(&self, name: &str) -> Option<String> {
        self.cookies.get(name).map(|(value, _)| value.clone())
    }

    fn delete(&mut self, name: &str) {
        self.cookies.remove(name);
    }
}

/// In-memory session store.
#[derive(Debug)]
pub struct MemorySessionStore {
    id: String,
    values: HashMap<String, String>,
    destroyed: bool,
    /// Makes `destroy` fail, for exercising the fatal sign-out path.
    pub fail_destroy: bool,
}

impl MemorySessionStore {
    /// Creates a store with the given session identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
            destroyed: false,
            fail_destroy: false,
        }
    }

    /// Whether `destroy` has run.
    #[must_use]
    pub fn destroyed(&self) -> bool {
        self.destroyed
    }
}

impl SessionStore for MemorySessionStore {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn destroy(&mut self) -> Result<(), String> {
        if self.fail_destroy {
            return Err("session store unavailable".to_string());
        }
        self.values.clear();
        self.destroyed = true;
        Ok(())
    }
}
