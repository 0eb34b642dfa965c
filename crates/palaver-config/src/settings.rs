//! Application settings and provider kinds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result, tables::DEFAULT_CACHEABLE_TABLES};

/// The SQL engine a deployment runs on.
///
/// Resolved once at startup into a concrete provider; kinds without a
/// shipped provider fail construction there rather than at first query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
    /// Embedded in-memory engine; baseline and test deployments.
    Memory,
}

/// The cache provider a deployment runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// Full in-memory table mirror (the default).
    Memory,
    /// No caching: reads see empty snapshots.
    None,
}

/// Database section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub kind: DatabaseKind,
    /// Connection URL; required for every kind except `memory`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Memory,
            url: None,
            pool_size: default_pool_size(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Cache section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_kind")]
    pub kind: CacheKind,
    /// Whether the no-cache provider still performs (and discards) the
    /// full-table fetches on build/update, as observed upstream.
    #[serde(default = "default_true")]
    pub eager_fetch: bool,
    /// Tables to mirror; defaults to the deployment-wide list.
    #[serde(default = "default_tables")]
    pub tables: Vec<String>,
}

fn default_cache_kind() -> CacheKind {
    CacheKind::Memory
}

fn default_true() -> bool {
    true
}

fn default_tables() -> Vec<String> {
    DEFAULT_CACHEABLE_TABLES
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            kind: default_cache_kind(),
            eager_fetch: true,
            tables: default_tables(),
        }
    }
}

/// Account lockout policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutSettings {
    /// Globally disables the lockout state machine when false.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Minutes until a lockout expires; `None` makes lockouts permanent.
    #[serde(default)]
    pub expiration_minutes: Option<u64>,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for LockoutSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: default_max_attempts(),
            expiration_minutes: None,
        }
    }
}

/// Cookie attributes for the auth-token and device-identifier cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieSettings {
    #[serde(default = "default_auth_cookie")]
    pub auth_name: String,
    #[serde(default = "default_device_cookie")]
    pub device_name: String,
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub domain: Option<String>,
}

fn default_auth_cookie() -> String {
    "palaver_token".to_string()
}

fn default_device_cookie() -> String {
    "palaver_device".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            auth_name: default_auth_cookie(),
            device_name: default_device_cookie(),
            secure: true,
            path: default_path(),
            domain: None,
        }
    }
}

/// Session durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Auth-cookie lifetime for a default sign-in, in seconds.
    #[serde(default = "default_session_secs")]
    pub duration_secs: i64,
    /// Auth-cookie lifetime with "remember me", in seconds.
    #[serde(default = "default_remember_secs")]
    pub remember_me_secs: i64,
}

fn default_session_secs() -> i64 {
    60 * 60 * 4
}

fn default_remember_secs() -> i64 {
    60 * 60 * 24 * 30
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_session_secs(),
            remember_me_secs: default_remember_secs(),
        }
    }
}

/// Authentication section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub lockout: LockoutSettings,
    #[serde(default)]
    pub cookies: CookieSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

impl AppConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed TOML and a validation error for
    /// inconsistent settings.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be read, plus the errors of
    /// [`AppConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.database.kind != DatabaseKind::Memory && self.database.url.is_none() {
            return Err(ConfigError::validation(
                "database.url is required for non-memory engines",
            ));
        }
        if self.auth.lockout.max_attempts == 0 {
            return Err(ConfigError::validation(
                "auth.lockout.max_attempts must be at least 1",
            ));
        }
        if self.cache.tables.is_empty() {
            return Err(ConfigError::validation(
                "cache.tables must name at least one table",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.database.kind, DatabaseKind::Memory);
        assert_eq!(config.cache.kind, CacheKind::Memory);
        assert!(config.auth.lockout.enabled);
        assert_eq!(config.auth.lockout.max_attempts, 3);
        assert_eq!(config.cache.tables.len(), DEFAULT_CACHEABLE_TABLES.len());
    }

    #[test]
    fn test_parses_full_document() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            kind = "postgres"
            url = "postgres://localhost/palaver"
            pool_size = 4

            [cache]
            kind = "none"
            eager_fetch = false
            tables = ["members", "sessions"]

            [auth.lockout]
            enabled = true
            max_attempts = 5
            expiration_minutes = 15
            "#,
        )
        .unwrap();
        assert_eq!(config.database.kind, DatabaseKind::Postgres);
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.cache.kind, CacheKind::None);
        assert!(!config.cache.eager_fetch);
        assert_eq!(config.auth.lockout.expiration_minutes, Some(15));
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let err = AppConfig::from_toml_str("[database]\nkind = \"postgres\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let err = AppConfig::from_toml_str("[database]\nkind = \"dbase\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_max_attempts_rejected() {
        let err =
            AppConfig::from_toml_str("[auth.lockout]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
