//! The application context.

use std::sync::Arc;

use palaver_auth::AuthService;
use palaver_config::{AppConfig, CacheKind, ConfigError, DatabaseKind};
use palaver_db_postgres::{PostgresConfig, PostgresProvider};
use palaver_menu::MenuService;
use palaver_storage::{
    Backend, DynCache, DynDatabase, MemoryCacheProvider, MemoryDatabase, NoCacheProvider,
};
use tracing::info;

use crate::BootResult;
use crate::error::BootError;

/// Process-wide handles: configuration plus the connected backend.
///
/// Built once at startup and passed by reference into request-scoped code;
/// nothing in the system reaches for global state.
pub struct AppContext {
    pub config: AppConfig,
    pub backend: Backend,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Resolves providers from configuration, connects the database and
    /// builds the cache mirror.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported` for engine kinds without a shipped provider,
    /// a configuration error for a missing connection URL, and a storage
    /// error if connecting or the initial cache build fails.
    pub async fn boot(config: AppConfig) -> BootResult<Self> {
        let db = resolve_database(&config)?;
        db.connect().await?;
        info!(kind = ?config.database.kind, "database connected");

        let cache = resolve_cache(&config, &db);
        cache.build().await?;
        info!(
            kind = ?config.cache.kind,
            tables = config.cache.tables.len(),
            "cache built"
        );

        Ok(Self {
            backend: Backend::new(db, cache),
            config,
        })
    }

    /// An authentication service over this context's backend.
    #[must_use]
    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.backend.clone(), self.config.auth.clone())
    }

    /// A menu service over this context's backend.
    #[must_use]
    pub fn menu_service(&self) -> MenuService {
        MenuService::new(self.backend.clone())
    }

    /// Releases the database connection.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` if boot's connection is already gone.
    pub async fn shutdown(&self) -> BootResult<()> {
        self.backend.db.disconnect().await?;
        info!("database disconnected");
        Ok(())
    }
}

fn resolve_database(config: &AppConfig) -> BootResult<DynDatabase> {
    match config.database.kind {
        DatabaseKind::Memory => Ok(Arc::new(MemoryDatabase::new())),
        DatabaseKind::Postgres => {
            let url = config.database.url.clone().ok_or_else(|| {
                ConfigError::validation("database.url is required for the postgres engine")
            })?;
            let mut pg = PostgresConfig::new(url);
            pg.pool_size = config.database.pool_size;
            pg.connect_timeout_ms = config.database.connect_timeout_ms;
            Ok(Arc::new(PostgresProvider::new(pg)))
        }
        kind @ (DatabaseKind::Mysql | DatabaseKind::Sqlite | DatabaseKind::Mssql) => {
            Err(BootError::unsupported(kind))
        }
    }
}

fn resolve_cache(config: &AppConfig, db: &DynDatabase) -> DynCache {
    let tables = config.cache.tables.clone();
    match config.cache.kind {
        CacheKind::Memory => Arc::new(MemoryCacheProvider::new(db.clone(), tables)),
        CacheKind::None => Arc::new(NoCacheProvider::new(
            db.clone(),
            tables,
            config.cache.eager_fetch,
        )),
    }
}
