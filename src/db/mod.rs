mod error;
#[cfg(feature = "database-postgres")]
pub mod postgres;
pub mod repos;
#[cfg(feature = "database-sqlite")]
pub mod sqlite;


use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    user_content: Arc<dyn UserContentRepo>,
    boards: Arc<dyn BoardRepo>,
    file_info: Arc<dyn FileInfoRepo>,
    playbooks: Arc<dyn PlaybookRepo>,
    channels: Arc<dyn ChannelRepo>,
    job_locks: Arc<dyn JobLockRepo>,
}

enum PoolStorage {
    #[cfg(feature = "database-sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(feature = "database-postgres")]
    Postgres(sqlx::PgPool),
    #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
    _None(std::convert::Infallible),
}

/// Database pool supporting both SQLite and PostgreSQL.
///
/// Repositories are cached at construction time to avoid allocation on
/// each access.
pub struct DbPool {
    inner: PoolStorage,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    #[cfg(feature = "database-sqlite")]
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos {
            user_content: Arc::new(sqlite::SqliteUserContentRepo::new(pool.clone())),
            boards: Arc::new(sqlite::SqliteBoardRepo::new(pool.clone())),
            file_info: Arc::new(sqlite::SqliteFileInfoRepo::new(pool.clone())),
            playbooks: Arc::new(sqlite::SqlitePlaybookRepo::new(pool.clone())),
            channels: Arc::new(sqlite::SqliteChannelRepo::new(pool.clone())),
            job_locks: Arc::new(sqlite::SqliteJobLockRepo::new(pool.clone())),
        };
        DbPool {
            inner: PoolStorage::Sqlite(pool),
            repos,
        }
    }

    /// Create a DbPool from an existing PostgreSQL pool.
    /// Primarily useful for testing.
    #[cfg(feature = "database-postgres")]
    pub fn from_postgres(pool: sqlx::PgPool) -> Self {
        let repos = CachedRepos {
            user_content: Arc::new(postgres::PostgresUserContentRepo::new(pool.clone())),
            boards: Arc::new(postgres::PostgresBoardRepo::new(pool.clone())),
            file_info: Arc::new(postgres::PostgresFileInfoRepo::new(pool.clone())),
            playbooks: Arc::new(postgres::PostgresPlaybookRepo::new(pool.clone())),
            channels: Arc::new(postgres::PostgresChannelRepo::new(pool.clone())),
            job_locks: Arc::new(postgres::PostgresJobLockRepo::new(pool.clone())),
        };
        DbPool {
            inner: PoolStorage::Postgres(pool),
            repos,
        }
    }

    /// Create a database pool from configuration.
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        match config {
            DatabaseConfig::None => Err(DbError::NotConfigured),
            #[cfg(feature = "database-sqlite")]
            DatabaseConfig::Sqlite(cfg) => {
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(cfg.max_connections)
                    .connect_with(
                        sqlx::sqlite::SqliteConnectOptions::new()
                            .filename(&cfg.path)
                            .busy_timeout(std::time::Duration::from_millis(cfg.busy_timeout_ms)),
                    )
                    .await?;

                Ok(Self::from_sqlite(pool))
            }
            #[cfg(feature = "database-postgres")]
            DatabaseConfig::Postgres(cfg) => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .min_connections(cfg.min_connections)
                    .max_connections(cfg.max_connections)
                    .connect(&cfg.url)
                    .await?;

                Ok(Self::from_postgres(pool))
            }
        }
    }

    /// Get user content repository
    pub fn user_content(&self) -> Arc<dyn UserContentRepo> {
        Arc::clone(&self.repos.user_content)
    }

    /// Get board repository
    pub fn boards(&self) -> Arc<dyn BoardRepo> {
        Arc::clone(&self.repos.boards)
    }

    /// Get file info repository
    pub fn file_info(&self) -> Arc<dyn FileInfoRepo> {
        Arc::clone(&self.repos.file_info)
    }

    /// Get playbook repository
    pub fn playbooks(&self) -> Arc<dyn PlaybookRepo> {
        Arc::clone(&self.repos.playbooks)
    }

    /// Get channel repository
    pub fn channels(&self) -> Arc<dyn ChannelRepo> {
        Arc::clone(&self.repos.channels)
    }

    /// Get job lock repository
    pub fn job_locks(&self) -> Arc<dyn JobLockRepo> {
        Arc::clone(&self.repos.job_locks)
    }

    /// Health check for database connectivity
    pub async fn health_check(&self) -> DbResult<()> {
        match &self.inner {
            #[cfg(feature = "database-sqlite")]
            PoolStorage::Sqlite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(feature = "database-postgres")]
            PoolStorage::Postgres(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
                Ok(())
            }
            #[cfg(not(any(feature = "database-sqlite", feature = "database-postgres")))]
            PoolStorage::_None(infallible) => match *infallible {},
        }
    }
}
