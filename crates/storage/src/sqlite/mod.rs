use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::debug;

use crate::repository::{KeyValueRepository, Storage};

mod migrate;
mod session_repo;

/// Session fields kept in a single `SQLite` table.
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error("could not open session database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("could not migrate session database: {0}")]
    Migrate(#[source] sqlx::Error),
}

impl SqliteRepository {
    /// Open a single-connection pool on `database_url`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError::Connect` for a malformed URL or an unreachable database.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(SqliteInitError::Connect)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        // One writer per device; a second connection would only contend for the lock.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(SqliteInitError::Connect)?;

        debug!(url = database_url, "opened session database");
        Ok(Self { pool })
    }

    /// Bring the schema up to date. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError::Migrate` if a migration statement fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool)
            .await
            .map_err(SqliteInitError::Migrate)
    }
}

impl Storage {
    /// Device storage backed by a migrated `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the database cannot be opened or migrated.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let session: Arc<dyn KeyValueRepository> = Arc::new(repo);
        Ok(Self { session })
    }
}
