use log::debug;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, SqliteConnection};
use std::path::{Path, PathBuf};
use thiserror::Error;

mod readings;
use self::readings::create_measurements_table;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("database path error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle on the sqlite file holding the readings.
///
/// It only remembers where the database lives. Every operation opens its own
/// connection and drops it before returning, so the sampler process and the
/// api process never share one; sqlite's file locking keeps them apart.
#[derive(Debug, Clone)]
pub struct SensorStore {
    db_path: PathBuf,
}

impl SensorStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        SensorStore {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn get_sql_connection(&self) -> Result<SqliteConnection, StorageError> {
        let conn = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .connect()
            .await?;

        Ok(conn)
    }

    /// Creates the readings table when it is missing. Safe to run on every start.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        // check if db folder exists
        if let Some(folder) = self.db_path.parent() {
            if !folder.as_os_str().is_empty() && !folder.exists() {
                tokio::fs::create_dir_all(folder).await?;
            }
        }

        let mut conn = self.get_sql_connection().await?;

        create_measurements_table(&mut conn).await?;

        debug!("schema ready in {}", self.db_path.display());

        Ok(())
    }
}
