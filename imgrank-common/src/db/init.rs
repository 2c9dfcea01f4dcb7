//! Database connection setup

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Open (creating the file if needed) the tally database
///
/// Only the connection is prepared here. Tables come from
/// [`crate::db::migrate`], so a freshly created file reports an
/// uninitialized store until that runs.
pub async fn open_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets leaderboard reads proceed while a ranking commits; the busy
    // timeout applies to every pooled connection
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Created new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Whether a table with the given name exists
pub(crate) async fn table_exists(pool: &SqlitePool, name: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type = 'table' AND name = ?
        )
        "#,
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_file_without_tables() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("ranking.db");

        let pool = open_database(&db_path).await.unwrap();
        assert!(db_path.exists(), "Database file was not created");
        assert!(!table_exists(&pool, "rankings").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_existing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ranking.db");

        let pool1 = open_database(&db_path).await.unwrap();
        drop(pool1);
        let pool2 = open_database(&db_path).await;
        assert!(pool2.is_ok(), "Failed to reopen database: {:?}", pool2.err());
    }
}
