//! Schema migrations for the tally store
//!
//! Migrations are versioned through the `schema_version` table and are safe
//! to run repeatedly. Serving traffic requires [`migrate`] to have run;
//! reads tolerate a missing schema, writes do not.

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::init::table_exists;

/// Name of the tally table
pub const RANKINGS_TABLE: &str = "rankings";

/// Current schema version
///
/// Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    if !table_exists(pool, "schema_version").await? {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Bring the schema up to date
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current_version = get_schema_version(pool).await?;

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    // The tally table is checked independently of the recorded version so a
    // table dropped by hand is recreated.
    if current_version < 1 || !table_exists(pool, RANKINGS_TABLE).await? {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed: rankings table ready");
    } else {
        info!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Migration v1: tally table
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rankings (
            image_filename TEXT PRIMARY KEY,
            points INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Drop all tally data and recreate an empty schema
pub async fn reset(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DROP TABLE IF EXISTS rankings")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS schema_version")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    warn!("Dropped existing tally data");
    migrate(pool).await
}

/// Whether the tally table exists
pub async fn tally_initialized(pool: &SqlitePool) -> Result<bool> {
    table_exists(pool, RANKINGS_TABLE).await
}
