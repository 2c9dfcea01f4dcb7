//! Ranking commits and leaderboard reads

use crate::scoring::score_submission;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use super::migrations::tally_initialized;

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TallyEntry {
    pub filename: String,
    pub points: i64,
}

/// Apply a best-first ranking and return the updated leaderboard
///
/// Every award in the submission is committed in a single transaction, so
/// concurrent submissions touching the same image cannot lose updates.
pub async fn apply_ranking(pool: &SqlitePool, ranked: &[String]) -> Result<Vec<TallyEntry>> {
    let awards = score_submission(ranked)?;

    if !tally_initialized(pool).await? {
        return Err(Error::NotInitialized(
            "rankings table missing, run init-db first".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;
    for &(filename, points) in &awards {
        sqlx::query("INSERT OR IGNORE INTO rankings (image_filename, points) VALUES (?, 0)")
            .bind(filename)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE rankings SET points = points + ? WHERE image_filename = ?")
            .bind(points)
            .bind(filename)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    debug!(images = awards.len(), "Committed ranking");

    read_leaderboard(pool).await
}

/// Read all tally rows, highest points first
///
/// A store that has not been migrated yet reads as empty. Ties keep the
/// order in which images first entered the tally.
pub async fn read_leaderboard(pool: &SqlitePool) -> Result<Vec<TallyEntry>> {
    if !tally_initialized(pool).await? {
        return Ok(Vec::new());
    }

    let entries = sqlx::query_as::<_, TallyEntry>(
        r#"
        SELECT image_filename AS filename, points
        FROM rankings
        ORDER BY points DESC, rowid ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrate, open_database};

    async fn migrated_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_database(&dir.path().join("ranking.db")).await.unwrap();
        migrate(&pool).await.unwrap();
        (dir, pool)
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn entry(filename: &str, points: i64) -> TallyEntry {
        TallyEntry {
            filename: filename.to_string(),
            points,
        }
    }

    #[tokio::test]
    async fn test_first_ranking_on_empty_store() {
        let (_dir, pool) = migrated_pool().await;

        let board = apply_ranking(&pool, &names(&["a.png", "b.png", "c.png"]))
            .await
            .unwrap();

        assert_eq!(
            board,
            vec![entry("a.png", 5), entry("b.png", 4), entry("c.png", 3)]
        );
    }

    #[tokio::test]
    async fn test_repeat_single_ranking_accumulates() {
        let (_dir, pool) = migrated_pool().await;

        apply_ranking(&pool, &names(&["a.png"])).await.unwrap();
        let board = apply_ranking(&pool, &names(&["a.png"])).await.unwrap();

        assert_eq!(board, vec![entry("a.png", 10)]);
    }

    #[tokio::test]
    async fn test_non_submitted_images_unchanged() {
        let (_dir, pool) = migrated_pool().await;

        apply_ranking(&pool, &names(&["a.png", "b.png", "c.png", "d.png", "e.png"]))
            .await
            .unwrap();
        let board = apply_ranking(&pool, &names(&["e.png", "d.png"])).await.unwrap();

        let points = |name: &str| board.iter().find(|e| e.filename == name).unwrap().points;
        assert_eq!(points("a.png"), 5);
        assert_eq!(points("b.png"), 4);
        assert_eq!(points("c.png"), 3);
        assert_eq!(points("d.png"), 2 + 4);
        assert_eq!(points("e.png"), 1 + 5);
    }

    #[tokio::test]
    async fn test_leaderboard_sorted_descending() {
        let (_dir, pool) = migrated_pool().await;

        apply_ranking(&pool, &names(&["c.png", "b.png", "a.png"])).await.unwrap();
        apply_ranking(&pool, &names(&["a.png", "d.png"])).await.unwrap();
        apply_ranking(&pool, &names(&["d.png", "a.png", "e.png"])).await.unwrap();

        let board = read_leaderboard(&pool).await.unwrap();
        assert_eq!(board.len(), 5);
        for pair in board.windows(2) {
            assert!(
                pair[0].points >= pair[1].points,
                "Leaderboard not sorted: {:?}",
                board
            );
        }
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let (_dir, pool) = migrated_pool().await;

        apply_ranking(&pool, &names(&["z.png"])).await.unwrap();
        apply_ranking(&pool, &names(&["a.png"])).await.unwrap();

        let board = read_leaderboard(&pool).await.unwrap();
        assert_eq!(board, vec![entry("z.png", 5), entry("a.png", 5)]);
    }

    #[tokio::test]
    async fn test_leaderboard_empty_before_migration() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_database(&dir.path().join("ranking.db")).await.unwrap();

        assert!(read_leaderboard(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ranking_requires_migration() {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_database(&dir.path().join("ranking.db")).await.unwrap();

        let result = apply_ranking(&pool, &names(&["a.png"])).await;
        assert!(matches!(result, Err(Error::NotInitialized(_))));
    }

    #[tokio::test]
    async fn test_invalid_submission_writes_nothing() {
        let (_dir, pool) = migrated_pool().await;

        let result = apply_ranking(&pool, &names(&["a.png", "a.png"])).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result =
            apply_ranking(&pool, &names(&["a", "b", "c", "d", "e", "f"])).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        assert!(read_leaderboard(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_rankings_do_not_lose_updates() {
        let (_dir, pool) = migrated_pool().await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let ranked = names(&["shared.png"]);
            handles.push(tokio::spawn(async move {
                apply_ranking(&pool, &ranked).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let board = read_leaderboard(&pool).await.unwrap();
        assert_eq!(board, vec![entry("shared.png", 40)]);
    }

    #[test]
    fn test_entry_json_shape() {
        let value = serde_json::to_value(entry("a.png", 5)).unwrap();
        assert_eq!(value, serde_json::json!({"filename": "a.png", "points": 5}));
    }
}
