use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::leaderboard::LeaderboardEntry;

pub const BOARD_LIMIT: i64 = 20;
pub const LANDING_LIMIT: i64 = 10;

/// Outcome of submitting a finished attempt to the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardUpdate {
    Inserted,
    Improved,
    Unchanged,
}

impl LeaderboardUpdate {
    pub fn changed(self) -> bool {
        !matches!(self, LeaderboardUpdate::Unchanged)
    }
}

#[derive(Clone)]
pub struct LeaderboardService {
    pool: SqlitePool,
}

impl LeaderboardService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, nickname: &str) -> Result<Option<LeaderboardEntry>> {
        let entry = sqlx::query_as::<_, LeaderboardEntry>(
            r#"SELECT id, nickname, best_score, best_duration_seconds, difficulty, updated_at
               FROM hall_of_fame WHERE nickname = ?"#,
        )
        .bind(nickname)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    /// Inserts a first entry for `nickname`, or overwrites the stored one only
    /// when `score` is strictly higher. Equal scores keep the earlier entry.
    pub async fn record(
        &self,
        nickname: &str,
        score: i64,
        duration_seconds: i64,
        difficulty: &str,
        now: DateTime<Utc>,
    ) -> Result<LeaderboardUpdate> {
        let existing: Option<i64> =
            sqlx::query_scalar(r#"SELECT best_score FROM hall_of_fame WHERE nickname = ?"#)
                .bind(nickname)
                .fetch_optional(&self.pool)
                .await?;

        let outcome = match existing {
            None => {
                // A concurrent first entry for the same nickname wins; this
                // one is dropped like any non-improving score.
                let inserted = sqlx::query(
                    r#"INSERT INTO hall_of_fame
                       (nickname, best_score, best_duration_seconds, updated_at, difficulty)
                       VALUES (?, ?, ?, ?, ?)
                       ON CONFLICT(nickname) DO NOTHING"#,
                )
                .bind(nickname)
                .bind(score)
                .bind(duration_seconds)
                .bind(now)
                .bind(difficulty)
                .execute(&self.pool)
                .await?;
                if inserted.rows_affected() == 1 {
                    LeaderboardUpdate::Inserted
                } else {
                    LeaderboardUpdate::Unchanged
                }
            }
            Some(best) if score > best => {
                sqlx::query(
                    r#"UPDATE hall_of_fame
                       SET best_score = ?, best_duration_seconds = ?, updated_at = ?, difficulty = ?
                       WHERE nickname = ?"#,
                )
                .bind(score)
                .bind(duration_seconds)
                .bind(now)
                .bind(difficulty)
                .bind(nickname)
                .execute(&self.pool)
                .await?;
                LeaderboardUpdate::Improved
            }
            Some(_) => LeaderboardUpdate::Unchanged,
        };

        tracing::debug!(nickname, score, ?outcome, "leaderboard recorded");
        Ok(outcome)
    }

    pub async fn top_for_difficulty(
        &self,
        difficulty: &str,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"SELECT id, nickname, best_score, best_duration_seconds, difficulty, updated_at
               FROM hall_of_fame
               WHERE difficulty = ?
               ORDER BY best_score DESC, best_duration_seconds ASC, updated_at DESC
               LIMIT ?"#,
        )
        .bind(difficulty)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn top_overall(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<_, LeaderboardEntry>(
            r#"SELECT id, nickname, best_score, best_duration_seconds, difficulty, updated_at
               FROM hall_of_fame
               ORDER BY best_score DESC, updated_at ASC
               LIMIT ?"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
