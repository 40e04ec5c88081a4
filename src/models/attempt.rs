use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attempt {
    pub id: i64,
    pub user_id: i64,
    pub score: i64,
    /// Comma-joined weak concept tags, most missed first.
    pub weak_tags: String,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}

