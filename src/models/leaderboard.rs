use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaderboardEntry {
    pub id: i64,
    pub nickname: String,
    pub best_score: i64,
    pub best_duration_seconds: i64,
    pub difficulty: String,
    pub updated_at: DateTime<Utc>,
}
