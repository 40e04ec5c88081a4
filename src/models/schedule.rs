use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: i64,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub note: Option<String>,
    pub include_weekends: bool,
    pub created_at: DateTime<Utc>,
}

/// A validated schedule entry ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDraft {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub note: String,
    pub include_weekends: bool,
}
