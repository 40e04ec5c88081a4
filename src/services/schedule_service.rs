use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::schedule::{Schedule, ScheduleDraft};

#[derive(Clone)]
pub struct ScheduleService {
    pool: SqlitePool,
}

impl ScheduleService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, draft: &ScheduleDraft, now: DateTime<Utc>) -> Result<Schedule> {
        let id = sqlx::query(
            r#"INSERT INTO schedules (title, start_date, end_date, note, include_weekends, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&draft.title)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.note)
        .bind(draft.include_weekends)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        tracing::info!(schedule_id = id, title = %draft.title, "schedule created");
        let row = self.find(id).await?.ok_or(sqlx::Error::RowNotFound)?;
        Ok(row)
    }

    pub async fn find(&self, id: i64) -> Result<Option<Schedule>> {
        let row = sqlx::query_as::<_, Schedule>(r#"SELECT * FROM schedules WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Returns false when no entry has this id.
    pub async fn update(&self, id: i64, draft: &ScheduleDraft) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE schedules
               SET title = ?, start_date = ?, end_date = ?, note = ?, include_weekends = ?
               WHERE id = ?"#,
        )
        .bind(&draft.title)
        .bind(draft.start_date)
        .bind(draft.end_date)
        .bind(&draft.note)
        .bind(draft.include_weekends)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM schedules WHERE id = ?"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest start date first, as shown on the admin page.
    pub async fn list_all(&self) -> Result<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, Schedule>(
            r#"SELECT * FROM schedules ORDER BY start_date DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Entries overlapping `[start, end]`, earliest first.
    pub async fn list_overlapping(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, Schedule>(
            r#"SELECT * FROM schedules
               WHERE NOT (end_date < ? OR start_date > ?)
               ORDER BY start_date ASC, id ASC"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_chronological(&self) -> Result<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, Schedule>(
            r#"SELECT * FROM schedules ORDER BY start_date ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
