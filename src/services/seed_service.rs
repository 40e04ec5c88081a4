use std::path::Path;

use anyhow::Context as _;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::concept_video::NewConceptVideo;
use crate::models::question::NewQuestion;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub questions: usize,
    pub videos: usize,
}

#[derive(Clone)]
pub struct SeedService {
    pool: SqlitePool,
}

impl SeedService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads both seed files, writing each table only while it is still empty.
    pub async fn seed_from_files(&self, questions_path: &Path, videos_path: &Path) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        if self.count("questions").await? == 0 {
            let questions: Vec<NewQuestion> = read_json(questions_path).await?;
            report.questions = self.insert_questions(&questions).await?;
        } else {
            tracing::info!("questions already seeded, skipping");
        }

        if self.count("concept_videos").await? == 0 {
            let videos: Vec<NewConceptVideo> = read_json(videos_path).await?;
            report.videos = self.insert_videos(&videos).await?;
        } else {
            tracing::info!("concept videos already seeded, skipping");
        }

        Ok(report)
    }

    pub async fn insert_questions(&self, questions: &[NewQuestion]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for q in questions {
            sqlx::query(
                r#"INSERT INTO questions
                   (topic, question, choice_a, choice_b, choice_c, choice_d, correct, concept_tag, difficulty)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&q.topic)
            .bind(&q.question)
            .bind(&q.choice_a)
            .bind(&q.choice_b)
            .bind(&q.choice_c)
            .bind(&q.choice_d)
            .bind(&q.correct)
            .bind(&q.concept_tag)
            .bind(&q.difficulty)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(questions.len())
    }

    pub async fn insert_videos(&self, videos: &[NewConceptVideo]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for v in videos {
            sqlx::query(r#"INSERT INTO concept_videos (concept_tag, youtube_url) VALUES (?, ?)"#)
                .bind(&v.concept_tag)
                .bind(&v.youtube_url)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(videos.len())
    }

    async fn count(&self, table: &'static str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(n)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading seed file {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}
