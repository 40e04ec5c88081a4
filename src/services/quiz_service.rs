use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::SqlitePool;

use crate::dto::quiz_dto::{QuizResult, VideoLink, ALL_TOPICS};
use crate::error::Result;
use crate::models::attempt::Attempt;
use crate::models::concept_video::ConceptVideo;
use crate::models::question::Question;
use crate::models::user::User;
use crate::services::grading_service::{GradingService, DEFAULT_WEAK_TAG_LIMIT};
use crate::services::leaderboard_service::LeaderboardService;
use crate::services::session_store::{QuizSession, MAX_QUESTIONS};
use crate::utils::youtube::to_embed_url;

/// Shuffles `ids` uniformly and keeps at most `limit` of them.
pub fn sample_ids<R: Rng + ?Sized>(mut ids: Vec<i64>, limit: usize, rng: &mut R) -> Vec<i64> {
    ids.shuffle(rng);
    ids.truncate(limit);
    ids
}

#[derive(Clone)]
pub struct QuizService {
    pool: SqlitePool,
    leaderboard: LeaderboardService,
}

impl QuizService {
    pub fn new(pool: SqlitePool) -> Self {
        let leaderboard = LeaderboardService::new(pool.clone());
        Self { pool, leaderboard }
    }

    pub async fn list_topics(&self) -> Result<Vec<String>> {
        let topics = sqlx::query_scalar::<_, String>(
            r#"SELECT DISTINCT topic FROM questions ORDER BY topic"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(topics)
    }

    /// Returns the user id for `nickname` and whether it was already taken.
    ///
    /// Two first-time starts racing on one nickname share a single row.
    pub async fn find_or_create_user(
        &self,
        nickname: &str,
        now: DateTime<Utc>,
    ) -> Result<(i64, bool)> {
        let inserted = sqlx::query(
            r#"INSERT INTO users (nickname, created_at) VALUES (?, ?)
               ON CONFLICT(nickname) DO NOTHING"#,
        )
        .bind(nickname)
        .bind(now)
        .execute(&self.pool)
        .await?;
        if inserted.rows_affected() == 1 {
            let id = inserted.last_insert_rowid();
            tracing::info!(user_id = id, nickname, "registered new nickname");
            return Ok((id, false));
        }

        let user = self
            .find_user(nickname)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((user.id, true))
    }

    pub async fn find_user(&self, nickname: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE nickname = ?"#)
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn matching_question_ids(&self, topic: &str, difficulty: &str) -> Result<Vec<i64>> {
        let ids = if topic.is_empty() || topic == ALL_TOPICS {
            sqlx::query_scalar::<_, i64>(r#"SELECT id FROM questions WHERE difficulty = ?"#)
                .bind(difficulty)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_scalar::<_, i64>(
                r#"SELECT id FROM questions WHERE topic = ? AND difficulty = ?"#,
            )
            .bind(topic)
            .bind(difficulty)
            .fetch_all(&self.pool)
            .await?
        };
        Ok(ids)
    }

    /// Draws up to eight distinct question ids for the filter, in random order.
    pub async fn sample_question_ids(&self, topic: &str, difficulty: &str) -> Result<Vec<i64>> {
        let ids = self.matching_question_ids(topic, difficulty).await?;
        Ok(sample_ids(ids, MAX_QUESTIONS, &mut rand::thread_rng()))
    }

    pub async fn get_question(&self, id: i64) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(r#"SELECT * FROM questions WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(question)
    }

    /// Loads questions in the given order; ids that no longer exist map to `None`.
    pub async fn load_questions(&self, ids: &[i64]) -> Result<Vec<Option<Question>>> {
        let mut questions = Vec::with_capacity(ids.len());
        for id in ids {
            questions.push(self.get_question(*id).await?);
        }
        Ok(questions)
    }

    pub async fn record_attempt(
        &self,
        user_id: i64,
        score: i64,
        weak_tags: &[String],
        duration_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<Attempt> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"INSERT INTO attempts (user_id, score, weak_tags, duration_seconds, created_at)
               VALUES (?, ?, ?, ?, ?)
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(score)
        .bind(weak_tags.join(","))
        .bind(duration_seconds)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    /// First remedial video registered for each tag, in tag order.
    pub async fn videos_for_tags(&self, tags: &[String]) -> Result<Vec<VideoLink>> {
        let mut videos = Vec::new();
        for tag in tags {
            let video = sqlx::query_as::<_, ConceptVideo>(
                r#"SELECT * FROM concept_videos WHERE concept_tag = ? ORDER BY id LIMIT 1"#,
            )
            .bind(tag)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(video) = video {
                videos.push(VideoLink {
                    tag: video.concept_tag,
                    embed_url: to_embed_url(&video.youtube_url),
                    url: video.youtube_url,
                });
            }
        }
        Ok(videos)
    }

    /// Scores a finished quiz, appends the attempt and updates the leaderboard.
    pub async fn finish(&self, quiz: &QuizSession, now: DateTime<Utc>) -> Result<QuizResult> {
        let questions = self.load_questions(quiz.question_ids()).await?;
        let answers = quiz.answers();

        let score = GradingService::score(&questions, answers);
        let weak_tags = GradingService::weak_tags(&questions, answers, DEFAULT_WEAK_TAG_LIMIT);
        let duration_seconds = (now - quiz.started_at).num_seconds().max(0);

        let attempt = self
            .record_attempt(quiz.user_id, score, &weak_tags, duration_seconds, now)
            .await?;
        let update = self
            .leaderboard
            .record(&quiz.nickname, score, duration_seconds, &quiz.difficulty, now)
            .await?;
        let videos = self.videos_for_tags(&weak_tags).await?;

        tracing::info!(
            attempt_id = attempt.id,
            nickname = %quiz.nickname,
            score,
            total = questions.len(),
            duration_seconds,
            "quiz finished"
        );

        Ok(QuizResult {
            nickname: quiz.nickname.clone(),
            difficulty: quiz.difficulty.clone(),
            score,
            total: questions.len(),
            weak_tags,
            videos,
            duration_seconds,
            leaderboard_updated: update.changed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::pool::{create_pool, run_migrations};
    use crate::models::question::NewQuestion;
    use crate::services::seed_service::SeedService;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.expect("pool");
        run_migrations(&pool).await.expect("migrations");
        pool
    }

    fn new_question(topic: &str, difficulty: &str, correct: &str, tag: &str) -> NewQuestion {
        NewQuestion {
            topic: topic.into(),
            question: format!("{} {} question", topic, tag),
            choice_a: "a".into(),
            choice_b: "b".into(),
            choice_c: "c".into(),
            choice_d: "d".into(),
            correct: correct.into(),
            concept_tag: tag.into(),
            difficulty: difficulty.into(),
        }
    }

    #[test]
    fn sampling_never_repeats_or_exceeds_available() {
        let mut rng = StdRng::seed_from_u64(7);
        for available in [0usize, 1, 5, 8, 9, 30] {
            let ids: Vec<i64> = (0..available as i64).collect();
            let sampled = sample_ids(ids, MAX_QUESTIONS, &mut rng);
            assert_eq!(sampled.len(), available.min(MAX_QUESTIONS));
            let unique: HashSet<_> = sampled.iter().collect();
            assert_eq!(unique.len(), sampled.len());
            assert!(sampled.iter().all(|id| *id >= 0 && (*id as usize) < available));
        }
    }

    #[tokio::test]
    async fn filters_by_topic_and_difficulty() {
        let pool = setup_test_db().await;
        let seeder = SeedService::new(pool.clone());
        seeder
            .insert_questions(&[
                new_question("network", "easy", "A", "tcp"),
                new_question("network", "hard", "A", "bgp"),
                new_question("linux", "easy", "B", "fs"),
            ])
            .await
            .unwrap();
        let svc = QuizService::new(pool);

        assert_eq!(svc.list_topics().await.unwrap(), vec!["linux", "network"]);
        assert_eq!(svc.matching_question_ids("all", "easy").await.unwrap().len(), 2);
        assert_eq!(svc.matching_question_ids("network", "easy").await.unwrap().len(), 1);
        assert!(svc.sample_question_ids("linux", "hard").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_nickname_is_reported() {
        let svc = QuizService::new(setup_test_db().await);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (id, existed) = svc.find_or_create_user("niobe", now).await.unwrap();
        assert!(!existed);
        let (again, existed) = svc.find_or_create_user("niobe", now).await.unwrap();
        assert!(existed);
        assert_eq!(id, again);
    }

    #[tokio::test]
    async fn racing_first_starts_share_one_user() {
        let svc = QuizService::new(setup_test_db().await);
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (a, b) = tokio::join!(
            svc.find_or_create_user("switch", now),
            svc.find_or_create_user("switch", now),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.0, b.0);
        assert_eq!([a.1, b.1].iter().filter(|existed| !**existed).count(), 1);

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&svc.pool)
            .await
            .unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn finish_persists_attempt_and_links_videos() {
        let pool = setup_test_db().await;
        let seeder = SeedService::new(pool.clone());
        seeder
            .insert_questions(&[
                new_question("network", "easy", "A", "tcp"),
                new_question("network", "easy", "B", "dns"),
            ])
            .await
            .unwrap();
        seeder
            .insert_videos(&[crate::models::concept_video::NewConceptVideo {
                concept_tag: "dns".into(),
                youtube_url: "https://youtu.be/dns101".into(),
            }])
            .await
            .unwrap();
        let svc = QuizService::new(pool);

        let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let (user_id, _) = svc.find_or_create_user("tank", start).await.unwrap();
        let mut ids = svc.matching_question_ids("network", "easy").await.unwrap();
        ids.sort();
        let mut quiz = QuizSession::new(
            user_id,
            "tank".into(),
            "network".into(),
            "easy".into(),
            ids,
            false,
            start,
        );
        quiz.record_answer("A");
        quiz.record_answer("C");

        let result = svc.finish(&quiz, start + Duration::seconds(95)).await.unwrap();
        assert_eq!(result.score, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.weak_tags, vec!["dns"]);
        assert_eq!(result.duration_seconds, 95);
        assert!(result.leaderboard_updated);
        assert_eq!(
            result.videos,
            vec![VideoLink {
                tag: "dns".into(),
                url: "https://youtu.be/dns101".into(),
                embed_url: "https://www.youtube.com/embed/dns101".into(),
            }]
        );

        let attempts = sqlx::query_as::<_, Attempt>(r#"SELECT * FROM attempts WHERE user_id = ?"#)
            .bind(user_id)
            .fetch_all(&svc.pool)
            .await
            .unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].score, 1);
        assert_eq!(attempts[0].weak_tags, "dns");
        assert_eq!(attempts[0].duration_seconds, 95);
    }
}
