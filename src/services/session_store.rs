use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::utils::time::Clock;
use crate::utils::token::generate_session_token;

pub const SESSION_COOKIE: &str = "quiz_session";

/// Sessions untouched for this long are forgotten.
pub const SESSION_IDLE_SECONDS: i64 = 2 * 60 * 60;
/// Idle sessions are swept once the map grows past this many entries.
const SWEEP_THRESHOLD: usize = 10_000;

/// Upper bound on questions drawn for one quiz.
pub const MAX_QUESTIONS: usize = 8;

/// Server-side state of one quiz in progress.
///
/// The cursor is the number of submitted answers, so `answers.len()` and the
/// current index can never disagree, and answers stop being accepted once
/// every question has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    pub user_id: i64,
    pub nickname: String,
    pub topic: String,
    pub difficulty: String,
    pub started_at: DateTime<Utc>,
    question_ids: Vec<i64>,
    answers: Vec<String>,
    nickname_exists: bool,
}

impl QuizSession {
    pub fn new(
        user_id: i64,
        nickname: String,
        topic: String,
        difficulty: String,
        mut question_ids: Vec<i64>,
        nickname_exists: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        question_ids.truncate(MAX_QUESTIONS);
        Self {
            user_id,
            nickname,
            topic,
            difficulty,
            started_at,
            question_ids,
            answers: Vec::new(),
            nickname_exists,
        }
    }

    pub fn question_ids(&self) -> &[i64] {
        &self.question_ids
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn index(&self) -> usize {
        self.answers.len()
    }

    pub fn total(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_complete(&self) -> bool {
        self.index() >= self.total()
    }

    pub fn current_question_id(&self) -> Option<i64> {
        self.question_ids.get(self.index()).copied()
    }

    /// Records the answer to the current question and advances the cursor.
    /// Returns false when the quiz is already complete.
    pub fn record_answer(&mut self, answer: impl Into<String>) -> bool {
        if self.is_complete() {
            return false;
        }
        self.answers.push(answer.into());
        true
    }

    /// One-shot flag: true only on the first read after starting with a
    /// nickname that was already registered.
    pub fn take_nickname_exists(&mut self) -> bool {
        std::mem::take(&mut self.nickname_exists)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub quiz: Option<QuizSession>,
    pub is_admin: bool,
}

impl SessionData {
    /// Nothing worth keeping: no quiz in progress and not logged in.
    pub fn is_empty(&self) -> bool {
        self.quiz.is_none() && !self.is_admin
    }
}

#[derive(Debug)]
struct StoredSession {
    data: SessionData,
    last_seen: DateTime<Utc>,
}

impl StoredSession {
    fn is_idle(&self, now: DateTime<Utc>) -> bool {
        now - self.last_seen >= Duration::seconds(SESSION_IDLE_SECONDS)
    }
}

/// In-memory sessions keyed by the token held in the client's cookie.
///
/// Tokens are only ever minted here, never taken from the client, and a
/// session that becomes empty or sits idle for too long is dropped.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    pub async fn get(&self, token: &str) -> Option<SessionData> {
        let now = self.clock.now();
        let mut guard = self.sessions.write().await;
        live(&mut guard, token, now).cloned()
    }

    /// Attaches `quiz` to the live session under `token`. When the client has
    /// no live session a fresh one is created and its new token returned.
    pub async fn begin_quiz(&self, token: Option<&str>, quiz: QuizSession) -> Option<String> {
        let now = self.clock.now();
        let mut guard = self.sessions.write().await;
        let existing = match token {
            Some(t) => live(&mut guard, t, now),
            None => None,
        };
        if let Some(data) = existing {
            data.quiz = Some(quiz);
            return None;
        }
        let data = SessionData {
            quiz: Some(quiz),
            is_admin: false,
        };
        Some(insert(&mut guard, data, now))
    }

    /// Moves the live session under `token` (or an empty one) to a freshly
    /// minted token, applying `f` on the way. The old token stops working.
    pub async fn rotate<F>(&self, token: Option<&str>, f: F) -> String
    where
        F: FnOnce(&mut SessionData),
    {
        let now = self.clock.now();
        let mut guard = self.sessions.write().await;
        let mut data = token
            .and_then(|t| guard.remove(t))
            .filter(|stored| !stored.is_idle(now))
            .map(|stored| stored.data)
            .unwrap_or_default();
        f(&mut data);
        insert(&mut guard, data, now)
    }

    /// Applies `f` only to an existing session, dropping it if that leaves
    /// it empty.
    pub async fn modify<F, T>(&self, token: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut SessionData) -> T,
    {
        let now = self.clock.now();
        let mut guard = self.sessions.write().await;
        let out = live(&mut guard, token, now).map(f);
        prune(&mut guard, token);
        out
    }

    /// Applies `f` to the quiz in progress, if there is one.
    pub async fn with_quiz<F, T>(&self, token: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut QuizSession) -> T,
    {
        let now = self.clock.now();
        let mut guard = self.sessions.write().await;
        live(&mut guard, token, now)
            .and_then(|data| data.quiz.as_mut())
            .map(f)
    }

    pub async fn take_quiz(&self, token: &str) -> Option<QuizSession> {
        self.modify(token, |data| data.quiz.take()).await.flatten()
    }
}

/// Session data under `token`, refreshing its idle stamp. Idle sessions are
/// removed on sight.
fn live<'a>(
    map: &'a mut HashMap<String, StoredSession>,
    token: &str,
    now: DateTime<Utc>,
) -> Option<&'a mut SessionData> {
    if map.get(token).is_some_and(|stored| stored.is_idle(now)) {
        map.remove(token);
        return None;
    }
    let stored = map.get_mut(token)?;
    stored.last_seen = now;
    Some(&mut stored.data)
}

fn prune(map: &mut HashMap<String, StoredSession>, token: &str) {
    if map.get(token).is_some_and(|stored| stored.data.is_empty()) {
        map.remove(token);
    }
}

fn insert(map: &mut HashMap<String, StoredSession>, data: SessionData, now: DateTime<Utc>) -> String {
    if map.len() > SWEEP_THRESHOLD {
        map.retain(|_, stored| !stored.is_idle(now));
    }
    let token = generate_session_token();
    map.insert(
        token.clone(),
        StoredSession {
            data,
            last_seen: now,
        },
    );
    token
}
