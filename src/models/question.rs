use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Difficulty levels a leaderboard is split into.
pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Question {
    pub id: i64,
    pub topic: String,
    pub question: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    /// Letter of the correct choice, `A` through `D`.
    pub correct: String,
    pub concept_tag: String,
    pub difficulty: String,
}

impl Question {
    pub fn choices(&self) -> [(&'static str, &str); 4] {
        [
            ("A", self.choice_a.as_str()),
            ("B", self.choice_b.as_str()),
            ("C", self.choice_c.as_str()),
            ("D", self.choice_d.as_str()),
        ]
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        !answer.is_empty() && answer == self.correct
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub topic: String,
    pub question: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub correct: String,
    pub concept_tag: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "medium".to_string()
}
