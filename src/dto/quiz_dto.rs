use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::leaderboard::LeaderboardEntry;
use crate::models::question::Question;

pub const ALL_TOPICS: &str = "all";
pub const NO_MATCHING_QUESTIONS: &str = "No questions match the selected topic and difficulty.";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StartQuizForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 40))]
    pub nickname: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl StartQuizForm {
    /// Trims every field and fills in the "all topics" / "easy" defaults.
    pub fn normalized(self) -> Self {
        let topic = self
            .topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| ALL_TOPICS.to_string());
        let difficulty = self
            .difficulty
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "easy".to_string());
        Self {
            nickname: self.nickname.trim().to_string(),
            topic: Some(topic),
            difficulty: Some(difficulty),
        }
    }

    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or(ALL_TOPICS)
    }

    pub fn difficulty(&self) -> &str {
        self.difficulty.as_deref().unwrap_or("easy")
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerForm {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopicsResponse {
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChoiceView {
    pub letter: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionView {
    pub question_id: i64,
    /// 1-based position of this question in the quiz.
    pub index: usize,
    pub total: usize,
    pub topic: String,
    pub question: String,
    pub choices: Vec<ChoiceView>,
    pub nickname_exists: bool,
}

impl QuestionView {
    pub fn new(question: &Question, index: usize, total: usize, nickname_exists: bool) -> Self {
        Self {
            question_id: question.id,
            index: index + 1,
            total,
            topic: question.topic.clone(),
            question: question.question.clone(),
            choices: question
                .choices()
                .iter()
                .map(|(letter, text)| ChoiceView {
                    letter: letter.to_string(),
                    text: text.to_string(),
                })
                .collect(),
            nickname_exists,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VideoLink {
    pub tag: String,
    pub url: String,
    pub embed_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizResult {
    pub nickname: String,
    pub difficulty: String,
    pub score: i64,
    pub total: usize,
    pub weak_tags: Vec<String>,
    pub videos: Vec<VideoLink>,
    pub duration_seconds: i64,
    pub leaderboard_updated: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaderboardQuery {
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardBoard {
    pub difficulty: String,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HallResponse {
    pub boards: Vec<LeaderboardBoard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LandingResponse {
    pub top_users: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_fills_defaults_and_trims() {
        let form = StartQuizForm {
            nickname: "  trinity ".into(),
            topic: Some("   ".into()),
            difficulty: None,
        }
        .normalized();
        assert_eq!(form.nickname, "trinity");
        assert_eq!(form.topic(), ALL_TOPICS);
        assert_eq!(form.difficulty(), "easy");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn blank_nickname_fails_validation() {
        let form = StartQuizForm {
            nickname: "   ".into(),
            topic: None,
            difficulty: None,
        }
        .normalized();
        assert!(form.validate().is_err());
    }
}
