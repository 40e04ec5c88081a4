use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::news_dto::{NewsDetailResponse, NewsListResponse};
use crate::dto::quiz_dto::{
    AnswerForm, ChoiceView, HallResponse, LandingResponse, LeaderboardBoard, QuestionView,
    QuizResult, StartQuizForm, TopicsResponse, VideoLink,
};
use crate::dto::schedule_dto::CalendarFeedEvent;
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::news::NewsItem;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::hall::landing,
        crate::routes::hall::hall_of_fame,
        crate::routes::quiz::list_topics,
        crate::routes::quiz::start_quiz,
        crate::routes::quiz::current_question,
        crate::routes::quiz::submit_answer,
        crate::routes::quiz::quiz_result,
        crate::routes::news::list_news,
        crate::routes::news::news_detail,
        crate::routes::schedule::calendar_feed,
    ),
    components(schemas(
        AnswerForm,
        CalendarFeedEvent,
        ChoiceView,
        HallResponse,
        LandingResponse,
        LeaderboardBoard,
        LeaderboardEntry,
        NewsDetailResponse,
        NewsItem,
        NewsListResponse,
        QuestionView,
        QuizResult,
        StartQuizForm,
        TopicsResponse,
        VideoLink,
    )),
    tags((name = "quiz-backend", description = "Quiz, leaderboard, schedule and tech news"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
