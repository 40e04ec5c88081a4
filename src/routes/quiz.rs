use axum::{
    extract::{Form, State},
    response::{IntoResponse, Json, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    dto::quiz_dto::{
        AnswerForm, QuestionView, StartQuizForm, TopicsResponse, NO_MATCHING_QUESTIONS,
    },
    error::{Error, Result},
    middleware::session::{session_cookie, session_token},
    services::session_store::QuizSession,
    AppState,
};

pub const QUIZ_HOME: &str = "/quiz";
pub const QUESTION_PAGE: &str = "/quiz/question";
pub const RESULT_PAGE: &str = "/quiz/result";

enum Step {
    Ask {
        question_id: i64,
        index: usize,
        total: usize,
        nickname_exists: bool,
    },
    Finished,
}

#[utoipa::path(
    get,
    path = "/quiz",
    responses(
        (status = 200, description = "Topics available for a new quiz", body = TopicsResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_topics(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let topics = state.quiz_service.list_topics().await?;
    Ok(Json(TopicsResponse {
        topics,
        error: None,
    }))
}

#[utoipa::path(
    post,
    path = "/quiz/start",
    request_body(content = StartQuizForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Quiz started, continue at /quiz/question"),
        (status = 200, description = "No question matches the filter", body = TopicsResponse)
    )
)]
#[axum::debug_handler]
pub async fn start_quiz(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<StartQuizForm>,
) -> Result<Response> {
    let form = form.normalized();
    if form.validate().is_err() {
        return Ok(Redirect::to(QUIZ_HOME).into_response());
    }

    let now = state.clock.now();
    let (user_id, nickname_exists) = state
        .quiz_service
        .find_or_create_user(&form.nickname, now)
        .await?;
    let question_ids = state
        .quiz_service
        .sample_question_ids(form.topic(), form.difficulty())
        .await?;

    if question_ids.is_empty() {
        tracing::info!(
            topic = form.topic(),
            difficulty = form.difficulty(),
            "no questions for filter"
        );
        let topics = state.quiz_service.list_topics().await?;
        return Ok(Json(TopicsResponse {
            topics,
            error: Some(NO_MATCHING_QUESTIONS.to_string()),
        })
        .into_response());
    }

    let quiz = QuizSession::new(
        user_id,
        form.nickname.clone(),
        form.topic().to_string(),
        form.difficulty().to_string(),
        question_ids,
        nickname_exists,
        now,
    );
    tracing::info!(
        nickname = %form.nickname,
        topic = form.topic(),
        difficulty = form.difficulty(),
        total = quiz.total(),
        "quiz started"
    );

    let token = session_token(&jar);
    let jar = match state.sessions.begin_quiz(token.as_deref(), quiz).await {
        Some(minted) => jar.add(session_cookie(minted)),
        None => jar,
    };
    Ok((jar, Redirect::to(QUESTION_PAGE)).into_response())
}

#[utoipa::path(
    get,
    path = "/quiz/question",
    responses(
        (status = 200, description = "The question to answer next", body = QuestionView),
        (status = 303, description = "No quiz in progress, or every question answered")
    )
)]
#[axum::debug_handler]
pub async fn current_question(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let Some(token) = session_token(&jar) else {
        return Ok(Redirect::to(QUIZ_HOME).into_response());
    };
    let step = state
        .sessions
        .with_quiz(&token, |quiz| match quiz.current_question_id() {
            Some(question_id) => Step::Ask {
                question_id,
                index: quiz.index(),
                total: quiz.total(),
                nickname_exists: quiz.take_nickname_exists(),
            },
            None => Step::Finished,
        })
        .await;

    match step {
        None => Ok(Redirect::to(QUIZ_HOME).into_response()),
        Some(Step::Finished) => Ok(Redirect::to(RESULT_PAGE).into_response()),
        Some(Step::Ask {
            question_id,
            index,
            total,
            nickname_exists,
        }) => {
            let question = state
                .quiz_service
                .get_question(question_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))?;
            Ok(Json(QuestionView::new(&question, index, total, nickname_exists)).into_response())
        }
    }
}

#[utoipa::path(
    post,
    path = "/quiz/question",
    request_body(content = AnswerForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Answer recorded, continue at /quiz/question")
    )
)]
#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AnswerForm>,
) -> Result<Response> {
    let Some(token) = session_token(&jar) else {
        return Ok(Redirect::to(QUIZ_HOME).into_response());
    };
    let recorded = state
        .sessions
        .with_quiz(&token, |quiz| quiz.record_answer(form.answer))
        .await;

    match recorded {
        None => Ok(Redirect::to(QUIZ_HOME).into_response()),
        Some(false) => {
            tracing::debug!("answer ignored, quiz already complete");
            Ok(Redirect::to(QUESTION_PAGE).into_response())
        }
        Some(true) => Ok(Redirect::to(QUESTION_PAGE).into_response()),
    }
}

#[axum::debug_handler]
pub async fn quit_quiz(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(token) = session_token(&jar) {
        if let Some(quiz) = state.sessions.take_quiz(&token).await {
            tracing::info!(nickname = %quiz.nickname, answered = quiz.index(), "quiz abandoned");
        }
    }
    Ok(Redirect::to(QUIZ_HOME).into_response())
}

#[utoipa::path(
    get,
    path = "/quiz/result",
    responses(
        (status = 200, description = "Score, weak concepts and remedial videos", body = QuizResult),
        (status = 303, description = "No quiz in progress")
    )
)]
#[axum::debug_handler]
pub async fn quiz_result(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    let Some(token) = session_token(&jar) else {
        return Ok(Redirect::to(QUIZ_HOME).into_response());
    };
    let Some(quiz) = state.sessions.get(&token).await.and_then(|s| s.quiz) else {
        return Ok(Redirect::to(QUIZ_HOME).into_response());
    };

    let result = state.quiz_service.finish(&quiz, state.clock.now()).await?;
    state.sessions.take_quiz(&token).await;
    Ok(Json(result).into_response())
}
