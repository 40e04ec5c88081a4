pub mod docs;
pub mod hall;
pub mod health;
pub mod news;
pub mod quiz;
pub mod schedule;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::middleware::{
    admin::require_admin,
    cors::feed_cors,
    rate_limit::{new_rps_state, rps_middleware},
};
use crate::services::news_service::GENERATED_URL_PREFIX;
use crate::AppState;

pub fn app_router(state: AppState) -> Router {
    let admin_api = Router::new()
        .route("/schedule/admin/edit/:id", get(schedule::edit_form))
        .route("/schedule/admin/create", post(schedule::create_schedule))
        .route("/schedule/admin/update/:id", post(schedule::update_schedule))
        .route("/schedule/admin/delete/:id", post(schedule::delete_schedule))
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let feed_api = Router::new()
        .route("/api/schedule", get(schedule::calendar_feed))
        .layer(feed_cors());

    let public_api = Router::new()
        .route("/", get(hall::landing))
        .route("/hall", get(hall::hall_of_fame))
        .route("/quiz", get(quiz::list_topics))
        .route("/quiz/start", post(quiz::start_quiz))
        .route(
            "/quiz/question",
            get(quiz::current_question).post(quiz::submit_answer),
        )
        .route("/quiz/quit", get(quiz::quit_quiz))
        .route("/quiz/result", get(quiz::quiz_result))
        .route("/news", get(news::list_news))
        .route("/news/:id", get(news::news_detail))
        .route("/schedule", get(schedule::calendar))
        .route("/schedule/admin", get(schedule::admin_page))
        .route("/schedule/admin/login", post(schedule::admin_login))
        .route("/schedule/admin/logout", post(schedule::admin_logout))
        .merge(admin_api)
        .merge(feed_api)
        .layer(from_fn_with_state(
            new_rps_state(state.config.public_rps),
            rps_middleware,
        ));

    let generated_dir = state.config.generated_dir.clone();
    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(docs::openapi_json))
        .merge(public_api)
        .nest_service(GENERATED_URL_PREFIX, ServeDir::new(generated_dir))
        .with_state(state)
}
