use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::news_dto::{NewsDetailResponse, NewsListResponse},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    get,
    path = "/news",
    responses(
        (status = 200, description = "Current tech headlines", body = NewsListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_news(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.news_service.get_tech_news().await;
    Ok(Json(NewsListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/news/{id}",
    params(
        ("id" = String, Path, description = "News item ID")
    ),
    responses(
        (status = 200, description = "Headline with rendered detail", body = NewsDetailResponse),
        (status = 404, description = "No current headline has this ID")
    )
)]
#[axum::debug_handler]
pub async fn news_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let item = state
        .news_service
        .find(&id)
        .await
        .ok_or_else(|| Error::NotFound(format!("News item {} not found", id)))?;
    Ok(Json(NewsDetailResponse::from(item)))
}
