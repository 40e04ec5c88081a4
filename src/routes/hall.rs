use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
};

use crate::{
    dto::quiz_dto::{HallResponse, LandingResponse, LeaderboardBoard, LeaderboardQuery},
    error::Result,
    models::question::DIFFICULTIES,
    services::leaderboard_service::{BOARD_LIMIT, LANDING_LIMIT},
    AppState,
};

#[utoipa::path(
    get,
    path = "/hall",
    params(
        ("difficulty" = Option<String>, Query, description = "Only this difficulty's board")
    ),
    responses(
        (status = 200, description = "Leaderboards, one per difficulty", body = HallResponse)
    )
)]
#[axum::debug_handler]
pub async fn hall_of_fame(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<impl IntoResponse> {
    let difficulties: Vec<String> = match query
        .difficulty
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
    {
        Some(difficulty) => vec![difficulty],
        None => DIFFICULTIES.iter().map(|d| d.to_string()).collect(),
    };

    let mut boards = Vec::with_capacity(difficulties.len());
    for difficulty in difficulties {
        let entries = state
            .leaderboard_service
            .top_for_difficulty(&difficulty, BOARD_LIMIT)
            .await?;
        boards.push(LeaderboardBoard {
            difficulty,
            entries,
        });
    }
    Ok(Json(HallResponse { boards }))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Top players across all difficulties", body = LandingResponse)
    )
)]
#[axum::debug_handler]
pub async fn landing(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let top_users = state.leaderboard_service.top_overall(LANDING_LIMIT).await?;
    Ok(Json(LandingResponse { top_users }))
}
