use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Json, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    dto::schedule_dto::{
        AdminLoginForm, CalendarFeedEvent, CalendarQuery, CalendarResponse, ScheduleAdminResponse,
        ScheduleForm,
    },
    error::{Error, Result},
    middleware::admin::password_matches,
    middleware::session::{session_cookie, session_token},
    services::calendar::{build_calendar, month_range, next_month, prev_month},
    AppState,
};

pub const CALENDAR_PAGE: &str = "/schedule";
pub const ADMIN_PAGE: &str = "/schedule/admin";

async fn is_admin(state: &AppState, jar: &CookieJar) -> bool {
    match session_token(jar) {
        Some(token) => state
            .sessions
            .get(&token)
            .await
            .map(|s| s.is_admin)
            .unwrap_or(false),
        None => false,
    }
}

#[axum::debug_handler]
pub async fn calendar(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse> {
    let (year, month) = query.resolve(state.clock.now().date_naive());
    let (start, end) = month_range(year, month)
        .ok_or_else(|| Error::BadRequest(format!("Invalid month {}-{}", year, month)))?;
    let events = state.schedule_service.list_overlapping(start, end).await?;

    let (prev_year, prev_month) = prev_month(year, month);
    let (next_year, next_month) = next_month(year, month);
    Ok(Json(CalendarResponse {
        year,
        month,
        prev_year,
        prev_month,
        next_year,
        next_month,
        weeks: build_calendar(year, month, &events),
        is_admin: is_admin(&state, &jar).await,
    }))
}

#[axum::debug_handler]
pub async fn admin_page(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    if !is_admin(&state, &jar).await {
        return Ok(Json(ScheduleAdminResponse {
            is_admin: false,
            schedules: Vec::new(),
            edit_item: None,
        }));
    }
    let schedules = state.schedule_service.list_all().await?;
    Ok(Json(ScheduleAdminResponse {
        is_admin: true,
        schedules,
        edit_item: None,
    }))
}

#[axum::debug_handler]
pub async fn admin_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AdminLoginForm>,
) -> Result<Response> {
    if !password_matches(state.config.admin_password.as_deref(), &form.password) {
        tracing::warn!("rejected admin login");
        return Err(Error::Forbidden("invalid_password".to_string()));
    }
    let previous = session_token(&jar);
    let token = state
        .sessions
        .rotate(previous.as_deref(), |s| s.is_admin = true)
        .await;
    tracing::info!("admin logged in");
    Ok((jar.add(session_cookie(token)), Redirect::to(ADMIN_PAGE)).into_response())
}

#[axum::debug_handler]
pub async fn admin_logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response> {
    if let Some(token) = session_token(&jar) {
        state.sessions.modify(&token, |s| s.is_admin = false).await;
    }
    Ok(Redirect::to(CALENDAR_PAGE).into_response())
}

#[axum::debug_handler]
pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let item = state
        .schedule_service
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Schedule {} not found", id)))?;
    Ok(Json(ScheduleAdminResponse {
        is_admin: true,
        schedules: Vec::new(),
        edit_item: Some(item),
    }))
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<AppState>,
    Form(form): Form<ScheduleForm>,
) -> Result<Response> {
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(error = %e, "schedule form rejected");
            return Ok(Redirect::to(ADMIN_PAGE).into_response());
        }
    };
    state.schedule_service.create(&draft, state.clock.now()).await?;
    Ok(Redirect::to(ADMIN_PAGE).into_response())
}

#[axum::debug_handler]
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ScheduleForm>,
) -> Result<Response> {
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(schedule_id = id, error = %e, "schedule form rejected");
            return Ok(Redirect::to(&format!("{}/edit/{}", ADMIN_PAGE, id)).into_response());
        }
    };
    if !state.schedule_service.update(id, &draft).await? {
        return Err(Error::NotFound(format!("Schedule {} not found", id)));
    }
    tracing::info!(schedule_id = id, "schedule updated");
    Ok(Redirect::to(ADMIN_PAGE).into_response())
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    if state.schedule_service.delete(id).await? {
        tracing::info!(schedule_id = id, "schedule deleted");
    }
    Ok(Redirect::to(ADMIN_PAGE).into_response())
}

#[utoipa::path(
    get,
    path = "/api/schedule",
    responses(
        (status = 200, description = "Every schedule as an all-day event with exclusive end", body = [CalendarFeedEvent])
    )
)]
#[axum::debug_handler]
pub async fn calendar_feed(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let schedules = state.schedule_service.list_chronological().await?;
    let events: Vec<CalendarFeedEvent> = schedules.iter().map(CalendarFeedEvent::from).collect();
    Ok(Json(events))
}
