#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use quiz_backend::{
    config::Config,
    database::pool::{create_pool, run_migrations},
    routes::app_router,
    services::session_store::SESSION_COOKIE,
    utils::time::FixedClock,
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "letmein";

pub fn test_config(hn_base_url: &str, openai_base_url: &str, dir: &Path) -> Config {
    Config {
        server_address: "127.0.0.1:0".into(),
        database_url: "sqlite::memory:".into(),
        admin_password: Some(ADMIN_PASSWORD.into()),
        openai_api_key: None,
        openai_base_url: openai_base_url.into(),
        hn_base_url: hn_base_url.into(),
        public_rps: 1_000,
        news_cache_dir: dir.join("cache").to_string_lossy().into_owned(),
        generated_dir: dir.join("generated").to_string_lossy().into_owned(),
        news_ttl_seconds: 86_400,
        news_refresh_seconds: 3_600,
    }
}

pub async fn build_app(config: &Config) -> (Router, AppState) {
    let pool = create_pool(&config.database_url).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    let clock = Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    ));
    let state = AppState::with_clock(pool, config, clock).expect("state");
    (app_router(state.clone()), state)
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("response")
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Session token set by the response, if any.
pub fn session_cookie(res: &Response<Body>) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| {
            v.strip_prefix(&format!("{}=", SESSION_COOKIE))
                .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
        })
}

pub fn location(res: &Response<Body>) -> String {
    assert_eq!(res.status(), StatusCode::SEE_OTHER, "expected a redirect");
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_json(res: Response<Body>) -> JsonValue {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
