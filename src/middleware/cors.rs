use tower_http::cors::{Any, CorsLayer};

/// The calendar feed is read by third-party calendar widgets.
pub fn feed_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any)
        .allow_origin(Any)
}
