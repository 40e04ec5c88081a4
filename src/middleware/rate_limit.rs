use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::middleware::session::session_token;

const WINDOW: Duration = Duration::from_secs(1);
/// Idle windows are swept once the map grows past this many clients.
const SWEEP_THRESHOLD: usize = 10_000;
pub const ANONYMOUS_CLIENT: &str = "anonymous";

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed one-second window per client key.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    rps: u32,
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    fn new(rps: u32) -> Self {
        Self {
            rps: rps.max(1),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut guard = self.windows.lock().expect("rate limiter mutex poisoned");
        if guard.len() > SWEEP_THRESHOLD {
            guard.retain(|_, w| now.duration_since(w.start) < WINDOW);
        }
        let window = guard.entry(key.to_string()).or_insert(WindowState {
            start: now,
            count: 0,
        });
        if now.duration_since(window.start) >= WINDOW {
            window.start = now;
            window.count = 0;
        }
        if window.count < self.rps {
            window.count += 1;
            true
        } else {
            false
        }
    }

    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }
}

/// Bucket for a request: its session token, else the peer address, else the
/// shared anonymous bucket when the server runs without connection info.
fn client_key(req: &Request<Body>) -> String {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(token) = session_token(&jar) {
        return format!("session:{}", token);
    }
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("peer:{}", addr.ip()),
        None => ANONYMOUS_CLIENT.to_string(),
    }
}

pub async fn rps_middleware(
    State(state): State<RateLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if !state.allow(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, "rate_limit_exceeded").into_response();
    }
    next.run(req).await
}

pub fn new_rps_state(rps: u32) -> RateLimiter {
    RateLimiter::new(rps)
}
