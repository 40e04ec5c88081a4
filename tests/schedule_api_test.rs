mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value as JsonValue};

use common::{
    body_json, build_app, get, location, post_form, send, session_cookie, test_config,
    ADMIN_PASSWORD,
};

fn events_on(calendar: &JsonValue, day: u64) -> Vec<JsonValue> {
    calendar["weeks"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|week| week.as_array().unwrap().iter())
        .find(|cell| cell["day"] == day)
        .map(|cell| cell["events"].as_array().unwrap().clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn admin_crud_and_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir.path());
    let (app, state) = build_app(&config).await;

    let create_body = "title=Bootcamp&start_date=2026-03-05&end_date=2026-03-10&note=bring+laptop";
    let res = send(&app, post_form("/schedule/admin/create", create_body, None)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = send(&app, post_form("/schedule/admin/login", "password=nope", None)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = send(&app, get("/schedule/admin", None)).await;
    assert_eq!(body_json(res).await, json!({ "is_admin": false }));

    let res = send(
        &app,
        post_form(
            "/schedule/admin/login",
            &format!("password={}", ADMIN_PASSWORD),
            None,
        ),
    )
    .await;
    assert_eq!(location(&res), "/schedule/admin");
    let token = session_cookie(&res).expect("session cookie");

    let res = send(&app, post_form("/schedule/admin/create", create_body, Some(&token))).await;
    assert_eq!(location(&res), "/schedule/admin");

    // Rejected forms redirect without writing anything.
    for bad in [
        "title=&start_date=2026-03-05",
        "title=Oops&start_date=not-a-date",
        "title=Oops&start_date=2026-03-10&end_date=2026-03-09",
    ] {
        let res = send(&app, post_form("/schedule/admin/create", bad, Some(&token))).await;
        assert_eq!(location(&res), "/schedule/admin");
    }
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedules")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let admin = body_json(send(&app, get("/schedule/admin", Some(&token))).await).await;
    assert_eq!(admin["is_admin"], true);
    let id = admin["schedules"][0]["id"].as_i64().unwrap();
    assert_eq!(admin["schedules"][0]["note"], "bring laptop");

    let calendar = body_json(send(&app, get("/schedule?year=2026&month=3", Some(&token))).await).await;
    assert_eq!(calendar["is_admin"], true);
    assert_eq!(calendar["prev_month"], 2);
    assert_eq!(calendar["next_month"], 4);
    assert_eq!(events_on(&calendar, 5)[0]["segment"], "start");
    assert_eq!(events_on(&calendar, 6)[0]["segment"], "middle");
    assert!(events_on(&calendar, 7).is_empty(), "weekend skipped");
    assert_eq!(events_on(&calendar, 10)[0]["segment"], "end");

    let feed_req = Request::builder()
        .uri("/api/schedule")
        .header(header::ORIGIN, "https://calendar.example")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, feed_req).await;
    assert_eq!(
        res.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        body_json(res).await,
        json!([{ "title": "Bootcamp", "start": "2026-03-05", "end": "2026-03-11", "allDay": true }])
    );

    let edit = body_json(
        send(&app, get(&format!("/schedule/admin/edit/{}", id), Some(&token))).await,
    )
    .await;
    assert_eq!(edit["edit_item"]["title"], "Bootcamp");
    let res = send(&app, get("/schedule/admin/edit/999", Some(&token))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(
        &app,
        post_form(
            &format!("/schedule/admin/update/{}", id),
            "title=Hackday&start_date=2026-03-07",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(location(&res), "/schedule/admin");
    let calendar = body_json(send(&app, get("/schedule?year=2026&month=3", None)).await).await;
    assert_eq!(calendar["is_admin"], false);
    let hackday = events_on(&calendar, 7);
    assert_eq!(hackday[0]["title"], "Hackday");
    assert_eq!(hackday[0]["segment"], "single");

    let res = send(
        &app,
        post_form(
            &format!("/schedule/admin/update/{}", id),
            "title=Hackday&start_date=2026-03-09&end_date=2026-03-08",
            Some(&token),
        ),
    )
    .await;
    assert_eq!(location(&res), format!("/schedule/admin/edit/{}", id));

    let res = send(
        &app,
        post_form(&format!("/schedule/admin/delete/{}", id), "", Some(&token)),
    )
    .await;
    assert_eq!(location(&res), "/schedule/admin");
    let feed = body_json(send(&app, get("/api/schedule", None)).await).await;
    assert_eq!(feed, json!([]));

    let res = send(&app, post_form("/schedule/admin/logout", "", Some(&token))).await;
    assert_eq!(location(&res), "/schedule");
    let res = send(&app, post_form("/schedule/admin/create", create_body, Some(&token))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_issues_a_new_session_token() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir.path());
    let (app, _state) = build_app(&config).await;

    let planted = "planted-before-login";
    let res = send(
        &app,
        post_form(
            "/schedule/admin/login",
            &format!("password={}", ADMIN_PASSWORD),
            Some(planted),
        ),
    )
    .await;
    assert_eq!(location(&res), "/schedule/admin");
    let token = session_cookie(&res).expect("rotated session cookie");
    assert_ne!(token, planted);

    let res = send(&app, get("/schedule/admin", Some(planted))).await;
    assert_eq!(body_json(res).await["is_admin"], false);
    let res = send(
        &app,
        post_form(
            "/schedule/admin/create",
            "title=Sneaky&start_date=2026-03-05",
            Some(planted),
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A second login rotates again and retires the previous token.
    let res = send(
        &app,
        post_form(
            "/schedule/admin/login",
            &format!("password={}", ADMIN_PASSWORD),
            Some(&token),
        ),
    )
    .await;
    let rotated = session_cookie(&res).expect("rotated again");
    assert_ne!(rotated, token);
    let res = send(&app, get("/schedule/admin", Some(&token))).await;
    assert_eq!(body_json(res).await["is_admin"], false);
    let res = send(&app, get("/schedule/admin", Some(&rotated))).await;
    assert_eq!(body_json(res).await["is_admin"], true);
}

#[tokio::test]
async fn malformed_month_falls_back_to_current() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir.path());
    let (app, _state) = build_app(&config).await;

    // The test clock sits in March 2026.
    let calendar = body_json(send(&app, get("/schedule?year=20x6&month=99", None)).await).await;
    assert_eq!(calendar["year"], 2026);
    assert_eq!(calendar["month"], 3);

    let res = send(&app, get("/health", None)).await;
    assert_eq!(body_json(res).await["status"], "ok");
}
