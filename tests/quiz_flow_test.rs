mod common;

use std::collections::HashMap;

use axum::http::StatusCode;
use quiz_backend::{
    models::question::NewQuestion, services::seed_service::SeedService, AppState,
};

use common::{body_json, build_app, get, location, post_form, send, session_cookie, test_config};

fn question(difficulty: &str, correct: &str, tag: &str) -> NewQuestion {
    NewQuestion {
        topic: "network".into(),
        question: format!("Question about {}", tag),
        choice_a: "first".into(),
        choice_b: "second".into(),
        choice_c: "third".into(),
        choice_d: "fourth".into(),
        correct: correct.into(),
        concept_tag: tag.into(),
        difficulty: difficulty.into(),
    }
}

async fn seed(state: &AppState) -> HashMap<i64, (String, String)> {
    SeedService::new(state.pool.clone())
        .insert_questions(&[
            question("easy", "A", "tcp"),
            question("easy", "B", "dns"),
            question("easy", "C", "http"),
            question("hard", "D", "bgp"),
        ])
        .await
        .expect("seed questions");

    let rows: Vec<(i64, String, String)> =
        sqlx::query_as("SELECT id, correct, concept_tag FROM questions")
            .fetch_all(&state.pool)
            .await
            .expect("answer key");
    rows.into_iter()
        .map(|(id, correct, tag)| (id, (correct, tag)))
        .collect()
}

#[tokio::test]
async fn quiz_flow_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir.path());
    let (app, state) = build_app(&config).await;
    let key = seed(&state).await;

    let res = send(&app, get("/quiz", None)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let topics = body_json(res).await;
    assert_eq!(topics["topics"], serde_json::json!(["network"]));

    let res = send(&app, post_form("/quiz/start", "nickname=++&topic=all", None)).await;
    assert_eq!(location(&res), "/quiz");

    let res = send(
        &app,
        post_form("/quiz/start", "nickname=cypher&topic=linux&difficulty=easy", None),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(
        body["error"],
        "No questions match the selected topic and difficulty."
    );

    let res = send(
        &app,
        post_form("/quiz/start", "nickname=neo&topic=network&difficulty=easy", None),
    )
    .await;
    assert_eq!(location(&res), "/quiz/question");
    let token = session_cookie(&res).expect("session cookie");

    let mut missed_tag = None;
    for expected_index in 1..=3 {
        let res = send(&app, get("/quiz/question", Some(&token))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let view = body_json(res).await;
        assert_eq!(view["index"], expected_index);
        assert_eq!(view["total"], 3);
        assert_eq!(view["nickname_exists"], false);
        assert_eq!(view["choices"].as_array().map(Vec::len), Some(4));

        let (correct, tag) = &key[&view["question_id"].as_i64().unwrap()];
        let answer = if expected_index == 1 {
            missed_tag = Some(tag.clone());
            if correct == "A" { "B" } else { "A" }
        } else {
            correct.as_str()
        };
        let res = send(
            &app,
            post_form("/quiz/question", &format!("answer={}", answer), Some(&token)),
        )
        .await;
        assert_eq!(location(&res), "/quiz/question");
    }

    // Extra answers after the last question are ignored.
    let res = send(&app, post_form("/quiz/question", "answer=A", Some(&token))).await;
    assert_eq!(location(&res), "/quiz/question");

    let res = send(&app, get("/quiz/question", Some(&token))).await;
    assert_eq!(location(&res), "/quiz/result");

    let res = send(&app, get("/quiz/result", Some(&token))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let result = body_json(res).await;
    assert_eq!(result["score"], 2);
    assert_eq!(result["total"], 3);
    assert_eq!(result["weak_tags"], serde_json::json!([missed_tag.unwrap()]));
    assert_eq!(result["leaderboard_updated"], true);

    let res = send(&app, get("/quiz/result", Some(&token))).await;
    assert_eq!(location(&res), "/quiz");

    let res = send(&app, get("/hall?difficulty=easy", None)).await;
    let hall = body_json(res).await;
    assert_eq!(hall["boards"][0]["entries"][0]["nickname"], "neo");
    assert_eq!(hall["boards"][0]["entries"][0]["best_score"], 2);

    let res = send(&app, get("/hall", None)).await;
    let hall = body_json(res).await;
    let difficulties: Vec<_> = hall["boards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["difficulty"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(difficulties, vec!["easy", "medium", "hard"]);

    let res = send(&app, get("/", None)).await;
    let landing = body_json(res).await;
    assert_eq!(landing["top_users"].as_array().map(Vec::len), Some(1));

    let attempts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attempts")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn returning_nickname_is_flagged_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir.path());
    let (app, state) = build_app(&config).await;
    seed(&state).await;

    let res = send(
        &app,
        post_form("/quiz/start", "nickname=trinity&difficulty=hard", None),
    )
    .await;
    let token = session_cookie(&res).unwrap();
    let first = body_json(send(&app, get("/quiz/question", Some(&token))).await).await;
    assert_eq!(first["nickname_exists"], false);

    // Restarting mid-quiz replaces the quiz inside the same session.
    let res = send(
        &app,
        post_form("/quiz/start", "nickname=trinity&difficulty=easy", Some(&token)),
    )
    .await;
    assert_eq!(location(&res), "/quiz/question");
    assert!(session_cookie(&res).is_none(), "live session is reused");

    let first = body_json(send(&app, get("/quiz/question", Some(&token))).await).await;
    assert_eq!(first["nickname_exists"], true);
    assert_eq!(first["total"], 3);
    let again = body_json(send(&app, get("/quiz/question", Some(&token))).await).await;
    assert_eq!(again["nickname_exists"], false);
}

#[tokio::test]
async fn quit_and_missing_session_redirect_home() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config("http://127.0.0.1:9", "http://127.0.0.1:9", dir.path());
    let (app, state) = build_app(&config).await;
    seed(&state).await;

    let res = send(&app, get("/quiz/question", None)).await;
    assert_eq!(location(&res), "/quiz");
    let res = send(&app, get("/quiz/question", Some("not-a-session"))).await;
    assert_eq!(location(&res), "/quiz");
    let res = send(&app, post_form("/quiz/question", "answer=A", Some("not-a-session"))).await;
    assert_eq!(location(&res), "/quiz");

    let res = send(
        &app,
        post_form("/quiz/start", "nickname=morpheus&difficulty=hard", None),
    )
    .await;
    let token = session_cookie(&res).unwrap();
    let res = send(&app, get("/quiz/quit", Some(&token))).await;
    assert_eq!(location(&res), "/quiz");
    let res = send(&app, get("/quiz/question", Some(&token))).await;
    assert_eq!(location(&res), "/quiz");

    // The emptied session is gone, so neither a stale nor a made-up token
    // is adopted by the next start.
    for stale in [token.as_str(), "chosen-by-client"] {
        let res = send(
            &app,
            post_form("/quiz/start", "nickname=morpheus&difficulty=easy", Some(stale)),
        )
        .await;
        assert_eq!(location(&res), "/quiz/question");
        let fresh = session_cookie(&res).expect("fresh session cookie");
        assert_ne!(fresh, stale);
        let res = send(&app, get("/quiz/question", Some(stale))).await;
        assert_eq!(location(&res), "/quiz");
    }
}
