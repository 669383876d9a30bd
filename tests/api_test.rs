mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use backend::api::router;
use backend::models::CourseType;
use backend::state::AppState;
use common::{MockLms, raw_course, raw_week};

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body was not json")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let state = AppState::new(Arc::new(MockLms::new()));
    let response = router(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn load_then_snapshot_reflects_the_normalized_tree() {
    let lms = Arc::new(
        MockLms::new()
            .with_bulk(vec![raw_course("c1", Some("blended"))])
            .with_curriculum(
                CourseType::Blended,
                "c1",
                vec![raw_week("db_1", "Intro"), raw_week("db_2", "Basics")],
            ),
    );
    let state = AppState::new(lms);
    let app = router(state);

    let response = app
        .clone()
        .oneshot(post("/courses/c1/curriculum/load", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = response_json(response).await;
    assert_eq!(snapshot["totals"]["total_weeks"], 2);
    assert_eq!(snapshot["weeks"][0]["id"], "week_1");
    assert_eq!(snapshot["weeks"][1]["id"], "week_2");

    let response = app.oneshot(get("/curriculum")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = response_json(response).await;
    assert_eq!(snapshot["course"]["course_id"], "c1");
    assert_eq!(snapshot["totals"]["total_lessons"], 0);
}

#[tokio::test]
async fn mutations_require_a_loaded_course() {
    let state = AppState::new(Arc::new(MockLms::new()));
    let response = router(state)
        .oneshot(post("/curriculum/weeks", json!({ "title": "Week one" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn week_creation_reports_its_persistence_status() {
    let mut lms = MockLms::new()
        .with_bulk(vec![raw_course("c1", Some("blended"))])
        .with_curriculum(CourseType::Blended, "c1", vec![raw_week("db_1", "Intro")]);
    lms.created_week_id = Some("week_2".to_string());
    let state = AppState::new(Arc::new(lms));
    let app = router(state);

    app.clone()
        .oneshot(post("/courses/c1/curriculum/load", json!({})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post("/curriculum/weeks", json!({ "title": "Week two" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = response_json(response).await;
    assert_eq!(outcome["status"], "persisted");
    assert_eq!(outcome["entity"]["id"], "week_2");

    let response = app.oneshot(get("/curriculum")).await.unwrap();
    let snapshot = response_json(response).await;
    assert_eq!(snapshot["totals"]["total_weeks"], 2);
}

#[tokio::test]
async fn local_only_lesson_surfaces_the_warning_to_the_client() {
    let mut lms = MockLms::new()
        .with_bulk(vec![raw_course("c1", Some("blended"))])
        .with_curriculum(CourseType::Blended, "c1", vec![raw_week("db_1", "Intro")]);
    lms.lesson_behavior = common::RemoteBehavior::FailServer;
    let state = AppState::new(Arc::new(lms));
    let app = router(state);

    app.clone()
        .oneshot(post("/courses/c1/curriculum/load", json!({})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post(
            "/curriculum/weeks/week_1/lessons",
            json!({ "title": "Welcome", "duration_minutes": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = response_json(response).await;
    assert_eq!(outcome["status"], "local_only");
    assert!(
        outcome["warning"]
            .as_str()
            .unwrap()
            .contains("may be lost")
    );

    let response = app.oneshot(get("/curriculum")).await.unwrap();
    let snapshot = response_json(response).await;
    assert_eq!(snapshot["totals"]["total_lessons"], 1);
    assert_eq!(snapshot["weeks"][0]["lessons"][0]["sync_state"], "local_only");
}

#[tokio::test]
async fn unknown_course_is_a_not_found_response() {
    let state = AppState::new(Arc::new(MockLms::new().with_bulk(Vec::new())));
    let response = router(state).oneshot(get("/courses/ghost")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("ghost"));
}
