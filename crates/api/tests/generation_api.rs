//! API integration tests: generation flow, validation mapping, and
//! the credits/references read surfaces.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{seed_reference, seed_user, test_app};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_ok(pool: PgPool) {
    let app = test_app(&pool);
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn generate_returns_a_completed_record(pool: PgPool) {
    let user_id = seed_user(&pool, "api@example.com", 10).await;
    seed_reference(&pool).await;

    let app = test_app(&pool);
    let response = app
        .oneshot(post_json(
            "/api/v1/generations",
            serde_json::json!({
                "user_id": user_id,
                "prompt": "Create a gaming thumbnail with a shocked face",
                "topic": "gaming",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let data = &body["data"];
    assert_eq!(data["status"], "completed");
    assert_eq!(data["credits_used"], 2);
    assert_eq!(data["quality_score"], 75.0);
    assert_eq!(
        data["final_image_url"],
        "https://img.example/raw.png?processed=1"
    );
    assert!(data["error_message"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_records_read_back_identically(pool: PgPool) {
    let user_id = seed_user(&pool, "readback@example.com", 10).await;
    seed_reference(&pool).await;

    let app = test_app(&pool);
    let created = json_body(
        app.clone()
            .oneshot(post_json(
                "/api/v1/generations",
                serde_json::json!({
                    "user_id": user_id,
                    "prompt": "Create a gaming thumbnail with a shocked face",
                }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = created["data"]["id"].as_i64().unwrap();

    let fetched = json_body(
        app.oneshot(get(&format!("/api/v1/generations/{id}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(fetched["data"], created["data"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn short_prompts_are_rejected_before_any_record(pool: PgPool) {
    let user_id = seed_user(&pool, "short@example.com", 10).await;

    let app = test_app(&pool);
    let response = app
        .oneshot(post_json(
            "/api/v1/generations",
            serde_json::json!({ "user_id": user_id, "prompt": "ab" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_user_is_a_404(pool: PgPool) {
    let app = test_app(&pool);
    let response = app
        .oneshot(post_json(
            "/api/v1/generations",
            serde_json::json!({ "user_id": 9999, "prompt": "a valid prompt" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn insufficient_credits_yield_a_failed_record(pool: PgPool) {
    let user_id = seed_user(&pool, "broke@example.com", 1).await;
    seed_reference(&pool).await;

    let app = test_app(&pool);
    let response = app
        .oneshot(post_json(
            "/api/v1/generations",
            serde_json::json!({
                "user_id": user_id,
                "prompt": "Create a gaming thumbnail with a shocked face",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let data = &body["data"];
    assert_eq!(data["status"], "failed");
    assert_eq!(data["credits_used"], 0);
    assert!(data["error_message"]
        .as_str()
        .unwrap()
        .contains("Insufficient credits"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn credits_endpoint_reports_balance_and_history(pool: PgPool) {
    let user_id = seed_user(&pool, "ledger@example.com", 10).await;

    let app = test_app(&pool);
    let response = app
        .oneshot(get(&format!("/api/v1/users/{user_id}/credits")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["balance"], 10);
    assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn references_endpoint_lists_active_catalog(pool: PgPool) {
    seed_reference(&pool).await;

    let app = test_app(&pool);
    let response = app
        .oneshot(get("/api/v1/references?style=gaming"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let references = body["data"].as_array().unwrap();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0]["title"], "shocked-gamer");
}
