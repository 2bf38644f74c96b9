//! Router tests that never reach the database: the pool is lazy and every
//! request here is answered before a connection is needed.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use moodtrack::{app, AppState, Settings, MAX_BODY_BYTES};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use tower::ServiceExt;

fn state() -> AppState {
    let vars: HashMap<String, String> = [("DATABASE_URL", "postgres://localhost:1/moodtrack_unreachable")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let settings = Settings::from_vars(vars).unwrap();
    let pool = PgPoolOptions::new().connect_lazy(&settings.db.url).unwrap();
    AppState::new(pool, settings)
}

async fn json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_and_version() {
    let res = app(state())
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(res.into_body()).await["status"], "ok");

    let res = app(state())
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res.into_body()).await;
    assert_eq!(body["name"], "moodtrack");
    assert_eq!(body["environment"], "development");
}

#[tokio::test]
async fn api_requires_user_header() {
    let res = app(state())
        .oneshot(Request::get("/v1/daylogs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json(res.into_body()).await;
    assert_eq!(body["error"]["code"], "unauthorized");

    let res = app(state())
        .oneshot(
            Request::get("/v1/tags")
                .header("X-User-Id", "not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let res = app(state())
        .oneshot(Request::get("/v2/daylogs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let body = vec![b' '; MAX_BODY_BYTES + 1];
    let res = app(state())
        .oneshot(
            Request::post("/v1/users/activate")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn registration_is_validated_before_touching_the_database() {
    let res = app(state())
        .oneshot(
            Request::post("/v1/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name": "", "email": "nope", "phone": "555"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json(res.into_body()).await;
    assert_eq!(body["error"]["code"], "validation_error");
    let details = &body["error"]["details"];
    assert!(details["name"].is_string());
    assert!(details["email"].is_string());
    assert!(details["password"].is_string());
}

#[tokio::test]
async fn account_deletion_requires_user_header() {
    let res = app(state())
        .oneshot(Request::delete("/v1/users/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
