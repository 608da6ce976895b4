//! Router-level checks that never reach the database: auth guard, query
//! validation and request body validation all fail before the first query.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::metrics::HttpMetrics;
use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use service::storage::LocalImageStore;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use server::auth::Claims;
use server::{ServerAuthConfig, ServerState};

const SECRET: &str = "test-secret";

fn app() -> Router {
    let upload_dir = std::env::temp_dir().join(format!("cms-router-{}", std::process::id()));
    let upload_dir = upload_dir.to_string_lossy().to_string();
    let state = ServerState {
        db: DatabaseConnection::default(),
        auth: ServerAuthConfig { jwt_secret: SECRET.into() },
        images: Arc::new(LocalImageStore::new(&upload_dir, "/uploads", 1024 * 1024)),
        metrics: Arc::new(HttpMetrics::new().unwrap()),
    };
    server::routes::build_router(state, CorsLayer::very_permissive(), &upload_dir, 1024 * 1024)
}

fn token(secret: &str) -> String {
    let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
    let claims = Claims { sub: Some("admin".into()), exp, iat: None };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

fn json_request(method: Method, uri: &str, bearer: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let res = app().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, body)
}

#[tokio::test]
async fn health_is_public() {
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_without_token_is_rejected() {
    let (status, body) = send(json_request(Method::POST, "/api/experts", None, json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let bad = token("another-secret");
    let (status, _) = send(json_request(Method::POST, "/api/experts", Some(&bad), json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_in_cookie_is_accepted() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/experts")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("theme=dark; auth_token={}", token(SECRET)))
        .body(Body::from(json!({ "name": "A" }).to_string()))
        .unwrap();
    let (status, _) = send(req).await;
    // past the guard, stopped by body validation
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_expert_body_lists_field_issues() {
    let t = token(SECRET);
    let (status, body) = send(json_request(Method::POST, "/api/experts", Some(&t), json!({ "name": "A", "bio": "short" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"].as_array().unwrap().iter().filter_map(|e| e["field"].as_str()).collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"bio"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let t = token(SECRET);
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/experts")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {t}"))
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn zero_page_is_rejected_before_querying() {
    let req = Request::builder().uri("/api/experts?page=0").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "page");
}

#[tokio::test]
async fn page_past_offset_range_is_rejected() {
    let req = Request::builder().uri("/api/experts?page=18446744073709551615&limit=100").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "page");
}

#[tokio::test]
async fn oversized_limit_is_rejected() {
    let req = Request::builder().uri("/api/partners?limit=101").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "limit");
}

#[tokio::test]
async fn empty_reorder_list_is_rejected() {
    let t = token(SECRET);
    let (status, _) = send(json_request(Method::PUT, "/api/experts/reorder", Some(&t), json!({ "expertIds": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reorder_with_bad_uuid_names_the_position() {
    let t = token(SECRET);
    let body = json!({ "caseStudyIds": ["not-a-uuid"] });
    let (status, body) = send(json_request(Method::PUT, "/api/case-studies/reorder", Some(&t), body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "caseStudyIds[0]");
}

#[tokio::test]
async fn contact_inbox_requires_token() {
    let req = Request::builder().uri("/api/contact-messages").body(Body::empty()).unwrap();
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_requires_token() {
    let req = Request::builder().uri("/api/stats").body(Body::empty()).unwrap();
    let (status, _) = send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_uuid_path_is_bad_request() {
    let req = Request::builder().uri("/api/experts/not-a-uuid").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let req = Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/services"].is_object());
}
