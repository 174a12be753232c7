use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query},
    http::{Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use svckit_common_log::Logger;
use svckit_http::config::AuthConfig;
use svckit_http::error::ApiResult;
use svckit_http::middleware::auth::{issue_token, Auth, AuthLayer, JwtTokenDecoder, MaybeAuth};
use svckit_http::request::{path_uuid, Pagination, ValidatedJson};
use tower::ServiceExt;
use validator::Validate;

const SECRET: &str = "integration-secret-that-is-32-chars!";

#[derive(Debug, Deserialize, Validate)]
struct CreateOrder {
    #[validate(length(min = 1))]
    book_id: String,
    #[validate(range(min = 1, max = 10))]
    quantity: u32,
}

async fn whoami(Auth(user): Auth) -> Json<Value> {
    Json(json!({ "userId": user.user_id }))
}

async fn create_order(
    Auth(user): Auth,
    ValidatedJson(order): ValidatedJson<CreateOrder>,
) -> Json<Value> {
    Json(json!({ "userId": user.user_id, "bookId": order.book_id, "quantity": order.quantity }))
}

async fn order_detail(
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Value>> {
    let id = path_uuid(&params, "id", None)?;
    let page = Pagination::from_query(&query)?;
    Ok(Json(json!({ "id": id, "limit": page.limit })))
}

async fn greeting(MaybeAuth(user): MaybeAuth) -> String {
    match user {
        Some(user) => format!("hello {}", user.user_id),
        None => "hello stranger".to_string(),
    }
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.into(),
        token_expiry_secs: 600,
    }
}

fn app() -> Router {
    let decoder = Arc::new(JwtTokenDecoder::from_config(&auth_config()));
    let protected = Router::new()
        .route("/me", get(whoami))
        .route("/orders", post(create_order))
        .layer(AuthLayer::new(decoder, Logger::new("auth")));

    Router::new()
        .merge(protected)
        .route("/orders/:id", get(order_detail))
        .route("/greeting", get(greeting))
}

async fn send(req: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn bearer(user_id: &str) -> String {
    format!("Bearer {}", issue_token(user_id, &auth_config()).unwrap())
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let req = Request::get("/me").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_non_bearer_scheme_is_rejected() {
    let req = Request::get("/me")
        .header("Authorization", "Token abc")
        .body(Body::empty())
        .unwrap();

    assert_eq!(send(req).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forged_token_is_rejected() {
    let forged = svckit_http::middleware::auth::encode_token(
        &svckit_http::middleware::auth::Claims::new("intruder", 600),
        "some-other-secret-of-thirty-two-chars",
    )
    .unwrap();
    let req = Request::get("/me")
        .header("Authorization", format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();

    assert_eq!(send(req).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let req = Request::get("/me")
        .header("Authorization", bearer("user-1"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "user-1");
}

#[tokio::test]
async fn test_forwarded_header_is_preferred() {
    let req = Request::get("/me")
        .header("Authorization", bearer("direct"))
        .header("X-Forwarded-Authorization", bearer("gateway-user"))
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(req).await;

    assert_eq!(body["userId"], "gateway-user");
}

#[tokio::test]
async fn test_validated_body_behind_gate() {
    let req = Request::post("/orders")
        .header("Authorization", bearer("user-3"))
        .header("Content-Type", "application/json")
        .body(Body::from(r#"{"book_id":"b-1","quantity":11}"#))
        .unwrap();
    let (status, body) = send(req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["fields"][0]["field"], "quantity");
    assert_eq!(body["error"]["fields"][0]["tag"], "range");

    let req = Request::post("/orders")
        .header("Authorization", bearer("user-3"))
        .body(Body::from(r#"{"book_id":"b-1","quantity":2}"#))
        .unwrap();
    let (status, body) = send(req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "user-3");
    assert_eq!(body["quantity"], 2);
}

#[tokio::test]
async fn test_path_and_query_params() {
    let req = Request::get("/orders/not-a-uuid").body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "invalid param id");

    let id = uuid::Uuid::new_v4();
    let req = Request::get(format!("/orders/{}?limit=-5", id)).body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "invalid query param limit");

    let req = Request::get(format!("/orders/{}", id)).body(Body::empty()).unwrap();
    let (status, body) = send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 30);
}

#[tokio::test]
async fn test_optional_identity_outside_gate() {
    let req = Request::get("/greeting").body(Body::empty()).unwrap();
    let response = app().oneshot(req).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    assert_eq!(&bytes[..], b"hello stranger");
}
