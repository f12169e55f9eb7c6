#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tms_api::auth::jwt::{generate_access_token, JwtConfig};
use tms_api::config::ServerConfig;
use tms_api::router::build_app_router;
use tms_api::state::AppState;
use tms_core::dashboard::HistoryWindow;
use tms_core::rbac::Principal;
use tms_db::models::region::CreateRegion;
use tms_db::models::user::{legacy_role_name, CreateUser, User};
use tms_db::repositories::{RegionRepo, RoleRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        dashboard_window: HistoryWindow::Days(7),
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_region(pool: &PgPool, name: &str) -> i64 {
    RegionRepo::create(
        pool,
        &CreateRegion {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

/// Create a user holding the named seeded role and return it with a signed
/// access token.
pub async fn user_with_role(
    pool: &PgPool,
    role_name: &str,
    region_id: Option<i64>,
) -> (User, String) {
    let role = RoleRepo::find_by_name(pool, role_name)
        .await
        .unwrap()
        .expect("seeded role should exist");
    let slug = legacy_role_name(role_name).to_lowercase();
    let input = CreateUser {
        name: format!("{role_name} user"),
        email: format!("{slug}-{}@test.com", region_id.unwrap_or(0)),
        role_id: role.id,
        region_id,
        location_id: None,
    };
    let user = UserRepo::create(pool, &input, &legacy_role_name(&role.name))
        .await
        .unwrap();
    let token = token_for(&user);
    (user, token)
}

pub fn token_for(user: &User) -> String {
    let principal = Principal {
        user_id: user.id,
        role_id: user.role_id,
        role: user.role.clone(),
        region_id: user.region_id,
        location_id: user.location_id,
    };
    generate_access_token(&principal, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send_json_auth(app, Method::POST, uri, body, token).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send_json_auth(app, Method::PUT, uri, body, token).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json_auth(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
