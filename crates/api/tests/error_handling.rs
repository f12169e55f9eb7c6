//! Tests for `AppError` to HTTP response mapping.
//!
//! Most call `IntoResponse` directly and need no server or database; the
//! constraint mapping tests provoke real PostgreSQL errors.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tms_api::error::{duplicate_message, AppError, DANGLING_REFERENCE_MESSAGE};
use tms_core::error::CoreError;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Core errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Trip",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Trip with id 42 not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation(
        "Passengers boarded must be greater than 0 for status 'Active'".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn forbidden_error_uses_fixed_message() {
    let (status, json) = error_to_response(AppError::Core(CoreError::forbidden())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["code"], "FORBIDDEN");
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn in_use_error_returns_409() {
    let err = AppError::Core(CoreError::InUse(
        "Region is used by 3 trip(s) and cannot be deleted".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "IN_USE");
}

#[tokio::test]
async fn unauthorized_error_returns_401() {
    let err = AppError::Core(CoreError::Unauthorized("Missing Authorization header".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn internal_error_hides_details() {
    let err = AppError::InternalError("pool exhausted at 10.0.0.3".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dangling_foreign_key_on_insert_returns_400(pool: PgPool) {
    let err = sqlx::query(
        "INSERT INTO trips (route_code, start_time, end_time, driver_id)
         VALUES ('R1', NOW(), NOW(), 999999)",
    )
    .execute(&pool)
    .await
    .unwrap_err();

    let (status, json) = error_to_response(AppError::Database(err)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], DANGLING_REFERENCE_MESSAGE);
}

// ---------------------------------------------------------------------------
// Duplicate messages
// ---------------------------------------------------------------------------

#[test]
fn duplicate_messages_name_the_entity() {
    assert_eq!(duplicate_message("uq_regions_name"), "Region name already exists");
    assert_eq!(duplicate_message("uq_users_email"), "Email already exists");
    assert_eq!(
        duplicate_message("uq_something_else"),
        "Duplicate value violates unique constraint: uq_something_else"
    );
}
