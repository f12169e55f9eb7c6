use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tms_core::error::CoreError;

/// Message returned when a delete trips a foreign key the pre-check did not
/// catch.
pub const FOREIGN_KEY_FALLBACK: &str = "Cannot delete: this item contains active trips or is \
                                        protected by critical system data.";

/// Message for a write referencing a row that does not exist.
pub const DANGLING_REFERENCE_MESSAGE: &str = "A referenced record does not exist.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tms_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::InUse(msg) => {
                    tracing::warn!(reason = %msg, "Delete rejected by reference check");
                    (StatusCode::CONFLICT, "IN_USE", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// User-facing message for a unique constraint violation.
pub fn duplicate_message(constraint: &str) -> String {
    match constraint {
        "uq_regions_name" => "Region name already exists".to_string(),
        "uq_trip_statuses_name" => "Status name already exists".to_string(),
        "uq_trip_sub_statuses_name" => "Sub-status name already exists".to_string(),
        "uq_users_email" | "uq_profiles_email" => "Email already exists".to_string(),
        "uq_vehicles_registration" => "Vehicle registration already exists".to_string(),
        "uq_roles_name" => "Role already exists".to_string(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Foreign key violations on insert or update map to 400 with
///   [`DANGLING_REFERENCE_MESSAGE`]; on delete they map to 409 with
///   [`FOREIGN_KEY_FALLBACK`].
/// - Check constraint violations map to 400.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        duplicate_message(constraint),
                    );
                }
                // PostgreSQL foreign key violation raised by an insert or
                // update: the row points at something that does not exist.
                Some("23503") if db_err.message().starts_with("insert or update") => {
                    tracing::warn!(constraint, "Dangling reference on write");
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        DANGLING_REFERENCE_MESSAGE.to_string(),
                    );
                }
                // PostgreSQL foreign key violation
                Some("23503") => {
                    tracing::warn!(constraint, "Foreign key violation");
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        FOREIGN_KEY_FALLBACK.to_string(),
                    );
                }
                // PostgreSQL check violation
                Some("23514") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        "VALIDATION_ERROR",
                        format!("Value violates constraint: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
