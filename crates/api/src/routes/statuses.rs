//! Route definitions for the status catalog.
//!
//! ```text
//! STATUSES:
//! GET    /          list_statuses
//! POST   /          create_status
//! PUT    /{id}      update_status
//! DELETE /{id}      delete_status
//!
//! SUB-STATUSES:
//! GET    /          list_sub_statuses
//! POST   /          create_sub_status
//! PUT    /{id}      update_sub_status
//! DELETE /{id}      delete_sub_status
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::statuses;
use crate::state::AppState;

/// Status routes, mounted at `/statuses`.
pub fn status_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(statuses::list_statuses).post(statuses::create_status),
        )
        .route(
            "/{id}",
            put(statuses::update_status).delete(statuses::delete_status),
        )
}

/// Sub-status routes, mounted at `/sub-statuses`.
pub fn sub_status_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(statuses::list_sub_statuses).post(statuses::create_sub_status),
        )
        .route(
            "/{id}",
            put(statuses::update_sub_status).delete(statuses::delete_sub_status),
        )
}
