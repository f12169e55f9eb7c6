//! Route definitions for roles.
//!
//! ```text
//! GET    /                     list_roles
//! POST   /                     create_role
//! DELETE /{id}                 delete_role
//! GET    /{id}/permissions     get_permissions
//! PUT    /{id}/permissions     replace_permissions
//! ```

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::roles;
use crate::state::AppState;

/// Role routes, mounted at `/roles`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(roles::list_roles).post(roles::create_role))
        .route("/{id}", delete(roles::delete_role))
        .route(
            "/{id}/permissions",
            get(roles::get_permissions).put(roles::replace_permissions),
        )
}
