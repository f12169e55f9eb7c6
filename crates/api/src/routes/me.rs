use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Caller self-description routes, mounted at `/me`.
pub fn router() -> Router<AppState> {
    Router::new().route("/permissions", get(me::my_permissions))
}
