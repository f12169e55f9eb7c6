use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes, mounted at `/dashboard`.
///
/// ```text
/// GET /    get_dashboard
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard::get_dashboard))
}
