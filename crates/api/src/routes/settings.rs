use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Settings routes, mounted at `/settings`.
///
/// ```text
/// GET /timezone    get_timezone
/// PUT /timezone    set_timezone
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/timezone",
        get(settings::get_timezone).put(settings::set_timezone),
    )
}
