use axum::routing::get;
use axum::Router;

use crate::handlers::people;
use crate::state::AppState;

/// Vehicle routes, mounted at `/vehicles`.
pub fn vehicle_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(people::list_vehicles).post(people::create_vehicle),
    )
}

/// Volunteer and driver profile routes, mounted at `/profiles`.
pub fn profile_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(people::list_profiles).post(people::create_profile),
    )
}
