pub mod dashboard;
pub mod health;
pub mod hierarchy;
pub mod me;
pub mod people;
pub mod roles;
pub mod settings;
pub mod statuses;
pub mod trips;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Every route requires a bearer token.
///
/// ```text
/// /me/permissions                      caller's resolved matrix
///
/// /dashboard                           dashboard view (history_days, status, q)
///
/// /trips                               list, create
/// /trips/{id}                          get, full edit, delete
/// /trips/{id}/progress                 quick status progression (POST)
/// /trips/{id}/details                  quick details (POST)
/// /trips/{id}/history                  status history
/// /my-location/trips                   trips touching the caller's location
///
/// /hierarchy                           region tree
/// /hierarchy/endpoints                 endpoint options for one region
/// /regions, /venues, /locations        create
/// /regions/{id}, /venues/{id}, ...     rename, guarded delete
///
/// /statuses, /sub-statuses             list, create
/// /statuses/{id}, /sub-statuses/{id}   update, delete
///
/// /roles                               list, create
/// /roles/{id}                          delete
/// /roles/{id}/permissions              get, replace matrix
///
/// /users                               list, create
/// /users/{id}                          update, delete
///
/// /vehicles                            list, create
/// /profiles                            list, create
///
/// /settings/timezone                   get, set
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/me", me::router())
        .nest("/dashboard", dashboard::router())
        // Trips and the location-scoped board.
        .nest("/trips", trips::router())
        .nest("/my-location", trips::my_location_router())
        // Region / venue / location hierarchy.
        .nest("/hierarchy", hierarchy::router())
        .nest("/regions", hierarchy::region_router())
        .nest("/venues", hierarchy::venue_router())
        .nest("/locations", hierarchy::location_router())
        // Status catalog.
        .nest("/statuses", statuses::status_router())
        .nest("/sub-statuses", statuses::sub_status_router())
        // Access control.
        .nest("/roles", roles::router())
        .nest("/users", users::router())
        // People and vehicles.
        .nest("/vehicles", people::vehicle_router())
        .nest("/profiles", people::profile_router())
        .nest("/settings", settings::router())
}
