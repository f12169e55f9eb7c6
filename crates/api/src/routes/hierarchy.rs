//! Route definitions for the region, venue and location hierarchy.
//!
//! ```text
//! HIERARCHY (read):
//! GET    /                   get_hierarchy
//! GET    /endpoints          get_endpoints
//!
//! REGIONS:
//! POST   /                   create_region
//! PUT    /{id}               rename_region
//! DELETE /{id}               delete_region
//!
//! VENUES:
//! POST   /                   create_venue
//! PUT    /{id}               rename_venue
//! DELETE /{id}               delete_venue
//!
//! LOCATIONS:
//! POST   /                   create_location
//! PUT    /{id}               rename_location
//! DELETE /{id}               delete_location
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::hierarchy;
use crate::state::AppState;

/// Read routes, mounted at `/hierarchy`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hierarchy::get_hierarchy))
        .route("/endpoints", get(hierarchy::get_endpoints))
}

/// Region routes, mounted at `/regions`.
pub fn region_router() -> Router<AppState> {
    Router::new()
        .route("/", post(hierarchy::create_region))
        .route(
            "/{id}",
            put(hierarchy::rename_region).delete(hierarchy::delete_region),
        )
}

/// Venue routes, mounted at `/venues`.
pub fn venue_router() -> Router<AppState> {
    Router::new()
        .route("/", post(hierarchy::create_venue))
        .route(
            "/{id}",
            put(hierarchy::rename_venue).delete(hierarchy::delete_venue),
        )
}

/// Location routes, mounted at `/locations`.
pub fn location_router() -> Router<AppState> {
    Router::new()
        .route("/", post(hierarchy::create_location))
        .route(
            "/{id}",
            put(hierarchy::rename_location).delete(hierarchy::delete_location),
        )
}
