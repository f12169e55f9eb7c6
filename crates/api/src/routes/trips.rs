//! Route definitions for trips.
//!
//! ```text
//! GET    /                   list_trips
//! POST   /                   create_trip
//! GET    /{id}               get_trip
//! PUT    /{id}               update_trip
//! DELETE /{id}               delete_trip
//! POST   /{id}/progress      progress_trip
//! POST   /{id}/details       update_trip_details
//! GET    /{id}/history       trip_history
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::trips;
use crate::state::AppState;

/// Trip routes, mounted at `/trips`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(trips::list_trips).post(trips::create_trip))
        .route(
            "/{id}",
            get(trips::get_trip)
                .put(trips::update_trip)
                .delete(trips::delete_trip),
        )
        .route("/{id}/progress", post(trips::progress_trip))
        .route("/{id}/details", post(trips::update_trip_details))
        .route("/{id}/history", get(trips::trip_history))
}

/// Location-scoped trip board, mounted at `/my-location`.
pub fn my_location_router() -> Router<AppState> {
    Router::new().route("/trips", get(trips::my_location_trips))
}
