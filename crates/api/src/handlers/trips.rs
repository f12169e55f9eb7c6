//! Handlers for the `/trips` resource.
//!
//! Every mutation runs the same pipeline: permission check, region scope,
//! endpoint resolution, status validation, then the repository write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tms_core::dashboard::StatusFilter;
use tms_core::error::CoreError;
use tms_core::hierarchy::{
    resolve_endpoint, Endpoint, EndpointSelection, EndpointSide, LocationNode, VenueNode,
};
use tms_core::rbac::{Action, Authorizer, Module};
use tms_core::search::SearchQuery;
use tms_core::trip_status::{
    validate_transition, ProgressPath, ProgressRequest, DEFAULT_STATUS, DEFAULT_SUB_STATUS,
};
use tms_core::types::{DbId, Timestamp};
use tms_db::models::trip::{
    Trip, TripChange, TripDetail, TripFilter, TripQuickDetails, TripStatusHistory, TripWrite,
};
use tms_db::repositories::{
    LocationRepo, ProfileRepo, TripRepo, TripStatusHistoryRepo, TripStatusRepo, VehicleRepo,
    VenueRepo,
};
use tms_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::Authorized;
use crate::query::{PaginationParams, SearchParams};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

/// Modules whose view permission opens trip reads.
const VIEW_MODULES: [Module; 2] = [Module::Trips, Module::Dashboard];
/// Modules whose edit permission opens trip create and full edit.
const EDIT_MODULES: [Module; 2] = [Module::Trips, Module::Dashboard];
/// Modules whose edit permission opens progress and quick detail updates.
const PROGRESS_MODULES: [Module; 3] = [Module::TripTracking, Module::Trips, Module::Dashboard];

/// Request body for create and full edit.
#[derive(Debug, Deserialize)]
pub struct TripInput {
    pub route_code: String,
    pub region_id: Option<DbId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(default)]
    pub origin: EndpointSelection,
    #[serde(default)]
    pub destination: EndpointSelection,
    pub vehicle_id: Option<DbId>,
    pub volunteer_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub status: Option<String>,
    pub sub_status: Option<String>,
    pub breakdown_issue: Option<String>,
    #[serde(default)]
    pub passengers_boarded: i32,
    #[serde(default)]
    pub wheelchairs_boarded: i32,
    pub notes: Option<String>,
}

/// Request body for `POST /trips/{id}/details`.
#[derive(Debug, Deserialize)]
pub struct QuickDetailsInput {
    pub volunteer_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub vehicle_registration: Option<String>,
    #[serde(default)]
    pub passengers_boarded: i32,
    #[serde(default)]
    pub wheelchairs_boarded: i32,
    pub notes: Option<String>,
}

/// GET /api/v1/trips
///
/// Paginated, region-scoped listing with status filter and multi-term search.
pub async fn list_trips(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Query(page): Query<PaginationParams>,
    Query(search): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Page<TripDetail>>>> {
    authz.require_any(&VIEW_MODULES, Action::View)?;

    let filter = TripFilter {
        region_id: authz.scope().region_id(),
        statuses: StatusFilter::parse(search.status.as_deref())
            .statuses()
            .to_vec(),
        search_patterns: SearchQuery::parse(search.q.as_deref()).like_patterns(),
        window_cutoff: None,
    };
    let (limit, offset) = (page.limit(), page.offset());

    let rows = TripRepo::list(&state.pool, &filter, limit, offset).await?;
    let total = TripRepo::count(&state.pool, &filter).await?;
    let items = TripRepo::resolve(&state.pool, rows).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// POST /api/v1/trips
///
/// Status defaults to Planned / Scheduled when omitted. The initial history
/// row is written with the trip.
pub async fn create_trip(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(input): Json<TripInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Trip>>)> {
    authz.require_any(&EDIT_MODULES, Action::Edit)?;

    let region_id = authz.scope().pin(input.region_id)?;
    let write = prepare_write(&state.pool, &input, region_id).await?;
    let trip = TripRepo::create(&state.pool, &write, Some(authz.principal.user_id)).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: trip })))
}

/// GET /api/v1/trips/{id}
pub async fn get_trip(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TripDetail>>> {
    authz.require_any(&VIEW_MODULES, Action::View)?;

    let detail = TripRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Trip", id })?;
    authz.scope().ensure(detail.row.trip.region_id)?;

    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/trips/{id}
///
/// Full edit. Applies the passenger-count gate; appends history only when
/// the status fields change.
pub async fn update_trip(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(input): Json<TripInput>,
) -> AppResult<Json<DataResponse<TripChange>>> {
    authz.require_any(&EDIT_MODULES, Action::Edit)?;
    load_scoped(&state.pool, &authz, id).await?;

    let region_id = authz.scope().pin(input.region_id)?;
    let write = prepare_write(&state.pool, &input, region_id).await?;
    let change = TripRepo::update_full(&state.pool, id, &write, Some(authz.principal.user_id))
        .await?
        .ok_or(CoreError::NotFound { entity: "Trip", id })?;

    Ok(Json(DataResponse { data: change }))
}

/// DELETE /api/v1/trips/{id}
///
/// Removes the trip and its history rows.
pub async fn delete_trip(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz.require(Module::Trips, Action::Edit)?;
    load_scoped(&state.pool, &authz, id).await?;

    if TripRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Trip", id }))
    }
}

/// POST /api/v1/trips/{id}/progress
///
/// Quick status update. Validates the status and sub-status pair but not the
/// passenger-count gate. Repeating the current status logs nothing.
pub async fn progress_trip(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(request): Json<ProgressRequest>,
) -> AppResult<Json<DataResponse<TripChange>>> {
    authz.require_any(&PROGRESS_MODULES, Action::Edit)?;
    let trip = load_scoped(&state.pool, &authz, id).await?;

    let catalog = TripStatusRepo::load_catalog(&state.pool).await?;
    let next = validate_transition(
        &catalog,
        ProgressPath::Quick,
        &request,
        trip.passengers_boarded,
    )?;

    let change = TripRepo::apply_progress(&state.pool, id, &next, Some(authz.principal.user_id))
        .await?
        .ok_or(CoreError::NotFound { entity: "Trip", id })?;

    Ok(Json(DataResponse { data: change }))
}

/// POST /api/v1/trips/{id}/details
///
/// People, vehicle, counts and notes. An unknown vehicle registration is
/// registered on the fly.
pub async fn update_trip_details(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(input): Json<QuickDetailsInput>,
) -> AppResult<Json<DataResponse<Trip>>> {
    authz.require_any(&PROGRESS_MODULES, Action::Edit)?;
    load_scoped(&state.pool, &authz, id).await?;
    validate_counts(input.passengers_boarded, input.wheelchairs_boarded)?;
    ensure_people_exist(&state.pool, input.volunteer_id, input.driver_id).await?;

    let details = TripQuickDetails {
        volunteer_id: input.volunteer_id,
        driver_id: input.driver_id,
        vehicle_registration: non_empty(input.vehicle_registration),
        passengers_boarded: input.passengers_boarded,
        wheelchairs_boarded: input.wheelchairs_boarded,
        notes: non_empty(input.notes),
    };
    let trip = TripRepo::quick_update_details(&state.pool, id, &details)
        .await?
        .ok_or(CoreError::NotFound { entity: "Trip", id })?;

    Ok(Json(DataResponse { data: trip }))
}

/// GET /api/v1/trips/{id}/history
pub async fn trip_history(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TripStatusHistory>>>> {
    authz.require_any(&VIEW_MODULES, Action::View)?;
    load_scoped(&state.pool, &authz, id).await?;

    let history = TripStatusHistoryRepo::list_for_trip(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/my-location/trips
///
/// Trips starting or ending at the caller's assigned location.
pub async fn my_location_trips(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<TripDetail>>>> {
    let location_id = user.principal.location_id.ok_or_else(|| {
        CoreError::Validation("No location is assigned to this user".to_string())
    })?;

    let rows = TripRepo::list_for_location(&state.pool, location_id).await?;
    let trips = TripRepo::resolve(&state.pool, rows).await?;
    Ok(Json(DataResponse { data: trips }))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Load a trip and check the caller's region scope covers it.
async fn load_scoped(pool: &DbPool, authz: &Authorizer, id: DbId) -> AppResult<Trip> {
    let trip = TripRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Trip", id })?;
    authz.scope().ensure(trip.region_id)?;
    Ok(trip)
}

/// Validate a create/edit body into the values to persist.
async fn prepare_write(
    pool: &DbPool,
    input: &TripInput,
    region_id: Option<DbId>,
) -> AppResult<TripWrite> {
    let route_code = input.route_code.trim();
    if route_code.is_empty() {
        return Err(CoreError::Validation("Route code is required".to_string()).into());
    }
    if input.end_time < input.start_time {
        return Err(
            CoreError::Validation("End time must not be before start time".to_string()).into(),
        );
    }
    validate_counts(input.passengers_boarded, input.wheelchairs_boarded)?;
    ensure_people_exist(pool, input.volunteer_id, input.driver_id).await?;
    if let Some(vehicle_id) = input.vehicle_id {
        if VehicleRepo::find_by_id(pool, vehicle_id).await?.is_none() {
            return Err(CoreError::Validation(format!(
                "Vehicle {vehicle_id} does not exist"
            ))
            .into());
        }
    }

    let origin = resolve_side(pool, EndpointSide::Origin, input.origin, region_id).await?;
    let destination =
        resolve_side(pool, EndpointSide::Destination, input.destination, region_id).await?;

    // A trip created without a status starts as Planned / Scheduled.
    let request = match input.status.as_deref().map(str::trim) {
        Some(status) if !status.is_empty() => ProgressRequest {
            status: status.to_string(),
            sub_status: input.sub_status.clone(),
            breakdown_issue: input.breakdown_issue.clone(),
        },
        _ => ProgressRequest {
            status: DEFAULT_STATUS.to_string(),
            sub_status: Some(DEFAULT_SUB_STATUS.to_string()),
            breakdown_issue: input.breakdown_issue.clone(),
        },
    };
    let catalog = TripStatusRepo::load_catalog(pool).await?;
    let status = validate_transition(
        &catalog,
        ProgressPath::FullEdit,
        &request,
        input.passengers_boarded,
    )?;

    Ok(TripWrite {
        route_code: route_code.to_string(),
        region_id,
        start_time: input.start_time,
        end_time: input.end_time,
        origin,
        destination,
        vehicle_id: input.vehicle_id,
        volunteer_id: input.volunteer_id,
        driver_id: input.driver_id,
        status,
        passengers_boarded: input.passengers_boarded,
        wheelchairs_boarded: input.wheelchairs_boarded,
        notes: non_empty(input.notes.clone()),
    })
}

/// Reject volunteer or driver IDs that point at no profile.
async fn ensure_people_exist(
    pool: &DbPool,
    volunteer_id: Option<DbId>,
    driver_id: Option<DbId>,
) -> AppResult<()> {
    for (role, id) in [("Volunteer", volunteer_id), ("Driver", driver_id)] {
        let Some(id) = id else { continue };
        if ProfileRepo::find_by_id(pool, id).await?.is_none() {
            return Err(CoreError::Validation(format!("{role} {id} does not exist")).into());
        }
    }
    Ok(())
}

/// Look up the submitted venue and location, then resolve the endpoint.
async fn resolve_side(
    pool: &DbPool,
    side: EndpointSide,
    selection: EndpointSelection,
    region_id: Option<DbId>,
) -> AppResult<Option<Endpoint>> {
    let venue = match selection.venue_id {
        Some(id) => VenueRepo::find_by_id(pool, id).await?.map(VenueNode::from),
        None => None,
    };
    let location = match selection.location_id {
        Some(id) => LocationRepo::find_by_id(pool, id)
            .await?
            .map(LocationNode::from),
        None => None,
    };
    Ok(resolve_endpoint(
        side,
        selection,
        region_id,
        venue.as_ref(),
        location.as_ref(),
    )?)
}

fn validate_counts(passengers: i32, wheelchairs: i32) -> AppResult<()> {
    if passengers < 0 || wheelchairs < 0 {
        return Err(CoreError::Validation(
            "Passenger and wheelchair counts must not be negative".to_string(),
        )
        .into());
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_drops_blank() {
        assert_eq!(non_empty(Some("  KA-01 ".into())), Some("KA-01".into()));
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(validate_counts(0, 0).is_ok());
        assert!(validate_counts(-1, 0).is_err());
        assert!(validate_counts(3, -2).is_err());
    }
}
