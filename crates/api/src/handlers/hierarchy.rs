//! Handlers for regions, venues and locations.
//!
//! Reads are open to any signed-in user within their region scope. Writes
//! need edit on the settings module; region writes additionally need a
//! global caller, since a region-scoped admin cannot create or remove the
//! region it is scoped to.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tms_core::error::CoreError;
use tms_core::hierarchy::{
    build_tree, ensure_deletable, location_region, validate_name, HierarchyKind, LocationNode,
    RegionNode, RegionTree, VenueNode,
};
use tms_core::rbac::{Action, Authorizer, Module, RegionScope};
use tms_core::types::DbId;
use tms_db::models::location::{CreateLocation, Location};
use tms_db::models::region::{CreateRegion, Region};
use tms_db::models::venue::{CreateVenue, Venue};
use tms_db::repositories::{
    DeleteOutcome, HierarchyRepo, LocationRepo, RegionRepo, VenueRepo,
};
use tms_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NameInput {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VenueInput {
    pub name: String,
    pub region_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct LocationInput {
    pub name: String,
    pub region_id: Option<DbId>,
    /// Set for a drop-off inside this venue; absent for a pickup.
    pub venue_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct EndpointsQuery {
    pub region_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/hierarchy
///
/// Regions with their venues, drop-offs and pickup locations.
pub async fn get_hierarchy(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<RegionTree>>>> {
    let region_id = user.principal.scope().region_id();
    let tree = load_tree(&state.pool, region_id).await?;
    Ok(Json(DataResponse { data: tree }))
}

/// GET /api/v1/hierarchy/endpoints?region_id=
///
/// The selectable origins and destinations for a trip in one region.
pub async fn get_endpoints(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<EndpointsQuery>,
) -> AppResult<Json<DataResponse<RegionTree>>> {
    let region_id = user
        .principal
        .scope()
        .pin(params.region_id)?
        .ok_or_else(|| CoreError::Validation("region_id is required".to_string()))?;

    let tree = load_tree(&state.pool, Some(region_id))
        .await?
        .into_iter()
        .next()
        .ok_or(CoreError::NotFound {
            entity: "Region",
            id: region_id,
        })?;
    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// Regions
// ---------------------------------------------------------------------------

/// POST /api/v1/regions
pub async fn create_region(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(input): Json<NameInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Region>>)> {
    require_global_settings(&authz)?;
    let name = validate_name(HierarchyKind::Region, &input.name)?;

    let region = RegionRepo::create(&state.pool, &CreateRegion { name }).await?;
    tracing::info!(region_id = region.id, name = %region.name, "Region created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: region })))
}

/// PUT /api/v1/regions/{id}
pub async fn rename_region(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(input): Json<NameInput>,
) -> AppResult<Json<DataResponse<Region>>> {
    require_global_settings(&authz)?;
    let name = validate_name(HierarchyKind::Region, &input.name)?;

    let region = RegionRepo::rename(&state.pool, id, &name)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Region",
            id,
        })?;
    Ok(Json(DataResponse { data: region }))
}

/// DELETE /api/v1/regions/{id}
///
/// Rejected while trips carry the region; otherwise removes its venues,
/// their drop-offs and its pickups, then the region.
pub async fn delete_region(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    require_global_settings(&authz)?;
    delete_entity(&state.pool, HierarchyKind::Region, id).await
}

// ---------------------------------------------------------------------------
// Venues
// ---------------------------------------------------------------------------

/// POST /api/v1/venues
pub async fn create_venue(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(input): Json<VenueInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Venue>>)> {
    authz.require(Module::Settings, Action::Edit)?;
    let name = validate_name(HierarchyKind::Venue, &input.name)?;
    let region_id = authz
        .scope()
        .pin(input.region_id)?
        .ok_or_else(|| CoreError::Validation("A venue requires a region".to_string()))?;

    let venue = VenueRepo::create(&state.pool, &CreateVenue { name, region_id }).await?;
    tracing::info!(venue_id = venue.id, region_id, "Venue created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: venue })))
}

/// PUT /api/v1/venues/{id}
pub async fn rename_venue(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(input): Json<NameInput>,
) -> AppResult<Json<DataResponse<Venue>>> {
    authz.require(Module::Settings, Action::Edit)?;
    let name = validate_name(HierarchyKind::Venue, &input.name)?;
    let existing = find_venue(&state.pool, id).await?;
    authz.scope().ensure(Some(existing.region_id))?;

    let venue = VenueRepo::rename(&state.pool, id, &name)
        .await?
        .ok_or(CoreError::NotFound { entity: "Venue", id })?;
    Ok(Json(DataResponse { data: venue }))
}

/// DELETE /api/v1/venues/{id}
pub async fn delete_venue(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz.require(Module::Settings, Action::Edit)?;
    let existing = find_venue(&state.pool, id).await?;
    authz.scope().ensure(Some(existing.region_id))?;

    delete_entity(&state.pool, HierarchyKind::Venue, id).await
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// POST /api/v1/locations
///
/// With a `venue_id` the location is a drop-off and takes the venue's
/// region; without one it is a pickup and needs a region.
pub async fn create_location(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(input): Json<LocationInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Location>>)> {
    authz.require(Module::Settings, Action::Edit)?;
    let name = validate_name(HierarchyKind::Location, &input.name)?;

    let venue = match input.venue_id {
        Some(id) => Some(VenueNode::from(find_venue(&state.pool, id).await?)),
        None => None,
    };
    let requested = match (&venue, authz.scope()) {
        // A drop-off for a global caller follows its venue.
        (Some(_), RegionScope::Global) => input.region_id,
        _ => authz.scope().pin(input.region_id)?,
    };
    let region_id = location_region(venue.as_ref(), requested)?;
    authz.scope().ensure(Some(region_id))?;

    let location = LocationRepo::create(
        &state.pool,
        &CreateLocation {
            name,
            region_id: Some(region_id),
            venue_id: input.venue_id,
        },
    )
    .await?;
    tracing::info!(
        location_id = location.id,
        region_id,
        venue_id = ?location.venue_id,
        "Location created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: location })))
}

/// PUT /api/v1/locations/{id}
pub async fn rename_location(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(input): Json<NameInput>,
) -> AppResult<Json<DataResponse<Location>>> {
    authz.require(Module::Settings, Action::Edit)?;
    let name = validate_name(HierarchyKind::Location, &input.name)?;
    let existing = find_location(&state.pool, id).await?;
    authz.scope().ensure(existing.region_id)?;

    let location = LocationRepo::rename(&state.pool, id, &name)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Location",
            id,
        })?;
    Ok(Json(DataResponse { data: location }))
}

/// DELETE /api/v1/locations/{id}
pub async fn delete_location(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz.require(Module::Settings, Action::Edit)?;
    let existing = find_location(&state.pool, id).await?;
    authz.scope().ensure(existing.region_id)?;

    delete_entity(&state.pool, HierarchyKind::Location, id).await
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn require_global_settings(authz: &Authorizer) -> AppResult<()> {
    authz.require(Module::Settings, Action::Edit)?;
    if authz.scope() != RegionScope::Global {
        return Err(CoreError::forbidden().into());
    }
    Ok(())
}

async fn find_venue(pool: &DbPool, id: DbId) -> AppResult<Venue> {
    Ok(VenueRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Venue", id })?)
}

async fn find_location(pool: &DbPool, id: DbId) -> AppResult<Location> {
    Ok(LocationRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Location",
            id,
        })?)
}

/// Run a guarded delete and map its outcome.
async fn delete_entity(pool: &DbPool, kind: HierarchyKind, id: DbId) -> AppResult<StatusCode> {
    match HierarchyRepo::delete(pool, kind, id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: kind.entity_name(),
            id,
        })),
        DeleteOutcome::Blocked { referencing_trips } => {
            ensure_deletable(kind, referencing_trips)?;
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

async fn load_tree(pool: &DbPool, region_id: Option<DbId>) -> AppResult<Vec<RegionTree>> {
    let regions = RegionRepo::list(pool, region_id).await?;
    let venues = VenueRepo::list(pool, region_id).await?;
    let locations = LocationRepo::list(pool, region_id).await?;

    Ok(build_tree(
        regions.into_iter().map(RegionNode::from).collect(),
        venues.into_iter().map(VenueNode::from).collect(),
        locations.into_iter().map(LocationNode::from).collect(),
    ))
}
