//! Handlers for the trip status catalog (`/statuses`, `/sub-statuses`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tms_core::error::CoreError;
use tms_core::rbac::{Action, Module};
use tms_core::trip_status::{validate_status_name, OrphanReport};
use tms_core::types::DbId;
use tms_db::models::trip_status::{
    CreateTripStatus, CreateTripSubStatus, TripStatus, TripSubStatus, UpdateTripStatus,
    UpdateTripSubStatus,
};
use tms_db::repositories::{StatusUpdate, TripStatusRepo, TripSubStatusRepo};
use tms_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// GET /api/v1/statuses
pub async fn list_statuses(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<Vec<TripStatus>>>> {
    authz.require(Module::Settings, Action::View)?;
    let statuses = TripStatusRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: statuses }))
}

/// POST /api/v1/statuses
pub async fn create_status(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(mut input): Json<CreateTripStatus>,
) -> AppResult<(StatusCode, Json<DataResponse<TripStatus>>)> {
    authz.require(Module::Settings, Action::Edit)?;
    input.name = validate_status_name(&input.name)?;

    let status = TripStatusRepo::create(&state.pool, &input).await?;
    tracing::info!(status_id = status.id, name = %status.name, "Trip status created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: status })))
}

/// PUT /api/v1/statuses/{id}
///
/// A changed name is carried over to linked sub-statuses and to trips in
/// the same transaction.
pub async fn update_status(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateTripStatus>,
) -> AppResult<Json<DataResponse<StatusUpdate>>> {
    authz.require(Module::Settings, Action::Edit)?;
    if let Some(name) = input.name.as_deref() {
        input.name = Some(validate_status_name(name)?);
    }

    let update = TripStatusRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TripStatus",
            id,
        })?;
    Ok(Json(DataResponse { data: update }))
}

/// DELETE /api/v1/statuses/{id}
///
/// Never blocked by trips. Returns what the delete left orphaned.
pub async fn delete_status(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrphanReport>>> {
    authz.require(Module::Settings, Action::Edit)?;

    let report = TripStatusRepo::delete(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TripStatus",
            id,
        })?;
    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Sub-statuses
// ---------------------------------------------------------------------------

/// GET /api/v1/sub-statuses
pub async fn list_sub_statuses(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<Vec<TripSubStatus>>>> {
    authz.require(Module::Settings, Action::View)?;
    let sub_statuses = TripSubStatusRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sub_statuses }))
}

/// POST /api/v1/sub-statuses
pub async fn create_sub_status(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(mut input): Json<CreateTripSubStatus>,
) -> AppResult<(StatusCode, Json<DataResponse<TripSubStatus>>)> {
    authz.require(Module::Settings, Action::Edit)?;
    input.name = validate_status_name(&input.name)?;
    input.linked_status = require_known_status(&state.pool, &input.linked_status).await?;

    let sub_status = TripSubStatusRepo::create(&state.pool, &input).await?;
    tracing::info!(
        sub_status_id = sub_status.id,
        name = %sub_status.name,
        linked_status = %sub_status.linked_status,
        "Trip sub-status created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: sub_status })))
}

/// PUT /api/v1/sub-statuses/{id}
pub async fn update_sub_status(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateTripSubStatus>,
) -> AppResult<Json<DataResponse<TripSubStatus>>> {
    authz.require(Module::Settings, Action::Edit)?;
    if let Some(name) = input.name.as_deref() {
        input.name = Some(validate_status_name(name)?);
    }
    if let Some(linked) = input.linked_status.as_deref() {
        input.linked_status = Some(require_known_status(&state.pool, linked).await?);
    }

    let sub_status = TripSubStatusRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "TripSubStatus",
            id,
        })?;
    Ok(Json(DataResponse { data: sub_status }))
}

/// DELETE /api/v1/sub-statuses/{id}
pub async fn delete_sub_status(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz.require(Module::Settings, Action::Edit)?;
    if TripSubStatusRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "TripSubStatus",
            id,
        }))
    }
}

/// A sub-status may only be linked to a status that exists.
async fn require_known_status(pool: &DbPool, name: &str) -> AppResult<String> {
    let catalog = TripStatusRepo::load_catalog(pool).await?;
    let status = catalog.require_status(name.trim())?;
    Ok(status.name.clone())
}
