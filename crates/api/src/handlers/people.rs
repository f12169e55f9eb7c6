//! Handlers for the people and vehicles trips are assigned.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tms_core::error::CoreError;
use tms_core::rbac::{Action, Module};
use tms_db::models::profile::{CreateProfile, Profile};
use tms_db::models::vehicle::{CreateVehicle, Vehicle};
use tms_db::repositories::{ProfileRepo, VehicleRepo};

use crate::error::AppResult;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    #[serde(default)]
    pub drivers_only: bool,
}

/// GET /api/v1/vehicles
pub async fn list_vehicles(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<Vec<Vehicle>>>> {
    authz.require(Module::Vehicles, Action::View)?;
    let vehicles = VehicleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: vehicles }))
}

/// POST /api/v1/vehicles
pub async fn create_vehicle(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(mut input): Json<CreateVehicle>,
) -> AppResult<(StatusCode, Json<DataResponse<Vehicle>>)> {
    authz.require(Module::Vehicles, Action::Edit)?;
    input.registration = input.registration.trim().to_string();
    if input.registration.is_empty() {
        return Err(CoreError::Validation("Registration is required".to_string()).into());
    }

    let vehicle = VehicleRepo::create(&state.pool, &input).await?;
    tracing::info!(vehicle_id = vehicle.id, registration = %vehicle.registration, "Vehicle created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: vehicle })))
}

/// GET /api/v1/profiles?drivers_only=
pub async fn list_profiles(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Query(params): Query<ProfileQuery>,
) -> AppResult<Json<DataResponse<Vec<Profile>>>> {
    authz.require(Module::Trips, Action::View)?;
    let profiles = ProfileRepo::list(&state.pool, params.drivers_only).await?;
    Ok(Json(DataResponse { data: profiles }))
}

/// POST /api/v1/profiles
pub async fn create_profile(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(mut input): Json<CreateProfile>,
) -> AppResult<(StatusCode, Json<DataResponse<Profile>>)> {
    authz.require(Module::Trips, Action::Edit)?;
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(CoreError::Validation("Name is required".to_string()).into());
    }

    let profile = ProfileRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}
