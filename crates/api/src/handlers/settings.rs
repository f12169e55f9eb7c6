//! Handlers for application settings.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tms_core::error::CoreError;
use tms_core::rbac::{Action, Module};
use tms_db::models::setting::{AppSetting, TIMEZONE_KEY};
use tms_db::repositories::SettingRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingInput {
    pub value: String,
}

/// GET /api/v1/settings/timezone
pub async fn get_timezone(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<AppSetting>>> {
    authz.require(Module::Settings, Action::View)?;
    let setting = SettingRepo::get(&state.pool, TIMEZONE_KEY)
        .await?
        .ok_or_else(|| AppError::InternalError("timezone setting is missing".to_string()))?;
    Ok(Json(DataResponse { data: setting }))
}

/// PUT /api/v1/settings/timezone
pub async fn set_timezone(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(input): Json<SettingInput>,
) -> AppResult<Json<DataResponse<AppSetting>>> {
    authz.require(Module::Settings, Action::Edit)?;
    let value = input.value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation("Timezone is required".to_string()).into());
    }

    let setting = SettingRepo::upsert(&state.pool, TIMEZONE_KEY, value).await?;
    tracing::info!(timezone = %setting.value, "Timezone updated");
    Ok(Json(DataResponse { data: setting }))
}
