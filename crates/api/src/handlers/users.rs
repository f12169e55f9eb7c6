//! Handlers for user management.
//!
//! Region-scoped callers only see and manage users in their own region.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use tms_core::error::CoreError;
use tms_core::rbac::{Action, Authorizer, Module};
use tms_core::types::DbId;
use tms_db::models::role::Role;
use tms_db::models::user::{legacy_role_name, CreateUser, UpdateUser, User};
use tms_db::repositories::{RoleRepo, UserRepo};
use tms_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role_id: DbId,
    pub region_id: Option<DbId>,
    pub location_id: Option<DbId>,
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<Vec<User>>>> {
    authz.require(Module::Users, Action::View)?;
    let users = UserRepo::list(&state.pool, authz.scope().region_id()).await?;
    Ok(Json(DataResponse { data: users }))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    authz.require(Module::Users, Action::Edit)?;
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let name = input.name.trim().to_string();
    let email = input.email.trim().to_lowercase();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".to_string()).into());
    }
    let role = assignable_role(&state.pool, &authz, input.role_id).await?;
    let region_id = authz.scope().pin(input.region_id)?;

    let create = CreateUser {
        name,
        email,
        role_id: role.id,
        region_id,
        location_id: input.location_id,
    };
    let user = UserRepo::create(&state.pool, &create, &legacy_role_name(&role.name)).await?;
    tracing::info!(user_id = user.id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<User>>> {
    authz.require(Module::Users, Action::Edit)?;
    find_scoped(&state.pool, &authz, id).await?;

    if let Some(region_id) = input.region_id {
        input.region_id = authz.scope().pin(Some(region_id))?;
    }
    if let Some(email) = input.email.as_deref() {
        input.email = Some(email.trim().to_lowercase());
    }
    let legacy_role = match input.role_id {
        Some(role_id) => {
            let role = assignable_role(&state.pool, &authz, role_id).await?;
            Some(legacy_role_name(&role.name))
        }
        None => None,
    };

    let user = UserRepo::update(&state.pool, id, &input, legacy_role.as_deref())
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    Ok(Json(DataResponse { data: user }))
}

/// DELETE /api/v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz.require(Module::Users, Action::Edit)?;
    find_scoped(&state.pool, &authz, id).await?;

    if UserRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

async fn find_scoped(pool: &DbPool, authz: &Authorizer, id: DbId) -> AppResult<User> {
    let user = UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "User", id })?;
    authz.scope().ensure(user.region_id)?;
    Ok(user)
}

/// Only a super admin may hand out a system role.
async fn assignable_role(pool: &DbPool, authz: &Authorizer, role_id: DbId) -> AppResult<Role> {
    let role = RoleRepo::find_by_id(pool, role_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Role",
            id: role_id,
        })?;
    if role.is_system_role && !authz.principal.is_super_admin() {
        return Err(CoreError::forbidden().into());
    }
    Ok(role)
}
