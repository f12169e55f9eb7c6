//! Handlers for roles and their permission matrices.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tms_core::error::CoreError;
use tms_core::rbac::{normalize_matrix, Action, Module, PermissionInput, PermissionSet};
use tms_core::types::DbId;
use tms_db::models::role::{CreateRole, Role};
use tms_db::repositories::RoleRepo;
use tms_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::handlers::me::ModuleAccess;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/roles
pub async fn list_roles(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<Vec<Role>>>> {
    authz.require(Module::Roles, Action::View)?;
    let roles = RoleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: roles }))
}

/// POST /api/v1/roles
///
/// A new role starts with no permission rows, so it can do nothing until
/// its matrix is set.
pub async fn create_role(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Json(mut input): Json<CreateRole>,
) -> AppResult<(StatusCode, Json<DataResponse<Role>>)> {
    authz.require(Module::Roles, Action::Edit)?;
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(CoreError::Validation("Role name is required".to_string()).into());
    }

    let role = RoleRepo::create(&state.pool, &input).await?;
    tracing::info!(role_id = role.id, name = %role.name, "Role created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: role })))
}

/// DELETE /api/v1/roles/{id}
///
/// System roles cannot be deleted. A role still assigned to users is
/// protected by its foreign key.
pub async fn delete_role(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authz.require(Module::Roles, Action::Edit)?;
    let role = find_role(&state.pool, id).await?;
    reject_system_role(&role)?;

    if RoleRepo::delete(&state.pool, id).await? {
        tracing::info!(role_id = id, "Role deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Role", id }))
    }
}

/// GET /api/v1/roles/{id}/permissions
///
/// The resolved matrix: one entry per module, denied unless a row grants it.
pub async fn get_permissions(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ModuleAccess>>>> {
    authz.require(Module::Roles, Action::View)?;
    let role = find_role(&state.pool, id).await?;

    let permissions = resolved_matrix(&state.pool, &role).await?;
    Ok(Json(DataResponse { data: permissions }))
}

/// PUT /api/v1/roles/{id}/permissions
///
/// Replaces the whole matrix in one transaction. Modules left out of the
/// body end up denied.
pub async fn replace_permissions(
    State(state): State<AppState>,
    Authorized(authz): Authorized,
    Path(id): Path<DbId>,
    Json(input): Json<Vec<PermissionInput>>,
) -> AppResult<Json<DataResponse<Vec<ModuleAccess>>>> {
    authz.require(Module::Roles, Action::Edit)?;
    let role = find_role(&state.pool, id).await?;
    reject_system_role(&role)?;

    let grants = normalize_matrix(&input)?;
    RoleRepo::replace_permissions(&state.pool, id, &grants).await?;

    let permissions = resolved_matrix(&state.pool, &role).await?;
    Ok(Json(DataResponse { data: permissions }))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

async fn find_role(pool: &DbPool, id: DbId) -> AppResult<Role> {
    Ok(RoleRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Role", id })?)
}

fn reject_system_role(role: &Role) -> AppResult<()> {
    if role.is_system_role {
        return Err(CoreError::Conflict(format!(
            "The '{}' role is a system role and cannot be changed",
            role.name
        ))
        .into());
    }
    Ok(())
}

async fn resolved_matrix(pool: &DbPool, role: &Role) -> AppResult<Vec<ModuleAccess>> {
    let set = if role.is_system_role {
        PermissionSet::full()
    } else {
        RoleRepo::resolve_permissions(pool, role.id).await?
    };
    Ok(set.iter().map(ModuleAccess::from).collect())
}
