//! Handler describing the calling user's own access.

use axum::Json;
use serde::Serialize;
use tms_core::rbac::{Grant, Module, RegionScope};
use tms_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::rbac::Authorized;
use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct ModuleAccess {
    pub module_code: Module,
    pub can_view: bool,
    pub can_edit: bool,
}

impl From<(Module, Grant)> for ModuleAccess {
    fn from((module_code, grant): (Module, Grant)) -> Self {
        Self {
            module_code,
            can_view: grant.can_view,
            can_edit: grant.can_edit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MyPermissions {
    pub user_id: DbId,
    pub role: String,
    pub is_super_admin: bool,
    pub scope: RegionScope,
    pub location_id: Option<DbId>,
    pub permissions: Vec<ModuleAccess>,
}

/// GET /api/v1/me/permissions
pub async fn my_permissions(
    Authorized(authz): Authorized,
) -> AppResult<Json<DataResponse<MyPermissions>>> {
    let principal = &authz.principal;
    let data = MyPermissions {
        user_id: principal.user_id,
        role: principal.role.clone(),
        is_super_admin: principal.is_super_admin(),
        scope: authz.scope(),
        location_id: principal.location_id,
        permissions: authz.permissions().iter().map(ModuleAccess::from).collect(),
    };
    Ok(Json(DataResponse { data }))
}
