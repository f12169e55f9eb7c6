//! Role and role permission models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::types::{DbId, Timestamp};

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_system_role: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new role. Roles created through the API are never
/// system roles.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
}

/// A row from the `role_permissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RolePermission {
    pub role_id: DbId,
    pub module_code: String,
    pub can_view: bool,
    pub can_edit: bool,
}
