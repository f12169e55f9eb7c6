//! Repository for the `roles` and `role_permissions` tables.

use sqlx::PgPool;
use tms_core::rbac::{Grant, Module, PermissionSet};
use tms_core::types::DbId;

use crate::models::role::{CreateRole, Role, RolePermission};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, is_system_role, created_at, updated_at";

/// Provides role CRUD and permission matrix operations.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new (non-system) role, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let query = format!(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Delete a non-system role. Returns `false` if no such deletable row exists.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1 AND NOT is_system_role")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stored permission rows for a role.
    pub async fn permissions(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<RolePermission>, sqlx::Error> {
        sqlx::query_as::<_, RolePermission>(
            "SELECT role_id, module_code, can_view, can_edit
             FROM role_permissions
             WHERE role_id = $1
             ORDER BY module_code ASC",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Resolve a role's permission matrix: every module denied, then stored
    /// rows overlaid. Re-queried on every call.
    pub async fn resolve_permissions(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<PermissionSet, sqlx::Error> {
        let rows = Self::permissions(pool, role_id).await?;
        Ok(PermissionSet::resolve(
            rows.iter()
                .map(|r| (r.module_code.as_str(), r.can_view, r.can_edit)),
        ))
    }

    /// Replace a role's whole matrix in one transaction.
    pub async fn replace_permissions(
        pool: &PgPool,
        role_id: DbId,
        grants: &[(Module, Grant)],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        for (module, grant) in grants {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, module_code, can_view, can_edit)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(role_id)
            .bind(module.as_str())
            .bind(grant.can_view)
            .bind(grant.can_edit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::info!(role_id, modules = grants.len(), "Role permissions replaced");
        Ok(())
    }
}
