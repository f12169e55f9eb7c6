//! Repository for the `users` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, role_id, role, region_id, location_id, is_active, \
                       created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// `legacy_role` is the upper-snake form of the role's name.
    pub async fn create(
        pool: &PgPool,
        input: &CreateUser,
        legacy_role: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, role_id, role, region_id, location_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(legacy_role)
            .bind(input.region_id)
            .bind(input.location_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List users by name, optionally limited to one region.
    pub async fn list(pool: &PgPool, region_id: Option<DbId>) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::BIGINT IS NULL OR region_id = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(region_id)
            .fetch_all(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied;
    /// `legacy_role` must accompany a changed `role_id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        legacy_role: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                role_id = COALESCE($4, role_id),
                role = COALESCE($5, role),
                region_id = COALESCE($6, region_id),
                location_id = COALESCE($7, location_id),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.role_id)
            .bind(legacy_role)
            .bind(input.region_id)
            .bind(input.location_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a user. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
