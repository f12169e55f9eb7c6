//! Repository for the `trip_sub_statuses` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::trip_status::{CreateTripSubStatus, TripSubStatus, UpdateTripSubStatus};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, linked_status, sort_order, created_at, updated_at";

/// Provides CRUD operations for sub-statuses.
pub struct TripSubStatusRepo;

impl TripSubStatusRepo {
    /// Insert a new sub-status, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTripSubStatus,
    ) -> Result<TripSubStatus, sqlx::Error> {
        let query = format!(
            "INSERT INTO trip_sub_statuses (name, linked_status, sort_order)
             VALUES ($1, $2, COALESCE($3, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripSubStatus>(&query)
            .bind(&input.name)
            .bind(&input.linked_status)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    /// Find a sub-status by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TripSubStatus>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trip_sub_statuses WHERE id = $1");
        sqlx::query_as::<_, TripSubStatus>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all sub-statuses grouped by parent, then in sort order.
    pub async fn list(pool: &PgPool) -> Result<Vec<TripSubStatus>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trip_sub_statuses
             ORDER BY linked_status ASC, sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, TripSubStatus>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a sub-status. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTripSubStatus,
    ) -> Result<Option<TripSubStatus>, sqlx::Error> {
        let query = format!(
            "UPDATE trip_sub_statuses SET
                name = COALESCE($2, name),
                linked_status = COALESCE($3, linked_status),
                sort_order = COALESCE($4, sort_order)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripSubStatus>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.linked_status)
            .bind(input.sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Delete a sub-status. Trips already carrying its name keep it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM trip_sub_statuses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
