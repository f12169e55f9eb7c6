//! Repository for the `trip_statuses` table.
//!
//! Statuses are referenced by name from `trip_sub_statuses.linked_status`
//! and `trips.status`, so a rename cascades explicitly to both inside one
//! transaction. A delete leaves dependents in place and reports them.

use serde::Serialize;
use sqlx::PgPool;
use tms_core::trip_status::{plan_rename, OrphanReport, StatusCatalog, StatusDef, SubStatusDef};
use tms_core::types::DbId;

use crate::models::trip_status::{CreateTripStatus, TripStatus, UpdateTripStatus};
use crate::repositories::TripSubStatusRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, sort_order, passenger_count_required, created_at, updated_at";

/// Result of a status update, including how far a rename cascaded.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: TripStatus,
    pub renamed_sub_statuses: u64,
    pub renamed_trips: u64,
}

/// Provides CRUD operations for the status catalog.
pub struct TripStatusRepo;

impl TripStatusRepo {
    /// Insert a new status, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTripStatus,
    ) -> Result<TripStatus, sqlx::Error> {
        let query = format!(
            "INSERT INTO trip_statuses (name, sort_order, passenger_count_required)
             VALUES ($1, COALESCE($2, 0), COALESCE($3, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripStatus>(&query)
            .bind(&input.name)
            .bind(input.sort_order)
            .bind(input.passenger_count_required)
            .fetch_one(pool)
            .await
    }

    /// Find a status by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TripStatus>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trip_statuses WHERE id = $1");
        sqlx::query_as::<_, TripStatus>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List statuses in workflow order.
    pub async fn list(pool: &PgPool) -> Result<Vec<TripStatus>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trip_statuses ORDER BY sort_order ASC, name ASC");
        sqlx::query_as::<_, TripStatus>(&query).fetch_all(pool).await
    }

    /// Load the full catalog (statuses and sub-statuses) for validation.
    pub async fn load_catalog(pool: &PgPool) -> Result<StatusCatalog, sqlx::Error> {
        let statuses = Self::list(pool).await?;
        let sub_statuses = TripSubStatusRepo::list(pool).await?;
        Ok(StatusCatalog::new(
            statuses.into_iter().map(StatusDef::from),
            sub_statuses.into_iter().map(SubStatusDef::from),
        ))
    }

    /// Update a status. A changed name is cascaded to every sub-status
    /// `linked_status` and every trip `status` carrying the old name.
    ///
    /// All statements run in one transaction; a failure at any step leaves
    /// the catalog, sub-statuses and trips untouched. Returns `None` if the
    /// status does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTripStatus,
    ) -> Result<Option<StatusUpdate>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let old_name: Option<String> =
            sqlx::query_scalar("SELECT name FROM trip_statuses WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(old_name) = old_name else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE trip_statuses SET
                name = COALESCE($2, name),
                sort_order = COALESCE($3, sort_order),
                passenger_count_required = COALESCE($4, passenger_count_required)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let status = sqlx::query_as::<_, TripStatus>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.sort_order)
            .bind(input.passenger_count_required)
            .fetch_one(&mut *tx)
            .await?;

        let mut renamed_sub_statuses = 0;
        let mut renamed_trips = 0;
        if let Some(plan) = plan_rename(&old_name, &status.name) {
            renamed_sub_statuses = sqlx::query(
                "UPDATE trip_sub_statuses SET linked_status = $2 WHERE linked_status = $1",
            )
            .bind(&plan.old_name)
            .bind(&plan.new_name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            renamed_trips = sqlx::query("UPDATE trips SET status = $2 WHERE status = $1")
                .bind(&plan.old_name)
                .bind(&plan.new_name)
                .execute(&mut *tx)
                .await?
                .rows_affected();

            tracing::info!(
                old_name = %plan.old_name,
                new_name = %plan.new_name,
                renamed_sub_statuses,
                renamed_trips,
                "Trip status renamed",
            );
        }

        tx.commit().await?;
        Ok(Some(StatusUpdate {
            status,
            renamed_sub_statuses,
            renamed_trips,
        }))
    }

    /// Delete a status. Sub-statuses linked to it are unlinked (their
    /// `linked_status` cleared); trips keep the stale name. Returns what was
    /// orphaned, or `None` if the status does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<OrphanReport>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let name: Option<String> =
            sqlx::query_scalar("DELETE FROM trip_statuses WHERE id = $1 RETURNING name")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(name) = name else {
            return Ok(None);
        };

        let unlinked_sub_statuses: Vec<String> = sqlx::query_scalar(
            "UPDATE trip_sub_statuses SET linked_status = ''
             WHERE linked_status = $1
             RETURNING name",
        )
        .bind(&name)
        .fetch_all(&mut *tx)
        .await?;

        let stranded_trips: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips WHERE status = $1")
            .bind(&name)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if stranded_trips > 0 || !unlinked_sub_statuses.is_empty() {
            tracing::warn!(
                status = %name,
                stranded_trips,
                unlinked = unlinked_sub_statuses.len(),
                "Deleted trip status left orphans",
            );
        }
        Ok(Some(OrphanReport {
            status: name,
            unlinked_sub_statuses,
            stranded_trips,
        }))
    }
}
