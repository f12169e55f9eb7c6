//! Repository for the append-only `trip_status_history` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::trip::{Trip, TripStatusHistory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, trip_id, status, sub_status, breakdown_issue, passengers_boarded, changed_by, changed_at";

/// Provides append and read operations for trip status history.
///
/// Rows are never updated. They are only removed by [`super::TripRepo::delete`].
pub struct TripStatusHistoryRepo;

impl TripStatusHistoryRepo {
    /// Record the trip's current status snapshot inside an open transaction.
    pub async fn append_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        trip: &Trip,
        changed_by: Option<DbId>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO trip_status_history
                (trip_id, status, sub_status, breakdown_issue, passengers_boarded, changed_by)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(trip.id)
        .bind(&trip.status)
        .bind(&trip.sub_status)
        .bind(&trip.breakdown_issue)
        .bind(trip.passengers_boarded)
        .bind(changed_by)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// History of one trip, oldest first.
    pub async fn list_for_trip(
        pool: &PgPool,
        trip_id: DbId,
    ) -> Result<Vec<TripStatusHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trip_status_history
             WHERE trip_id = $1
             ORDER BY changed_at ASC, id ASC"
        );
        sqlx::query_as::<_, TripStatusHistory>(&query)
            .bind(trip_id)
            .fetch_all(pool)
            .await
    }

    /// Number of history rows for a trip.
    pub async fn count_for_trip(pool: &PgPool, trip_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM trip_status_history WHERE trip_id = $1")
            .bind(trip_id)
            .fetch_one(pool)
            .await
    }
}
