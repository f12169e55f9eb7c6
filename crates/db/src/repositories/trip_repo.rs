//! Repository for the `trips` table.
//!
//! Every write that can change `(status, sub_status, breakdown_issue)` reads
//! the stored values under a row lock and appends a `trip_status_history`
//! row only when at least one of them differs. Assigning a driver promotes
//! that profile's `is_driver` flag in the same transaction.

use std::collections::BTreeSet;

use sqlx::PgPool;
use tms_core::dashboard::ALWAYS_VISIBLE_STATUSES;
use tms_core::hierarchy::endpoint_columns;
use tms_core::trip_status::{history_needed, StatusSnapshot};
use tms_core::types::DbId;

use crate::models::trip::{
    Trip, TripChange, TripDetail, TripFilter, TripQuickDetails, TripRow, TripWrite,
};
use crate::repositories::{HierarchyRepo, ProfileRepo, TripStatusHistoryRepo, VehicleRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, route_code, region_id, start_time, end_time, \
    origin_id, origin_venue_id, destination_id, destination_venue_id, \
    vehicle_id, volunteer_id, driver_id, status, sub_status, breakdown_issue, \
    passengers_boarded, wheelchairs_boarded, notes, created_at, updated_at";

/// Trip columns plus joined people and vehicle, aliased as `t`.
const ROW_SELECT: &str = "SELECT t.id, t.route_code, t.region_id, t.start_time, t.end_time, \
    t.origin_id, t.origin_venue_id, t.destination_id, t.destination_venue_id, \
    t.vehicle_id, t.volunteer_id, t.driver_id, t.status, t.sub_status, t.breakdown_issue, \
    t.passengers_boarded, t.wheelchairs_boarded, t.notes, t.created_at, t.updated_at, \
    v.name AS volunteer_name, v.phone AS volunteer_phone, \
    d.name AS driver_name, d.phone AS driver_phone, \
    vh.registration AS vehicle_registration \
    FROM trips t \
    LEFT JOIN profiles v ON v.id = t.volunteer_id \
    LEFT JOIN profiles d ON d.id = t.driver_id \
    LEFT JOIN vehicles vh ON vh.id = t.vehicle_id";

/// Predicate over [`TripFilter`]. Binds, in order: region_id, statuses,
/// window cutoff, always-visible statuses, search patterns.
///
/// Each search pattern must match at least one field. The start time is
/// matched in the same `YYYY-MM-DD HH:MM` UTC form the in-memory search
/// uses. Location and venue names are reached through both the venue
/// columns and the locations' parent venues.
const FILTER: &str = "($1::BIGINT IS NULL OR t.region_id = $1) \
    AND (cardinality($2::TEXT[]) = 0 OR t.status = ANY($2)) \
    AND ($3::TIMESTAMPTZ IS NULL OR t.status = ANY($4::TEXT[]) OR t.start_time > $3) \
    AND NOT EXISTS ( \
        SELECT 1 FROM unnest($5::TEXT[]) AS term(pattern) \
        WHERE NOT COALESCE( \
            t.route_code ILIKE term.pattern \
            OR v.name ILIKE term.pattern OR v.phone ILIKE term.pattern \
            OR d.name ILIKE term.pattern OR d.phone ILIKE term.pattern \
            OR vh.registration ILIKE term.pattern \
            OR to_char(t.start_time AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI') ILIKE term.pattern \
            OR EXISTS (SELECT 1 FROM locations l \
                       WHERE l.id IN (t.origin_id, t.destination_id) \
                         AND l.name ILIKE term.pattern) \
            OR EXISTS (SELECT 1 FROM venues ve \
                       WHERE (ve.id IN (t.origin_venue_id, t.destination_venue_id) \
                              OR ve.id IN (SELECT l2.venue_id FROM locations l2 \
                                           WHERE l2.id IN (t.origin_id, t.destination_id))) \
                         AND ve.name ILIKE term.pattern), \
            false))";

fn always_visible() -> Vec<String> {
    ALWAYS_VISIBLE_STATUSES.iter().map(|s| s.to_string()).collect()
}

/// Provides CRUD and query operations for trips.
pub struct TripRepo;

impl TripRepo {
    /// Insert a trip and its initial history row in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &TripWrite,
        changed_by: Option<DbId>,
    ) -> Result<Trip, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (origin_id, origin_venue_id) = endpoint_columns(input.origin);
        let (destination_id, destination_venue_id) = endpoint_columns(input.destination);

        let query = format!(
            "INSERT INTO trips (route_code, region_id, start_time, end_time,
                 origin_id, origin_venue_id, destination_id, destination_venue_id,
                 vehicle_id, volunteer_id, driver_id, status, sub_status, breakdown_issue,
                 passengers_boarded, wheelchairs_boarded, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING {COLUMNS}"
        );
        let trip = sqlx::query_as::<_, Trip>(&query)
            .bind(&input.route_code)
            .bind(input.region_id)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(origin_id)
            .bind(origin_venue_id)
            .bind(destination_id)
            .bind(destination_venue_id)
            .bind(input.vehicle_id)
            .bind(input.volunteer_id)
            .bind(input.driver_id)
            .bind(&input.status.status)
            .bind(&input.status.sub_status)
            .bind(&input.status.breakdown_issue)
            .bind(input.passengers_boarded)
            .bind(input.wheelchairs_boarded)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        TripStatusHistoryRepo::append_in(&mut tx, &trip, changed_by).await?;
        if let Some(driver_id) = trip.driver_id {
            ProfileRepo::mark_driver_in(&mut tx, driver_id).await?;
        }

        tx.commit().await?;
        tracing::info!(trip_id = trip.id, route_code = %trip.route_code, "Trip created");
        Ok(trip)
    }

    /// Find a trip by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Trip>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trips WHERE id = $1");
        sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a trip with people, vehicle and resolved endpoint names.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<TripDetail>, sqlx::Error> {
        let query = format!("{ROW_SELECT} WHERE t.id = $1");
        let row = sqlx::query_as::<_, TripRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        match row {
            Some(row) => Ok(Self::resolve(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Replace every editable field. Appends history when the status
    /// snapshot changed. Returns `None` if the trip does not exist.
    pub async fn update_full(
        pool: &PgPool,
        id: DbId,
        input: &TripWrite,
        changed_by: Option<DbId>,
    ) -> Result<Option<TripChange>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(prior) = Self::lock_snapshot(&mut tx, id).await? else {
            return Ok(None);
        };

        let (origin_id, origin_venue_id) = endpoint_columns(input.origin);
        let (destination_id, destination_venue_id) = endpoint_columns(input.destination);

        let query = format!(
            "UPDATE trips SET
                route_code = $2, region_id = $3, start_time = $4, end_time = $5,
                origin_id = $6, origin_venue_id = $7,
                destination_id = $8, destination_venue_id = $9,
                vehicle_id = $10, volunteer_id = $11, driver_id = $12,
                status = $13, sub_status = $14, breakdown_issue = $15,
                passengers_boarded = $16, wheelchairs_boarded = $17, notes = $18
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let trip = sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .bind(&input.route_code)
            .bind(input.region_id)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(origin_id)
            .bind(origin_venue_id)
            .bind(destination_id)
            .bind(destination_venue_id)
            .bind(input.vehicle_id)
            .bind(input.volunteer_id)
            .bind(input.driver_id)
            .bind(&input.status.status)
            .bind(&input.status.sub_status)
            .bind(&input.status.breakdown_issue)
            .bind(input.passengers_boarded)
            .bind(input.wheelchairs_boarded)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let history_logged = history_needed(Some(&prior), &input.status);
        if history_logged {
            TripStatusHistoryRepo::append_in(&mut tx, &trip, changed_by).await?;
        }
        if let Some(driver_id) = trip.driver_id {
            ProfileRepo::mark_driver_in(&mut tx, driver_id).await?;
        }

        tx.commit().await?;
        tracing::info!(trip_id = id, status = %trip.status, history_logged, "Trip updated");
        Ok(Some(TripChange {
            trip,
            history_logged,
        }))
    }

    /// Apply a status-only progress update. Appends history only when the
    /// stored snapshot differs from `next`.
    pub async fn apply_progress(
        pool: &PgPool,
        id: DbId,
        next: &StatusSnapshot,
        changed_by: Option<DbId>,
    ) -> Result<Option<TripChange>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(prior) = Self::lock_snapshot(&mut tx, id).await? else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE trips SET status = $2, sub_status = $3, breakdown_issue = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let trip = sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .bind(&next.status)
            .bind(&next.sub_status)
            .bind(&next.breakdown_issue)
            .fetch_one(&mut *tx)
            .await?;

        let history_logged = history_needed(Some(&prior), next);
        if history_logged {
            TripStatusHistoryRepo::append_in(&mut tx, &trip, changed_by).await?;
        }

        tx.commit().await?;
        tracing::info!(
            trip_id = id,
            status = %next.status,
            sub_status = %next.sub_status,
            history_logged,
            "Trip progress applied",
        );
        Ok(Some(TripChange {
            trip,
            history_logged,
        }))
    }

    /// Update people, vehicle, counts and notes without touching status.
    ///
    /// An unknown vehicle registration creates the vehicle in the same
    /// transaction.
    pub async fn quick_update_details(
        pool: &PgPool,
        id: DbId,
        input: &TripQuickDetails,
    ) -> Result<Option<Trip>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let vehicle_id = match input.vehicle_registration.as_deref() {
            Some(registration) => {
                let (vehicle_id, created) =
                    VehicleRepo::find_or_create_in(&mut tx, registration).await?;
                if created {
                    tracing::info!(vehicle_id, registration, "Vehicle auto-created");
                }
                Some(vehicle_id)
            }
            None => None,
        };

        let query = format!(
            "UPDATE trips SET
                volunteer_id = $2, driver_id = $3, vehicle_id = $4,
                passengers_boarded = $5, wheelchairs_boarded = $6, notes = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let trip = sqlx::query_as::<_, Trip>(&query)
            .bind(id)
            .bind(input.volunteer_id)
            .bind(input.driver_id)
            .bind(vehicle_id)
            .bind(input.passengers_boarded)
            .bind(input.wheelchairs_boarded)
            .bind(&input.notes)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(trip) = trip else {
            return Ok(None);
        };
        if let Some(driver_id) = trip.driver_id {
            ProfileRepo::mark_driver_in(&mut tx, driver_id).await?;
        }

        tx.commit().await?;
        tracing::info!(trip_id = id, "Trip details updated");
        Ok(Some(trip))
    }

    /// Delete a trip and its history rows in one transaction.
    /// Returns `true` if the trip existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM trip_status_history WHERE trip_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit().await?;
        tracing::info!(trip_id = id, "Trip deleted");
        Ok(true)
    }

    /// One page of trips matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TripFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TripRow>, sqlx::Error> {
        let query = format!(
            "{ROW_SELECT} WHERE {FILTER} ORDER BY t.start_time DESC, t.id DESC LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, TripRow>(&query)
            .bind(filter.region_id)
            .bind(&filter.statuses)
            .bind(filter.window_cutoff)
            .bind(always_visible())
            .bind(&filter.search_patterns)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Every trip matching `filter`, newest first. Used for the dashboard,
    /// where the window bounds the result instead of paging.
    pub async fn list_all(pool: &PgPool, filter: &TripFilter) -> Result<Vec<TripRow>, sqlx::Error> {
        let query = format!("{ROW_SELECT} WHERE {FILTER} ORDER BY t.start_time DESC, t.id DESC");
        sqlx::query_as::<_, TripRow>(&query)
            .bind(filter.region_id)
            .bind(&filter.statuses)
            .bind(filter.window_cutoff)
            .bind(always_visible())
            .bind(&filter.search_patterns)
            .fetch_all(pool)
            .await
    }

    /// Number of trips matching `filter`.
    pub async fn count(pool: &PgPool, filter: &TripFilter) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM trips t \
             LEFT JOIN profiles v ON v.id = t.volunteer_id \
             LEFT JOIN profiles d ON d.id = t.driver_id \
             LEFT JOIN vehicles vh ON vh.id = t.vehicle_id \
             WHERE {FILTER}"
        );
        sqlx::query_scalar(&query)
            .bind(filter.region_id)
            .bind(&filter.statuses)
            .bind(filter.window_cutoff)
            .bind(always_visible())
            .bind(&filter.search_patterns)
            .fetch_one(pool)
            .await
    }

    /// Trips using a location as origin or destination. For a drop-off,
    /// trips routed to its parent venue without a specific drop-off count too.
    pub async fn list_for_location(
        pool: &PgPool,
        location_id: DbId,
    ) -> Result<Vec<TripRow>, sqlx::Error> {
        let query = format!(
            "{ROW_SELECT}
             WHERE t.origin_id = $1 OR t.destination_id = $1
                OR (t.origin_id IS NULL
                    AND t.origin_venue_id = (SELECT venue_id FROM locations WHERE id = $1))
                OR (t.destination_id IS NULL
                    AND t.destination_venue_id = (SELECT venue_id FROM locations WHERE id = $1))
             ORDER BY t.start_time DESC, t.id DESC"
        );
        sqlx::query_as::<_, TripRow>(&query)
            .bind(location_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve endpoint names for a batch of rows with two lookups.
    pub async fn resolve(
        pool: &PgPool,
        rows: Vec<TripRow>,
    ) -> Result<Vec<TripDetail>, sqlx::Error> {
        let mut location_ids = BTreeSet::new();
        let mut venue_ids = BTreeSet::new();
        for r in &rows {
            let t = &r.trip;
            location_ids.extend([t.origin_id, t.destination_id].into_iter().flatten());
            venue_ids.extend([t.origin_venue_id, t.destination_venue_id].into_iter().flatten());
        }
        let location_ids: Vec<DbId> = location_ids.into_iter().collect();
        let venue_ids: Vec<DbId> = venue_ids.into_iter().collect();

        let index = HierarchyRepo::index_for(pool, &location_ids, &venue_ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| TripDetail::resolve(row, &index))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Read the stored status snapshot and lock the row until commit.
    async fn lock_snapshot(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<StatusSnapshot>, sqlx::Error> {
        let row: Option<(String, String, Option<String>)> = sqlx::query_as(
            "SELECT status, sub_status, breakdown_issue FROM trips WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(row.map(|(status, sub_status, breakdown_issue)| StatusSnapshot {
            status,
            sub_status,
            breakdown_issue,
        }))
    }
}
