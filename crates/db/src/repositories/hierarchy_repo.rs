//! Cross-table hierarchy operations: guarded cascading deletes and the
//! lookup index used to resolve trip endpoint names.

use std::collections::BTreeSet;

use serde::Serialize;
use sqlx::PgPool;
use tms_core::hierarchy::{HierarchyIndex, HierarchyKind, LocationNode, VenueNode};
use tms_core::types::DbId;

use crate::repositories::{LocationRepo, VenueRepo};

/// Outcome of a guarded delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// Trips still reference the entity; nothing was removed.
    Blocked { referencing_trips: i64 },
}

/// Provides guarded deletes across regions, venues and locations.
pub struct HierarchyRepo;

impl HierarchyRepo {
    /// Delete a region, its venues, their drop-offs and its pickup locations.
    ///
    /// Rejected without touching any row while a trip carries the region.
    /// Runs as one transaction; any failure (including a foreign key held by
    /// another table) rolls the whole cascade back.
    pub async fn delete_region(pool: &PgPool, id: DbId) -> Result<DeleteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Trips can reach the region directly, through one of its venues, or
        // through a location under either.
        let referencing: i64 = sqlx::query_scalar(
            "WITH region_venues AS (SELECT id FROM venues WHERE region_id = $1),
                  region_locations AS (
                      SELECT id FROM locations
                      WHERE region_id = $1 OR venue_id IN (SELECT id FROM region_venues)
                  )
             SELECT COUNT(*) FROM trips
             WHERE region_id = $1
                OR origin_venue_id IN (SELECT id FROM region_venues)
                OR destination_venue_id IN (SELECT id FROM region_venues)
                OR origin_id IN (SELECT id FROM region_locations)
                OR destination_id IN (SELECT id FROM region_locations)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if referencing > 0 {
            return Ok(DeleteOutcome::Blocked {
                referencing_trips: referencing,
            });
        }

        sqlx::query(
            "DELETE FROM locations
             WHERE venue_id IN (SELECT id FROM venues WHERE region_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM venues WHERE region_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM locations WHERE region_id = $1 AND venue_id IS NULL")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM regions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        tx.commit().await?;
        tracing::info!(region_id = id, "Region deleted with its venues and locations");
        Ok(DeleteOutcome::Deleted)
    }

    /// Delete a venue and its drop-off locations.
    ///
    /// Rejected while a trip is routed to the venue or to one of its drop-offs.
    pub async fn delete_venue(pool: &PgPool, id: DbId) -> Result<DeleteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let referencing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM trips
             WHERE origin_venue_id = $1 OR destination_venue_id = $1
                OR origin_id IN (SELECT id FROM locations WHERE venue_id = $1)
                OR destination_id IN (SELECT id FROM locations WHERE venue_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if referencing > 0 {
            return Ok(DeleteOutcome::Blocked {
                referencing_trips: referencing,
            });
        }

        sqlx::query("DELETE FROM locations WHERE venue_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        tx.commit().await?;
        tracing::info!(venue_id = id, "Venue deleted with its drop-offs");
        Ok(DeleteOutcome::Deleted)
    }

    /// Delete a pickup or drop-off location not used as any trip endpoint.
    pub async fn delete_location(pool: &PgPool, id: DbId) -> Result<DeleteOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let referencing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM trips WHERE origin_id = $1 OR destination_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if referencing > 0 {
            return Ok(DeleteOutcome::Blocked {
                referencing_trips: referencing,
            });
        }

        let result = sqlx::query("DELETE FROM locations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }

        tx.commit().await?;
        tracing::info!(location_id = id, "Location deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Dispatch a guarded delete by kind.
    pub async fn delete(
        pool: &PgPool,
        kind: HierarchyKind,
        id: DbId,
    ) -> Result<DeleteOutcome, sqlx::Error> {
        match kind {
            HierarchyKind::Region => Self::delete_region(pool, id).await,
            HierarchyKind::Venue => Self::delete_venue(pool, id).await,
            HierarchyKind::Location => Self::delete_location(pool, id).await,
        }
    }

    /// Build a lookup index covering the given endpoint IDs.
    ///
    /// Venues are loaded both for the IDs passed in and for the parent
    /// venues of the loaded locations, so drop-offs resolve their venue even
    /// when the trip stored only the location.
    pub async fn index_for(
        pool: &PgPool,
        location_ids: &[DbId],
        venue_ids: &[DbId],
    ) -> Result<HierarchyIndex, sqlx::Error> {
        let locations = if location_ids.is_empty() {
            Vec::new()
        } else {
            LocationRepo::find_many(pool, location_ids).await?
        };

        let all_venue_ids: Vec<DbId> = venue_ids
            .iter()
            .copied()
            .chain(locations.iter().filter_map(|l| l.venue_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let venues = if all_venue_ids.is_empty() {
            Vec::new()
        } else {
            VenueRepo::find_many(pool, &all_venue_ids).await?
        };

        Ok(HierarchyIndex::new(
            venues.into_iter().map(VenueNode::from),
            locations.into_iter().map(LocationNode::from),
        ))
    }
}
