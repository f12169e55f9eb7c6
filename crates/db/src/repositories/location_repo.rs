//! Repository for the `locations` table (pickups and drop-offs).

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::location::{CreateLocation, Location};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, region_id, venue_id, created_at, updated_at";

/// Provides CRUD operations for locations. Deletes live in [`super::HierarchyRepo`].
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a new location, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateLocation) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (name, region_id, venue_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(&input.name)
            .bind(input.region_id)
            .bind(input.venue_id)
            .fetch_one(pool)
            .await
    }

    /// Find a location by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE id = $1");
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the locations with the given IDs. Missing IDs are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE id = ANY($1)");
        sqlx::query_as::<_, Location>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List locations by name, optionally limited to one region.
    pub async fn list(pool: &PgPool, region_id: Option<DbId>) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM locations
             WHERE ($1::BIGINT IS NULL OR region_id = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(region_id)
            .fetch_all(pool)
            .await
    }

    /// Rename a location. Returns `None` if it does not exist.
    pub async fn rename(
        pool: &PgPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("UPDATE locations SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
