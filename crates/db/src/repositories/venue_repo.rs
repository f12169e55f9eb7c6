//! Repository for the `venues` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::venue::{CreateVenue, Venue};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, region_id, created_at, updated_at";

/// Provides CRUD operations for venues. Deletes live in [`super::HierarchyRepo`].
pub struct VenueRepo;

impl VenueRepo {
    /// Insert a new venue, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVenue) -> Result<Venue, sqlx::Error> {
        let query =
            format!("INSERT INTO venues (name, region_id) VALUES ($1, $2) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Venue>(&query)
            .bind(&input.name)
            .bind(input.region_id)
            .fetch_one(pool)
            .await
    }

    /// Find a venue by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Venue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM venues WHERE id = $1");
        sqlx::query_as::<_, Venue>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the venues with the given IDs. Missing IDs are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Venue>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM venues WHERE id = ANY($1)");
        sqlx::query_as::<_, Venue>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List venues by name, optionally limited to one region.
    pub async fn list(pool: &PgPool, region_id: Option<DbId>) -> Result<Vec<Venue>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM venues
             WHERE ($1::BIGINT IS NULL OR region_id = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Venue>(&query)
            .bind(region_id)
            .fetch_all(pool)
            .await
    }

    /// Rename a venue. Returns `None` if it does not exist.
    pub async fn rename(pool: &PgPool, id: DbId, name: &str) -> Result<Option<Venue>, sqlx::Error> {
        let query = format!("UPDATE venues SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Venue>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
