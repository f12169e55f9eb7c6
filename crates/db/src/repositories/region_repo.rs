//! Repository for the `regions` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::region::{CreateRegion, Region};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for regions. Deletes live in [`super::HierarchyRepo`].
pub struct RegionRepo;

impl RegionRepo {
    /// Insert a new region, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateRegion) -> Result<Region, sqlx::Error> {
        let query = format!("INSERT INTO regions (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Region>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a region by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM regions WHERE id = $1");
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List regions by name. A `region_id` limits the result to that region.
    pub async fn list(pool: &PgPool, region_id: Option<DbId>) -> Result<Vec<Region>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM regions
             WHERE ($1::BIGINT IS NULL OR id = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Region>(&query)
            .bind(region_id)
            .fetch_all(pool)
            .await
    }

    /// Rename a region. Returns `None` if it does not exist.
    pub async fn rename(pool: &PgPool, id: DbId, name: &str) -> Result<Option<Region>, sqlx::Error> {
        let query = format!("UPDATE regions SET name = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Region>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
