//! Repository for the `profiles` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, email, phone, is_driver, location_id, created_at, updated_at";

/// Provides CRUD operations for volunteer and driver profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (name, email, phone, location_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.location_id)
            .fetch_one(pool)
            .await
    }

    /// Find a profile by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List profiles by name. `drivers_only` keeps promoted drivers.
    pub async fn list(pool: &PgPool, drivers_only: bool) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles
             WHERE (NOT $1 OR is_driver)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(drivers_only)
            .fetch_all(pool)
            .await
    }

    /// Promote a profile to driver. The flag is never cleared automatically.
    pub async fn mark_driver_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE profiles SET is_driver = true WHERE id = $1 AND NOT is_driver")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
