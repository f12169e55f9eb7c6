//! Repository for the `vehicles` table.

use sqlx::PgPool;
use tms_core::types::DbId;

use crate::models::vehicle::{
    CreateVehicle, Vehicle, AUTO_VEHICLE_MAKE_MODEL, AUTO_VEHICLE_STATUS, AUTO_VEHICLE_TYPE,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, vehicle_type, registration, capacity, make_model, status, created_at, updated_at";

/// Provides CRUD operations for vehicles.
pub struct VehicleRepo;

impl VehicleRepo {
    /// Insert a new vehicle, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVehicle) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles (registration, vehicle_type, capacity, make_model, status)
             VALUES ($1, COALESCE($2, 'Bus'), COALESCE($3, 0), COALESCE($4, 'Unknown'),
                     COALESCE($5, 'Active'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(&input.registration)
            .bind(&input.vehicle_type)
            .bind(input.capacity)
            .bind(&input.make_model)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Find a vehicle by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE id = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a vehicle by its registration (case-sensitive).
    pub async fn find_by_registration(
        pool: &PgPool,
        registration: &str,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE registration = $1");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(registration)
            .fetch_optional(pool)
            .await
    }

    /// List all vehicles by registration.
    pub async fn list(pool: &PgPool) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles ORDER BY registration ASC");
        sqlx::query_as::<_, Vehicle>(&query).fetch_all(pool).await
    }

    /// Resolve a registration to a vehicle ID inside an open transaction,
    /// creating an active bus with placeholder details when it is unknown.
    ///
    /// Returns the ID and whether a new row was inserted.
    pub async fn find_or_create_in(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        registration: &str,
    ) -> Result<(DbId, bool), sqlx::Error> {
        // The no-op DO UPDATE makes RETURNING yield the existing row too;
        // xmax = 0 only for a freshly inserted tuple.
        sqlx::query_as::<_, (DbId, bool)>(
            "INSERT INTO vehicles (registration, vehicle_type, capacity, make_model, status)
             VALUES ($1, $2, 0, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_vehicles_registration
             DO UPDATE SET registration = EXCLUDED.registration
             RETURNING id, (xmax = 0) AS inserted",
        )
        .bind(registration)
        .bind(AUTO_VEHICLE_TYPE)
        .bind(AUTO_VEHICLE_MAKE_MODEL)
        .bind(AUTO_VEHICLE_STATUS)
        .fetch_one(&mut **tx)
        .await
    }
}
