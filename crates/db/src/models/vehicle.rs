//! Vehicle entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::types::{DbId, Timestamp};

/// Defaults applied to a vehicle auto-created from an unknown registration.
pub const AUTO_VEHICLE_TYPE: &str = "Bus";
pub const AUTO_VEHICLE_MAKE_MODEL: &str = "Unknown";
pub const AUTO_VEHICLE_STATUS: &str = "Active";

/// A vehicle row from the `vehicles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub vehicle_type: String,
    pub registration: String,
    pub capacity: i32,
    pub make_model: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new vehicle. Omitted fields take the column defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVehicle {
    pub registration: String,
    pub vehicle_type: Option<String>,
    pub capacity: Option<i32>,
    pub make_model: Option<String>,
    pub status: Option<String>,
}
