//! Profile (volunteer / driver) entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::types::{DbId, Timestamp};

/// A profile row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_driver: bool,
    pub location_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location_id: Option<DbId>,
}
