//! Venue entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::hierarchy::VenueNode;
use tms_core::types::{DbId, Timestamp};

/// A venue row from the `venues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Venue {
    pub id: DbId,
    pub name: String,
    pub region_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Venue> for VenueNode {
    fn from(v: Venue) -> Self {
        VenueNode {
            id: v.id,
            name: v.name,
            region_id: v.region_id,
        }
    }
}

/// DTO for creating a new venue.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVenue {
    pub name: String,
    pub region_id: DbId,
}
