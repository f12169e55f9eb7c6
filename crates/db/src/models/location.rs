//! Location entity model and DTOs.
//!
//! A location with `venue_id = NULL` is a pickup point; one with a venue is a
//! drop-off inside that venue.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::hierarchy::LocationNode;
use tms_core::types::{DbId, Timestamp};

/// A location row from the `locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub id: DbId,
    pub name: String,
    pub region_id: Option<DbId>,
    pub venue_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Location> for LocationNode {
    fn from(l: Location) -> Self {
        LocationNode {
            id: l.id,
            name: l.name,
            region_id: l.region_id,
            venue_id: l.venue_id,
        }
    }
}

/// DTO for creating a new location.
///
/// For a drop-off the handler fills `region_id` from the venue before insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocation {
    pub name: String,
    pub region_id: Option<DbId>,
    pub venue_id: Option<DbId>,
}
