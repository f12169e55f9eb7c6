//! Region entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::hierarchy::RegionNode;
use tms_core::types::{DbId, Timestamp};

/// A region row from the `regions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Region {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Region> for RegionNode {
    fn from(r: Region) -> Self {
        RegionNode {
            id: r.id,
            name: r.name,
        }
    }
}

/// DTO for creating a new region.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRegion {
    pub name: String,
}
