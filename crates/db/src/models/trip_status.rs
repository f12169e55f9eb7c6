//! Trip status and sub-status catalog models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::trip_status::{StatusDef, SubStatusDef};
use tms_core::types::{DbId, Timestamp};

/// A row from the `trip_statuses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripStatus {
    pub id: DbId,
    pub name: String,
    pub sort_order: i32,
    pub passenger_count_required: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TripStatus> for StatusDef {
    fn from(s: TripStatus) -> Self {
        StatusDef {
            name: s.name,
            sort_order: s.sort_order,
            passenger_count_required: s.passenger_count_required,
        }
    }
}

/// DTO for creating a new status.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTripStatus {
    pub name: String,
    pub sort_order: Option<i32>,
    pub passenger_count_required: Option<bool>,
}

/// DTO for updating a status. A changed `name` cascades to sub-statuses and trips.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTripStatus {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub passenger_count_required: Option<bool>,
}

/// A row from the `trip_sub_statuses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripSubStatus {
    pub id: DbId,
    pub name: String,
    pub linked_status: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TripSubStatus> for SubStatusDef {
    fn from(s: TripSubStatus) -> Self {
        SubStatusDef {
            name: s.name,
            linked_status: s.linked_status,
            sort_order: s.sort_order,
        }
    }
}

/// DTO for creating a new sub-status.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTripSubStatus {
    pub name: String,
    pub linked_status: String,
    pub sort_order: Option<i32>,
}

/// DTO for updating a sub-status. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTripSubStatus {
    pub name: Option<String>,
    pub linked_status: Option<String>,
    pub sort_order: Option<i32>,
}
