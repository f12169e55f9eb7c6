//! Trip entity model, DTOs and history rows.

use serde::Serialize;
use sqlx::FromRow;
use tms_core::dashboard::DashboardTrip;
use tms_core::hierarchy::{resolve_display, Endpoint, EndpointDisplay, HierarchyLookup};
use tms_core::search::format_start_time;
use tms_core::trip_status::StatusSnapshot;
use tms_core::types::{DbId, Timestamp};

/// A trip row from the `trips` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trip {
    pub id: DbId,
    pub route_code: String,
    pub region_id: Option<DbId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub origin_id: Option<DbId>,
    pub origin_venue_id: Option<DbId>,
    pub destination_id: Option<DbId>,
    pub destination_venue_id: Option<DbId>,
    pub vehicle_id: Option<DbId>,
    pub volunteer_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub status: String,
    pub sub_status: String,
    pub breakdown_issue: Option<String>,
    pub passengers_boarded: i32,
    pub wheelchairs_boarded: i32,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Trip {
    /// The fields tracked by the status history log.
    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            status: self.status.clone(),
            sub_status: self.sub_status.clone(),
            breakdown_issue: self.breakdown_issue.clone(),
        }
    }
}

/// A trip joined with its volunteer, driver and vehicle.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub trip: Trip,
    pub volunteer_name: Option<String>,
    pub volunteer_phone: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub vehicle_registration: Option<String>,
}

/// A trip with its endpoint names resolved.
#[derive(Debug, Clone, Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub row: TripRow,
    pub origin: EndpointDisplay,
    pub destination: EndpointDisplay,
}

impl TripDetail {
    pub fn resolve(row: TripRow, lookup: &impl HierarchyLookup) -> Self {
        let t = &row.trip;
        let origin = resolve_display(t.origin_id, t.origin_venue_id, lookup);
        let destination = resolve_display(t.destination_id, t.destination_venue_id, lookup);
        Self {
            row,
            origin,
            destination,
        }
    }
}

impl DashboardTrip for TripDetail {
    fn status(&self) -> &str {
        &self.row.trip.status
    }

    fn start_time(&self) -> Timestamp {
        self.row.trip.start_time
    }

    fn passengers_boarded(&self) -> i32 {
        self.row.trip.passengers_boarded
    }

    fn search_fields(&self) -> Vec<String> {
        let r = &self.row;
        [
            Some(r.trip.route_code.clone()),
            self.origin.name.clone(),
            self.origin.venue_name.clone(),
            self.destination.name.clone(),
            self.destination.venue_name.clone(),
            r.volunteer_name.clone(),
            r.volunteer_phone.clone(),
            r.driver_name.clone(),
            r.driver_phone.clone(),
            r.vehicle_registration.clone(),
            Some(format_start_time(r.trip.start_time)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Fully validated values for an insert or a full edit.
///
/// Endpoints are already resolved and the status snapshot normalised.
#[derive(Debug, Clone)]
pub struct TripWrite {
    pub route_code: String,
    pub region_id: Option<DbId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub origin: Option<Endpoint>,
    pub destination: Option<Endpoint>,
    pub vehicle_id: Option<DbId>,
    pub volunteer_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    pub status: StatusSnapshot,
    pub passengers_boarded: i32,
    pub wheelchairs_boarded: i32,
    pub notes: Option<String>,
}

/// Field-limited update from the quick details form. No status effect.
#[derive(Debug, Clone)]
pub struct TripQuickDetails {
    pub volunteer_id: Option<DbId>,
    pub driver_id: Option<DbId>,
    /// Looked up by registration; an unknown registration creates a vehicle.
    /// `None` clears the assignment.
    pub vehicle_registration: Option<String>,
    pub passengers_boarded: i32,
    pub wheelchairs_boarded: i32,
    pub notes: Option<String>,
}

/// Result of a write that may append a history row.
#[derive(Debug, Clone, Serialize)]
pub struct TripChange {
    pub trip: Trip,
    pub history_logged: bool,
}

/// Filters shared by the trip list, count and dashboard queries.
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    /// Region scope; `None` for global callers.
    pub region_id: Option<DbId>,
    /// Only these statuses; empty means all.
    pub statuses: Vec<String>,
    /// `ILIKE` patterns, one per search term. Every pattern must match.
    pub search_patterns: Vec<String>,
    /// Dashboard window: statuses outside the always-visible set must start
    /// after this instant. `None` disables the age bound.
    pub window_cutoff: Option<Timestamp>,
}

/// A row from the `trip_status_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripStatusHistory {
    pub id: DbId,
    pub trip_id: DbId,
    pub status: String,
    pub sub_status: String,
    pub breakdown_issue: Option<String>,
    pub passengers_boarded: i32,
    pub changed_by: Option<DbId>,
    pub changed_at: Timestamp,
}
