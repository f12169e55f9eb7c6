//! Dashboard window, count and ordering policy.
//!
//! Three nested trip sets drive the dashboard:
//!
//! 1. **history set**: every trip inside the [`HistoryWindow`]. In-flight
//!    statuses (see [`ALWAYS_VISIBLE_STATUSES`]) are included regardless of
//!    age; everything else only while `start_time` is newer than the cutoff.
//! 2. **dashboard set**: the history set narrowed to [`DASHBOARD_STATUSES`]
//!    that are still in the catalog (`Planned` always counts).
//! 3. **displayed list**: the dashboard set narrowed by the caller's status
//!    filter and search query, then sorted by [`status_priority`].
//!
//! Summary tiles are computed from sets 1 and 2 only, so toggling a status
//! filter or typing a search never changes the numbers.

use std::cmp::Ordering;

use chrono::TimeDelta;
use serde::Serialize;

use crate::error::CoreError;
use crate::search::SearchQuery;
use crate::trip_status::{
    StatusCatalog, STATUS_ACTIVE, STATUS_ARRIVING, STATUS_BREAKDOWN, STATUS_CANCELLED,
    STATUS_COMPLETED, STATUS_PLANNED, STATUS_SCHEDULED,
};
use crate::types::Timestamp;

/// Default history horizon in days.
pub const DEFAULT_HISTORY_DAYS: i64 = 7;

/// `history_days` value meaning "no age bound".
pub const ALL_TIME: i64 = -1;

/// Statuses shown regardless of how old the trip is.
pub const ALWAYS_VISIBLE_STATUSES: [&str; 4] = [
    STATUS_ACTIVE,
    STATUS_ARRIVING,
    STATUS_SCHEDULED,
    STATUS_BREAKDOWN,
];

/// Statuses the dashboard knows how to show. Anything else counts toward
/// the total only.
pub const DASHBOARD_STATUSES: [&str; 7] = [
    STATUS_ACTIVE,
    STATUS_ARRIVING,
    STATUS_SCHEDULED,
    STATUS_BREAKDOWN,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
    STATUS_PLANNED,
];

/// Largest accepted `history_days` (a little over a century).
pub const MAX_HISTORY_DAYS: i64 = 40_000;

/// Sort priority for statuses without an explicit rank.
pub const UNKNOWN_STATUS_PRIORITY: u8 = 99;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWindow {
    Days(i64),
    AllTime,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        HistoryWindow::Days(DEFAULT_HISTORY_DAYS)
    }
}

impl HistoryWindow {
    /// `-1` means all time; any other negative value, or anything above
    /// [`MAX_HISTORY_DAYS`], is rejected.
    pub fn from_days(days: i64) -> Result<Self, CoreError> {
        match days {
            ALL_TIME => Ok(HistoryWindow::AllTime),
            d if (0..=MAX_HISTORY_DAYS).contains(&d) => Ok(HistoryWindow::Days(d)),
            d => Err(CoreError::Validation(format!(
                "history_days must be -1 or between 0 and {MAX_HISTORY_DAYS}, got {d}"
            ))),
        }
    }

    pub fn days(self) -> i64 {
        match self {
            HistoryWindow::Days(d) => d,
            HistoryWindow::AllTime => ALL_TIME,
        }
    }

    /// Trips must start strictly after this instant to be inside the window.
    ///
    /// A window reaching past the representable range has no bound.
    pub fn cutoff(self, now: Timestamp) -> Option<Timestamp> {
        match self {
            HistoryWindow::Days(d) => {
                TimeDelta::try_days(d).and_then(|span| now.checked_sub_signed(span))
            }
            HistoryWindow::AllTime => None,
        }
    }

    pub fn includes(self, status: &str, start_time: Timestamp, now: Timestamp) -> bool {
        if is_always_visible(status) {
            return true;
        }
        match self.cutoff(now) {
            Some(cutoff) => start_time > cutoff,
            None => true,
        }
    }
}

pub fn is_always_visible(status: &str) -> bool {
    ALWAYS_VISIBLE_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// What the dashboard needs to know about a trip row.
pub trait DashboardTrip {
    fn status(&self) -> &str;
    fn start_time(&self) -> Timestamp;
    fn passengers_boarded(&self) -> i32;
    /// Values matched by free-text search.
    fn search_fields(&self) -> Vec<String>;
}

/// Keep only trips inside the window.
pub fn history_set<T: DashboardTrip>(
    trips: Vec<T>,
    window: HistoryWindow,
    now: Timestamp,
) -> Vec<T> {
    trips
        .into_iter()
        .filter(|t| window.includes(t.status(), t.start_time(), now))
        .collect()
}

/// Whether a trip with this status belongs on the dashboard.
pub fn is_dashboard_status(status: &str, catalog: &StatusCatalog) -> bool {
    DASHBOARD_STATUSES.contains(&status)
        && (status == STATUS_PLANNED || catalog.contains(status))
}

// ---------------------------------------------------------------------------
// Filters and ordering
// ---------------------------------------------------------------------------

/// Status chips selected on the dashboard. Empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter(Vec<String>);

impl StatusFilter {
    /// Parse a comma-separated list, ignoring blanks.
    pub fn parse(raw: Option<&str>) -> Self {
        Self(
            raw.unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn statuses(&self) -> &[String] {
        &self.0
    }

    pub fn allows(&self, status: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|s| s == status)
    }
}

/// Display rank of a status; lower sorts first.
pub fn status_priority(status: &str) -> u8 {
    match status {
        STATUS_BREAKDOWN => 1,
        STATUS_ARRIVING => 2,
        STATUS_ACTIVE => 3,
        STATUS_SCHEDULED => 4,
        STATUS_COMPLETED => 5,
        _ => UNKNOWN_STATUS_PRIORITY,
    }
}

/// Status priority first, then most recent start time.
pub fn display_order<T: DashboardTrip>(a: &T, b: &T) -> Ordering {
    status_priority(a.status())
        .cmp(&status_priority(b.status()))
        .then_with(|| b.start_time().cmp(&a.start_time()))
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub trips: i64,
    pub passengers: i64,
}

impl Tile {
    fn add(&mut self, passengers: i32) {
        self.trips += 1;
        self.passengers += i64::from(passengers.max(0));
    }
}

/// Numbers shown on the summary tiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub arriving: Tile,
    pub active: Tile,
    pub breakdown: Tile,
    /// Scheduled and Planned trips together.
    pub scheduled: Tile,
    pub completed: Tile,
    pub cancelled: Tile,
    pub total: Tile,
}

/// Compute the tiles from the history set.
///
/// Cancelled and Total come straight from the history set; the other tiles
/// only count trips in the dashboard set.
pub fn summarize<T: DashboardTrip>(history: &[T], catalog: &StatusCatalog) -> DashboardSummary {
    let mut summary = DashboardSummary::default();

    for trip in history {
        let status = trip.status();
        let pax = trip.passengers_boarded();

        summary.total.add(pax);
        if status == STATUS_CANCELLED {
            summary.cancelled.add(pax);
        }

        if !is_dashboard_status(status, catalog) {
            continue;
        }
        let tile = match status {
            STATUS_ARRIVING => &mut summary.arriving,
            STATUS_ACTIVE => &mut summary.active,
            STATUS_BREAKDOWN => &mut summary.breakdown,
            STATUS_SCHEDULED | STATUS_PLANNED => &mut summary.scheduled,
            STATUS_COMPLETED => &mut summary.completed,
            _ => continue,
        };
        tile.add(pax);
    }

    summary
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView<T> {
    pub history_days: i64,
    pub summary: DashboardSummary,
    pub trips: Vec<T>,
}

/// Build the dashboard from an already-windowed history set.
pub fn build_view<T: DashboardTrip>(
    history: Vec<T>,
    window: HistoryWindow,
    catalog: &StatusCatalog,
    filter: &StatusFilter,
    search: &SearchQuery,
) -> DashboardView<T> {
    let summary = summarize(&history, catalog);

    let mut trips: Vec<T> = history
        .into_iter()
        .filter(|t| is_dashboard_status(t.status(), catalog))
        .filter(|t| filter.allows(t.status()))
        .filter(|t| {
            search.is_empty() || {
                let fields = t.search_fields();
                search.matches(fields.iter().map(String::as_str))
            }
        })
        .collect();
    trips.sort_by(display_order);

    DashboardView {
        history_days: window.days(),
        summary,
        trips,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
