//! Trip status workflow rules.
//!
//! Statuses and sub-statuses form a user-editable catalog referenced by name
//! (trips store the status string, sub-statuses store their parent's name in
//! `linked_status`). There is no fixed transition graph: any catalog status
//! may be set from any other. This module validates a requested transition,
//! normalises the submitted values, and decides whether a history row is due.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Well-known status names used by the dashboard policy.
pub const STATUS_PLANNED: &str = "Planned";
pub const STATUS_SCHEDULED: &str = "Scheduled";
pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_ARRIVING: &str = "Arriving";
pub const STATUS_BREAKDOWN: &str = "Breakdown";
pub const STATUS_COMPLETED: &str = "Completed";
pub const STATUS_CANCELLED: &str = "Cancelled";

/// Status given to a trip created without one.
pub const DEFAULT_STATUS: &str = STATUS_PLANNED;
/// Sub-status given to a trip created without one.
pub const DEFAULT_SUB_STATUS: &str = STATUS_SCHEDULED;

/// Maximum length of a status or sub-status name.
pub const MAX_STATUS_NAME_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A core status as far as the workflow is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusDef {
    pub name: String,
    pub sort_order: i32,
    pub passenger_count_required: bool,
}

/// A sub-status and the status name it refines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubStatusDef {
    pub name: String,
    pub linked_status: String,
    pub sort_order: i32,
}

/// Name-indexed snapshot of the status catalog, loaded per request.
#[derive(Debug, Default)]
pub struct StatusCatalog {
    statuses: HashMap<String, StatusDef>,
    sub_statuses: HashMap<String, SubStatusDef>,
}

impl StatusCatalog {
    pub fn new(
        statuses: impl IntoIterator<Item = StatusDef>,
        sub_statuses: impl IntoIterator<Item = SubStatusDef>,
    ) -> Self {
        Self {
            statuses: statuses
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
            sub_statuses: sub_statuses
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
        }
    }

    pub fn status(&self, name: &str) -> Option<&StatusDef> {
        self.statuses.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.statuses.contains_key(name)
    }

    /// Look up a status, rejecting names that are not in the catalog.
    pub fn require_status(&self, name: &str) -> Result<&StatusDef, CoreError> {
        self.status(name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown trip status '{name}'")))
    }

    /// A sub-status is valid when it equals the status itself or is linked to it.
    pub fn validate_sub_status(&self, status: &str, sub_status: &str) -> Result<(), CoreError> {
        if sub_status == status {
            return Ok(());
        }
        match self.sub_statuses.get(sub_status) {
            Some(def) if def.linked_status == status => Ok(()),
            Some(def) => Err(CoreError::Validation(format!(
                "Sub-status '{sub_status}' belongs to '{}', not '{status}'",
                def.linked_status
            ))),
            None => Err(CoreError::Validation(format!(
                "Unknown trip sub-status '{sub_status}'"
            ))),
        }
    }

    /// Sub-statuses whose `linked_status` matches no catalog status.
    pub fn orphaned_sub_statuses(&self) -> Vec<&SubStatusDef> {
        let mut orphans: Vec<&SubStatusDef> = self
            .sub_statuses
            .values()
            .filter(|s| !self.statuses.contains_key(&s.linked_status))
            .collect();
        orphans.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.name.cmp(&b.name)));
        orphans
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// The three fields tracked by the history log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub status: String,
    pub sub_status: String,
    pub breakdown_issue: Option<String>,
}

/// A requested status change as submitted by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressRequest {
    pub status: String,
    pub sub_status: Option<String>,
    pub breakdown_issue: Option<String>,
}

impl ProgressRequest {
    /// Trim the submitted values. An empty sub-status falls back to the
    /// status name, an empty breakdown issue becomes `None`.
    pub fn normalize(&self) -> StatusSnapshot {
        let status = self.status.trim().to_string();
        let sub_status = self
            .sub_status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| status.clone());
        let breakdown_issue = self
            .breakdown_issue
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        StatusSnapshot {
            status,
            sub_status,
            breakdown_issue,
        }
    }
}

/// Which write path a status change arrives through.
///
/// The quick progress path is a field-limited update used from the tracking
/// screens and does not apply the passenger-count gate; the full edit path
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPath {
    Quick,
    FullEdit,
}

impl ProgressPath {
    pub fn enforces_passenger_gate(self) -> bool {
        matches!(self, ProgressPath::FullEdit)
    }
}

/// Reject a status that requires boarded passengers when none are recorded.
pub fn check_passenger_gate(
    path: ProgressPath,
    status: &StatusDef,
    passengers_boarded: i32,
) -> Result<(), CoreError> {
    if path.enforces_passenger_gate() && status.passenger_count_required && passengers_boarded <= 0
    {
        return Err(CoreError::Validation(format!(
            "Passengers boarded must be greater than 0 for status '{}'",
            status.name
        )));
    }
    Ok(())
}

/// Validate a requested transition and return the values to persist.
pub fn validate_transition(
    catalog: &StatusCatalog,
    path: ProgressPath,
    request: &ProgressRequest,
    passengers_boarded: i32,
) -> Result<StatusSnapshot, CoreError> {
    let next = request.normalize();
    let status = catalog.require_status(&next.status)?;
    catalog.validate_sub_status(&next.status, &next.sub_status)?;
    check_passenger_gate(path, status, passengers_boarded)?;
    Ok(next)
}

/// Whether a history row is due: always for a new trip, otherwise only
/// when at least one tracked field differs from the stored values.
pub fn history_needed(prior: Option<&StatusSnapshot>, next: &StatusSnapshot) -> bool {
    prior != Some(next)
}

// ---------------------------------------------------------------------------
// Catalog edits
// ---------------------------------------------------------------------------

/// Trim and validate a status or sub-status name.
pub fn validate_status_name(name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Status name is required".to_string()));
    }
    if trimmed.chars().count() > MAX_STATUS_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Status name must be at most {MAX_STATUS_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// A pending rename, present only when the name actually changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub old_name: String,
    pub new_name: String,
}

pub fn plan_rename(old_name: &str, new_name: &str) -> Option<RenamePlan> {
    (old_name != new_name).then(|| RenamePlan {
        old_name: old_name.to_string(),
        new_name: new_name.to_string(),
    })
}

/// What a status delete left pointing at the removed name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanReport {
    pub status: String,
    /// Sub-statuses whose `linked_status` was cleared.
    pub unlinked_sub_statuses: Vec<String>,
    /// Trips still carrying the deleted status name.
    pub stranded_trips: i64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn status(name: &str, sort_order: i32, required: bool) -> StatusDef {
        StatusDef {
            name: name.to_string(),
            sort_order,
            passenger_count_required: required,
        }
    }

    fn sub(name: &str, linked: &str) -> SubStatusDef {
        SubStatusDef {
            name: name.to_string(),
            linked_status: linked.to_string(),
            sort_order: 0,
        }
    }

    fn catalog() -> StatusCatalog {
        StatusCatalog::new(
            vec![
                status(STATUS_PLANNED, 0, false),
                status(STATUS_SCHEDULED, 1, false),
                status(STATUS_ACTIVE, 2, true),
                status(STATUS_BREAKDOWN, 4, false),
            ],
            vec![
                sub("Boarding", STATUS_ACTIVE),
                sub("En Route", STATUS_ACTIVE),
                sub("Tyre Burst", STATUS_BREAKDOWN),
                sub("Ghost", "Retired"),
            ],
        )
    }

    fn request(status: &str, sub_status: Option<&str>, breakdown: Option<&str>) -> ProgressRequest {
        ProgressRequest {
            status: status.to_string(),
            sub_status: sub_status.map(str::to_string),
            breakdown_issue: breakdown.map(str::to_string),
        }
    }

    // -- normalisation ------------------------------------------------------

    #[test]
    fn empty_sub_status_falls_back_to_status() {
        let snap = request("Active", Some("  "), None).normalize();
        assert_eq!(snap.sub_status, "Active");

        let snap = request("Active", None, None).normalize();
        assert_eq!(snap.sub_status, "Active");
    }

    #[test]
    fn blank_breakdown_issue_becomes_none() {
        let snap = request("Breakdown", None, Some("   ")).normalize();
        assert_eq!(snap.breakdown_issue, None);

        let snap = request("Breakdown", None, Some(" flat tyre ")).normalize();
        assert_eq!(snap.breakdown_issue.as_deref(), Some("flat tyre"));
    }

    // -- catalog validation -------------------------------------------------

    #[test]
    fn unknown_status_is_rejected() {
        let result =
            validate_transition(&catalog(), ProgressPath::Quick, &request("Teleported", None, None), 0);
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Teleported"));
    }

    #[test]
    fn linked_sub_status_is_accepted() {
        let snap = validate_transition(
            &catalog(),
            ProgressPath::Quick,
            &request("Active", Some("Boarding"), None),
            0,
        )
        .unwrap();
        assert_eq!(snap.sub_status, "Boarding");
    }

    #[test]
    fn sub_status_of_another_status_is_rejected() {
        let result = validate_transition(
            &catalog(),
            ProgressPath::Quick,
            &request("Active", Some("Tyre Burst"), None),
            0,
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Breakdown"));
    }

    #[test]
    fn unknown_sub_status_is_rejected() {
        let result = catalog().validate_sub_status("Active", "Parked");
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn orphans_are_reported() {
        let cat = catalog();
        let orphans = cat.orphaned_sub_statuses();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].name, "Ghost");
    }

    // -- passenger gate -----------------------------------------------------

    #[test]
    fn full_edit_rejects_zero_passengers_for_gated_status() {
        let result = validate_transition(
            &catalog(),
            ProgressPath::FullEdit,
            &request("Active", None, None),
            0,
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Passengers"));
    }

    #[test]
    fn full_edit_accepts_boarded_passengers_for_gated_status() {
        let result = validate_transition(
            &catalog(),
            ProgressPath::FullEdit,
            &request("Active", None, None),
            1,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn quick_path_skips_passenger_gate() {
        let result =
            validate_transition(&catalog(), ProgressPath::Quick, &request("Active", None, None), 0);
        assert!(result.is_ok());
    }

    #[test]
    fn ungated_status_needs_no_passengers() {
        let result = validate_transition(
            &catalog(),
            ProgressPath::FullEdit,
            &request("Scheduled", None, None),
            0,
        );
        assert!(result.is_ok());
    }

    // -- history --------------------------------------------------------------

    #[test]
    fn identical_snapshot_logs_no_history() {
        let snap = request("Active", Some("Boarding"), None).normalize();
        assert!(!history_needed(Some(&snap), &snap.clone()));
    }

    #[test]
    fn any_changed_field_logs_history() {
        let prior = request("Breakdown", None, Some("flat tyre")).normalize();

        let other_issue = request("Breakdown", None, Some("engine")).normalize();
        assert!(history_needed(Some(&prior), &other_issue));

        let other_sub = request("Breakdown", Some("Tyre Burst"), Some("flat tyre")).normalize();
        assert!(history_needed(Some(&prior), &other_sub));
    }

    #[test]
    fn new_trip_always_logs_history() {
        let snap = request(DEFAULT_STATUS, Some(DEFAULT_SUB_STATUS), None).normalize();
        assert!(history_needed(None, &snap));
    }

    // -- catalog edits ----------------------------------------------------------

    #[test]
    fn rename_plan_only_when_name_changes() {
        assert_eq!(plan_rename("Active", "Active"), None);
        assert_eq!(
            plan_rename("Active", "Rolling"),
            Some(RenamePlan {
                old_name: "Active".into(),
                new_name: "Rolling".into()
            })
        );
    }

    #[test]
    fn status_names_are_trimmed_and_bounded() {
        assert_eq!(validate_status_name("  Delayed ").unwrap(), "Delayed");
        assert!(validate_status_name("").is_err());
        assert!(validate_status_name(&"x".repeat(MAX_STATUS_NAME_LEN + 1)).is_err());
    }
}
