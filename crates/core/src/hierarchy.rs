//! Region / venue / location hierarchy resolution.
//!
//! A trip endpoint (origin or destination) is exactly one of:
//!
//! - a plain pickup location (a `locations` row with no venue),
//! - a venue with no specific drop-off,
//! - a venue plus one of that venue's drop-off locations.
//!
//! Submitted form data is normalised into an [`Endpoint`] by
//! [`resolve_endpoint`]; persisted rows are turned back into display names by
//! [`resolve_display`], which follows both ownership chains (trip -> venue and
//! trip -> location -> venue).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Display name used when an endpoint references a row that no longer exists.
pub const UNKNOWN_ENDPOINT_NAME: &str = "Unknown";

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A region as far as resolution is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionNode {
    pub id: DbId,
    pub name: String,
}

/// A venue (event site) inside a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueNode {
    pub id: DbId,
    pub name: String,
    pub region_id: DbId,
}

/// A pickup location (`venue_id` is `None`) or a drop-off inside a venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationNode {
    pub id: DbId,
    pub name: String,
    pub region_id: Option<DbId>,
    pub venue_id: Option<DbId>,
}

impl LocationNode {
    pub fn is_drop_off(&self) -> bool {
        self.venue_id.is_some()
    }
}

/// Read access to hierarchy rows by id.
pub trait HierarchyLookup {
    fn location(&self, id: DbId) -> Option<&LocationNode>;
    fn venue(&self, id: DbId) -> Option<&VenueNode>;
}

/// In-memory index over venues and locations, built once per request.
#[derive(Debug, Default)]
pub struct HierarchyIndex {
    venues: HashMap<DbId, VenueNode>,
    locations: HashMap<DbId, LocationNode>,
}

impl HierarchyIndex {
    pub fn new(
        venues: impl IntoIterator<Item = VenueNode>,
        locations: impl IntoIterator<Item = LocationNode>,
    ) -> Self {
        Self {
            venues: venues.into_iter().map(|v| (v.id, v)).collect(),
            locations: locations.into_iter().map(|l| (l.id, l)).collect(),
        }
    }
}

impl HierarchyLookup for HierarchyIndex {
    fn location(&self, id: DbId) -> Option<&LocationNode> {
        self.locations.get(&id)
    }

    fn venue(&self, id: DbId) -> Option<&VenueNode> {
        self.venues.get(&id)
    }
}

// ---------------------------------------------------------------------------
// Endpoint resolution (write side)
// ---------------------------------------------------------------------------

/// Which end of the trip is being resolved. Only used in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    Origin,
    Destination,
}

impl EndpointSide {
    pub fn label(self) -> &'static str {
        match self {
            EndpointSide::Origin => "Origin",
            EndpointSide::Destination => "Destination",
        }
    }
}

/// The raw `(location_id, venue_id)` pair submitted for one endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointSelection {
    pub location_id: Option<DbId>,
    pub venue_id: Option<DbId>,
}

/// Canonical reference stored for one trip endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Endpoint {
    Pickup { location_id: DbId },
    Venue { venue_id: DbId },
    DropOff { venue_id: DbId, location_id: DbId },
}

impl Endpoint {
    /// Value for the `origin_id` / `destination_id` column.
    pub fn location_id(&self) -> Option<DbId> {
        match *self {
            Endpoint::Pickup { location_id } | Endpoint::DropOff { location_id, .. } => {
                Some(location_id)
            }
            Endpoint::Venue { .. } => None,
        }
    }

    /// Value for the `origin_venue_id` / `destination_venue_id` column.
    pub fn venue_id(&self) -> Option<DbId> {
        match *self {
            Endpoint::Venue { venue_id } | Endpoint::DropOff { venue_id, .. } => Some(venue_id),
            Endpoint::Pickup { .. } => None,
        }
    }

    /// Rebuild an endpoint from its two persisted columns.
    pub fn from_columns(location_id: Option<DbId>, venue_id: Option<DbId>) -> Option<Self> {
        match (location_id, venue_id) {
            (Some(location_id), Some(venue_id)) => Some(Endpoint::DropOff {
                venue_id,
                location_id,
            }),
            (None, Some(venue_id)) => Some(Endpoint::Venue { venue_id }),
            (Some(location_id), None) => Some(Endpoint::Pickup { location_id }),
            (None, None) => None,
        }
    }
}

/// Split an optional endpoint into its `(location_id, venue_id)` columns.
pub fn endpoint_columns(endpoint: Option<Endpoint>) -> (Option<DbId>, Option<DbId>) {
    match endpoint {
        Some(e) => (e.location_id(), e.venue_id()),
        None => (None, None),
    }
}

/// Normalise a submitted endpoint into its canonical form.
///
/// The venue path always wins when a venue id is present: the location is
/// kept only when it is a drop-off of that same venue, otherwise the
/// endpoint degrades to "venue, no specific drop-off". Without a venue the
/// location is stored as a pickup and must sit in the trip's region.
///
/// `venue` and `location` are the rows for the submitted ids as looked up by
/// the caller; `None` means the id was not submitted or does not exist.
pub fn resolve_endpoint(
    side: EndpointSide,
    selection: EndpointSelection,
    region_id: Option<DbId>,
    venue: Option<&VenueNode>,
    location: Option<&LocationNode>,
) -> Result<Option<Endpoint>, CoreError> {
    if let Some(venue_id) = selection.venue_id {
        let venue = venue
            .filter(|v| v.id == venue_id)
            .ok_or(CoreError::NotFound {
                entity: "Venue",
                id: venue_id,
            })?;

        if let Some(region_id) = region_id {
            if venue.region_id != region_id {
                return Err(CoreError::Validation(format!(
                    "{} venue '{}' does not belong to the trip's region",
                    side.label(),
                    venue.name
                )));
            }
        }

        let drop_off = selection.location_id.and_then(|location_id| {
            location
                .filter(|l| l.id == location_id && l.venue_id == Some(venue_id))
                .map(|l| l.id)
        });

        return Ok(Some(match drop_off {
            Some(location_id) => Endpoint::DropOff {
                venue_id,
                location_id,
            },
            None => Endpoint::Venue { venue_id },
        }));
    }

    let Some(location_id) = selection.location_id else {
        return Ok(None);
    };

    let location = location
        .filter(|l| l.id == location_id)
        .ok_or(CoreError::NotFound {
            entity: "Location",
            id: location_id,
        })?;

    if let Some(region_id) = region_id {
        if location.region_id != Some(region_id) {
            return Err(CoreError::Validation(format!(
                "{} location '{}' does not belong to the trip's region",
                side.label(),
                location.name
            )));
        }
    }

    Ok(Some(Endpoint::Pickup { location_id }))
}

// ---------------------------------------------------------------------------
// Display resolution (read side)
// ---------------------------------------------------------------------------

/// Human-readable names for one persisted endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EndpointDisplay {
    /// Location name if the location exists, else the venue name, else
    /// [`UNKNOWN_ENDPOINT_NAME`]. `None` only when nothing is referenced.
    pub name: Option<String>,
    /// Venue context, reached directly or through the location's parent venue.
    pub venue_name: Option<String>,
}

/// Resolve the display names of a persisted endpoint.
pub fn resolve_display(
    location_id: Option<DbId>,
    venue_id: Option<DbId>,
    lookup: &impl HierarchyLookup,
) -> EndpointDisplay {
    if location_id.is_none() && venue_id.is_none() {
        return EndpointDisplay::default();
    }

    let location = location_id.and_then(|id| lookup.location(id));

    let venue = venue_id
        .and_then(|id| lookup.venue(id))
        .or_else(|| location.and_then(|l| l.venue_id).and_then(|id| lookup.venue(id)));

    let venue_name = venue.map(|v| v.name.clone());

    let name = location
        .map(|l| l.name.clone())
        .or_else(|| venue_name.clone())
        .unwrap_or_else(|| UNKNOWN_ENDPOINT_NAME.to_string());

    EndpointDisplay {
        name: Some(name),
        venue_name,
    }
}

// ---------------------------------------------------------------------------
// Management helpers
// ---------------------------------------------------------------------------

/// The three managed hierarchy levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyKind {
    Region,
    Venue,
    Location,
}

impl HierarchyKind {
    pub fn entity_name(self) -> &'static str {
        match self {
            HierarchyKind::Region => "Region",
            HierarchyKind::Venue => "Venue",
            HierarchyKind::Location => "Location",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            HierarchyKind::Region => "regions",
            HierarchyKind::Venue => "venues",
            HierarchyKind::Location => "locations",
        }
    }
}

/// Trim and validate a region/venue/location name.
pub fn validate_name(kind: HierarchyKind, name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!(
            "{} name is required",
            kind.entity_name()
        )));
    }
    Ok(trimmed.to_string())
}

/// Reject a delete while trips still reference the entity.
///
/// `referencing_trips` is the count from the pre-check query: trips in the
/// region, trips routed directly to the venue, or trips using the location
/// as origin/destination.
pub fn ensure_deletable(kind: HierarchyKind, referencing_trips: i64) -> Result<(), CoreError> {
    if referencing_trips <= 0 {
        return Ok(());
    }
    let msg = match kind {
        HierarchyKind::Region => {
            format!("Cannot delete Region. It has {referencing_trips} active Trips attached.")
        }
        HierarchyKind::Venue => {
            "Cannot delete this Venue. Trips are currently routed directly to it.".to_string()
        }
        HierarchyKind::Location => "Cannot delete this Location/Drop-off. It is currently \
                                    acting as an Origin or Destination for an existing Trip."
            .to_string(),
    };
    Err(CoreError::InUse(msg))
}

/// Work out the `region_id` for a new location.
///
/// A drop-off inherits its venue's region (a conflicting explicit region is
/// rejected); a pickup must name a region.
pub fn location_region(
    venue: Option<&VenueNode>,
    region_id: Option<DbId>,
) -> Result<DbId, CoreError> {
    match (venue, region_id) {
        (Some(venue), Some(region_id)) if venue.region_id != region_id => {
            Err(CoreError::Validation(format!(
                "Drop-off region must match venue '{}' region",
                venue.name
            )))
        }
        (Some(venue), _) => Ok(venue.region_id),
        (None, Some(region_id)) => Ok(region_id),
        (None, None) => Err(CoreError::Validation(
            "A pickup location requires a region".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// A venue with its drop-off locations.
#[derive(Debug, Clone, Serialize)]
pub struct VenueTree {
    pub id: DbId,
    pub name: String,
    pub drop_offs: Vec<LocationNode>,
}

/// A region with its venues and standalone pickup locations.
#[derive(Debug, Clone, Serialize)]
pub struct RegionTree {
    pub id: DbId,
    pub name: String,
    pub venues: Vec<VenueTree>,
    pub pickup_locations: Vec<LocationNode>,
}

/// Assemble flat rows into a region -> venue -> drop-off tree.
///
/// Input order is preserved at every level. Drop-offs whose venue is not in
/// `venues` and pickups whose region is not in `regions` are left out.
pub fn build_tree(
    regions: Vec<RegionNode>,
    venues: Vec<VenueNode>,
    locations: Vec<LocationNode>,
) -> Vec<RegionTree> {
    let mut drop_offs: HashMap<DbId, Vec<LocationNode>> = HashMap::new();
    let mut pickups: HashMap<DbId, Vec<LocationNode>> = HashMap::new();
    for location in locations {
        match (location.venue_id, location.region_id) {
            (Some(venue_id), _) => drop_offs.entry(venue_id).or_default().push(location),
            (None, Some(region_id)) => pickups.entry(region_id).or_default().push(location),
            (None, None) => {}
        }
    }

    let mut venues_by_region: HashMap<DbId, Vec<VenueTree>> = HashMap::new();
    for venue in venues {
        venues_by_region
            .entry(venue.region_id)
            .or_default()
            .push(VenueTree {
                id: venue.id,
                name: venue.name,
                drop_offs: drop_offs.remove(&venue.id).unwrap_or_default(),
            });
    }

    regions
        .into_iter()
        .map(|r| RegionTree {
            venues: venues_by_region.remove(&r.id).unwrap_or_default(),
            pickup_locations: pickups.remove(&r.id).unwrap_or_default(),
            id: r.id,
            name: r.name,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const REGION: DbId = 1;
    const OTHER_REGION: DbId = 2;

    fn venue(id: DbId, name: &str, region_id: DbId) -> VenueNode {
        VenueNode {
            id,
            name: name.to_string(),
            region_id,
        }
    }

    fn pickup(id: DbId, name: &str, region_id: DbId) -> LocationNode {
        LocationNode {
            id,
            name: name.to_string(),
            region_id: Some(region_id),
            venue_id: None,
        }
    }

    fn drop_off(id: DbId, name: &str, venue: &VenueNode) -> LocationNode {
        LocationNode {
            id,
            name: name.to_string(),
            region_id: Some(venue.region_id),
            venue_id: Some(venue.id),
        }
    }

    fn select(location_id: Option<DbId>, venue_id: Option<DbId>) -> EndpointSelection {
        EndpointSelection {
            location_id,
            venue_id,
        }
    }

    // -- resolve_endpoint -------------------------------------------------

    #[test]
    fn venue_with_matching_drop_off_resolves_to_drop_off() {
        let stadium = venue(10, "Stadium", REGION);
        let gate = drop_off(100, "Gate 1", &stadium);

        let resolved = resolve_endpoint(
            EndpointSide::Destination,
            select(Some(100), Some(10)),
            Some(REGION),
            Some(&stadium),
            Some(&gate),
        )
        .unwrap();

        assert_eq!(
            resolved,
            Some(Endpoint::DropOff {
                venue_id: 10,
                location_id: 100
            })
        );
    }

    #[test]
    fn venue_with_foreign_location_drops_the_location() {
        let stadium = venue(10, "Stadium", REGION);
        let arena = venue(11, "Arena", REGION);
        let arena_gate = drop_off(101, "Arena Gate", &arena);

        let resolved = resolve_endpoint(
            EndpointSide::Origin,
            select(Some(101), Some(10)),
            Some(REGION),
            Some(&stadium),
            Some(&arena_gate),
        )
        .unwrap();

        assert_eq!(resolved, Some(Endpoint::Venue { venue_id: 10 }));
    }

    #[test]
    fn venue_only_resolves_to_venue() {
        let stadium = venue(10, "Stadium", REGION);
        let resolved = resolve_endpoint(
            EndpointSide::Origin,
            select(None, Some(10)),
            Some(REGION),
            Some(&stadium),
            None,
        )
        .unwrap();
        assert_eq!(resolved, Some(Endpoint::Venue { venue_id: 10 }));
    }

    #[test]
    fn venue_outside_region_is_rejected() {
        let stadium = venue(10, "Stadium", OTHER_REGION);
        let result = resolve_endpoint(
            EndpointSide::Origin,
            select(None, Some(10)),
            Some(REGION),
            Some(&stadium),
            None,
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Origin venue"));
    }

    #[test]
    fn missing_venue_row_is_not_found() {
        let result = resolve_endpoint(
            EndpointSide::Origin,
            select(None, Some(10)),
            Some(REGION),
            None,
            None,
        );
        assert_matches!(
            result,
            Err(CoreError::NotFound {
                entity: "Venue",
                id: 10
            })
        );
    }

    #[test]
    fn pickup_in_region_resolves_to_pickup() {
        let airport = pickup(5, "Airport", REGION);
        let resolved = resolve_endpoint(
            EndpointSide::Origin,
            select(Some(5), None),
            Some(REGION),
            None,
            Some(&airport),
        )
        .unwrap();
        assert_eq!(resolved, Some(Endpoint::Pickup { location_id: 5 }));
    }

    #[test]
    fn pickup_outside_region_is_rejected() {
        let airport = pickup(5, "Airport", OTHER_REGION);
        let result = resolve_endpoint(
            EndpointSide::Destination,
            select(Some(5), None),
            Some(REGION),
            None,
            Some(&airport),
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("Destination location"));
    }

    #[test]
    fn pickup_without_trip_region_skips_region_check() {
        let airport = pickup(5, "Airport", OTHER_REGION);
        let resolved = resolve_endpoint(
            EndpointSide::Origin,
            select(Some(5), None),
            None,
            None,
            Some(&airport),
        )
        .unwrap();
        assert_eq!(resolved, Some(Endpoint::Pickup { location_id: 5 }));
    }

    #[test]
    fn empty_selection_resolves_to_none() {
        let resolved =
            resolve_endpoint(EndpointSide::Origin, select(None, None), Some(REGION), None, None)
                .unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn endpoint_columns_round_trip() {
        let e = Endpoint::DropOff {
            venue_id: 3,
            location_id: 9,
        };
        let (loc, ven) = endpoint_columns(Some(e));
        assert_eq!((loc, ven), (Some(9), Some(3)));
        assert_eq!(Endpoint::from_columns(loc, ven), Some(e));
        assert_eq!(endpoint_columns(None), (None, None));
    }

    // -- resolve_display --------------------------------------------------

    fn index() -> HierarchyIndex {
        let stadium = venue(10, "Stadium", REGION);
        let gate = drop_off(100, "Gate 1", &stadium);
        let airport = pickup(5, "Airport", REGION);
        HierarchyIndex::new(vec![stadium], vec![gate, airport])
    }

    #[test]
    fn venue_only_trip_displays_venue_name() {
        let d = resolve_display(None, Some(10), &index());
        assert_eq!(d.name.as_deref(), Some("Stadium"));
        assert_eq!(d.venue_name.as_deref(), Some("Stadium"));
    }

    #[test]
    fn drop_off_location_without_venue_id_reaches_venue_through_location() {
        let d = resolve_display(Some(100), None, &index());
        assert_eq!(d.name.as_deref(), Some("Gate 1"));
        assert_eq!(d.venue_name.as_deref(), Some("Stadium"));
    }

    #[test]
    fn location_name_wins_over_venue_name() {
        let d = resolve_display(Some(100), Some(10), &index());
        assert_eq!(d.name.as_deref(), Some("Gate 1"));
        assert_eq!(d.venue_name.as_deref(), Some("Stadium"));
    }

    #[test]
    fn pickup_has_no_venue_context() {
        let d = resolve_display(Some(5), None, &index());
        assert_eq!(d.name.as_deref(), Some("Airport"));
        assert_eq!(d.venue_name, None);
    }

    #[test]
    fn deleted_location_displays_unknown() {
        let d = resolve_display(Some(999), None, &index());
        assert_eq!(d.name.as_deref(), Some(UNKNOWN_ENDPOINT_NAME));
    }

    #[test]
    fn deleted_drop_off_falls_back_to_venue() {
        let d = resolve_display(Some(999), Some(10), &index());
        assert_eq!(d.name.as_deref(), Some("Stadium"));
    }

    #[test]
    fn unset_endpoint_has_no_name() {
        assert_eq!(resolve_display(None, None, &index()), EndpointDisplay::default());
    }

    // -- management helpers -----------------------------------------------

    #[test]
    fn delete_allowed_without_references() {
        assert!(ensure_deletable(HierarchyKind::Region, 0).is_ok());
        assert!(ensure_deletable(HierarchyKind::Location, 0).is_ok());
    }

    #[test]
    fn region_delete_message_includes_count() {
        let err = ensure_deletable(HierarchyKind::Region, 3).unwrap_err();
        assert_matches!(err, CoreError::InUse(msg) if msg.contains("3 active Trips"));
    }

    #[test]
    fn venue_and_location_deletes_are_blocked() {
        assert_matches!(
            ensure_deletable(HierarchyKind::Venue, 1),
            Err(CoreError::InUse(_))
        );
        assert_matches!(
            ensure_deletable(HierarchyKind::Location, 2),
            Err(CoreError::InUse(_))
        );
    }

    #[test]
    fn drop_off_inherits_venue_region() {
        let stadium = venue(10, "Stadium", REGION);
        assert_eq!(location_region(Some(&stadium), None).unwrap(), REGION);
        assert_eq!(location_region(Some(&stadium), Some(REGION)).unwrap(), REGION);
        assert!(location_region(Some(&stadium), Some(OTHER_REGION)).is_err());
    }

    #[test]
    fn pickup_requires_region() {
        assert_eq!(location_region(None, Some(REGION)).unwrap(), REGION);
        assert_matches!(location_region(None, None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            validate_name(HierarchyKind::Venue, "  Hall A ").unwrap(),
            "Hall A"
        );
        assert!(validate_name(HierarchyKind::Region, "   ").is_err());
    }

    #[test]
    fn tree_groups_drop_offs_and_pickups() {
        let stadium = venue(10, "Stadium", REGION);
        let gate = drop_off(100, "Gate 1", &stadium);
        let airport = pickup(5, "Airport", REGION);
        let elsewhere = pickup(6, "Depot", OTHER_REGION);

        let tree = build_tree(
            vec![
                RegionNode {
                    id: REGION,
                    name: "North".into(),
                },
                RegionNode {
                    id: OTHER_REGION,
                    name: "South".into(),
                },
            ],
            vec![stadium],
            vec![gate, airport, elsewhere],
        );

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].venues.len(), 1);
        assert_eq!(tree[0].venues[0].drop_offs[0].name, "Gate 1");
        assert_eq!(tree[0].pickup_locations[0].name, "Airport");
        assert!(tree[1].venues.is_empty());
        assert_eq!(tree[1].pickup_locations[0].name, "Depot");
    }
}
