//! Integration tests for guarded hierarchy deletes and renames.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tms_core::hierarchy::{Endpoint, HierarchyKind};
use tms_core::trip_status::StatusSnapshot;
use tms_core::types::DbId;
use tms_db::models::location::CreateLocation;
use tms_db::models::region::CreateRegion;
use tms_db::models::trip::TripWrite;
use tms_db::models::venue::CreateVenue;
use tms_db::repositories::{
    DeleteOutcome, HierarchyRepo, LocationRepo, RegionRepo, TripRepo, VenueRepo,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

struct Tree {
    region_id: DbId,
    venue_id: DbId,
    drop_off_id: DbId,
    pickup_id: DbId,
}

async fn seed_tree(pool: &PgPool, region: &str) -> Tree {
    let region_id = RegionRepo::create(
        pool,
        &CreateRegion {
            name: region.to_string(),
        },
    )
    .await
    .unwrap()
    .id;
    let venue_id = VenueRepo::create(
        pool,
        &CreateVenue {
            name: format!("{region} Stadium"),
            region_id,
        },
    )
    .await
    .unwrap()
    .id;
    let drop_off_id = LocationRepo::create(
        pool,
        &CreateLocation {
            name: format!("{region} Gate"),
            region_id: Some(region_id),
            venue_id: Some(venue_id),
        },
    )
    .await
    .unwrap()
    .id;
    let pickup_id = LocationRepo::create(
        pool,
        &CreateLocation {
            name: format!("{region} Depot"),
            region_id: Some(region_id),
            venue_id: None,
        },
    )
    .await
    .unwrap()
    .id;
    Tree {
        region_id,
        venue_id,
        drop_off_id,
        pickup_id,
    }
}

fn trip(region_id: Option<DbId>, origin: Option<Endpoint>, destination: Option<Endpoint>) -> TripWrite {
    let start = Utc::now();
    TripWrite {
        route_code: "H-1".into(),
        region_id,
        start_time: start,
        end_time: start + Duration::hours(1),
        origin,
        destination,
        vehicle_id: None,
        volunteer_id: None,
        driver_id: None,
        status: StatusSnapshot {
            status: "Planned".into(),
            sub_status: "Scheduled".into(),
            breakdown_issue: None,
        },
        passengers_boarded: 0,
        wheelchairs_boarded: 0,
        notes: None,
    }
}

// ---------------------------------------------------------------------------
// Test: region
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_region_delete_cascades_in_order(pool: PgPool) {
    let tree = seed_tree(&pool, "West").await;
    let other = seed_tree(&pool, "South").await;

    let outcome = HierarchyRepo::delete(&pool, HierarchyKind::Region, tree.region_id)
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);

    assert!(RegionRepo::find_by_id(&pool, tree.region_id).await.unwrap().is_none());
    assert!(VenueRepo::find_by_id(&pool, tree.venue_id).await.unwrap().is_none());
    assert!(LocationRepo::find_by_id(&pool, tree.drop_off_id).await.unwrap().is_none());
    assert!(LocationRepo::find_by_id(&pool, tree.pickup_id).await.unwrap().is_none());

    // Another region's tree is untouched.
    assert!(VenueRepo::find_by_id(&pool, other.venue_id).await.unwrap().is_some());
    assert!(LocationRepo::find_by_id(&pool, other.pickup_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_region_delete_blocked_by_trip(pool: PgPool) {
    let tree = seed_tree(&pool, "West").await;
    TripRepo::create(&pool, &trip(Some(tree.region_id), None, None), None)
        .await
        .unwrap();

    let outcome = HierarchyRepo::delete_region(&pool, tree.region_id).await.unwrap();
    assert_matches!(outcome, DeleteOutcome::Blocked { referencing_trips: 1 });

    assert!(RegionRepo::find_by_id(&pool, tree.region_id).await.unwrap().is_some());
    assert!(VenueRepo::find_by_id(&pool, tree.venue_id).await.unwrap().is_some());
    assert!(LocationRepo::find_by_id(&pool, tree.pickup_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_region_delete_blocked_by_trip_through_venue(pool: PgPool) {
    let tree = seed_tree(&pool, "North").await;
    let origin = Endpoint::Venue {
        venue_id: tree.venue_id,
    };
    TripRepo::create(&pool, &trip(None, Some(origin), None), None)
        .await
        .unwrap();

    let outcome = HierarchyRepo::delete_region(&pool, tree.region_id).await.unwrap();
    assert_matches!(outcome, DeleteOutcome::Blocked { referencing_trips: 1 });
    assert!(VenueRepo::find_by_id(&pool, tree.venue_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_region_delete_blocked_by_trip_through_location(pool: PgPool) {
    let tree = seed_tree(&pool, "North").await;
    let destination = Endpoint::Pickup {
        location_id: tree.pickup_id,
    };
    TripRepo::create(&pool, &trip(None, None, Some(destination)), None)
        .await
        .unwrap();

    let outcome = HierarchyRepo::delete_region(&pool, tree.region_id).await.unwrap();
    assert_matches!(outcome, DeleteOutcome::Blocked { referencing_trips: 1 });
    assert!(LocationRepo::find_by_id(&pool, tree.pickup_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_region_delete_missing_is_not_found(pool: PgPool) {
    let outcome = HierarchyRepo::delete_region(&pool, 9999).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::NotFound);
}

// ---------------------------------------------------------------------------
// Test: venue
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_venue_delete_blocked_by_direct_route(pool: PgPool) {
    let tree = seed_tree(&pool, "West").await;
    let endpoint = Endpoint::Venue {
        venue_id: tree.venue_id,
    };
    TripRepo::create(&pool, &trip(None, None, Some(endpoint)), None)
        .await
        .unwrap();

    let outcome = HierarchyRepo::delete_venue(&pool, tree.venue_id).await.unwrap();
    assert_matches!(outcome, DeleteOutcome::Blocked { .. });
    assert!(LocationRepo::find_by_id(&pool, tree.drop_off_id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_venue_delete_removes_drop_offs(pool: PgPool) {
    let tree = seed_tree(&pool, "West").await;

    let outcome = HierarchyRepo::delete_venue(&pool, tree.venue_id).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(LocationRepo::find_by_id(&pool, tree.drop_off_id).await.unwrap().is_none());
    assert!(LocationRepo::find_by_id(&pool, tree.pickup_id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Test: location
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_location_delete_blocked_while_used_as_origin(pool: PgPool) {
    let tree = seed_tree(&pool, "West").await;
    let origin = Endpoint::Pickup {
        location_id: tree.pickup_id,
    };
    TripRepo::create(&pool, &trip(Some(tree.region_id), Some(origin), None), None)
        .await
        .unwrap();

    let outcome = HierarchyRepo::delete_location(&pool, tree.pickup_id).await.unwrap();
    assert_matches!(outcome, DeleteOutcome::Blocked { referencing_trips: 1 });

    // The unused drop-off can still go.
    let outcome = HierarchyRepo::delete_location(&pool, tree.drop_off_id).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
}

// ---------------------------------------------------------------------------
// Test: rename and listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_and_scoped_listing(pool: PgPool) {
    let west = seed_tree(&pool, "West").await;
    seed_tree(&pool, "South").await;

    let renamed = VenueRepo::rename(&pool, west.venue_id, "West Arena")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "West Arena");
    assert!(VenueRepo::rename(&pool, 9999, "Nowhere").await.unwrap().is_none());

    let venues = VenueRepo::list(&pool, Some(west.region_id)).await.unwrap();
    assert_eq!(venues.len(), 1);
    assert_eq!(VenueRepo::list(&pool, None).await.unwrap().len(), 2);
    assert_eq!(LocationRepo::list(&pool, Some(west.region_id)).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_region_name_is_rejected(pool: PgPool) {
    seed_tree(&pool, "West").await;
    let err = RegionRepo::create(
        &pool,
        &CreateRegion {
            name: "West".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.as_database_error().and_then(|e| e.constraint()),
        Some("uq_regions_name")
    );
}
