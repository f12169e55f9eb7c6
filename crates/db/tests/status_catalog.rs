//! Integration tests for the status catalog.
//!
//! Covers the seeded catalog, the rename cascade, its rollback on failure,
//! and the orphan report produced by a delete.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tms_core::trip_status::StatusSnapshot;
use tms_core::types::DbId;
use tms_db::models::region::CreateRegion;
use tms_db::models::trip::TripWrite;
use tms_db::models::trip_status::{CreateTripStatus, CreateTripSubStatus, UpdateTripStatus};
use tms_db::repositories::{RegionRepo, TripRepo, TripStatusRepo, TripSubStatusRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn status_id(pool: &PgPool, name: &str) -> DbId {
    TripStatusRepo::list(pool)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("status {name} should be seeded"))
        .id
}

async fn active_trip(pool: &PgPool) -> DbId {
    let region_id = RegionRepo::create(
        pool,
        &CreateRegion {
            name: "East".into(),
        },
    )
    .await
    .unwrap()
    .id;
    let start = Utc::now();
    let input = TripWrite {
        route_code: "E-1".into(),
        region_id: Some(region_id),
        start_time: start,
        end_time: start + Duration::hours(1),
        origin: None,
        destination: None,
        vehicle_id: None,
        volunteer_id: None,
        driver_id: None,
        status: StatusSnapshot {
            status: "Active".into(),
            sub_status: "Boarding".into(),
            breakdown_issue: None,
        },
        passengers_boarded: 10,
        wheelchairs_boarded: 0,
        notes: None,
    };
    TripRepo::create(pool, &input, None).await.unwrap().id
}

fn rename_to(name: &str) -> UpdateTripStatus {
    UpdateTripStatus {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Test: seeded catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seeded_catalog_validates_pairs(pool: PgPool) {
    let catalog = TripStatusRepo::load_catalog(&pool).await.unwrap();

    assert!(catalog.contains("Planned"));
    assert!(catalog.require_status("Active").unwrap().passenger_count_required);
    assert!(catalog.validate_sub_status("Active", "Boarding").is_ok());
    assert!(catalog.validate_sub_status("Active", "Active").is_ok());
    assert!(catalog.validate_sub_status("Active", "Tyre Puncture").is_err());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_status_name_is_rejected(pool: PgPool) {
    let err = TripStatusRepo::create(
        &pool,
        &CreateTripStatus {
            name: "Active".into(),
            sort_order: None,
            passenger_count_required: None,
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_trip_statuses_name"));
}

// ---------------------------------------------------------------------------
// Test: rename cascade
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rename_cascades_to_sub_statuses_and_trips(pool: PgPool) {
    let trip_id = active_trip(&pool).await;
    let id = status_id(&pool, "Active").await;

    let update = TripStatusRepo::update(&pool, id, &rename_to("In Transit"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(update.status.name, "In Transit");
    assert_eq!(update.renamed_sub_statuses, 2, "Boarding and En Route");
    assert_eq!(update.renamed_trips, 1);

    let trip = TripRepo::find_by_id(&pool, trip_id).await.unwrap().unwrap();
    assert_eq!(trip.status, "In Transit");
    let catalog = TripStatusRepo::load_catalog(&pool).await.unwrap();
    assert!(catalog.validate_sub_status("In Transit", "Boarding").is_ok());
    assert!(!catalog.contains("Active"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_without_rename_touches_nothing_else(pool: PgPool) {
    active_trip(&pool).await;
    let id = status_id(&pool, "Active").await;

    let update = TripStatusRepo::update(
        &pool,
        id,
        &UpdateTripStatus {
            sort_order: Some(42),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(update.status.name, "Active");
    assert_eq!(update.status.sort_order, 42);
    assert_eq!(update.renamed_sub_statuses, 0);
    assert_eq!(update.renamed_trips, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_rename_rolls_back_every_step(pool: PgPool) {
    let trip_id = active_trip(&pool).await;
    let id = status_id(&pool, "Active").await;

    // Make the last step of the cascade fail.
    sqlx::query(
        "CREATE FUNCTION reject_trip_update() RETURNS trigger AS $$
         BEGIN RAISE EXCEPTION 'trip updates disabled'; END;
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_trip_update BEFORE UPDATE ON trips
         FOR EACH ROW EXECUTE FUNCTION reject_trip_update()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let result = TripStatusRepo::update(&pool, id, &rename_to("In Transit")).await;
    assert!(result.is_err());

    let status = TripStatusRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(status.name, "Active");
    let boarding = TripSubStatusRepo::list(&pool)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.name == "Boarding")
        .unwrap();
    assert_eq!(boarding.linked_status, "Active");
    let trip = TripRepo::find_by_id(&pool, trip_id).await.unwrap().unwrap();
    assert_eq!(trip.status, "Active");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_status_returns_none(pool: PgPool) {
    let result = TripStatusRepo::update(&pool, 9999, &rename_to("Nope"))
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Test: delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_reports_orphans(pool: PgPool) {
    active_trip(&pool).await;
    let id = status_id(&pool, "Active").await;

    let report = TripStatusRepo::delete(&pool, id).await.unwrap().unwrap();

    assert_eq!(report.status, "Active");
    let mut unlinked = report.unlinked_sub_statuses.clone();
    unlinked.sort();
    assert_eq!(unlinked, vec!["Boarding", "En Route"]);
    assert_eq!(report.stranded_trips, 1);

    let catalog = TripStatusRepo::load_catalog(&pool).await.unwrap();
    let orphaned: Vec<_> = catalog
        .orphaned_sub_statuses()
        .into_iter()
        .map(|s| s.name.clone())
        .collect();
    assert!(orphaned.contains(&"Boarding".to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sub_status_crud(pool: PgPool) {
    let created = TripSubStatusRepo::create(
        &pool,
        &CreateTripSubStatus {
            name: "Waiting at Gate".into(),
            linked_status: "Arriving".into(),
            sort_order: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(created.linked_status, "Arriving");

    assert!(TripSubStatusRepo::delete(&pool, created.id).await.unwrap());
    assert!(TripSubStatusRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .is_none());
}
