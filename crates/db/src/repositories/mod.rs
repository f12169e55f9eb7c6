//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Helpers suffixed `_in`
//! take an open transaction instead.

pub mod hierarchy_repo;
pub mod location_repo;
pub mod profile_repo;
pub mod region_repo;
pub mod role_repo;
pub mod setting_repo;
pub mod trip_repo;
pub mod trip_status_history_repo;
pub mod trip_status_repo;
pub mod trip_sub_status_repo;
pub mod user_repo;
pub mod vehicle_repo;
pub mod venue_repo;

pub use hierarchy_repo::{DeleteOutcome, HierarchyRepo};
pub use location_repo::LocationRepo;
pub use profile_repo::ProfileRepo;
pub use region_repo::RegionRepo;
pub use role_repo::RoleRepo;
pub use setting_repo::SettingRepo;
pub use trip_repo::TripRepo;
pub use trip_status_history_repo::TripStatusHistoryRepo;
pub use trip_status_repo::{StatusUpdate, TripStatusRepo};
pub use trip_sub_status_repo::TripSubStatusRepo;
pub use user_repo::UserRepo;
pub use vehicle_repo::VehicleRepo;
pub use venue_repo::VenueRepo;
