//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod location;
pub mod profile;
pub mod region;
pub mod role;
pub mod setting;
pub mod trip;
pub mod trip_status;
pub mod user;
pub mod vehicle;
pub mod venue;
