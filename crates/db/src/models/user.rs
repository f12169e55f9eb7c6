//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tms_core::types::{DbId, Timestamp};

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role_id: Option<DbId>,
    /// Legacy upper-snake role name, kept in sync with `role_id`.
    pub role: String,
    pub region_id: Option<DbId>,
    pub location_id: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub role_id: DbId,
    pub region_id: Option<DbId>,
    pub location_id: Option<DbId>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<DbId>,
    pub region_id: Option<DbId>,
    pub location_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Legacy role string stored alongside `role_id`: `"Trip Admin"` -> `"TRIP_ADMIN"`.
pub fn legacy_role_name(role_name: &str) -> String {
    role_name.trim().to_uppercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_role_name_is_upper_snake() {
        assert_eq!(legacy_role_name("Trip Admin"), "TRIP_ADMIN");
        assert_eq!(legacy_role_name("Super Admin"), "SUPER_ADMIN");
        assert_eq!(legacy_role_name("Volunteer"), "VOLUNTEER");
    }
}
