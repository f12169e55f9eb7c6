//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000006_create_roles.sql`.

/// The single built-in system role. Immutable, implicitly granted
/// view and edit on every module.
pub const ROLE_SUPER_ADMIN: &str = "Super Admin";
pub const ROLE_REGION_ADMIN: &str = "Region Admin";
pub const ROLE_COMMAND_CENTER: &str = "Command Center";
pub const ROLE_TRIP_ADMIN: &str = "Trip Admin";
pub const ROLE_BUS_INCHARGE: &str = "Bus Incharge";
pub const ROLE_VOLUNTEER: &str = "Volunteer";

/// Whether a role name denotes the built-in super admin.
///
/// Session tokens issued by older clients carry the upper-snake legacy
/// form (`SUPER_ADMIN`), so both spellings are accepted.
pub fn is_super_admin_name(role: &str) -> bool {
    role == ROLE_SUPER_ADMIN || role == "SUPER_ADMIN"
}
