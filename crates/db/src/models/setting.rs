//! Key/value application settings.

use serde::Serialize;
use sqlx::FromRow;
use tms_core::types::Timestamp;

/// Key of the display timezone setting.
pub const TIMEZONE_KEY: &str = "timezone";

/// A row from the `app_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AppSetting {
    pub key: String,
    pub value: String,
    pub updated_at: Timestamp,
}
