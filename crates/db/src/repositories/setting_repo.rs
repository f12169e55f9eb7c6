//! Repository for the `app_settings` key/value table.

use sqlx::PgPool;

use crate::models::setting::AppSetting;

/// Provides get/upsert for application settings.
pub struct SettingRepo;

impl SettingRepo {
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<AppSetting>, sqlx::Error> {
        sqlx::query_as::<_, AppSetting>(
            "SELECT key, value, updated_at FROM app_settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    /// Insert or overwrite a setting.
    pub async fn upsert(pool: &PgPool, key: &str, value: &str) -> Result<AppSetting, sqlx::Error> {
        sqlx::query_as::<_, AppSetting>(
            "INSERT INTO app_settings (key, value) VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
             RETURNING key, value, updated_at",
        )
        .bind(key)
        .bind(value)
        .fetch_one(pool)
        .await
    }
}
