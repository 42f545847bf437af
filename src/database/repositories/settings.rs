//! Key/value settings repository implementation

use crate::database::DatabasePool;
use crate::utils::errors::MenuGateError;

#[derive(Clone, Debug)]
pub struct SettingsRepository {
    pool: DatabasePool,
}

impl SettingsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Read a raw setting value
    pub async fn get(&self, key: &str) -> Result<Option<String>, MenuGateError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Insert or replace a setting value
    pub async fn set(&self, key: &str, value: &str) -> Result<(), MenuGateError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
