//! Admin roster repository implementation

use crate::database::DatabasePool;
use crate::models::admin::AdminRecord;
use crate::utils::errors::MenuGateError;

#[derive(Clone, Debug)]
pub struct AdminRepository {
    pool: DatabasePool,
}

impl AdminRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Find an admin record
    pub async fn find(&self, user_id: i64) -> Result<Option<AdminRecord>, MenuGateError> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            "SELECT user_id, name, is_super FROM admins WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Insert or update an admin.
    ///
    /// The super flag only ever goes up here; demotion is not an upsert concern.
    pub async fn upsert(&self, user_id: i64, name: Option<&str>, is_super: bool) -> Result<AdminRecord, MenuGateError> {
        let admin = sqlx::query_as::<_, AdminRecord>(
            r#"
            INSERT INTO admins (user_id, name, is_super)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id)
            DO UPDATE SET
                name = COALESCE(excluded.name, admins.name),
                is_super = MAX(admins.is_super, excluded.is_super)
            RETURNING user_id, name, is_super
            "#
        )
        .bind(user_id)
        .bind(name)
        .bind(is_super)
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }

    /// Remove an admin, returning whether a row was deleted
    pub async fn remove(&self, user_id: i64) -> Result<bool, MenuGateError> {
        let result = sqlx::query("DELETE FROM admins WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Roster with super-admins first
    pub async fn list(&self) -> Result<Vec<AdminRecord>, MenuGateError> {
        let admins = sqlx::query_as::<_, AdminRecord>(
            "SELECT user_id, name, is_super FROM admins ORDER BY is_super DESC, user_id ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }

    /// Number of rows holding the super flag for a user (0 or 1)
    pub async fn count_super(&self, user_id: i64) -> Result<i64, MenuGateError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM admins WHERE user_id = ? AND is_super = 1"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
