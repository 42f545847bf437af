//! User repository implementation

use chrono::{DateTime, Utc};
use crate::database::DatabasePool;
use crate::models::user::{User, UpsertUserRequest};
use crate::utils::errors::MenuGateError;

#[derive(Clone)]
#[derive(Debug)]
pub struct UserRepository {
    pool: DatabasePool,
}

impl UserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert a user or refresh their profile fields.
    ///
    /// `joined_at` is written only by the insert branch.
    pub async fn upsert(&self, request: UpsertUserRequest) -> Result<User, MenuGateError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, first_name, last_name, username, joined_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id)
            DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                username = excluded.username
            RETURNING user_id, first_name, last_name, username, joined_at
            "#
        )
        .bind(request.user_id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.username)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by Telegram ID
    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, MenuGateError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, first_name, last_name, username, joined_at FROM users WHERE user_id = ?"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Count users, optionally only those who joined at or after `since`
    pub async fn count_since(&self, since: Option<DateTime<Utc>>) -> Result<i64, MenuGateError> {
        let count: (i64,) = match since {
            Some(since) => {
                sqlx::query_as("SELECT COUNT(*) FROM users WHERE joined_at >= ?")
                    .bind(since)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(count.0)
    }

    /// List all users, newest first
    pub async fn list_all(&self) -> Result<Vec<User>, MenuGateError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT user_id, first_name, last_name, username, joined_at FROM users ORDER BY joined_at DESC, user_id ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// All user ids, used as broadcast recipients
    pub async fn list_ids(&self) -> Result<Vec<i64>, MenuGateError> {
        let rows: Vec<(i64,)> = sqlx::query_as("SELECT user_id FROM users ORDER BY user_id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
