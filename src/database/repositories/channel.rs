//! Channel registry repository implementation

use crate::database::DatabasePool;
use crate::models::channel::{Channel, SaveChannelRequest};
use crate::utils::errors::MenuGateError;

#[derive(Clone, Debug)]
pub struct ChannelRepository {
    pool: DatabasePool,
}

impl ChannelRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Insert or replace the metadata of a channel keyed by `chat_id`
    pub async fn save(&self, request: SaveChannelRequest) -> Result<Channel, MenuGateError> {
        let channel = sqlx::query_as::<_, Channel>(
            r#"
            INSERT INTO channels (chat_id, title, username, invite_link, url)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (chat_id)
            DO UPDATE SET
                title = excluded.title,
                username = excluded.username,
                invite_link = excluded.invite_link,
                url = excluded.url
            RETURNING chat_id, title, username, invite_link, url
            "#
        )
        .bind(request.chat_id)
        .bind(request.title)
        .bind(request.username)
        .bind(request.invite_link)
        .bind(request.url)
        .fetch_one(&self.pool)
        .await?;

        Ok(channel)
    }

    /// Remove a channel, returning whether a row was deleted
    pub async fn remove(&self, chat_id: &str) -> Result<bool, MenuGateError> {
        let result = sqlx::query("DELETE FROM channels WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All channels in creation order
    pub async fn list_full(&self) -> Result<Vec<Channel>, MenuGateError> {
        let channels = sqlx::query_as::<_, Channel>(
            "SELECT chat_id, title, username, invite_link, url FROM channels ORDER BY rowid ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    /// Find a channel by its identifier
    pub async fn find(&self, chat_id: &str) -> Result<Option<Channel>, MenuGateError> {
        let channel = sqlx::query_as::<_, Channel>(
            "SELECT chat_id, title, username, invite_link, url FROM channels WHERE chat_id = ?"
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(channel)
    }
}
