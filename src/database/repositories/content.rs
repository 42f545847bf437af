//! Button content repository implementation

use crate::database::DatabasePool;
use crate::models::content::{ContentItem, CreateContentRequest};
use crate::utils::errors::MenuGateError;

#[derive(Clone, Debug)]
pub struct ContentRepository {
    pool: DatabasePool,
}

impl ContentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Attach a content item to a button.
    ///
    /// Returns `None` when the button no longer exists.
    pub async fn add(&self, request: CreateContentRequest) -> Result<Option<ContentItem>, MenuGateError> {
        let item = sqlx::query_as::<_, ContentItem>(
            r#"
            INSERT INTO button_contents (button_id, media_kind, payload_ref, caption)
            SELECT id, ?, ?, ? FROM buttons WHERE id = ?
            RETURNING id, button_id, media_kind, payload_ref, caption
            "#
        )
        .bind(request.media_kind)
        .bind(request.payload_ref)
        .bind(request.caption)
        .bind(request.button_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Content of a button in insertion order
    pub async fn list(&self, button_id: i64) -> Result<Vec<ContentItem>, MenuGateError> {
        let items = sqlx::query_as::<_, ContentItem>(
            r#"
            SELECT id, button_id, media_kind, payload_ref, caption
            FROM button_contents
            WHERE button_id = ?
            ORDER BY id ASC
            "#
        )
        .bind(button_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Delete one content item, returning whether it existed
    pub async fn delete(&self, id: i64) -> Result<bool, MenuGateError> {
        let result = sqlx::query("DELETE FROM button_contents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total number of content items
    pub async fn count(&self) -> Result<i64, MenuGateError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM button_contents")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }
}
