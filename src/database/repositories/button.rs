//! Menu button repository implementation
//!
//! Buttons form a tree. Within one sibling group (same `parent_id`) positions
//! are always the dense sequence 1..N; every structural change re-sequences
//! the affected group in the same transaction.

use sqlx::{Sqlite, Transaction};
use crate::database::DatabasePool;
use crate::models::button::{Button, MoveDirection};
use crate::utils::errors::MenuGateError;

#[derive(Clone, Debug)]
pub struct ButtonRepository {
    pool: DatabasePool,
}

impl ButtonRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Create a button as the last sibling under `parent_id`
    pub async fn create(&self, title: &str, parent_id: Option<i64>) -> Result<i64, MenuGateError> {
        let mut tx = self.pool.begin().await?;

        let next: (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM buttons WHERE parent_id IS ?"
        )
        .bind(parent_id)
        .fetch_one(&mut *tx)
        .await?;

        let id: (i64,) = sqlx::query_as(
            "INSERT INTO buttons (parent_id, title, position) VALUES (?, ?, ?) RETURNING id"
        )
        .bind(parent_id)
        .bind(title)
        .bind(next.0)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id.0)
    }

    /// Find a button by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Button>, MenuGateError> {
        let button = sqlx::query_as::<_, Button>(
            "SELECT id, parent_id, title, position FROM buttons WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(button)
    }

    /// Children of `parent_id` (root when `None`) in ascending position
    pub async fn list(&self, parent_id: Option<i64>) -> Result<Vec<Button>, MenuGateError> {
        let buttons = sqlx::query_as::<_, Button>(
            "SELECT id, parent_id, title, position FROM buttons WHERE parent_id IS ? ORDER BY position ASC, id ASC"
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(buttons)
    }

    /// Every button, grouped by parent and ordered by position
    pub async fn list_all(&self) -> Result<Vec<Button>, MenuGateError> {
        let buttons = sqlx::query_as::<_, Button>(
            "SELECT id, parent_id, title, position FROM buttons ORDER BY parent_id ASC, position ASC, id ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(buttons)
    }

    /// Exact title match among the children of `parent_id`; first match wins
    pub async fn find_by_title(&self, parent_id: Option<i64>, title: &str) -> Result<Option<Button>, MenuGateError> {
        let button = sqlx::query_as::<_, Button>(
            r#"
            SELECT id, parent_id, title, position FROM buttons
            WHERE parent_id IS ? AND title = ?
            ORDER BY position ASC, id ASC
            LIMIT 1
            "#
        )
        .bind(parent_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;

        Ok(button)
    }

    /// Whether a button has at least one child
    pub async fn has_children(&self, id: i64) -> Result<bool, MenuGateError> {
        let row: (i64,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM buttons WHERE parent_id = ?)"
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0 != 0)
    }

    /// Rename a button, returning whether it existed
    pub async fn rename(&self, id: i64, title: &str) -> Result<bool, MenuGateError> {
        let result = sqlx::query("UPDATE buttons SET title = ? WHERE id = ?")
            .bind(title)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a button with its whole subtree and all attached content.
    ///
    /// Returns the number of buttons removed (0 when the id does not exist).
    pub async fn delete_cascade(&self, id: i64) -> Result<u64, MenuGateError> {
        let mut tx = self.pool.begin().await?;

        let target = sqlx::query_as::<_, Button>(
            "SELECT id, parent_id, title, position FROM buttons WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(target) = target else {
            tx.rollback().await?;
            return Ok(0);
        };

        sqlx::query(
            r#"
            WITH RECURSIVE subtree(id) AS (
                SELECT id FROM buttons WHERE id = ?
                UNION ALL
                SELECT b.id FROM buttons b JOIN subtree s ON b.parent_id = s.id
            )
            DELETE FROM button_contents WHERE button_id IN (SELECT id FROM subtree)
            "#
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let removed = sqlx::query(
            r#"
            WITH RECURSIVE subtree(id) AS (
                SELECT id FROM buttons WHERE id = ?
                UNION ALL
                SELECT b.id FROM buttons b JOIN subtree s ON b.parent_id = s.id
            )
            DELETE FROM buttons WHERE id IN (SELECT id FROM subtree)
            "#
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        resequence(&mut tx, target.parent_id).await?;

        tx.commit().await?;
        Ok(removed)
    }

    /// Exchange positions with the adjacent sibling in `direction`.
    ///
    /// Returns false when the button is missing or already at the boundary.
    pub async fn swap_with_neighbor(&self, id: i64, direction: MoveDirection) -> Result<bool, MenuGateError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Button>(
            "SELECT id, parent_id, title, position FROM buttons WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            tx.rollback().await?;
            return Ok(false);
        };

        let neighbor_sql = match direction {
            MoveDirection::Up => {
                "SELECT id, parent_id, title, position FROM buttons \
                 WHERE parent_id IS ? AND position < ? ORDER BY position DESC LIMIT 1"
            }
            MoveDirection::Down => {
                "SELECT id, parent_id, title, position FROM buttons \
                 WHERE parent_id IS ? AND position > ? ORDER BY position ASC LIMIT 1"
            }
        };

        let neighbor = sqlx::query_as::<_, Button>(neighbor_sql)
            .bind(current.parent_id)
            .bind(current.position)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(neighbor) = neighbor else {
            tx.rollback().await?;
            return Ok(false);
        };

        sqlx::query("UPDATE buttons SET position = ? WHERE id = ?")
            .bind(neighbor.position)
            .bind(current.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE buttons SET position = ? WHERE id = ?")
            .bind(current.position)
            .bind(neighbor.id)
            .execute(&mut *tx)
            .await?;

        resequence(&mut tx, current.parent_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Total number of buttons
    pub async fn count(&self) -> Result<i64, MenuGateError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM buttons")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }
}

/// Rewrite positions of one sibling group to 1..N, keeping the current order
async fn resequence(tx: &mut Transaction<'_, Sqlite>, parent_id: Option<i64>) -> Result<(), MenuGateError> {
    let ids: Vec<(i64,)> = sqlx::query_as(
        "SELECT id FROM buttons WHERE parent_id IS ? ORDER BY position ASC, id ASC"
    )
    .bind(parent_id)
    .fetch_all(&mut **tx)
    .await?;

    for (index, (id,)) in ids.into_iter().enumerate() {
        sqlx::query("UPDATE buttons SET position = ? WHERE id = ?")
            .bind(index as i64 + 1)
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}
