//! Menu editor service
//!
//! Admin-side mutations of the button tree and its content. Operations on ids
//! that no longer exist report "not found" instead of failing.

use tracing::{debug, info};
use crate::database::{DatabaseService, SettingsRepository};
use crate::models::{Button, ButtonTreeEntry, ContentItem, CreateContentRequest, MediaKind, MoveDirection};
use crate::services::navigation::BACK_LABEL;
use crate::utils::errors::Result;

/// Settings key for the number of reply keyboard columns
pub const MENU_COLS_KEY: &str = "menu_cols";
pub const DEFAULT_MENU_COLS: usize = 2;
pub const MIN_MENU_COLS: i64 = 1;
pub const MAX_MENU_COLS: i64 = 4;

/// Longest accepted button title
pub const MAX_TITLE_LEN: usize = 64;

pub fn clamp_menu_cols(value: i64) -> usize {
    value.clamp(MIN_MENU_COLS, MAX_MENU_COLS) as usize
}

/// Read the column setting; missing or unreadable values fall back to the default
pub async fn load_menu_cols(settings: &SettingsRepository) -> Result<usize> {
    let cols = settings
        .get(MENU_COLS_KEY)
        .await?
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(clamp_menu_cols)
        .unwrap_or(DEFAULT_MENU_COLS);
    Ok(cols)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateButtonOutcome {
    Created(i64),
    DuplicateTitle,
    ParentMissing,
    InvalidTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameButtonOutcome {
    Renamed,
    Unchanged,
    DuplicateTitle,
    NotFound,
    InvalidTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddContentOutcome {
    Added(ContentItem),
    NotFound,
    /// Buttons with children open their submenu, so content there is never shown
    HasSubmenu,
}

/// The back label is reserved: navigation reads it before matching titles
fn clean_title(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty()
        || title.starts_with('/')
        || title == BACK_LABEL
        || title.chars().count() > MAX_TITLE_LEN
    {
        return None;
    }
    Some(title.to_string())
}

#[derive(Debug, Clone)]
pub struct MenuService {
    db: DatabaseService,
}

impl MenuService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn menu_cols(&self) -> Result<usize> {
        load_menu_cols(&self.db.settings).await
    }

    /// Store the column count clamped to 1..=4 and return what was stored
    pub async fn set_menu_cols(&self, value: i64) -> Result<usize> {
        let cols = clamp_menu_cols(value);
        self.db.settings.set(MENU_COLS_KEY, &cols.to_string()).await?;
        info!(requested = value, stored = cols, "Menu columns updated");
        Ok(cols)
    }

    pub async fn find_button(&self, id: i64) -> Result<Option<Button>> {
        self.db.buttons.find_by_id(id).await
    }

    /// Whole tree flattened depth-first, for pick lists
    pub async fn tree(&self) -> Result<Vec<ButtonTreeEntry>> {
        self.db.button_tree().await
    }

    /// Create a button at the end of its sibling group.
    ///
    /// Titles are unique among siblings so text navigation stays unambiguous.
    pub async fn create_button(&self, title: &str, parent_id: Option<i64>) -> Result<CreateButtonOutcome> {
        let Some(title) = clean_title(title) else {
            return Ok(CreateButtonOutcome::InvalidTitle);
        };

        if let Some(parent) = parent_id {
            if self.db.buttons.find_by_id(parent).await?.is_none() {
                return Ok(CreateButtonOutcome::ParentMissing);
            }
        }

        if self.db.buttons.find_by_title(parent_id, &title).await?.is_some() {
            debug!(title = %title, parent_id = ?parent_id, "Sibling with this title exists");
            return Ok(CreateButtonOutcome::DuplicateTitle);
        }

        let id = self.db.buttons.create(&title, parent_id).await?;
        info!(button_id = id, parent_id = ?parent_id, title = %title, "Button created");
        Ok(CreateButtonOutcome::Created(id))
    }

    pub async fn rename_button(&self, id: i64, title: &str) -> Result<RenameButtonOutcome> {
        let Some(title) = clean_title(title) else {
            return Ok(RenameButtonOutcome::InvalidTitle);
        };

        let Some(button) = self.db.buttons.find_by_id(id).await? else {
            return Ok(RenameButtonOutcome::NotFound);
        };

        if button.title == title {
            return Ok(RenameButtonOutcome::Unchanged);
        }

        if let Some(existing) = self.db.buttons.find_by_title(button.parent_id, &title).await? {
            if existing.id != id {
                return Ok(RenameButtonOutcome::DuplicateTitle);
            }
        }

        if self.db.buttons.rename(id, &title).await? {
            info!(button_id = id, title = %title, "Button renamed");
            Ok(RenameButtonOutcome::Renamed)
        } else {
            Ok(RenameButtonOutcome::NotFound)
        }
    }

    /// Swap with the neighbour; false at a boundary or for a missing id
    pub async fn move_button(&self, id: i64, direction: MoveDirection) -> Result<bool> {
        let moved = self.db.buttons.swap_with_neighbor(id, direction).await?;
        debug!(button_id = id, direction = direction.as_str(), moved = moved, "Move requested");
        Ok(moved)
    }

    /// Delete a button with its subtree; returns the number of buttons removed
    pub async fn delete_button(&self, id: i64) -> Result<u64> {
        let removed = self.db.buttons.delete_cascade(id).await?;
        if removed > 0 {
            info!(button_id = id, removed = removed, "Button subtree deleted");
        }
        Ok(removed)
    }

    /// Attach content to a leaf button
    pub async fn add_content(
        &self,
        button_id: i64,
        media_kind: MediaKind,
        payload_ref: Option<String>,
        caption: Option<String>,
    ) -> Result<AddContentOutcome> {
        if self.db.buttons.has_children(button_id).await? {
            debug!(button_id = button_id, "Content refused for a button with a submenu");
            return Ok(AddContentOutcome::HasSubmenu);
        }

        let item = self
            .db
            .contents
            .add(CreateContentRequest { button_id, media_kind, payload_ref, caption })
            .await?;

        Ok(match item {
            Some(item) => {
                info!(button_id = button_id, content_id = item.id, kind = %item.media_kind, "Content added");
                AddContentOutcome::Added(item)
            }
            None => AddContentOutcome::NotFound,
        })
    }

    /// Whether a button opens a submenu instead of showing content
    pub async fn has_submenu(&self, button_id: i64) -> Result<bool> {
        self.db.buttons.has_children(button_id).await
    }

    pub async fn list_content(&self, button_id: i64) -> Result<Vec<ContentItem>> {
        self.db.contents.list(button_id).await
    }

    pub async fn delete_content(&self, id: i64) -> Result<bool> {
        self.db.contents.delete(id).await
    }
}
