//! Menu navigation engine
//!
//! Each user is either at the root of the button tree or inside one button.
//! Free text is matched against the titles shown at the current level; a
//! match with children descends, a leaf emits its content. Every step runs
//! the subscription gate first.

use tracing::debug;
use crate::database::DatabaseService;
use crate::models::{Button, ContentItem, MediaKind};
use crate::state::NavigationState;
use crate::utils::errors::Result;
use crate::utils::helpers::{chunk_text, MAX_CAPTION_LEN, MAX_TEXT_LEN};
use super::menu::load_menu_cols;
use super::subscription::{MissingChannel, SubscriptionGate};

/// Label of the reply button leading one level up
pub const BACK_LABEL: &str = "⬅️ Back";

/// Text sent together with a menu level
pub const MENU_PROMPT: &str = "📂 Menu";

/// One rendered level of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuLevel {
    pub parent: Option<i64>,
    pub buttons: Vec<Button>,
    pub cols: usize,
}

impl MenuLevel {
    /// Reply keyboard rows for this level
    pub fn rows(&self) -> Vec<Vec<String>> {
        let titles: Vec<&str> = self.buttons.iter().map(|b| b.title.as_str()).collect();
        menu_rows(&titles, self.cols, self.parent.is_some())
    }
}

/// A single message to deliver when a leaf is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    Media {
        kind: MediaKind,
        file_id: String,
        caption: Option<String>,
    },
}

/// Result of handling one navigation input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Show this level of the menu
    Level(MenuLevel),
    /// The user must subscribe first
    Gate { missing: Vec<MissingChannel> },
    /// Deliver the content of a leaf button
    Content { button: Button, messages: Vec<Outgoing> },
    /// The leaf exists but holds nothing
    NoContent { button: Button },
    /// Input is a command and belongs to another handler
    Ignored,
}

/// Arrange titles into rows of `cols` buttons, plus a back row below the root
pub fn menu_rows(titles: &[&str], cols: usize, with_back: bool) -> Vec<Vec<String>> {
    let cols = cols.clamp(1, 4);
    let mut rows: Vec<Vec<String>> = titles
        .chunks(cols)
        .map(|chunk| chunk.iter().map(|t| t.to_string()).collect())
        .collect();

    if with_back {
        rows.push(vec![BACK_LABEL.to_string()]);
    }
    rows
}

/// Turn stored content into deliverable messages.
///
/// Text is chunked to the message limit. Media keeps its caption inline when
/// it fits the caption limit; otherwise the media goes bare and the caption
/// follows as text.
pub fn content_plan(items: &[ContentItem]) -> Vec<Outgoing> {
    let mut plan = Vec::new();

    for item in items {
        let text = item.caption.as_deref().unwrap_or("").trim();

        let file_id = match (item.media_kind.is_media(), item.payload_ref.as_deref()) {
            (true, Some(file_id)) if !file_id.is_empty() => file_id.to_string(),
            _ => {
                let body = if text.is_empty() { " " } else { text };
                plan.extend(chunk_text(body, MAX_TEXT_LEN).into_iter().map(Outgoing::Text));
                continue;
            }
        };

        if text.chars().count() > MAX_CAPTION_LEN {
            plan.push(Outgoing::Media { kind: item.media_kind, file_id, caption: None });
            plan.extend(chunk_text(text, MAX_TEXT_LEN).into_iter().map(Outgoing::Text));
        } else {
            let caption = (!text.is_empty()).then(|| text.to_string());
            plan.push(Outgoing::Media { kind: item.media_kind, file_id, caption });
        }
    }

    plan
}

#[derive(Debug, Clone)]
pub struct NavigationEngine {
    db: DatabaseService,
    gate: SubscriptionGate,
}

impl NavigationEngine {
    pub fn new(db: DatabaseService, gate: SubscriptionGate) -> Self {
        Self { db, gate }
    }

    pub fn gate(&self) -> &SubscriptionGate {
        &self.gate
    }

    async fn gate_outcome(&self, user_id: i64) -> Result<Option<NavigationOutcome>> {
        if self.gate.verify(user_id).await? {
            return Ok(None);
        }
        let missing = self.gate.missing_channels(user_id).await?;
        Ok(Some(NavigationOutcome::Gate { missing }))
    }

    /// Buttons of the given level with the configured column count
    pub async fn current_level(&self, parent: Option<i64>) -> Result<MenuLevel> {
        let buttons = self.db.buttons.list(parent).await?;
        let cols = load_menu_cols(&self.db.settings).await?;
        Ok(MenuLevel { parent, buttons, cols })
    }

    /// Entry point: reset to the root once the gate passes
    pub async fn enter(&self, user_id: i64, state: &mut NavigationState) -> Result<NavigationOutcome> {
        if let Some(gate) = self.gate_outcome(user_id).await? {
            return Ok(gate);
        }
        *state = NavigationState::at_root();
        Ok(NavigationOutcome::Level(self.current_level(None).await?))
    }

    /// Saved level after a successful re-check; a vanished level falls back to the root
    pub async fn resume(&self, user_id: i64, state: &mut NavigationState) -> Result<MenuLevel> {
        if let Some(current) = state.current_parent {
            if self.db.buttons.find_by_id(current).await?.is_none() {
                debug!(user_id = user_id, button_id = current, "Saved level vanished, back to root");
                *state = NavigationState::at_root();
            }
        }
        self.current_level(state.current_parent).await
    }

    /// Move one level up; stays at the root when already there
    pub async fn back(&self, user_id: i64, state: &mut NavigationState) -> Result<NavigationOutcome> {
        if let Some(gate) = self.gate_outcome(user_id).await? {
            return Ok(gate);
        }

        let parent = match state.current_parent {
            Some(current) => self.db.button_parent(current).await?,
            None => None,
        };
        *state = NavigationState::at(parent);
        debug!(user_id = user_id, parent = ?parent, "Moved up");
        Ok(NavigationOutcome::Level(self.current_level(parent).await?))
    }

    /// Resolve a button title typed or tapped at the current level
    pub async fn select(&self, user_id: i64, state: &mut NavigationState, title: &str) -> Result<NavigationOutcome> {
        if let Some(gate) = self.gate_outcome(user_id).await? {
            return Ok(gate);
        }

        // The level may have been deleted by an admin in the meantime
        if let Some(current) = state.current_parent {
            if self.db.buttons.find_by_id(current).await?.is_none() {
                debug!(user_id = user_id, button_id = current, "Current level vanished, back to root");
                *state = NavigationState::at_root();
            }
        }
        let parent = state.current_parent;

        let Some(button) = self.db.buttons.find_by_title(parent, title.trim()).await? else {
            return Ok(NavigationOutcome::Level(self.current_level(parent).await?));
        };

        if self.db.buttons.has_children(button.id).await? {
            *state = NavigationState::at(Some(button.id));
            debug!(user_id = user_id, button_id = button.id, "Descended");
            return Ok(NavigationOutcome::Level(self.current_level(Some(button.id)).await?));
        }

        if let Some(gate) = self.gate_outcome(user_id).await? {
            return Ok(gate);
        }

        let items = self.db.contents.list(button.id).await?;
        if items.is_empty() {
            return Ok(NavigationOutcome::NoContent { button });
        }

        let messages = content_plan(&items);
        Ok(NavigationOutcome::Content { button, messages })
    }

    /// Dispatch free text: commands are ignored, the back label goes up,
    /// anything else is a title lookup
    pub async fn handle_text(&self, user_id: i64, state: &mut NavigationState, text: &str) -> Result<NavigationOutcome> {
        let text = text.trim();
        if text.starts_with('/') {
            return Ok(NavigationOutcome::Ignored);
        }
        if text == BACK_LABEL {
            return self.back(user_id, state).await;
        }
        self.select(user_id, state, text).await
    }
}
