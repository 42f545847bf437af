//! Database service layer
//!
//! This module provides a high-level interface to database operations

use std::collections::HashMap;
use crate::database::{
    DatabasePool, UserRepository, ButtonRepository, ContentRepository,
    ChannelRepository, AdminRepository, SettingsRepository,
};
use crate::models::*;
use crate::utils::errors::MenuGateError;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub buttons: ButtonRepository,
    pub contents: ContentRepository,
    pub channels: ChannelRepository,
    pub admins: AdminRepository,
    pub settings: SettingsRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            buttons: ButtonRepository::new(pool.clone()),
            contents: ContentRepository::new(pool.clone()),
            channels: ChannelRepository::new(pool.clone()),
            admins: AdminRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
        }
    }

    /// Flatten the whole menu tree depth-first, children in position order
    pub async fn button_tree(&self) -> Result<Vec<ButtonTreeEntry>, MenuGateError> {
        let all = self.buttons.list_all().await?;

        let mut by_parent: HashMap<Option<i64>, Vec<Button>> = HashMap::new();
        for button in all {
            by_parent.entry(button.parent_id).or_default().push(button);
        }
        for siblings in by_parent.values_mut() {
            siblings.sort_by_key(|b| (b.position, b.id));
        }

        let mut entries = Vec::new();
        let mut stack: Vec<(Button, usize)> = by_parent
            .remove(&None)
            .unwrap_or_default()
            .into_iter()
            .rev()
            .map(|b| (b, 0))
            .collect();

        while let Some((button, depth)) = stack.pop() {
            if let Some(children) = by_parent.remove(&Some(button.id)) {
                stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
            }
            entries.push(ButtonTreeEntry { button, depth });
        }

        Ok(entries)
    }

    /// Parent of a button; `None` for root buttons and unknown ids
    pub async fn button_parent(&self, id: i64) -> Result<Option<i64>, MenuGateError> {
        Ok(self.buttons.find_by_id(id).await?.and_then(|b| b.parent_id))
    }
}
