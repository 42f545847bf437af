//! Bot handlers module
//!
//! This module contains all bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for free text, media and admin dialogues
//!
//! Handlers work on [`IncomingMessage`] and [`IncomingCallback`] so they can
//! run against any [`crate::services::ChatTransport`].

pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;
pub mod navigation;

use teloxide::types::{CallbackQuery, Message};
use crate::models::{MediaKind, UpsertUserRequest};

/// Payload of an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Media {
        kind: MediaKind,
        file_id: String,
        caption: Option<String>,
    },
    /// Stickers, polls, locations and anything else the bot does not store
    Unsupported,
}

/// A private message from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub content: MessageContent,
}

impl IncomingMessage {
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn upsert_request(&self) -> UpsertUserRequest {
        UpsertUserRequest {
            user_id: self.user_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
        }
    }

    pub fn full_name(&self) -> Option<String> {
        crate::utils::helpers::full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    /// Map a Telegram message; `None` for messages without a sender
    pub fn from_telegram(msg: &Message) -> Option<Self> {
        let user = msg.from.as_ref()?;
        let caption = msg.caption().map(str::to_string);

        let media = |kind: MediaKind, file_id: String| MessageContent::Media {
            kind,
            file_id,
            caption: caption.clone(),
        };

        // Animations also carry a document, so they are checked first
        let content = if let Some(text) = msg.text() {
            MessageContent::Text(text.to_string())
        } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
            media(MediaKind::Photo, photo.file.id.to_string())
        } else if let Some(video) = msg.video() {
            media(MediaKind::Video, video.file.id.to_string())
        } else if let Some(animation) = msg.animation() {
            media(MediaKind::Animation, animation.file.id.to_string())
        } else if let Some(document) = msg.document() {
            media(MediaKind::Document, document.file.id.to_string())
        } else if let Some(audio) = msg.audio() {
            media(MediaKind::Audio, audio.file.id.to_string())
        } else {
            MessageContent::Unsupported
        };

        Some(Self {
            user_id: user.id.0 as i64,
            chat_id: msg.chat.id.0,
            message_id: msg.id.0,
            first_name: Some(user.first_name.clone()),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            content,
        })
    }
}

/// A pressed inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    pub user_id: i64,
    /// Chat and id of the message carrying the keyboard, if still accessible
    pub message: Option<(i64, i32)>,
    pub data: String,
}

impl IncomingCallback {
    /// Chat to answer in: the keyboard's chat, else the user's private chat
    pub fn chat_id(&self) -> i64 {
        self.message.map(|(chat_id, _)| chat_id).unwrap_or(self.user_id)
    }

    pub fn from_telegram(query: &CallbackQuery) -> Option<Self> {
        let data = query.data.clone()?;
        Some(Self {
            user_id: query.from.id.0 as i64,
            message: query.message.as_ref().map(|m| (m.chat().id.0, m.id().0)),
            data,
        })
    }
}

/// Toast shown after a callback is handled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackReply {
    pub text: Option<String>,
    pub alert: bool,
}

impl CallbackReply {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), alert: false }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), alert: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_chat_fallback() {
        let callback = IncomingCallback { user_id: 5, message: None, data: "x".to_string() };
        assert_eq!(callback.chat_id(), 5);

        let callback = IncomingCallback { message: Some((9, 1)), ..callback };
        assert_eq!(callback.chat_id(), 9);
    }

    #[test]
    fn test_message_helpers() {
        let msg = IncomingMessage {
            user_id: 1,
            chat_id: 1,
            message_id: 3,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            username: None,
            content: MessageContent::Text("hi".to_string()),
        };
        assert_eq!(msg.text(), Some("hi"));
        assert_eq!(msg.full_name(), Some("Ada Lovelace".to_string()));
        assert_eq!(msg.upsert_request().user_id, 1);
    }
}
