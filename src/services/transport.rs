//! Chat transport abstraction
//!
//! Handlers and services talk to the chat platform only through
//! [`ChatTransport`]. The teloxide-backed implementation lives in
//! [`crate::services::telegram`]; tests use a recording fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::models::MediaKind;
use crate::utils::errors::Result;

/// Membership of a user in a channel as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MembershipStatus {
    /// Only owners, administrators and plain members pass the gate
    pub fn is_satisfied(&self) -> bool {
        matches!(
            self,
            MembershipStatus::Owner | MembershipStatus::Administrator | MembershipStatus::Member
        )
    }
}

/// How an operator referred to a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReference {
    Id(i64),
    Username(String),
}

impl ChatReference {
    /// Parse `@handle` or a numeric id
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(handle) = input.strip_prefix('@') {
            if handle.is_empty() {
                return None;
            }
            return Some(ChatReference::Username(handle.to_string()));
        }
        input.parse::<i64>().ok().map(ChatReference::Id)
    }
}

impl std::fmt::Display for ChatReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatReference::Id(id) => write!(f, "{}", id),
            ChatReference::Username(name) => write!(f, "@{}", name),
        }
    }
}

/// Chat metadata returned by a lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    pub id: i64,
    pub title: Option<String>,
    pub username: Option<String>,
    /// Full name for private chats
    pub full_name: Option<String>,
}

/// Action behind an inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self { text: text.into(), action: ButtonAction::Callback(data.into()) }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self { text: text.into(), action: ButtonAction::Url(url.into()) }
    }
}

/// Keyboard attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard, rows of labels
    Reply(Vec<Vec<String>>),
    /// Inline keyboard under the message
    Inline(Vec<Vec<InlineButton>>),
    /// Hide the reply keyboard
    Remove,
}

impl Keyboard {
    pub fn single_column(buttons: Vec<InlineButton>) -> Self {
        Keyboard::Inline(buttons.into_iter().map(|b| vec![b]).collect())
    }
}

/// Operations the bot needs from the chat platform
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message, returning its message id
    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<i32>;

    /// Send a stored media item by its platform file handle
    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
        keyboard: Option<Keyboard>,
    ) -> Result<i32>;

    /// Replace text and markup of an existing message; an unchanged edit is not an error
    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) -> Result<()>;

    async fn membership(&self, chat_id: i64, user_id: i64) -> Result<MembershipStatus>;

    /// Create a permanent invite link that requires join approval
    async fn create_join_request_link(&self, chat_id: i64, name: &str) -> Result<String>;

    async fn resolve_chat(&self, reference: &ChatReference) -> Result<ChatInfo>;

    /// Copy any message to another chat, returning the new message id
    async fn copy_message(&self, to_chat_id: i64, from_chat_id: i64, message_id: i32) -> Result<i32>;

    async fn send_document_bytes(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>, caption: Option<&str>) -> Result<()>;
}
