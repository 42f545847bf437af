//! Recording chat transport
//!
//! Implements [`ChatTransport`] in memory. Every outgoing call is recorded so
//! tests can assert on what the bot said, and platform answers (membership,
//! chat lookups, failing recipients) are scripted per test.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use MenuGate::models::MediaKind;
use MenuGate::services::{ButtonAction, ChatInfo, ChatReference, ChatTransport, Keyboard, MembershipStatus};
use MenuGate::{MenuGateError, Result};

/// One call made through the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: i64,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Media {
        chat_id: i64,
        kind: MediaKind,
        file_id: String,
        caption: Option<String>,
    },
    Edit {
        chat_id: i64,
        message_id: i32,
        text: String,
        keyboard: Option<Keyboard>,
    },
    Copy {
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i32,
    },
    Document {
        chat_id: i64,
        file_name: String,
        bytes: Vec<u8>,
    },
}

impl Sent {
    /// Text of a sent or edited message
    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } | Sent::Edit { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Sent::Text { keyboard, .. } | Sent::Edit { keyboard, .. } => keyboard.as_ref(),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct FakeTransport {
    next_message_id: AtomicI32,
    sent: Mutex<Vec<Sent>>,
    memberships: Mutex<HashMap<(i64, i64), MembershipStatus>>,
    broken_channels: Mutex<HashSet<i64>>,
    membership_delay: Mutex<Option<Duration>>,
    failing_recipients: Mutex<HashSet<i64>>,
    chats: Mutex<HashMap<String, ChatInfo>>,
    join_link: Mutex<Option<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            next_message_id: AtomicI32::new(100),
            ..Self::default()
        }
    }

    fn record(&self, sent: Sent) -> i32 {
        self.sent.lock().unwrap().push(sent);
        self.next_message_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Script a user's status in a channel; unknown pairs report `Left`
    pub fn set_membership(&self, chat_id: i64, user_id: i64, status: MembershipStatus) {
        self.memberships.lock().unwrap().insert((chat_id, user_id), status);
    }

    /// Make every membership query for this channel fail
    pub fn break_channel(&self, chat_id: i64) {
        self.broken_channels.lock().unwrap().insert(chat_id);
    }

    pub fn delay_membership(&self, delay: Duration) {
        *self.membership_delay.lock().unwrap() = Some(delay);
    }

    /// Copies to this recipient fail, as if they blocked the bot
    pub fn fail_copies_to(&self, user_id: i64) {
        self.failing_recipients.lock().unwrap().insert(user_id);
    }

    /// Make a chat resolvable under the given reference (`@handle` or id)
    pub fn add_chat(&self, reference: &str, info: ChatInfo) {
        self.chats.lock().unwrap().insert(reference.to_string(), info);
    }

    pub fn set_join_link(&self, link: &str) {
        *self.join_link.lock().unwrap() = Some(link.to_string());
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Texts of messages sent or edited in a chat, in order
    pub fn texts_in(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|s| match s {
                Sent::Text { chat_id: c, .. } | Sent::Edit { chat_id: c, .. } => *c == chat_id,
                _ => false,
            })
            .filter_map(|s| s.text().map(str::to_string))
            .collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent().iter().rev().find_map(|s| s.text().map(str::to_string))
    }

    pub fn last_keyboard(&self) -> Option<Keyboard> {
        self.sent().iter().rev().find_map(|s| s.keyboard().cloned())
    }

    pub fn copies(&self) -> Vec<(i64, i64, i32)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Copy { to_chat_id, from_chat_id, message_id } => Some((to_chat_id, from_chat_id, message_id)),
                _ => None,
            })
            .collect()
    }

    pub fn media(&self) -> Vec<Sent> {
        self.sent()
            .into_iter()
            .filter(|s| matches!(s, Sent::Media { .. }))
            .collect()
    }
}

/// Callback data of every inline button in a keyboard
pub fn callback_data(keyboard: &Keyboard) -> Vec<String> {
    match keyboard {
        Keyboard::Inline(rows) => rows
            .iter()
            .flatten()
            .filter_map(|b| match &b.action {
                ButtonAction::Callback(data) => Some(data.clone()),
                ButtonAction::Url(_) => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Labels and links of the url buttons in a keyboard
pub fn url_buttons(keyboard: &Keyboard) -> Vec<(String, String)> {
    match keyboard {
        Keyboard::Inline(rows) => rows
            .iter()
            .flatten()
            .filter_map(|b| match &b.action {
                ButtonAction::Url(link) => Some((b.text.clone(), link.clone())),
                ButtonAction::Callback(_) => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<i32> {
        Ok(self.record(Sent::Text { chat_id, text: text.to_string(), keyboard }))
    }

    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
        _keyboard: Option<Keyboard>,
    ) -> Result<i32> {
        Ok(self.record(Sent::Media {
            chat_id,
            kind,
            file_id: file_id.to_string(),
            caption: caption.map(str::to_string),
        }))
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        self.record(Sent::Edit { chat_id, message_id, text: text.to_string(), keyboard });
        Ok(())
    }

    async fn membership(&self, chat_id: i64, user_id: i64) -> Result<MembershipStatus> {
        let delay = *self.membership_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.broken_channels.lock().unwrap().contains(&chat_id) {
            return Err(MenuGateError::Transport("Bad Request: chat not found".to_string()));
        }
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .get(&(chat_id, user_id))
            .copied()
            .unwrap_or(MembershipStatus::Left))
    }

    async fn create_join_request_link(&self, _chat_id: i64, _name: &str) -> Result<String> {
        self.join_link
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MenuGateError::Transport("Bad Request: not enough rights".to_string()))
    }

    async fn resolve_chat(&self, reference: &ChatReference) -> Result<ChatInfo> {
        self.chats
            .lock()
            .unwrap()
            .get(&reference.to_string())
            .cloned()
            .ok_or_else(|| MenuGateError::Transport("Bad Request: chat not found".to_string()))
    }

    async fn copy_message(&self, to_chat_id: i64, from_chat_id: i64, message_id: i32) -> Result<i32> {
        if self.failing_recipients.lock().unwrap().contains(&to_chat_id) {
            return Err(MenuGateError::Transport("Forbidden: bot was blocked by the user".to_string()));
        }
        Ok(self.record(Sent::Copy { to_chat_id, from_chat_id, message_id }))
    }

    async fn send_document_bytes(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>, _caption: Option<&str>) -> Result<()> {
        self.record(Sent::Document { chat_id, file_name: file_name.to_string(), bytes });
        Ok(())
    }
}
