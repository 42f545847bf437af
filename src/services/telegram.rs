//! Telegram transport backed by teloxide

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatMemberStatus, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton,
    KeyboardMarkup, KeyboardRemove, MessageId, Recipient, ReplyMarkup,
};
use tracing::{debug, warn};
use crate::models::MediaKind;
use crate::utils::errors::{MenuGateError, Result};
use super::transport::{
    ButtonAction, ChatInfo, ChatReference, ChatTransport, InlineButton, Keyboard, MembershipStatus,
};

/// [`ChatTransport`] over the Telegram Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn inline_markup(rows: Vec<Vec<InlineButton>>) -> Result<InlineKeyboardMarkup> {
    let mut markup_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let mut markup_row = Vec::with_capacity(row.len());
        for button in row {
            let converted = match button.action {
                ButtonAction::Callback(data) => InlineKeyboardButton::callback(button.text, data),
                ButtonAction::Url(link) => InlineKeyboardButton::url(button.text, url::Url::parse(&link)?),
            };
            markup_row.push(converted);
        }
        markup_rows.push(markup_row);
    }
    Ok(InlineKeyboardMarkup::new(markup_rows))
}

/// Convert a domain keyboard into Telegram markup
pub fn to_reply_markup(keyboard: Keyboard) -> Result<ReplyMarkup> {
    Ok(match keyboard {
        Keyboard::Reply(rows) => {
            let rows = rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
                .collect::<Vec<_>>();
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard())
        }
        Keyboard::Inline(rows) => ReplyMarkup::InlineKeyboard(inline_markup(rows)?),
        Keyboard::Remove => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    })
}

fn membership_from(status: ChatMemberStatus) -> MembershipStatus {
    match status {
        ChatMemberStatus::Owner => MembershipStatus::Owner,
        ChatMemberStatus::Administrator => MembershipStatus::Administrator,
        ChatMemberStatus::Member => MembershipStatus::Member,
        ChatMemberStatus::Restricted => MembershipStatus::Restricted,
        ChatMemberStatus::Left => MembershipStatus::Left,
        ChatMemberStatus::Banned => MembershipStatus::Banned,
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str, keyboard: Option<Keyboard>) -> Result<i32> {
        let mut request = self.bot.send_message(ChatId(chat_id), text.to_string());
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(to_reply_markup(keyboard)?);
        }
        let message = request.await?;
        Ok(message.id.0)
    }

    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
        keyboard: Option<Keyboard>,
    ) -> Result<i32> {
        let chat = ChatId(chat_id);
        let file = InputFile::file_id(file_id.to_string());
        let markup = keyboard.map(to_reply_markup).transpose()?;

        // Each media kind has its own request type, so the optional parts are applied per arm
        macro_rules! send_with {
            ($request:expr) => {{
                let mut request = $request;
                if let Some(caption) = caption {
                    request = request.caption(caption.to_string());
                }
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                request.await?
            }};
        }

        let message = match kind {
            MediaKind::Photo => send_with!(self.bot.send_photo(chat, file)),
            MediaKind::Video => send_with!(self.bot.send_video(chat, file)),
            MediaKind::Document => send_with!(self.bot.send_document(chat, file)),
            MediaKind::Audio => send_with!(self.bot.send_audio(chat, file)),
            MediaKind::Animation => send_with!(self.bot.send_animation(chat, file)),
            MediaKind::Text => {
                return Err(MenuGateError::InvalidInput("Text items have no media handle".to_string()));
            }
        };

        Ok(message.id.0)
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        let mut request = self.bot.edit_message_text(ChatId(chat_id), MessageId(message_id), text.to_string());
        if let Some(Keyboard::Inline(rows)) = keyboard {
            request = request.reply_markup(inline_markup(rows)?);
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(e) => {
                let error = MenuGateError::from(e);
                if error.is_not_modified() {
                    debug!(chat_id = chat_id, message_id = message_id, "Edit left message unchanged");
                    Ok(())
                } else {
                    Err(error)
                }
            }
        }
    }

    async fn membership(&self, chat_id: i64, user_id: i64) -> Result<MembershipStatus> {
        let member = self.bot.get_chat_member(ChatId(chat_id), UserId(user_id as u64)).await?;
        let status = membership_from(member.status());
        debug!(chat_id = chat_id, user_id = user_id, status = ?status, "Membership status retrieved");
        Ok(status)
    }

    async fn create_join_request_link(&self, chat_id: i64, name: &str) -> Result<String> {
        let link = self
            .bot
            .create_chat_invite_link(ChatId(chat_id))
            .name(name.to_string())
            .creates_join_request(true)
            .await?;
        Ok(link.invite_link)
    }

    async fn resolve_chat(&self, reference: &ChatReference) -> Result<ChatInfo> {
        let recipient = match reference {
            ChatReference::Id(id) => Recipient::Id(ChatId(*id)),
            ChatReference::Username(name) => Recipient::ChannelUsername(format!("@{}", name)),
        };

        let chat = self.bot.get_chat(recipient).await.map_err(|e| {
            warn!(reference = %reference, error = %e, "Chat lookup failed");
            MenuGateError::from(e)
        })?;

        let full_name = match (chat.first_name(), chat.last_name()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first.to_string()),
            _ => None,
        };

        Ok(ChatInfo {
            id: chat.id.0,
            title: chat.title().map(str::to_string),
            username: chat.username().map(str::to_string),
            full_name,
        })
    }

    async fn copy_message(&self, to_chat_id: i64, from_chat_id: i64, message_id: i32) -> Result<i32> {
        let copied = self
            .bot
            .copy_message(ChatId(to_chat_id), ChatId(from_chat_id), MessageId(message_id))
            .await?;
        Ok(copied.0)
    }

    async fn send_document_bytes(&self, chat_id: i64, file_name: &str, bytes: Vec<u8>, caption: Option<&str>) -> Result<()> {
        let file = InputFile::memory(bytes).file_name(file_name.to_string());
        let mut request = self.bot.send_document(ChatId(chat_id), file);
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}
