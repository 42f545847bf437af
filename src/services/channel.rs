//! Mandatory channel registry service
//!
//! Wraps the channel repository with the lookup and linking steps an
//! operator goes through when registering a channel.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::database::ChannelRepository;
use crate::models::{Channel, SaveChannelRequest};
use crate::utils::errors::Result;
use crate::utils::helpers::{is_http_link, normalize_channel_url, FALLBACK_CHANNEL_URL};
use super::transport::{ChatReference, ChatTransport};

/// Name given to invite links the bot creates
pub const JOIN_LINK_NAME: &str = "ForcedSub";

/// Channel data collected during registration, before it is saved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChannel {
    pub chat_id: String,
    pub title: Option<String>,
    pub username: Option<String>,
    pub invite_link: Option<String>,
}

impl PendingChannel {
    pub fn display_name(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.username.as_ref().map(|u| format!("@{}", u)))
            .unwrap_or_else(|| self.chat_id.clone())
    }
}

/// What the operator's identifier resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelLookup {
    /// A link was sent; keep it and ask for the identifier again
    LinkNoted(String),
    Found(PendingChannel),
    InvalidFormat,
    /// Numeric id the bot cannot see, usually because it is not an admin there
    NotVisible,
}

/// Result of choosing the channel mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Saved(Channel),
    /// No public handle and no link could be created; ask the operator
    NeedLink,
}

#[derive(Clone)]
pub struct ChannelService {
    channels: ChannelRepository,
    transport: Arc<dyn ChatTransport>,
}

impl ChannelService {
    pub fn new(channels: ChannelRepository, transport: Arc<dyn ChatTransport>) -> Self {
        Self { channels, transport }
    }

    /// Resolve an operator-supplied identifier, carrying over a link sent earlier
    pub async fn lookup(&self, input: &str, invite_link: Option<String>) -> Result<ChannelLookup> {
        let input = input.trim();
        if is_http_link(input) {
            return Ok(ChannelLookup::LinkNoted(input.to_string()));
        }

        let Some(reference) = ChatReference::parse(input) else {
            return Ok(ChannelLookup::InvalidFormat);
        };

        match (&reference, self.transport.resolve_chat(&reference).await) {
            (_, Ok(chat)) => Ok(ChannelLookup::Found(PendingChannel {
                chat_id: chat.id.to_string(),
                title: chat.title,
                username: chat.username.or_else(|| match &reference {
                    ChatReference::Username(name) => Some(name.clone()),
                    ChatReference::Id(_) => None,
                }),
                invite_link,
            })),
            (ChatReference::Username(name), Err(e)) => {
                // Public handles stay usable as links even when the lookup fails
                warn!(username = %name, error = %e, "Could not resolve channel handle");
                Ok(ChannelLookup::Found(PendingChannel {
                    chat_id: format!("@{}", name),
                    title: None,
                    username: Some(name.clone()),
                    invite_link,
                }))
            }
            (ChatReference::Id(id), Err(e)) => {
                warn!(chat_id = id, error = %e, "Bot cannot see channel");
                Ok(ChannelLookup::NotVisible)
            }
        }
    }

    /// Finish registration once the operator picked public or join-request mode
    pub async fn register(&self, mut pending: PendingChannel, join_request: bool) -> Result<RegisterOutcome> {
        if join_request && pending.username.is_none() {
            let created = match pending.chat_id.parse::<i64>() {
                Ok(chat_id) => self.transport.create_join_request_link(chat_id, JOIN_LINK_NAME).await.ok(),
                Err(_) => None,
            };

            match created {
                Some(link) => pending.invite_link = Some(link),
                None => return Ok(RegisterOutcome::NeedLink),
            }
        }

        Ok(RegisterOutcome::Saved(self.save(pending).await?))
    }

    /// Save with an operator-supplied invite link; `None` if it is not a link
    pub async fn register_with_link(&self, mut pending: PendingChannel, link: &str) -> Result<Option<Channel>> {
        let link = link.trim();
        if !is_http_link(link) {
            return Ok(None);
        }
        pending.invite_link = Some(link.to_string());
        Ok(Some(self.save(pending).await?))
    }

    async fn save(&self, pending: PendingChannel) -> Result<Channel> {
        let url = normalize_channel_url(pending.username.as_deref(), pending.invite_link.as_deref(), None);
        let channel = self
            .channels
            .save(SaveChannelRequest {
                chat_id: pending.chat_id,
                title: pending.title,
                username: pending.username,
                invite_link: pending.invite_link,
                url,
            })
            .await?;

        info!(chat_id = %channel.chat_id, url = ?channel.url, "Channel saved");
        Ok(channel)
    }

    pub async fn list(&self) -> Result<Vec<Channel>> {
        self.channels.list_full().await
    }

    pub async fn remove(&self, chat_id: &str) -> Result<bool> {
        let removed = self.channels.remove(chat_id).await?;
        info!(chat_id = %chat_id, removed = removed, "Channel removal requested");
        Ok(removed)
    }
}

/// Link for a channel button, falling back to the bare domain
pub fn channel_link(channel: &Channel) -> String {
    channel
        .public_url()
        .filter(|link| is_http_link(link))
        .unwrap_or_else(|| FALLBACK_CHANNEL_URL.to_string())
}

impl std::fmt::Debug for ChannelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_display_name() {
        let mut pending = PendingChannel { chat_id: "-1001".to_string(), ..Default::default() };
        assert_eq!(pending.display_name(), "-1001");
        pending.username = Some("news".to_string());
        assert_eq!(pending.display_name(), "@news");
        pending.title = Some("News".to_string());
        assert_eq!(pending.display_name(), "News");
    }

    #[test]
    fn test_channel_link_fallback() {
        let channel = Channel {
            chat_id: "-1".to_string(),
            title: None,
            username: None,
            invite_link: None,
            url: Some("tg://nope".to_string()),
        };
        assert_eq!(channel_link(&channel), FALLBACK_CHANNEL_URL);

        let broken = Channel {
            invite_link: Some("https://".to_string()),
            url: Some("https://".to_string()),
            ..channel
        };
        assert_eq!(channel_link(&broken), FALLBACK_CHANNEL_URL);
    }
}
