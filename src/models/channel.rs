//! Mandatory channel model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use crate::utils::helpers::normalize_channel_url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Channel {
    /// Raw identifier as entered, normally a numeric chat id
    pub chat_id: String,
    pub title: Option<String>,
    pub username: Option<String>,
    pub invite_link: Option<String>,
    pub url: Option<String>,
}

impl Channel {
    /// Link shown to users and admins, if any
    pub fn public_url(&self) -> Option<String> {
        normalize_channel_url(
            self.username.as_deref(),
            self.invite_link.as_deref(),
            self.url.as_deref(),
        )
    }

    /// Name shown on buttons: title, then `@handle`, then the raw id
    pub fn display_name(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return format!("@{}", username.trim_start_matches('@'));
        }
        self.chat_id.clone()
    }

    /// Chat id in the form the transport understands, if it parses
    pub fn numeric_id(&self) -> Option<i64> {
        self.chat_id.trim().parse::<i64>().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveChannelRequest {
    pub chat_id: String,
    pub title: Option<String>,
    pub username: Option<String>,
    pub invite_link: Option<String>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel {
        Channel {
            chat_id: "-100200".to_string(),
            title: None,
            username: None,
            invite_link: None,
            url: None,
        }
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut ch = channel();
        assert_eq!(ch.display_name(), "-100200");
        ch.username = Some("news".to_string());
        assert_eq!(ch.display_name(), "@news");
        ch.title = Some("News".to_string());
        assert_eq!(ch.display_name(), "News");
    }

    #[test]
    fn test_numeric_id() {
        let mut ch = channel();
        assert_eq!(ch.numeric_id(), Some(-100200));
        ch.chat_id = "@broken".to_string();
        assert_eq!(ch.numeric_id(), None);
    }
}
