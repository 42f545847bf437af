//! Button content model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::helpers::truncate_text;

/// Kind of a stored content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Text,
    Photo,
    Video,
    Document,
    Audio,
    Animation,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Text => "text",
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
            MediaKind::Animation => "animation",
        }
    }

    pub fn is_media(&self) -> bool {
        !matches!(self, MediaKind::Text)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deliverable piece of a leaf button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContentItem {
    pub id: i64,
    pub button_id: i64,
    pub media_kind: MediaKind,
    /// Opaque media handle, absent for text
    pub payload_ref: Option<String>,
    /// Caption for media, body for text
    pub caption: Option<String>,
}

impl ContentItem {
    /// Row label used in the admin content list
    pub fn admin_label(&self, index: usize) -> String {
        let storage = if self.payload_ref.is_some() { "file" } else { "text" };
        let caption = match self.caption.as_deref().filter(|c| !c.is_empty()) {
            Some(caption) => truncate_text(caption, 40),
            None => "-".to_string(),
        };
        format!("{}. id={} | {} | {} | {}", index, self.id, self.media_kind, storage, caption)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContentRequest {
    pub button_id: i64,
    pub media_kind: MediaKind,
    pub payload_ref: Option<String>,
    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_label() {
        let item = ContentItem {
            id: 7,
            button_id: 1,
            media_kind: MediaKind::Photo,
            payload_ref: Some("AgAD".to_string()),
            caption: Some("x".repeat(50)),
        };
        assert_eq!(item.admin_label(1), format!("1. id=7 | photo | file | {}...", "x".repeat(40)));

        let text = ContentItem {
            id: 8,
            button_id: 1,
            media_kind: MediaKind::Text,
            payload_ref: None,
            caption: None,
        };
        assert_eq!(text.admin_label(2), "2. id=8 | text | text | -");

        let short = ContentItem { caption: Some("Price list".to_string()), ..item };
        assert_eq!(short.admin_label(3), "3. id=7 | photo | file | Price list");
    }
}
