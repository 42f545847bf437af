//! Database testing utilities
//!
//! Every test gets its own in-memory SQLite database with migrations applied.

use MenuGate::database::{create_pool, run_migrations, DatabaseConfig, DatabasePool, DatabaseService};
use MenuGate::models::{Channel, ContentItem, CreateContentRequest, MediaKind, SaveChannelRequest};
use MenuGate::Result;

/// Test database wrapper
pub struct TestDatabase {
    pub pool: DatabasePool,
    pub service: DatabaseService,
}

impl TestDatabase {
    /// Create a fresh migrated in-memory database
    pub async fn new() -> Result<Self> {
        let pool = create_pool(&DatabaseConfig::in_memory()).await?;
        run_migrations(&pool).await?;
        let service = DatabaseService::new(pool.clone());
        Ok(Self { pool, service })
    }

    /// Open a database at an explicit url, e.g. a temporary file
    pub async fn at(url: &str) -> Result<Self> {
        let config = DatabaseConfig {
            url: url.to_string(),
            ..DatabaseConfig::default()
        };
        let pool = create_pool(&config).await?;
        run_migrations(&pool).await?;
        let service = DatabaseService::new(pool.clone());
        Ok(Self { pool, service })
    }

    pub async fn add_button(&self, title: &str, parent_id: Option<i64>) -> i64 {
        self.service
            .buttons
            .create(title, parent_id)
            .await
            .expect("Failed to create button")
    }

    pub async fn add_text(&self, button_id: i64, text: &str) -> ContentItem {
        self.service
            .contents
            .add(CreateContentRequest {
                button_id,
                media_kind: MediaKind::Text,
                payload_ref: None,
                caption: Some(text.to_string()),
            })
            .await
            .expect("Failed to add content")
            .expect("Button should exist")
    }

    pub async fn add_media(&self, button_id: i64, kind: MediaKind, file_id: &str, caption: Option<&str>) -> ContentItem {
        self.service
            .contents
            .add(CreateContentRequest {
                button_id,
                media_kind: kind,
                payload_ref: Some(file_id.to_string()),
                caption: caption.map(str::to_string),
            })
            .await
            .expect("Failed to add content")
            .expect("Button should exist")
    }

    /// Register a mandatory channel with a public handle
    pub async fn add_channel(&self, chat_id: i64, username: &str) -> Channel {
        self.add_raw_channel(&chat_id.to_string(), Some(username)).await
    }

    /// Register a channel with an arbitrary stored id
    pub async fn add_raw_channel(&self, chat_id: &str, username: Option<&str>) -> Channel {
        self.service
            .channels
            .save(SaveChannelRequest {
                chat_id: chat_id.to_string(),
                title: username.map(|u| format!("{} channel", u)),
                username: username.map(str::to_string),
                invite_link: None,
                url: username.map(|u| format!("https://t.me/{}", u)),
            })
            .await
            .expect("Failed to save channel")
    }

    /// Channel stored with an invite link exactly as given, bypassing the registry flow
    pub async fn add_linked_channel(&self, chat_id: i64, invite_link: &str) -> Channel {
        self.service
            .channels
            .save(SaveChannelRequest {
                chat_id: chat_id.to_string(),
                title: Some("Private".to_string()),
                username: None,
                invite_link: Some(invite_link.to_string()),
                url: Some(invite_link.to_string()),
            })
            .await
            .expect("Failed to save channel")
    }

    /// Positions of the children of `parent_id` in display order
    pub async fn positions(&self, parent_id: Option<i64>) -> Vec<i64> {
        self.service
            .buttons
            .list(parent_id)
            .await
            .expect("Failed to list buttons")
            .into_iter()
            .map(|b| b.position)
            .collect()
    }

    /// Titles of the children of `parent_id` in display order
    pub async fn titles(&self, parent_id: Option<i64>) -> Vec<String> {
        self.service
            .buttons
            .list(parent_id)
            .await
            .expect("Failed to list buttons")
            .into_iter()
            .map(|b| b.title)
            .collect()
    }
}
