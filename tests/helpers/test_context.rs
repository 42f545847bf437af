//! Test context management
//!
//! Bundles an in-memory database, the recording transport and the full
//! service graph, and offers builders for incoming updates.

use std::sync::Arc;
use std::time::Duration;
use MenuGate::config::Settings;
use MenuGate::handlers::callbacks::handle_callback_query;
use MenuGate::handlers::commands::{handle_command, Command};
use MenuGate::handlers::messages::handle_message;
use MenuGate::handlers::{CallbackReply, IncomingCallback, IncomingMessage, MessageContent};
use MenuGate::models::MediaKind;
use MenuGate::services::{ChatTransport, MembershipStatus, ServiceFactory};
use MenuGate::state::{ConversationContext, MemoryStateStorage, ScenarioManager, StateStore};
use super::{FakeTransport, TestDatabase, SUPER_ADMIN_ID, TEST_TOKEN};

/// Everything a handler needs, wired against fakes
pub struct TestContext {
    pub db: TestDatabase,
    pub transport: Arc<FakeTransport>,
    pub services: ServiceFactory,
    pub scenario_manager: ScenarioManager,
    pub state: MemoryStateStorage,
    pub settings: Settings,
    next_message_id: std::sync::atomic::AtomicI32,
}

/// Settings used by tests: known super-admin, no broadcast pause
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.bot.token = TEST_TOKEN.to_string();
    settings.bot.super_admin_id = Some(SUPER_ADMIN_ID);
    settings.gate.check_timeout_seconds = 1;
    settings.broadcast.delay_ms = 0;
    settings
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_settings(test_settings()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let db = TestDatabase::new().await.expect("Failed to create test database");
        let transport = Arc::new(FakeTransport::new());
        let dyn_transport: Arc<dyn ChatTransport> = transport.clone();
        let services = ServiceFactory::new(db.service.clone(), settings.clone(), dyn_transport);

        Self {
            db,
            transport,
            services,
            scenario_manager: ScenarioManager::new(),
            state: MemoryStateStorage::new(Duration::from_secs(settings.state.idle_ttl_seconds)),
            settings,
            next_message_id: std::sync::atomic::AtomicI32::new(1),
        }
    }

    fn message_id(&self) -> i32 {
        self.next_message_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }

    /// Private message from a user
    pub fn message(&self, user_id: i64, content: MessageContent) -> IncomingMessage {
        IncomingMessage {
            user_id,
            chat_id: user_id,
            message_id: self.message_id(),
            first_name: Some(format!("User{}", user_id)),
            last_name: None,
            username: Some(format!("user{}", user_id)),
            content,
        }
    }

    pub fn text(&self, user_id: i64, text: &str) -> IncomingMessage {
        self.message(user_id, MessageContent::Text(text.to_string()))
    }

    pub fn photo(&self, user_id: i64, file_id: &str, caption: Option<&str>) -> IncomingMessage {
        self.message(
            user_id,
            MessageContent::Media {
                kind: MediaKind::Photo,
                file_id: file_id.to_string(),
                caption: caption.map(str::to_string),
            },
        )
    }

    /// Callback pressed on a keyboard message the bot sent earlier
    pub fn callback(&self, user_id: i64, data: &str) -> IncomingCallback {
        IncomingCallback {
            user_id,
            message: Some((user_id, 500)),
            data: data.to_string(),
        }
    }

    pub async fn command(&self, user_id: i64, command: Command) {
        let text = match command {
            Command::Start => "/start",
            Command::Help => "/help",
            Command::Admin => "/admin",
            Command::Cancel => "/cancel",
        };
        let msg = self.text(user_id, text);
        handle_command(command, &msg, &self.services, &self.scenario_manager, &self.state)
            .await
            .expect("Command handler failed");
    }

    pub async fn send(&self, msg: &IncomingMessage) {
        handle_message(msg, &self.services, &self.scenario_manager, &self.state)
            .await
            .expect("Message handler failed");
    }

    pub async fn say(&self, user_id: i64, text: &str) {
        let msg = self.text(user_id, text);
        self.send(&msg).await;
    }

    pub async fn press(&self, user_id: i64, data: &str) -> CallbackReply {
        let cb = self.callback(user_id, data);
        handle_callback_query(&cb, &self.services, &self.scenario_manager, &self.state)
            .await
            .expect("Callback handler failed")
    }

    pub async fn context_of(&self, user_id: i64) -> ConversationContext {
        self.state
            .load_or_default(user_id)
            .await
            .expect("Failed to load context")
    }

    /// Subscribe a user to a channel on the fake platform
    pub fn subscribe(&self, chat_id: i64, user_id: i64) {
        self.transport.set_membership(chat_id, user_id, MembershipStatus::Member);
    }
}
