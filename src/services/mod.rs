//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod broadcast;
pub mod channel;
pub mod menu;
pub mod navigation;
pub mod subscription;
pub mod telegram;
pub mod transport;
pub mod user;

// Re-export commonly used services
pub use auth::{AuthService, AddAdminOutcome, RemoveAdminOutcome};
pub use broadcast::{BroadcastService, BroadcastReport};
pub use channel::{ChannelService, ChannelLookup, PendingChannel, RegisterOutcome};
pub use menu::{MenuService, AddContentOutcome, CreateButtonOutcome, RenameButtonOutcome};
pub use navigation::{NavigationEngine, NavigationOutcome, MenuLevel, Outgoing, BACK_LABEL};
pub use subscription::{SubscriptionGate, JoinRequestTracker, MissingChannel};
pub use telegram::TelegramTransport;
pub use transport::{ChatTransport, ChatInfo, ChatReference, Keyboard, InlineButton, ButtonAction, MembershipStatus};
pub use user::UserService;

use std::sync::Arc;
use std::time::Duration;
use crate::config::settings::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub transport: Arc<dyn ChatTransport>,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub menu_service: MenuService,
    pub channel_service: ChannelService,
    pub navigation: NavigationEngine,
    pub broadcast_service: BroadcastService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: Settings, transport: Arc<dyn ChatTransport>) -> Self {
        let gate = SubscriptionGate::new(
            db.channels.clone(),
            transport.clone(),
            JoinRequestTracker::new(),
            Duration::from_secs(settings.gate.check_timeout_seconds),
        );

        let user_service = UserService::new(db.users.clone());
        let auth_service = AuthService::new(db.admins.clone(), settings.clone());
        let menu_service = MenuService::new(db.clone());
        let channel_service = ChannelService::new(db.channels.clone(), transport.clone());
        let broadcast_service = BroadcastService::new(
            transport.clone(),
            db.users.clone(),
            Duration::from_millis(settings.broadcast.delay_ms),
        );
        let navigation = NavigationEngine::new(db, gate);

        Self {
            transport,
            user_service,
            auth_service,
            menu_service,
            channel_service,
            navigation,
            broadcast_service,
        }
    }

    /// Subscription gate shared with the navigation engine
    pub fn gate(&self) -> &SubscriptionGate {
        self.navigation.gate()
    }
}
