//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod button;
pub mod content;
pub mod channel;
pub mod admin;
pub mod settings;

// Re-export repositories
pub use user::UserRepository;
pub use button::ButtonRepository;
pub use content::ContentRepository;
pub use channel::ChannelRepository;
pub use admin::AdminRepository;
pub use settings::SettingsRepository;
