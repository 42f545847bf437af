//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod button;
pub mod content;
pub mod channel;
pub mod admin;

// Re-export commonly used models
pub use user::{User, UpsertUserRequest, UserStats};
pub use button::{Button, ButtonTreeEntry, MoveDirection};
pub use content::{ContentItem, CreateContentRequest, MediaKind};
pub use channel::{Channel, SaveChannelRequest};
pub use admin::AdminRecord;
