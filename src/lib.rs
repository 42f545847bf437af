//! MenuGate Telegram Bot
//!
//! A Telegram bot that serves an admin-editable tree of menu buttons with
//! stored content behind a mandatory channel subscription check. This library
//! provides the storage, gating, navigation and admin components; the binary
//! wires them to the Telegram Bot API.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{MenuGateError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;
pub use state::{ScenarioManager, StateStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
