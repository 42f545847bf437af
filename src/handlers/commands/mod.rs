//! Command handlers module
//!
//! This module contains handlers for all bot commands like /start, /help, etc.

pub mod start;
pub mod help;
pub mod admin;

use teloxide::utils::command::BotCommands;
use tracing::debug;
use crate::utils::errors::Result;
use crate::services::ServiceFactory;
use crate::state::{ScenarioManager, StateStore};
use super::IncomingMessage;

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Open the menu")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Admin panel (admin only)")]
    Admin,
    #[command(description = "Abort the current admin dialogue")]
    Cancel,
}

/// Main command dispatcher
pub async fn handle_command(
    cmd: Command,
    msg: &IncomingMessage,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<()> {
    debug!(user_id = msg.user_id, command = ?cmd, "Dispatching command");

    match cmd {
        Command::Start => start::handle_start(msg, services, state_storage).await,
        Command::Help => help::handle_help(msg, services).await,
        Command::Admin => admin::handle_admin_panel(msg, services, scenario_manager, state_storage).await,
        Command::Cancel => admin::handle_cancel(msg, services, state_storage).await,
    }
}
