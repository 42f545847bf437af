//! Help command handler

use crate::handlers::IncomingMessage;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

pub const HELP_TEXT: &str = "👋 Welcome!\n\n\
    🤖 With this bot you can:\n\
    📂 Browse the menu and open its content\n\
    ✅ Unlock it by joining the mandatory channels\n\
    📊 Manage everything from the admin panel (/admin)\n\n\
    /start - Open the menu\n\
    /help - Show this help message\n\
    /cancel - Abort the current admin dialogue";

/// Handle /help command
pub async fn handle_help(msg: &IncomingMessage, services: &ServiceFactory) -> Result<()> {
    services.transport.send_text(msg.chat_id, HELP_TEXT, None).await?;
    Ok(())
}
