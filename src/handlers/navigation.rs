//! Rendering of navigation outcomes

use tracing::warn;
use crate::services::navigation::{MenuLevel, NavigationOutcome, Outgoing, MENU_PROMPT};
use crate::services::subscription::MissingChannel;
use crate::services::transport::{ChatTransport, Keyboard};
use crate::utils::errors::Result;
use super::keyboards::subscribe_keyboard;

pub const WELCOME: &str = "Hello!\nSubscribe to the mandatory channels below, then press «✅ Check».";
pub const CHANNELS_HEADER: &str = "👇 Mandatory channels:";
pub const NO_CONTENT: &str = "This button has no content yet.";

/// Hide the menu and list the channels still to join
pub async fn send_gate_prompt(transport: &dyn ChatTransport, chat_id: i64, missing: &[MissingChannel]) -> Result<()> {
    transport.send_text(chat_id, WELCOME, Some(Keyboard::Remove)).await?;
    transport
        .send_text(chat_id, CHANNELS_HEADER, Some(subscribe_keyboard(missing)))
        .await?;
    Ok(())
}

pub async fn send_level(transport: &dyn ChatTransport, chat_id: i64, level: &MenuLevel) -> Result<()> {
    transport
        .send_text(chat_id, MENU_PROMPT, Some(Keyboard::Reply(level.rows())))
        .await?;
    Ok(())
}

/// Deliver whatever the engine decided
pub async fn deliver(transport: &dyn ChatTransport, chat_id: i64, outcome: &NavigationOutcome) -> Result<()> {
    match outcome {
        NavigationOutcome::Level(level) => send_level(transport, chat_id, level).await,
        NavigationOutcome::Gate { missing } => send_gate_prompt(transport, chat_id, missing).await,
        NavigationOutcome::NoContent { .. } => {
            transport.send_text(chat_id, NO_CONTENT, None).await?;
            Ok(())
        }
        NavigationOutcome::Content { button, messages } => {
            for message in messages {
                let sent = match message {
                    Outgoing::Text(text) => transport.send_text(chat_id, text, None).await,
                    Outgoing::Media { kind, file_id, caption } => {
                        transport
                            .send_media(chat_id, *kind, file_id, caption.as_deref(), None)
                            .await
                    }
                };

                // One broken item must not hide the rest of the button
                if let Err(e) = sent {
                    warn!(chat_id = chat_id, button_id = button.id, error = %e, "Failed to deliver content item");
                }
            }
            Ok(())
        }
        NavigationOutcome::Ignored => Ok(()),
    }
}
