//! Mandatory channel section of the admin panel

use tracing::warn;
use crate::handlers::keyboards::{back_only, channel_delete_confirm, channel_delete_pick, channel_links, channels_menu};
use crate::handlers::{CallbackReply, IncomingCallback};
use crate::models::Channel;
use crate::services::{PendingChannel, RegisterOutcome, ServiceFactory};
use crate::state::scenarios::ids;
use crate::state::{ScenarioManager, StateStore};
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use super::{dialogue_at, leave_dialogue, render, start_dialogue, SESSION_EXPIRED};

pub const CHANNELS_TITLE: &str = "📌 Mandatory channels:";
pub const ASK_CHANNEL: &str = "Send the channel id (for example -100123...) or @username.\n\
    🔒 For join-request channels the id or @username is enough too.\n\
    ℹ️ You may send an invite link first, the id or @username is still required.";
pub const ASK_INVITE_LINK: &str = "🔒 Join-request channel without a username.\n\
    The bot could not create a link. Send an invite link (t.me/+... or joinchat...).";

/// Key of the [`PendingChannel`] kept in the dialogue data
pub const PENDING_KEY: &str = "pending";

/// Confirmation shown after a channel is saved
pub fn saved_text(channel: &Channel) -> String {
    format!(
        "✅ Channel added:\n{}\nID: {}\nURL: {}\n/admin",
        channel.title.as_deref().unwrap_or("—"),
        channel.chat_id,
        channel.url.as_deref().unwrap_or("—"),
    )
}

pub async fn handle(
    action: &str,
    arg: &str,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;

    match action {
        "ad_channels" => {
            leave_dialogue(user_id, state_storage).await?;
            render(services, cb, CHANNELS_TITLE, Some(channels_menu())).await?;
            Ok(CallbackReply::none())
        }
        "ch_add_simple" => {
            start_dialogue(user_id, ids::CHANNEL_ADD, scenario_manager, state_storage).await?;
            render(services, cb, ASK_CHANNEL, Some(back_only("ad_channels"))).await?;
            Ok(CallbackReply::none())
        }
        "ch_type" => choose_mode(arg == "j", cb, services, scenario_manager, state_storage).await,
        "ch_list" => {
            let channels = services.channel_service.list().await?;
            if channels.is_empty() {
                render(services, cb, "The list is empty.", Some(channels_menu())).await?;
            } else {
                render(services, cb, "📋 Mandatory channels:", Some(channel_links(&channels))).await?;
            }
            Ok(CallbackReply::none())
        }
        "ch_del" => {
            let channels = services.channel_service.list().await?;
            if channels.is_empty() {
                render(services, cb, "No channels to delete.", Some(channels_menu())).await?;
            } else {
                render(services, cb, "Which channel should be removed?", Some(channel_delete_pick(&channels))).await?;
            }
            Ok(CallbackReply::none())
        }
        "pickdel" => {
            let text = format!("Delete this channel?\nID: {}", arg);
            render(services, cb, &text, Some(channel_delete_confirm(arg))).await?;
            Ok(CallbackReply::none())
        }
        "chdel" => {
            let Some((chat_id, answer)) = arg.rsplit_once(':') else {
                return Ok(CallbackReply::none());
            };
            if answer != "yes" {
                render(services, cb, "Cancelled.", Some(channels_menu())).await?;
                return Ok(CallbackReply::none());
            }

            let removed = services.channel_service.remove(chat_id).await?;
            log_admin_action(user_id, "remove_channel", Some(chat_id), None);
            let text = if removed { "✅ Deleted." } else { "⚠️ Not found." };
            render(services, cb, text, Some(channels_menu())).await?;
            Ok(CallbackReply::text("Done."))
        }
        _ => Ok(CallbackReply::none()),
    }
}

/// Public or join-request mode picked for the channel found in the dialogue
async fn choose_mode(
    join_request: bool,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;
    let Some(mut context) = dialogue_at(user_id, ids::CHANNEL_ADD, ids::STEP_CHOOSE_MODE, state_storage).await? else {
        return Ok(CallbackReply::text(SESSION_EXPIRED));
    };
    let Some(pending) = context.get_data::<PendingChannel>(PENDING_KEY)? else {
        warn!(user_id = user_id, "Channel dialogue without a pending channel");
        context.cancel_scenario();
        state_storage.save_context(&context).await?;
        return Ok(CallbackReply::text(SESSION_EXPIRED));
    };

    match services.channel_service.register(pending, join_request).await? {
        RegisterOutcome::Saved(channel) => {
            context.complete_scenario();
            state_storage.save_context(&context).await?;
            log_admin_action(user_id, "add_channel", Some(&channel.chat_id), channel.url.as_deref());
            render(services, cb, &saved_text(&channel), Some(channels_menu())).await?;
            Ok(CallbackReply::text("Saved."))
        }
        RegisterOutcome::NeedLink => {
            scenario_manager.next_step(&mut context, ids::STEP_ASK_LINK)?;
            state_storage.save_context(&context).await?;
            render(services, cb, ASK_INVITE_LINK, Some(back_only("ad_channels"))).await?;
            Ok(CallbackReply::none())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saved_text_placeholders() {
        let channel = Channel {
            chat_id: "-100".to_string(),
            title: None,
            username: None,
            invite_link: None,
            url: None,
        };
        assert_eq!(saved_text(&channel), "✅ Channel added:\n—\nID: -100\nURL: —\n/admin");
    }
}
