//! Callback query handlers module
//!
//! This module contains handlers for all inline keyboard button callbacks.
//! Callback data has the form `action` or `action:argument`.

pub mod admins;
pub mod broadcast;
pub mod buttons;
pub mod channels;
pub mod subscription;
pub mod users;

use tracing::{debug, info, warn};
use crate::services::{Keyboard, ServiceFactory};
use crate::state::{ConversationContext, ScenarioManager, StateStore};
use crate::utils::errors::Result;
use super::commands::admin::ADMIN_PANEL;
use super::keyboards::admin_root;
use super::{CallbackReply, IncomingCallback};

pub const NO_ACCESS: &str = "No access.";
pub const SESSION_EXPIRED: &str = "This dialogue has expired, start again.";

/// Main callback query dispatcher
pub async fn handle_callback_query(
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;
    let (action, arg) = cb.data.split_once(':').unwrap_or((cb.data.as_str(), ""));
    debug!(user_id = user_id, action = %action, arg = %arg, "Routing callback");

    if action == "check_sub" {
        return subscription::handle_check(cb, services, state_storage).await;
    }

    if !services.auth_service.is_admin(user_id).await? {
        warn!(user_id = user_id, action = %action, "Admin callback from non-admin");
        return Ok(CallbackReply::text(NO_ACCESS));
    }

    match action {
        "admin_back" => {
            leave_dialogue(user_id, state_storage).await?;
            render(services, cb, ADMIN_PANEL, Some(admin_root())).await?;
            Ok(CallbackReply::none())
        }
        "ad_channels" | "ch_add_simple" | "ch_type" | "ch_list" | "ch_del" | "pickdel" | "chdel" => {
            channels::handle(action, arg, cb, services, scenario_manager, state_storage).await
        }
        "ad_buttons" | "btn_cols" | "btn_layout" | "set_cols" | "btn_add" | "add_parent" | "btn_rename"
        | "pick_rnm" | "btn_move" | "pick_move" | "mv" | "btn_del" | "pick_del" | "delbtn"
        | "btn_add_content" | "pick_content" | "btn_list_content" | "pick_showc" | "delbc" | "btn_info" => {
            buttons::handle(action, arg, cb, services, scenario_manager, state_storage).await
        }
        "ad_users" | "u_stats" | "u_export" => users::handle(action, cb, services, state_storage).await,
        "ad_admins" | "adm_list" | "adm_add" | "adm_del" => {
            admins::handle(action, cb, services, scenario_manager, state_storage).await
        }
        "ad_broadcast" | "bc_cancel" => {
            broadcast::handle(action, cb, services, scenario_manager, state_storage).await
        }
        _ => {
            warn!(user_id = user_id, data = %cb.data, "Unknown callback data");
            Ok(CallbackReply::none())
        }
    }
}

/// Replace the keyboard message in place, or send a new one when it is gone
pub(crate) async fn render(
    services: &ServiceFactory,
    cb: &IncomingCallback,
    text: &str,
    keyboard: Option<Keyboard>,
) -> Result<()> {
    match cb.message {
        Some((chat_id, message_id)) => services.transport.edit_text(chat_id, message_id, text, keyboard).await,
        None => services.transport.send_text(cb.chat_id(), text, keyboard).await.map(|_| ()),
    }
}

/// Open an admin dialogue, replacing whatever dialogue was active
pub(crate) async fn start_dialogue(
    user_id: i64,
    scenario_id: &str,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<ConversationContext> {
    let mut context = state_storage.load_or_default(user_id).await?;
    scenario_manager.start_scenario(&mut context, scenario_id)?;
    state_storage.save_context(&context).await?;
    info!(user_id = user_id, scenario = %scenario_id, "Admin dialogue started");
    Ok(context)
}

/// Drop an active dialogue; section roots act as an exit
pub(crate) async fn leave_dialogue(user_id: i64, state_storage: &dyn StateStore) -> Result<()> {
    if let Some(mut context) = state_storage.load_context(user_id).await? {
        if context.has_scenario() {
            debug!(user_id = user_id, scenario = ?context.scenario, "Admin dialogue left");
            context.complete_scenario();
            state_storage.save_context(&context).await?;
        }
    }
    Ok(())
}

/// Context of a live dialogue at the given step, if any
pub(crate) async fn dialogue_at(
    user_id: i64,
    scenario_id: &str,
    step: &str,
    state_storage: &dyn StateStore,
) -> Result<Option<ConversationContext>> {
    Ok(state_storage
        .load_context(user_id)
        .await?
        .filter(|c| c.has_scenario() && c.is_at(scenario_id, step)))
}

