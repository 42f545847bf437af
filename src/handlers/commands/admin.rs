//! Admin command handlers

use tracing::{info, warn};
use crate::handlers::keyboards::admin_root;
use crate::handlers::IncomingMessage;
use crate::services::ServiceFactory;
use crate::state::{ScenarioManager, StateStore};
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;

pub const ADMIN_PANEL: &str = "Admin panel:";
pub const ADMINS_ONLY: &str = "This section is for admins only.";

/// Handle /admin command; works from any state and drops an open dialogue
pub async fn handle_admin_panel(
    msg: &IncomingMessage,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<()> {
    let user_id = msg.user_id;
    services.user_service.touch(msg.upsert_request()).await?;

    // The roster name is only taken from the configured super-admin's own profile
    let auth = &services.auth_service;
    let name = if auth.is_configured_super_admin(user_id) { msg.full_name() } else { None };
    auth.bootstrap_super_admin(name.as_deref()).await?;

    if !auth.is_admin(user_id).await? {
        warn!(user_id = user_id, "Non-admin tried to open the admin panel");
        services.transport.send_text(msg.chat_id, ADMINS_ONLY, None).await?;
        return Ok(());
    }

    let mut context = state_storage.load_or_default(user_id).await?;
    if context.has_scenario() {
        let scenario = context.scenario.clone().unwrap_or_default();
        let step = scenario_manager
            .get_current_step(&context)
            .map(|s| s.id.clone())
            .unwrap_or_default();
        info!(user_id = user_id, scenario = %scenario, step = %step, "Admin dialogue closed by /admin");
        context.complete_scenario();
        state_storage.save_context(&context).await?;
    }

    log_admin_action(user_id, "open_panel", None, None);
    services.transport.send_text(msg.chat_id, ADMIN_PANEL, Some(admin_root())).await?;
    Ok(())
}

/// Handle /cancel command: abort the dialogue and any running broadcast
pub async fn handle_cancel(
    msg: &IncomingMessage,
    services: &ServiceFactory,
    state_storage: &dyn StateStore,
) -> Result<()> {
    let user_id = msg.user_id;
    let mut context = state_storage.load_or_default(user_id).await?;

    let had_dialogue = context.has_scenario();
    if had_dialogue {
        context.cancel_scenario();
        state_storage.save_context(&context).await?;
    }
    let stopped_broadcast = services.broadcast_service.cancel(user_id);

    let text = match (had_dialogue, stopped_broadcast) {
        (_, true) => "⛔ Broadcast is stopping.",
        (true, false) => "❌ Cancelled.",
        (false, false) => "Nothing to cancel.",
    };

    if had_dialogue || stopped_broadcast {
        log_admin_action(user_id, "cancel", None, None);
    }
    services.transport.send_text(msg.chat_id, text, None).await?;
    Ok(())
}
