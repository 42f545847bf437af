//! Broadcast section of the admin panel

use crate::handlers::keyboards::{back_only, broadcast_running};
use crate::handlers::{CallbackReply, IncomingCallback};
use crate::services::ServiceFactory;
use crate::state::scenarios::ids;
use crate::state::{ScenarioManager, StateStore};
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use super::{render, start_dialogue};

pub const ASK_BROADCAST: &str = "📣 Send the message to broadcast (any type).\n/cancel to abort.";

pub async fn handle(
    action: &str,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;

    match action {
        "ad_broadcast" => {
            if services.broadcast_service.is_running(user_id) {
                render(services, cb, "A broadcast is already running.", Some(broadcast_running())).await?;
                return Ok(CallbackReply::none());
            }
            start_dialogue(user_id, ids::BROADCAST, scenario_manager, state_storage).await?;
            render(services, cb, ASK_BROADCAST, Some(back_only("admin_back"))).await?;
            Ok(CallbackReply::none())
        }
        "bc_cancel" => {
            if services.broadcast_service.cancel(user_id) {
                log_admin_action(user_id, "cancel_broadcast", None, None);
                Ok(CallbackReply::text("Stopping..."))
            } else {
                Ok(CallbackReply::text("No broadcast is running."))
            }
        }
        _ => Ok(CallbackReply::none()),
    }
}
