//! Start command handler
//!
//! Records the user, runs the subscription gate and shows the menu root.

use tracing::{debug, info};
use crate::handlers::navigation::deliver;
use crate::handlers::IncomingMessage;
use crate::services::{NavigationOutcome, ServiceFactory};
use crate::state::StateStore;
use crate::utils::errors::Result;
use crate::utils::logging::log_user_action;

/// Handle /start command - main entry point for every user
pub async fn handle_start(
    msg: &IncomingMessage,
    services: &ServiceFactory,
    state_storage: &dyn StateStore,
) -> Result<()> {
    let user_id = msg.user_id;
    debug!(user_id = user_id, chat_id = msg.chat_id, "Processing /start command");

    let user = services.user_service.touch(msg.upsert_request()).await?;
    log_user_action(user_id, "start", None);

    let mut context = state_storage.load_or_default(user_id).await?;
    let outcome = services.navigation.enter(user_id, &mut context.navigation).await?;

    state_storage.save_context(&context).await?;

    if matches!(outcome, NavigationOutcome::Level(_)) {
        info!(user_id = user_id, joined_at = %user.joined_at, "Menu opened");
    }

    deliver(services.transport.as_ref(), msg.chat_id, &outcome).await
}
