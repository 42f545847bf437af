//! Message handlers module
//!
//! Handles free-text menu navigation and routes messages to an open admin
//! dialogue when there is one.

pub mod dialogues;

use tracing::{debug, warn};
use crate::handlers::navigation::deliver;
use crate::handlers::IncomingMessage;
use crate::services::ServiceFactory;
use crate::state::{ScenarioManager, StateStore};
use crate::utils::errors::Result;

/// Handle incoming non-command messages
pub async fn handle_message(
    msg: &IncomingMessage,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<()> {
    let user_id = msg.user_id;
    debug!(user_id = user_id, chat_id = msg.chat_id, "Processing message");

    services.user_service.touch(msg.upsert_request()).await?;
    let mut context = state_storage.load_or_default(user_id).await?;

    if context.has_scenario() {
        if services.auth_service.is_admin(user_id).await? {
            return dialogues::handle_dialogue_message(msg, context, services, scenario_manager, state_storage).await;
        }

        // Rights were revoked while the dialogue was open
        warn!(user_id = user_id, scenario = ?context.scenario, "Dropping dialogue of a former admin");
        context.cancel_scenario();
        state_storage.save_context(&context).await?;
    }

    handle_regular_message(msg, services, state_storage).await
}

/// Menu navigation by button title
async fn handle_regular_message(
    msg: &IncomingMessage,
    services: &ServiceFactory,
    state_storage: &dyn StateStore,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(user_id = msg.user_id, "Ignoring non-text message outside a dialogue");
        return Ok(());
    };

    let mut context = state_storage.load_or_default(msg.user_id).await?;
    let outcome = services
        .navigation
        .handle_text(msg.user_id, &mut context.navigation, text)
        .await?;
    state_storage.save_context(&context).await?;

    deliver(services.transport.as_ref(), msg.chat_id, &outcome).await
}
