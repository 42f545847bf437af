//! "✅ Check" callback: re-run the subscription gate

use tracing::info;
use crate::handlers::keyboards::subscribe_keyboard;
use crate::handlers::navigation::{send_level, WELCOME};
use crate::handlers::{CallbackReply, IncomingCallback};
use crate::services::ServiceFactory;
use crate::state::StateStore;
use crate::utils::errors::Result;
use super::render;

pub const CONFIRMED: &str = "✅ Subscription confirmed.";

pub async fn handle_check(
    cb: &IncomingCallback,
    services: &ServiceFactory,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;
    let gate = services.gate();

    if !gate.verify(user_id).await? {
        let missing = gate.missing_channels(user_id).await?;
        render(services, cb, WELCOME, Some(subscribe_keyboard(&missing))).await?;
        return Ok(CallbackReply::text("Not all yet."));
    }

    render(services, cb, CONFIRMED, None).await?;

    let mut context = state_storage.load_or_default(user_id).await?;
    let level = services.navigation.resume(user_id, &mut context.navigation).await?;
    state_storage.save_context(&context).await?;

    info!(user_id = user_id, parent = ?level.parent, "Gate passed on re-check");
    send_level(services.transport.as_ref(), cb.chat_id(), &level).await?;
    Ok(CallbackReply::text("✅ Checked."))
}
