//! User section of the admin panel

use crate::handlers::keyboards::users_menu;
use crate::handlers::{CallbackReply, IncomingCallback};
use crate::services::user::{format_stats, EXPORT_FILE_NAME};
use crate::services::ServiceFactory;
use crate::state::StateStore;
use crate::utils::errors::Result;
use crate::utils::logging::log_admin_action;
use super::{leave_dialogue, render};

pub async fn handle(
    action: &str,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    match action {
        "ad_users" => {
            leave_dialogue(cb.user_id, state_storage).await?;
            render(services, cb, "Users section:", Some(users_menu())).await?;
            Ok(CallbackReply::none())
        }
        "u_stats" => {
            let stats = services.user_service.stats().await?;
            render(services, cb, &format_stats(&stats), Some(users_menu())).await?;
            Ok(CallbackReply::none())
        }
        "u_export" => {
            let bytes = services.user_service.export_json().await?;
            services
                .transport
                .send_document_bytes(cb.user_id, EXPORT_FILE_NAME, bytes, Some("👥 Users"))
                .await?;
            log_admin_action(cb.user_id, "export_users", None, None);
            Ok(CallbackReply::text("Exported."))
        }
        _ => Ok(CallbackReply::none()),
    }
}
