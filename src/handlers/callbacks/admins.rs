//! Admin roster section; changes are reserved to the super-admin

use crate::handlers::keyboards::admins_menu;
use crate::handlers::{CallbackReply, IncomingCallback};
use crate::models::AdminRecord;
use crate::services::ServiceFactory;
use crate::state::scenarios::ids;
use crate::state::{ScenarioManager, StateStore};
use crate::utils::errors::Result;
use super::{leave_dialogue, render, start_dialogue};

pub const ONLY_SUPER_ADD: &str = "Only the super admin can add admins.";
pub const ONLY_SUPER_REMOVE: &str = "Only the super admin can remove admins.";

/// One roster line per admin
pub fn format_roster(admins: &[AdminRecord]) -> String {
    if admins.is_empty() {
        return "👮 Admins:\n(none)".to_string();
    }

    let lines: Vec<String> = admins
        .iter()
        .map(|a| match a.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("• {}: {} ({})", a.user_id, a.role(), name),
            None => format!("• {}: {}", a.user_id, a.role()),
        })
        .collect();
    format!("👮 Admins:\n{}", lines.join("\n"))
}

pub async fn handle(
    action: &str,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;
    let super_mode = services.auth_service.is_super_admin(user_id).await?;

    match action {
        "ad_admins" => {
            leave_dialogue(user_id, state_storage).await?;
            render(services, cb, "Admins:", Some(admins_menu(super_mode))).await?;
            Ok(CallbackReply::none())
        }
        "adm_list" => {
            let admins = services.auth_service.list_admins().await?;
            render(services, cb, &format_roster(&admins), Some(admins_menu(super_mode))).await?;
            Ok(CallbackReply::none())
        }
        "adm_add" => {
            if !super_mode {
                return Ok(CallbackReply::alert(ONLY_SUPER_ADD));
            }
            start_dialogue(user_id, ids::ADMIN_ADD, scenario_manager, state_storage).await?;
            render(services, cb, "Send the new admin's id or @username:", Some(admins_menu(true))).await?;
            Ok(CallbackReply::none())
        }
        "adm_del" => {
            if !super_mode {
                return Ok(CallbackReply::alert(ONLY_SUPER_REMOVE));
            }
            start_dialogue(user_id, ids::ADMIN_REMOVE, scenario_manager, state_storage).await?;
            render(services, cb, "Send the id of the admin to remove:", Some(admins_menu(true))).await?;
            Ok(CallbackReply::none())
        }
        _ => Ok(CallbackReply::none()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_roster() {
        let admins = vec![
            AdminRecord { user_id: 1, name: Some("Owner".to_string()), is_super: true },
            AdminRecord { user_id: 2, name: None, is_super: false },
        ];
        assert_eq!(format_roster(&admins), "👮 Admins:\n• 1: super (Owner)\n• 2: admin");
        assert_eq!(format_roster(&[]), "👮 Admins:\n(none)");
    }
}
