//! Button section of the admin panel: layout, tree edits and content

use tracing::debug;
use crate::handlers::keyboards::{
    back_only, button_delete_confirm, buttons_menu, columns, content_manage, move_controls, pick_button, pick_parent,
};
use crate::handlers::messages::dialogues::CONTENT_NEEDS_LEAF;
use crate::handlers::{CallbackReply, IncomingCallback};
use crate::models::MoveDirection;
use crate::services::ServiceFactory;
use crate::state::scenarios::ids;
use crate::state::{ScenarioManager, StateStore};
use crate::utils::errors::Result;
use crate::utils::helpers::parse_numeric_id;
use crate::utils::logging::log_admin_action;
use super::{dialogue_at, leave_dialogue, render, start_dialogue, SESSION_EXPIRED};

pub const BUTTONS_TITLE: &str = "Buttons menu:";
pub const NO_BUTTONS: &str = "No buttons yet.";
pub const BUTTON_NOT_FOUND: &str = "Button not found.";
pub const ASK_CONTENT: &str = "Send content: text / photo / video / document / audio / gif.\nFinish: /admin.";

/// Dialogue data keys
pub const PARENT_KEY: &str = "parent_id";
pub const BUTTON_KEY: &str = "button_id";

pub const INFO_TEXT: &str = "🧩 Buttons section\n\
    • Layout: show the menu in 1-4 columns.\n\
    • New button: create a button under the root or any button.\n\
    • Rename: change a button title.\n\
    • Reorder: move a button up or down among its siblings.\n\
    • Add content: store text, photos, videos, documents, audio or gifs.\n\
    • Manage content: list and delete a button's items.\n\
    • Delete button: removes the button, its sub-buttons and their content.\n\
    After a deletion the order 1..n is compacted automatically.";

pub async fn handle(
    action: &str,
    arg: &str,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let user_id = cb.user_id;
    let menu = &services.menu_service;

    match action {
        "ad_buttons" => {
            leave_dialogue(user_id, state_storage).await?;
            show_menu(cb, services, BUTTONS_TITLE).await?;
            Ok(CallbackReply::none())
        }
        "btn_cols" | "btn_layout" => {
            let cols = menu.menu_cols().await?;
            render(services, cb, "How many columns?", Some(columns(cols))).await?;
            Ok(CallbackReply::none())
        }
        "set_cols" => {
            let Some(requested) = parse_numeric_id(arg) else {
                return Ok(CallbackReply::none());
            };
            let stored = menu.set_menu_cols(requested).await?;
            log_admin_action(user_id, "set_menu_cols", None, Some(&stored.to_string()));
            render(services, cb, BUTTONS_TITLE, Some(buttons_menu(stored))).await?;
            Ok(CallbackReply::text("Layout updated."))
        }
        "btn_add" => {
            let tree = menu.tree().await?;
            start_dialogue(user_id, ids::BUTTON_ADD, scenario_manager, state_storage).await?;
            render(services, cb, "Where should the new button go?", Some(pick_parent(&tree))).await?;
            Ok(CallbackReply::none())
        }
        "add_parent" => pick_new_parent(arg, cb, services, scenario_manager, state_storage).await,
        "btn_rename" => pick(cb, services, "Which button?", "pick_rnm").await,
        "pick_rnm" => {
            let Some(button_id) = existing_button(arg, services).await? else {
                return Ok(CallbackReply::text(BUTTON_NOT_FOUND));
            };
            let mut context = start_dialogue(user_id, ids::BUTTON_RENAME, scenario_manager, state_storage).await?;
            context.set_data(BUTTON_KEY, button_id)?;
            state_storage.save_context(&context).await?;
            render(services, cb, "Send the new title:", Some(back_only("ad_buttons"))).await?;
            Ok(CallbackReply::none())
        }
        "btn_move" => pick(cb, services, "Which button should move?", "pick_move").await,
        "pick_move" => {
            let Some(button_id) = existing_button(arg, services).await? else {
                return Ok(CallbackReply::text(BUTTON_NOT_FOUND));
            };
            render(services, cb, "Which way?", Some(move_controls(button_id))).await?;
            Ok(CallbackReply::none())
        }
        "mv" => {
            let parsed = arg
                .split_once(':')
                .and_then(|(id, dir)| Some((parse_numeric_id(id)?, MoveDirection::parse(dir)?)));
            let Some((button_id, direction)) = parsed else {
                return Ok(CallbackReply::none());
            };

            let moved = menu.move_button(button_id, direction).await?;
            let text = if moved { "Order updated." } else { "Already at the edge." };
            render(services, cb, text, Some(move_controls(button_id))).await?;
            Ok(CallbackReply::text("OK"))
        }
        "btn_del" => pick(cb, services, "Which button should be deleted?", "pick_del").await,
        "pick_del" => {
            let Some(button_id) = parse_numeric_id(arg) else {
                return Ok(CallbackReply::none());
            };
            let text = format!("Confirm deletion? (ID={})\nSub-buttons and content go with it.", button_id);
            render(services, cb, &text, Some(button_delete_confirm(button_id))).await?;
            Ok(CallbackReply::none())
        }
        "delbtn" => {
            let Some((button_id, answer)) = arg.split_once(':') else {
                return Ok(CallbackReply::none());
            };
            let Some(button_id) = parse_numeric_id(button_id).filter(|_| answer == "yes") else {
                return Ok(CallbackReply::text("Cancelled."));
            };

            let removed = menu.delete_button(button_id).await?;
            if removed == 0 {
                show_menu(cb, services, BUTTON_NOT_FOUND).await?;
                return Ok(CallbackReply::none());
            }
            log_admin_action(user_id, "delete_button", Some(&button_id.to_string()), Some(&format!("{} removed", removed)));
            show_menu(cb, services, "✅ Deleted. Positions were renumbered.").await?;
            Ok(CallbackReply::text("Deleted."))
        }
        "btn_add_content" => pick(cb, services, "Which button gets the content?", "pick_content").await,
        "pick_content" => {
            let Some(button_id) = existing_button(arg, services).await? else {
                return Ok(CallbackReply::text(BUTTON_NOT_FOUND));
            };
            if menu.has_submenu(button_id).await? {
                return Ok(CallbackReply::alert(CONTENT_NEEDS_LEAF));
            }
            let mut context = start_dialogue(user_id, ids::CONTENT_ADD, scenario_manager, state_storage).await?;
            context.set_data(BUTTON_KEY, button_id)?;
            state_storage.save_context(&context).await?;
            render(services, cb, ASK_CONTENT, Some(back_only("ad_buttons"))).await?;
            Ok(CallbackReply::none())
        }
        "btn_list_content" => pick(cb, services, "Whose content?", "pick_showc").await,
        "pick_showc" => {
            let Some(button_id) = parse_numeric_id(arg) else {
                return Ok(CallbackReply::none());
            };
            let items = menu.list_content(button_id).await?;
            if items.is_empty() {
                show_menu(cb, services, "This button has no content.").await?;
                return Ok(CallbackReply::none());
            }

            let lines: Vec<String> = items.iter().enumerate().map(|(i, item)| item.admin_label(i + 1)).collect();
            let text = format!("Content:\n{}", lines.join("\n"));
            render(services, cb, &text, Some(content_manage(&items))).await?;
            Ok(CallbackReply::none())
        }
        "delbc" => {
            let Some(content_id) = parse_numeric_id(arg) else {
                return Ok(CallbackReply::none());
            };
            let deleted = menu.delete_content(content_id).await?;
            debug!(content_id = content_id, deleted = deleted, "Content delete requested");
            show_menu(cb, services, if deleted { "Deleted. /admin" } else { "Already deleted." }).await?;
            Ok(CallbackReply::text("Deleted."))
        }
        "btn_info" => {
            show_menu(cb, services, INFO_TEXT).await?;
            Ok(CallbackReply::text("ℹ️"))
        }
        _ => Ok(CallbackReply::none()),
    }
}

async fn show_menu(cb: &IncomingCallback, services: &ServiceFactory, text: &str) -> Result<()> {
    let cols = services.menu_service.menu_cols().await?;
    render(services, cb, text, Some(buttons_menu(cols))).await
}

/// Offer the whole tree for the next step, or say there is nothing to pick
async fn pick(cb: &IncomingCallback, services: &ServiceFactory, prompt: &str, prefix: &str) -> Result<CallbackReply> {
    let tree = services.menu_service.tree().await?;
    if tree.is_empty() {
        show_menu(cb, services, NO_BUTTONS).await?;
    } else {
        render(services, cb, prompt, Some(pick_button(&tree, prefix, "ad_buttons"))).await?;
    }
    Ok(CallbackReply::none())
}

async fn existing_button(arg: &str, services: &ServiceFactory) -> Result<Option<i64>> {
    let Some(button_id) = parse_numeric_id(arg) else {
        return Ok(None);
    };
    Ok(services.menu_service.find_button(button_id).await?.map(|b| b.id))
}

/// Parent chosen for a new button; the title comes as the next message
async fn pick_new_parent(
    arg: &str,
    cb: &IncomingCallback,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<CallbackReply> {
    let Some(mut context) = dialogue_at(cb.user_id, ids::BUTTON_ADD, ids::STEP_PICK_PARENT, state_storage).await? else {
        return Ok(CallbackReply::text(SESSION_EXPIRED));
    };

    let parent_id = if arg == "root" {
        None
    } else {
        match existing_button(arg, services).await? {
            Some(id) => Some(id),
            None => return Ok(CallbackReply::text(BUTTON_NOT_FOUND)),
        }
    };

    context.set_data(PARENT_KEY, parent_id)?;
    scenario_manager.next_step(&mut context, ids::STEP_TITLE)?;
    state_storage.save_context(&context).await?;

    render(services, cb, "New button title?", Some(back_only("ad_buttons"))).await?;
    Ok(CallbackReply::none())
}
