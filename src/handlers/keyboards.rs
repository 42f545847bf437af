//! Keyboards used by the bot
//!
//! Everything here builds domain [`Keyboard`] values; conversion to Telegram
//! markup happens in the transport.

use crate::models::{ButtonTreeEntry, Channel, ContentItem};
use crate::services::channel::channel_link;
use crate::services::subscription::MissingChannel;
use crate::services::transport::{InlineButton, Keyboard};

pub const BACK: &str = "⬅️ Back";

pub fn back_only(target: &str) -> Keyboard {
    Keyboard::Inline(vec![vec![InlineButton::callback(BACK, target)]])
}

/// Channels the user still has to join, then the re-check button
pub fn subscribe_keyboard(missing: &[MissingChannel]) -> Keyboard {
    let mut rows: Vec<Vec<InlineButton>> = missing
        .iter()
        .map(|m| {
            let mut label = m.channel.display_name();
            if m.pending_request {
                label.push_str(" ⏳");
            }
            vec![InlineButton::url(label, channel_link(&m.channel))]
        })
        .collect();
    rows.push(vec![InlineButton::callback("✅ Check", "check_sub")]);
    Keyboard::Inline(rows)
}

pub fn admin_root() -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("📌 Mandatory channels", "ad_channels"),
        InlineButton::callback("🎛 Buttons", "ad_buttons"),
        InlineButton::callback("👥 Users", "ad_users"),
        InlineButton::callback("👮 Admins", "ad_admins"),
        InlineButton::callback("📣 Broadcast", "ad_broadcast"),
    ])
}

pub fn channels_menu() -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("➕ Add channel", "ch_add_simple"),
        InlineButton::callback("📋 List", "ch_list"),
        InlineButton::callback("🗑 Delete", "ch_del"),
        InlineButton::callback(BACK, "admin_back"),
    ])
}

pub fn channel_mode() -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("🌐 Public channel", "ch_type:n"),
        InlineButton::callback("🔒 Join request", "ch_type:j"),
        InlineButton::callback(BACK, "ad_channels"),
    ])
}

pub fn channel_links(channels: &[Channel]) -> Keyboard {
    let mut buttons: Vec<InlineButton> = channels
        .iter()
        .map(|c| {
            let title = c.title.as_deref().unwrap_or("—");
            InlineButton::url(format!("{}  ({})", title, c.chat_id), channel_link(c))
        })
        .collect();
    buttons.push(InlineButton::callback(BACK, "ad_channels"));
    Keyboard::single_column(buttons)
}

pub fn channel_delete_pick(channels: &[Channel]) -> Keyboard {
    let mut buttons: Vec<InlineButton> = channels
        .iter()
        .map(|c| {
            let title = c.title.as_deref().unwrap_or("—");
            InlineButton::callback(format!("🗑 {}  ({})", title, c.chat_id), format!("pickdel:{}", c.chat_id))
        })
        .collect();
    buttons.push(InlineButton::callback(BACK, "ad_channels"));
    Keyboard::single_column(buttons)
}

pub fn channel_delete_confirm(chat_id: &str) -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("✅ Yes, delete", format!("chdel:{}:yes", chat_id)),
        InlineButton::callback("⬅️ Cancel", "ch_del"),
    ])
}

pub fn buttons_menu(cols: usize) -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback(format!("⚙️ Layout (columns): {}", cols), "btn_cols"),
        InlineButton::callback("➕ New button", "btn_add"),
        InlineButton::callback("✏️ Rename", "btn_rename"),
        InlineButton::callback("↕️ Reorder", "btn_move"),
        InlineButton::callback("📎 Add content", "btn_add_content"),
        InlineButton::callback("📑 Manage content", "btn_list_content"),
        InlineButton::callback("🗑 Delete button", "btn_del"),
        InlineButton::callback("ℹ️ Info", "btn_info"),
        InlineButton::callback(BACK, "admin_back"),
    ])
}

/// Column choices with the current one ticked
pub fn columns(current: usize) -> Keyboard {
    let row = (1..=4)
        .map(|i| {
            let label = if i == current { format!("✅ {}", i) } else { i.to_string() };
            InlineButton::callback(label, format!("set_cols:{}", i))
        })
        .collect();
    Keyboard::Inline(vec![row, vec![InlineButton::callback(BACK, "ad_buttons")]])
}

/// Flattened tree, one button per node, indented by depth
pub fn pick_button(entries: &[ButtonTreeEntry], prefix: &str, back_to: &str) -> Keyboard {
    let mut buttons: Vec<InlineButton> = entries
        .iter()
        .map(|e| InlineButton::callback(e.indented_label(), format!("{}:{}", prefix, e.button.id)))
        .collect();
    buttons.push(InlineButton::callback(BACK, back_to));
    Keyboard::single_column(buttons)
}

/// Parent choice for a new button: root first, then the tree
pub fn pick_parent(entries: &[ButtonTreeEntry]) -> Keyboard {
    let mut buttons = vec![InlineButton::callback("🏠 Root", "add_parent:root")];
    buttons.extend(
        entries
            .iter()
            .map(|e| InlineButton::callback(e.indented_label(), format!("add_parent:{}", e.button.id))),
    );
    buttons.push(InlineButton::callback(BACK, "ad_buttons"));
    Keyboard::single_column(buttons)
}

pub fn move_controls(button_id: i64) -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("⬆️ Up", format!("mv:{}:up", button_id)),
        InlineButton::callback("⬇️ Down", format!("mv:{}:down", button_id)),
        InlineButton::callback(BACK, "ad_buttons"),
    ])
}

pub fn button_delete_confirm(button_id: i64) -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("❌ Yes, delete", format!("delbtn:{}:yes", button_id)),
        InlineButton::callback("⬅️ Cancel", "ad_buttons"),
    ])
}

pub fn content_manage(items: &[ContentItem]) -> Keyboard {
    let mut buttons: Vec<InlineButton> = items
        .iter()
        .map(|i| InlineButton::callback(format!("❌ Del #{} ({})", i.id, i.media_kind), format!("delbc:{}", i.id)))
        .collect();
    buttons.push(InlineButton::callback(BACK, "ad_buttons"));
    Keyboard::single_column(buttons)
}

pub fn users_menu() -> Keyboard {
    Keyboard::single_column(vec![
        InlineButton::callback("📊 Statistics", "u_stats"),
        InlineButton::callback("📤 Export", "u_export"),
        InlineButton::callback(BACK, "admin_back"),
    ])
}

/// Roster actions; add and remove only for the super-admin
pub fn admins_menu(super_mode: bool) -> Keyboard {
    let mut buttons = vec![InlineButton::callback("📋 List", "adm_list")];
    if super_mode {
        buttons.push(InlineButton::callback("➕ Add", "adm_add"));
        buttons.push(InlineButton::callback("🗑 Remove", "adm_del"));
    }
    buttons.push(InlineButton::callback(BACK, "admin_back"));
    Keyboard::single_column(buttons)
}

pub fn broadcast_running() -> Keyboard {
    Keyboard::single_column(vec![InlineButton::callback("⛔ Cancel broadcast", "bc_cancel")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::telegram::to_reply_markup;
    use crate::services::transport::ButtonAction;
    use crate::utils::helpers::FALLBACK_CHANNEL_URL;

    fn rows(keyboard: Keyboard) -> Vec<Vec<InlineButton>> {
        match keyboard {
            Keyboard::Inline(rows) => rows,
            other => panic!("expected inline keyboard, got {:?}", other),
        }
    }

    #[test]
    fn test_subscribe_keyboard_links_and_check() {
        let channel = Channel {
            chat_id: "-100".to_string(),
            title: Some("News".to_string()),
            username: None,
            invite_link: None,
            url: None,
        };
        let keyboard = subscribe_keyboard(&[MissingChannel { channel, pending_request: true }]);
        let rows = rows(keyboard);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0].text, "News ⏳");
        assert_eq!(rows[0][0].action, ButtonAction::Url("https://t.me/".to_string()));
        assert_eq!(rows[1][0].action, ButtonAction::Callback("check_sub".to_string()));
    }

    #[test]
    fn test_unparseable_links_fall_back() {
        let broken = Channel {
            chat_id: "-100".to_string(),
            title: Some("Private".to_string()),
            username: None,
            invite_link: Some("https://".to_string()),
            url: Some("https://".to_string()),
        };

        let gate = subscribe_keyboard(&[MissingChannel { channel: broken.clone(), pending_request: false }]);
        assert_eq!(rows(gate.clone())[0][0].action, ButtonAction::Url(FALLBACK_CHANNEL_URL.to_string()));
        assert!(to_reply_markup(gate).is_ok());

        let listing = channel_links(&[broken]);
        assert_eq!(rows(listing.clone())[0][0].action, ButtonAction::Url(FALLBACK_CHANNEL_URL.to_string()));
        assert!(to_reply_markup(listing).is_ok());
    }

    #[test]
    fn test_columns_marks_current() {
        let rows = rows(columns(3));
        assert_eq!(rows[0].len(), 4);
        assert_eq!(rows[0][2].text, "✅ 3");
        assert_eq!(rows[0][0].text, "1");
    }

    #[test]
    fn test_admins_menu_modes() {
        assert_eq!(rows(admins_menu(false)).len(), 2);
        assert_eq!(rows(admins_menu(true)).len(), 4);
    }
}
