//! Admin dialogue steps driven by plain messages

use tracing::{error, info, warn};
use crate::handlers::callbacks::buttons::{BUTTON_KEY, PARENT_KEY};
use crate::handlers::callbacks::channels::{saved_text, PENDING_KEY};
use crate::handlers::keyboards::{broadcast_running, channel_mode};
use crate::handlers::{IncomingMessage, MessageContent};
use crate::models::MediaKind;
use crate::services::{
    AddAdminOutcome, AddContentOutcome, ChannelLookup, ChatReference, CreateButtonOutcome, PendingChannel, RemoveAdminOutcome,
    RenameButtonOutcome, ServiceFactory,
};
use crate::state::scenarios::ids;
use crate::state::{ConversationContext, ScenarioManager, StateStore};
use crate::utils::errors::{MenuGateError, Result};
use crate::utils::logging::log_admin_action;

pub const WRONG_CHANNEL_FORMAT: &str = "❌ Wrong format. Send an id (-100...) or @username.";
pub const CHANNEL_NOT_VISIBLE: &str = "❌ The bot cannot see this channel.\n\
    • Private or join-request channel: make the bot an admin there.\n\
    • Public channel: check that the @username is correct.";
pub const INVALID_LINK: &str = "❌ Send a valid link (t.me/...).";
pub const UNSUPPORTED_TYPE: &str = "Unsupported type.";
pub const CONTENT_SAVED: &str = "✅ Saved. You can send more. /admin";
pub const INVALID_ID: &str = "Invalid id.";
pub const INVALID_TITLE: &str = "Title must be 1-64 characters, must not start with '/' and cannot be the back button label.";
pub const CONTENT_NEEDS_LEAF: &str = "This button has a submenu, so its content would never be shown. \
    Add content to a button without children. /admin";

/// Route a message to the step the admin is at
pub async fn handle_dialogue_message(
    msg: &IncomingMessage,
    mut context: ConversationContext,
    services: &ServiceFactory,
    scenario_manager: &ScenarioManager,
    state_storage: &dyn StateStore,
) -> Result<()> {
    let (scenario, step) = match context.current_state() {
        (Some(scenario), Some(step)) => (scenario.to_string(), step.to_string()),
        _ => return Ok(()),
    };
    let dialogue = Dialogue { msg, services, scenario_manager, state_storage };

    match (scenario.as_str(), step.as_str()) {
        (ids::CHANNEL_ADD, ids::STEP_ASK_ID) => dialogue.channel_identifier(&mut context).await,
        (ids::CHANNEL_ADD, ids::STEP_ASK_LINK) => dialogue.channel_link(&mut context).await,
        (ids::CHANNEL_ADD, ids::STEP_CHOOSE_MODE) => dialogue.reply("Pick the channel type with the buttons above.").await,
        (ids::BUTTON_ADD, ids::STEP_PICK_PARENT) => dialogue.reply("Pick the parent with the buttons above.").await,
        (ids::BUTTON_ADD, ids::STEP_TITLE) => dialogue.button_title(&mut context).await,
        (ids::BUTTON_RENAME, ids::STEP_NEW_TITLE) => dialogue.button_rename(&mut context).await,
        (ids::CONTENT_ADD, ids::STEP_AWAIT_CONTENT) => dialogue.content_item(&mut context).await,
        (ids::ADMIN_ADD, ids::STEP_AWAIT_ID) => dialogue.admin_add(&mut context).await,
        (ids::ADMIN_REMOVE, ids::STEP_AWAIT_ID) => dialogue.admin_remove(&mut context).await,
        (ids::BROADCAST, ids::STEP_AWAIT_MESSAGE) => dialogue.broadcast(&mut context).await,
        _ => {
            warn!(user_id = msg.user_id, scenario = %scenario, step = %step, "Unknown dialogue step, dropping it");
            context.cancel_scenario();
            state_storage.save_context(&context).await
        }
    }
}

struct Dialogue<'a> {
    msg: &'a IncomingMessage,
    services: &'a ServiceFactory,
    scenario_manager: &'a ScenarioManager,
    state_storage: &'a dyn StateStore,
}

impl Dialogue<'_> {
    fn user_id(&self) -> i64 {
        self.msg.user_id
    }

    fn text(&self) -> &str {
        self.msg.text().map(str::trim).unwrap_or_default()
    }

    async fn reply(&self, text: &str) -> Result<()> {
        self.services.transport.send_text(self.msg.chat_id, text, None).await?;
        Ok(())
    }

    /// Run the step's input rules; a rejection is shown and `false` returned
    async fn accepts(&self, context: &ConversationContext) -> Result<bool> {
        match self.scenario_manager.validate_input(context, self.text()) {
            Ok(()) => Ok(true),
            Err(MenuGateError::InvalidInput(reason)) => {
                self.reply(&reason).await?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn finish(&self, context: &mut ConversationContext, text: &str) -> Result<()> {
        context.complete_scenario();
        self.state_storage.save_context(context).await?;
        self.reply(text).await
    }

    async fn channel_identifier(&self, context: &mut ConversationContext) -> Result<()> {
        if !self.accepts(context).await? {
            return Ok(());
        }

        let invite_link = context.get_string("invite_link");
        match self.services.channel_service.lookup(self.text(), invite_link).await? {
            ChannelLookup::LinkNoted(link) => {
                context.set_data("invite_link", link)?;
                self.state_storage.save_context(context).await?;
                self.reply("ℹ️ Link noted. Now send the channel id or @username.").await
            }
            ChannelLookup::InvalidFormat => self.reply(WRONG_CHANNEL_FORMAT).await,
            ChannelLookup::NotVisible => self.reply(CHANNEL_NOT_VISIBLE).await,
            ChannelLookup::Found(pending) => {
                context.remove_data("invite_link");
                context.set_data(PENDING_KEY, &pending)?;
                self.scenario_manager.next_step(context, ids::STEP_CHOOSE_MODE)?;
                self.state_storage.save_context(context).await?;

                let text = format!("Found: {}\nChannel type?", pending.display_name());
                self.services
                    .transport
                    .send_text(self.msg.chat_id, &text, Some(channel_mode()))
                    .await?;
                Ok(())
            }
        }
    }

    async fn channel_link(&self, context: &mut ConversationContext) -> Result<()> {
        if !self.accepts(context).await? {
            return Ok(());
        }
        let Some(pending) = context.get_data::<PendingChannel>(PENDING_KEY)? else {
            return self.finish(context, "This dialogue has expired, start again. /admin").await;
        };

        match self.services.channel_service.register_with_link(pending, self.text()).await? {
            Some(channel) => {
                log_admin_action(self.user_id(), "add_channel", Some(&channel.chat_id), channel.url.as_deref());
                self.finish(context, &saved_text(&channel)).await
            }
            None => self.reply(INVALID_LINK).await,
        }
    }

    async fn button_title(&self, context: &mut ConversationContext) -> Result<()> {
        if !self.accepts(context).await? {
            return Ok(());
        }
        let parent_id = context.get_data::<Option<i64>>(PARENT_KEY)?.flatten();

        match self.services.menu_service.create_button(self.text(), parent_id).await? {
            CreateButtonOutcome::Created(id) => {
                log_admin_action(self.user_id(), "create_button", Some(&id.to_string()), Some(self.text()));
                self.finish(context, &format!("✅ Button created (ID={}). /admin", id)).await
            }
            CreateButtonOutcome::DuplicateTitle => {
                self.reply("A button with this title already exists on that level. Send another title.").await
            }
            CreateButtonOutcome::ParentMissing => {
                self.finish(context, "The parent button no longer exists. /admin").await
            }
            CreateButtonOutcome::InvalidTitle => self.reply(INVALID_TITLE).await,
        }
    }

    async fn button_rename(&self, context: &mut ConversationContext) -> Result<()> {
        if !self.accepts(context).await? {
            return Ok(());
        }
        let Some(button_id) = context.get_i64(BUTTON_KEY) else {
            return self.finish(context, "This dialogue has expired, start again. /admin").await;
        };

        match self.services.menu_service.rename_button(button_id, self.text()).await? {
            RenameButtonOutcome::Renamed | RenameButtonOutcome::Unchanged => {
                log_admin_action(self.user_id(), "rename_button", Some(&button_id.to_string()), Some(self.text()));
                self.finish(context, "✅ Title changed. /admin").await
            }
            RenameButtonOutcome::DuplicateTitle => {
                self.reply("A sibling already uses this title. Send another one.").await
            }
            RenameButtonOutcome::NotFound => self.finish(context, "Button not found. /admin").await,
            RenameButtonOutcome::InvalidTitle => self.reply(INVALID_TITLE).await,
        }
    }

    /// Store one item; the dialogue stays open for more until the admin leaves
    async fn content_item(&self, context: &mut ConversationContext) -> Result<()> {
        let Some(button_id) = context.get_i64(BUTTON_KEY) else {
            return self.finish(context, "This dialogue has expired, start again. /admin").await;
        };

        let (kind, payload, caption) = match &self.msg.content {
            MessageContent::Text(text) => (MediaKind::Text, None, Some(text.clone())),
            MessageContent::Media { kind, file_id, caption } => (*kind, Some(file_id.clone()), caption.clone()),
            MessageContent::Unsupported => return self.reply(UNSUPPORTED_TYPE).await,
        };

        match self.services.menu_service.add_content(button_id, kind, payload, caption).await? {
            AddContentOutcome::Added(item) => {
                // Keep the dialogue alive while items keep coming
                self.state_storage.save_context(context).await?;
                info!(user_id = self.user_id(), button_id = button_id, content_id = item.id, "Content item stored");
                self.reply(CONTENT_SAVED).await
            }
            AddContentOutcome::HasSubmenu => self.finish(context, CONTENT_NEEDS_LEAF).await,
            AddContentOutcome::NotFound => self.finish(context, "Button not found. /admin").await,
        }
    }

    async fn admin_add(&self, context: &mut ConversationContext) -> Result<()> {
        let auth = &self.services.auth_service;
        if !auth.is_super_admin(self.user_id()).await? {
            return self.reply("Only the super admin can add admins.").await;
        }
        if !self.accepts(context).await? {
            return Ok(());
        }

        let (new_admin_id, name) = match ChatReference::parse(self.text()) {
            Some(reference @ ChatReference::Username(_)) => {
                match self.services.transport.resolve_chat(&reference).await {
                    Ok(chat) => (chat.id, chat.full_name.or(chat.title)),
                    Err(e) => {
                        warn!(reference = %reference, error = %e, "Admin handle lookup failed");
                        return self.reply("Username not found.").await;
                    }
                }
            }
            Some(ChatReference::Id(id)) => (id, None),
            None => return self.reply(INVALID_ID).await,
        };

        match auth.add_admin(self.user_id(), new_admin_id, name.as_deref()).await? {
            AddAdminOutcome::Added(record) => {
                log_admin_action(self.user_id(), "add_admin", Some(&record.user_id.to_string()), record.name.as_deref());
                self.finish(context, "✅ Added. /admin").await
            }
            AddAdminOutcome::AlreadySuperAdmin => self.reply("This user is already the super admin.").await,
            AddAdminOutcome::Denied => self.reply("Only the super admin can add admins.").await,
        }
    }

    async fn admin_remove(&self, context: &mut ConversationContext) -> Result<()> {
        let auth = &self.services.auth_service;
        if !auth.is_super_admin(self.user_id()).await? {
            return self.reply("Only the super admin can remove admins.").await;
        }
        if !self.accepts(context).await? {
            return Ok(());
        }
        let Ok(admin_id) = self.text().parse::<i64>() else {
            return self.reply(INVALID_ID).await;
        };

        match auth.remove_admin(self.user_id(), admin_id).await? {
            RemoveAdminOutcome::Removed => {
                log_admin_action(self.user_id(), "remove_admin", Some(&admin_id.to_string()), None);
                self.finish(context, "✅ Removed. /admin").await
            }
            RemoveAdminOutcome::NotFound => self.finish(context, "⚠️ This user is not an admin. /admin").await,
            RemoveAdminOutcome::ProtectedSuperAdmin => self.reply("The super admin cannot be removed.").await,
            RemoveAdminOutcome::Denied => self.reply("Only the super admin can remove admins.").await,
        }
    }

    /// Copy the captured message to every user in a background task
    async fn broadcast(&self, context: &mut ConversationContext) -> Result<()> {
        context.complete_scenario();
        self.state_storage.save_context(context).await?;

        let admin_id = self.user_id();
        if self.services.broadcast_service.is_running(admin_id) {
            return self.reply("A broadcast is already running.").await;
        }

        self.services
            .transport
            .send_text(self.msg.chat_id, "📣 Broadcast started.", Some(broadcast_running()))
            .await?;
        log_admin_action(admin_id, "broadcast", None, Some(&self.msg.message_id.to_string()));

        let services = self.services.clone();
        let chat_id = self.msg.chat_id;
        let message_id = self.msg.message_id;
        tokio::spawn(async move {
            let text = match services.broadcast_service.run(admin_id, chat_id, message_id).await {
                Ok(report) => report.summary(),
                Err(e) => {
                    error!(admin_id = admin_id, error = %e, "Broadcast aborted");
                    "❌ Broadcast failed.".to_string()
                }
            };
            if let Err(e) = services.transport.send_text(chat_id, &text, None).await {
                warn!(admin_id = admin_id, error = %e, "Could not report broadcast result");
            }
        });

        Ok(())
    }
}
