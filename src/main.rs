//! MenuGate Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatJoinRequest, Update};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, info, warn};

use MenuGate::{
    config::Settings,
    database::{connection::create_pool, health_check, run_migrations, DatabaseConfig, DatabaseService},
    handlers::{
        callbacks::handle_callback_query,
        commands::{handle_command, Command},
        messages::handle_message,
        IncomingCallback, IncomingMessage,
    },
    services::{ChatTransport, ServiceFactory, TelegramTransport},
    state::{create_state_store, ScenarioManager, StateStorageManager, StateStore},
    utils::logging,
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate().context("invalid settings")?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging).context("failed to initialize logging")?;

    info!("Starting {}...", MenuGate::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = create_pool(&DatabaseConfig::from(&settings.database))
        .await
        .context("failed to open the database")?;
    run_migrations(&db_pool).await.context("failed to run migrations")?;
    health_check(&db_pool).await.context("database health check failed")?;
    let database_service = DatabaseService::new(db_pool);

    // Initialize bot and services
    let bot = Bot::new(&settings.bot.token);
    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(bot.clone()));
    let services = ServiceFactory::new(database_service, settings.clone(), transport);

    if let Some(record) = services.auth_service.bootstrap_super_admin(None).await? {
        info!(user_id = record.user_id, "Configured super admin added to the roster");
    }

    // Initialize state management
    let state_storage = create_state_store(&settings).await.context("failed to initialize state storage")?;
    let mut state_manager = StateStorageManager::new(
        state_storage.clone(),
        Duration::from_secs(settings.state.cleanup_interval_seconds),
    );
    state_manager.start_cleanup();
    let scenario_manager = ScenarioManager::new();

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Could not register the command list");
    }

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![
            Arc::new(services),
            Arc::new(scenario_manager),
            state_storage
        ])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("An error from the update dispatcher"))
        .enable_ctrlc_handler()
        .build();

    if let Some(webhook_url) = &settings.bot.webhook_url {
        info!("Webhook URL configured: {}", webhook_url);
        info!("Note: Webhook setup not implemented in this version, falling back to polling");
    }

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    state_manager.stop_cleanup();
    info!("MenuGate bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter(|msg: Message| msg.chat.is_private())
                .branch(dptree::entry().filter_command::<Command>().endpoint(handle_commands))
                .branch(dptree::endpoint(handle_messages)),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callbacks))
        .branch(Update::filter_chat_join_request().endpoint(handle_join_request))
}

/// Handle bot commands
async fn handle_commands(
    msg: Message,
    cmd: Command,
    services: Arc<ServiceFactory>,
    scenario_manager: Arc<ScenarioManager>,
    state_storage: Arc<dyn StateStore>,
) -> HandlerResult {
    let Some(incoming) = IncomingMessage::from_telegram(&msg) else {
        return Ok(());
    };

    if let Err(e) = handle_command(cmd, &incoming, &services, &scenario_manager, state_storage.as_ref()).await {
        error!(user_id = incoming.user_id, severity = %e.severity(), error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    msg: Message,
    services: Arc<ServiceFactory>,
    scenario_manager: Arc<ScenarioManager>,
    state_storage: Arc<dyn StateStore>,
) -> HandlerResult {
    let Some(incoming) = IncomingMessage::from_telegram(&msg) else {
        return Ok(());
    };

    if let Err(e) = handle_message(&incoming, &services, &scenario_manager, state_storage.as_ref()).await {
        error!(user_id = incoming.user_id, severity = %e.severity(), error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries; the query is always answered to stop the spinner
async fn handle_callbacks(
    bot: Bot,
    query: CallbackQuery,
    services: Arc<ServiceFactory>,
    scenario_manager: Arc<ScenarioManager>,
    state_storage: Arc<dyn StateStore>,
) -> HandlerResult {
    let Some(incoming) = IncomingCallback::from_telegram(&query) else {
        bot.answer_callback_query(query.id).await?;
        return Ok(());
    };

    let result = handle_callback_query(&incoming, &services, &scenario_manager, state_storage.as_ref()).await;

    let mut answer = bot.answer_callback_query(query.id.clone());
    if let Ok(reply) = &result {
        if let Some(text) = &reply.text {
            answer = answer.text(text.clone()).show_alert(reply.alert);
        }
    }
    if let Err(e) = answer.await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    if let Err(e) = result {
        error!(user_id = incoming.user_id, data = %incoming.data, severity = %e.severity(), error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}

/// Remember join requests so the gate prompt can mark them as pending
async fn handle_join_request(request: ChatJoinRequest, services: Arc<ServiceFactory>) -> HandlerResult {
    let user_id = request.from.id.0 as i64;
    let chat_id = request.chat.id.0;

    services.gate().join_requests().record(user_id, chat_id);
    debug!(user_id = user_id, chat_id = chat_id, "Join request recorded");
    Ok(())
}
