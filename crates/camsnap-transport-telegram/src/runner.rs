use crate::bot;
use crate::bot::handlers::Command;
use crate::config::get_poll_timeout;
use camsnap_core::capture::{Camera, Capturer};
use camsnap_core::config::Settings;
use camsnap_core::dispatch::CommandDispatcher;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime until Ctrl-C.
pub async fn run_bot(settings: Arc<Settings>, camera: Arc<dyn Camera>) {
    let bot = Bot::new(settings.telegram.bot_token.clone());
    let dispatcher = init_dispatcher(&settings, camera);
    register_commands(&bot).await;
    let handler = setup_handler();

    let timeout = get_poll_timeout();
    let listener = Polling::builder(bot.clone()).timeout(timeout).build();

    info!("Bot is running (poll timeout: {}s)...", timeout.as_secs());

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;
}

fn init_dispatcher(settings: &Arc<Settings>, camera: Arc<dyn Camera>) -> Arc<CommandDispatcher> {
    let capturer = Capturer::new(camera, settings.camera.clone());
    info!(
        "Capturer initialized (device: {}, output: {})",
        settings.camera.device_id,
        settings.camera.filename.display()
    );

    let allowed = settings.telegram.allowed_users.len();
    if allowed == 0 {
        warn!("telegram.allowed_users is empty: every request will be denied.");
    } else {
        info!("Allow-list loaded ({allowed} users).");
    }

    Arc::new(CommandDispatcher::new(Arc::clone(settings), capturer))
}

async fn register_commands(bot: &Bot) {
    match bot.set_my_commands(Command::bot_commands()).await {
        Ok(_) => info!("Bot commands registered."),
        Err(e) => warn!("Failed to register bot commands: {}", e),
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    // Non-command messages fall through and are ignored
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command)
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<CommandDispatcher>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg, dispatcher).await,
        Command::Photo => bot::handlers::photo(bot, msg, dispatcher).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}
