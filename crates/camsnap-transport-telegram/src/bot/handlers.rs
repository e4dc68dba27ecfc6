use crate::bot::messaging::send_reply;
use anyhow::Result;
use camsnap_core::dispatch::CommandDispatcher;
use std::sync::Arc;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::info;

// Helper function to get user name from Message
fn get_user_name(msg: &Message) -> String {
    if let Some(ref user) = msg.from {
        if let Some(ref username) = user.username {
            return username.clone();
        }
        if !user.first_name.is_empty() {
            return user.first_name.clone();
        }
    }
    "Unknown".to_string()
}

/// Safe extraction of user ID from a message.
/// Returns 0 if the user information is missing.
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Supported commands for the bot
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the welcome message
    #[command(description = "Show the welcome message.")]
    Start,
    /// Capture and send a camera snapshot
    #[command(description = "Take a photo with the camera.")]
    Photo,
}

/// Start handler
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn start(bot: Bot, msg: Message, dispatcher: Arc<CommandDispatcher>) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);

    info!("User {user_id} ({user_name}) initiated /start command.");

    let reply = dispatcher.start(user_id);
    send_reply(&bot, msg.chat.id, reply).await?;
    Ok(())
}

/// Photo handler: captures a frame for allowed users
///
/// # Errors
///
/// Returns an error if the reply cannot be sent. Capture failures are
/// reported to the user and are not errors here.
pub async fn photo(bot: Bot, msg: Message, dispatcher: Arc<CommandDispatcher>) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);

    info!("User {user_id} ({user_name}) initiated /photo command.");

    let reply = dispatcher.photo(user_id).await;
    send_reply(&bot, msg.chat.id, reply).await?;

    info!("Responded to /photo from user {user_id}.");
    Ok(())
}
