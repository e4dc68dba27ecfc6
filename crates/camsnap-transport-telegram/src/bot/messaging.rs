//! Delivery of dispatcher replies.

use anyhow::Result;
use camsnap_core::dispatch::Reply;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tracing::debug;

/// Send a reply as a single Telegram message: text, or a photo with caption.
///
/// No retry: a failed send is returned to the caller to be logged.
///
/// # Errors
///
/// Returns an error if the Telegram API rejects the request.
pub async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> Result<Message> {
    let sent = match reply {
        Reply::Text(text) => bot.send_message(chat_id, text).await?,
        Reply::Photo { image, caption } => {
            debug!(
                chat_id = chat_id.0,
                file_name = %image.file_name,
                size = image.bytes.len(),
                "Uploading photo"
            );
            let file = InputFile::memory(image.bytes).file_name(image.file_name);
            bot.send_photo(chat_id, file).caption(caption).await?
        }
    };
    Ok(sent)
}
