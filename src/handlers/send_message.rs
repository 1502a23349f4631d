use teloxide::prelude::*;
use teloxide::types::ChatId;

use crate::types::{BotType, HandlerResult};
use crate::util::{chunk_text, MAX_MESSAGE_LENGTH};

/// Sends text that may exceed Telegram's message length limit as multiple
/// sequential messages, preserving order.
pub async fn send_chunked(bot: &BotType, chat_id: ChatId, text: &str) -> HandlerResult {
    for chunk in chunk_text(text, MAX_MESSAGE_LENGTH) {
        bot.send_message(chat_id, chunk).await?;
    }

    Ok(())
}
