use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::Me;
use teloxide::utils::command::BotCommands;

use crate::storage::StateStorage;
use crate::types::{BotType, ConversationState, DialogueWithState, HandlerResult};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show what this bot can do")]
    Help,

    #[command(description = "start using this bot")]
    Start,

    #[command(description = "bind a sticker to keywords or phrases", alias = "bind")]
    Add,

    #[command(description = "remove a sticker from my database")]
    Remove,

    #[command(description = "list the keywords saved for a sticker")]
    Info,

    #[command(description = "stop the current operation")]
    Cancel,
}

/// Commands are global: starting a new flow overwrites whatever flow was in
/// progress, so an abandoned dialogue can never leak into a fresh one.
pub async fn receive_command(
    bot: BotType,
    me: Me,
    storage: Arc<StateStorage>,
    dialogue: DialogueWithState,
    msg: Message,
    cmd: Command,
) -> HandlerResult {
    match cmd {
        Command::Help | Command::Start => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "I help you save stickers and find them by keywords and phrases. \
                    To search, open any chat and type \"@{} &lt;query&gt;\".\n\
                    \n<b>Commands</b>\n{}",
                    me.username(),
                    Command::descriptions()
                ),
            )
            .await?;
        }
        Command::Add => {
            bot.send_message(
                msg.chat.id,
                "Send me the sticker you want to bind keywords to",
            )
            .await?;
            dialogue
                .update(ConversationState::ReceiveStickerForBind)
                .await?;
        }
        Command::Remove => {
            bot.send_message(
                msg.chat.id,
                "Send me the sticker you want to remove from my database",
            )
            .await?;
            dialogue
                .update(ConversationState::ReceiveStickerForRemoval)
                .await?;
        }
        Command::Info => {
            bot.send_message(
                msg.chat.id,
                "Send me a sticker to get its list of keywords and phrases",
            )
            .await?;
            dialogue
                .update(ConversationState::ReceiveStickerForInfo)
                .await?;
        }
        Command::Cancel => {
            let state = storage.load(dialogue.chat_id()).await?;
            if state == ConversationState::Idle {
                bot.send_message(msg.chat.id, "Nothing to cancel").await?;
            } else {
                dialogue.exit().await?;
                bot.send_message(msg.chat.id, "Cancelled").await?;
            }
        }
    }

    Ok(())
}

/// Anything that matches no transition for the current state.
pub async fn receive_other(bot: BotType, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, "Send /help to see what I can do")
        .await?;
    Ok(())
}

// A button press from a chat with no active flow, e.g. after a restart ate
// the dialogue or the same button was pressed twice. Answer it so the client
// stops the spinner.
pub async fn receive_stray_callback(bot: BotType, q: CallbackQuery) -> HandlerResult {
    bot.answer_callback_query(q.id).await?;
    Ok(())
}
