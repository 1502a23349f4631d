use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::database::queries;
use crate::types::*;

pub async fn receive_removal_sticker(
    bot: BotType,
    dialogue: DialogueWithState,
    msg: Message,
) -> HandlerResult {
    let Some(sticker) = msg.sticker() else {
        bot.send_message(msg.chat.id, "Please send me a sticker, or /cancel")
            .await?;
        return Ok(());
    };

    log::debug!(
        "Removing sticker: {:?} in chat: {:?}",
        sticker.file.id,
        msg.chat.id
    );

    let markup = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Yes", "confirm_removal"),
        InlineKeyboardButton::callback("Cancel", "cancel"),
    ]]);
    bot.send_message(msg.chat.id, "Are you sure?")
        .reply_markup(markup)
        .await?;

    dialogue
        .update(ConversationState::ReceiveRemovalConfirm {
            sticker_id: sticker.file.id.clone(),
        })
        .await?;

    Ok(())
}

pub async fn receive_removal_confirm(
    db: DbType,
    bot: BotType,
    dialogue: DialogueWithState,
    sticker_id: String,
    q: CallbackQuery,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let choice = q.data.as_deref().unwrap_or_default();
    let chat_id = dialogue.chat_id();

    log::debug!("Got removal choice: {:?} in chat: {:?}", choice, chat_id);

    if let Some(message) = q.regular_message() {
        bot.edit_message_reply_markup(message.chat.id, message.id)
            .await?;
    }

    match choice {
        "confirm_removal" => {
            let result = queries::delete_record(&db, q.from.id.to_string(), sticker_id).await;
            dialogue.exit().await?;

            match result {
                Ok(true) => {
                    bot.send_message(chat_id, "Removed").await?;
                }
                Ok(false) => {
                    bot.send_message(chat_id, "Nothing was saved for this sticker")
                        .await?;
                }
                Err(err) => {
                    log::error!("delete_record failed in chat {:?}: {:?}", chat_id, err);
                    bot.send_message(chat_id, "Something went wrong, please try again")
                        .await?;
                }
            }
        }
        "cancel" => {
            dialogue.exit().await?;
            bot.send_message(chat_id, "Cancelled").await?;
        }
        _ => {
            bot.send_message(chat_id, "Please pick one of the buttons, or /cancel")
                .await?;
        }
    }

    Ok(())
}
