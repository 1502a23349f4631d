use teloxide::prelude::*;
use teloxide::utils::html;

use crate::database::queries;
use crate::handlers::send_message::send_chunked;
use crate::types::*;

pub async fn receive_info_sticker(
    db: DbType,
    bot: BotType,
    dialogue: DialogueWithState,
    msg: Message,
) -> HandlerResult {
    let Some(sticker) = msg.sticker() else {
        bot.send_message(msg.chat.id, "Please send me a sticker, or /cancel")
            .await?;
        return Ok(());
    };

    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    log::debug!(
        "Listing keywords of sticker: {:?} for user: {:?}",
        sticker.file.id,
        user.id
    );

    let result =
        queries::get_keywords(&db, user.id.to_string(), sticker.file.id.clone()).await;
    dialogue.exit().await?;

    match result {
        Ok(Some(keywords)) if !keywords.is_empty() => {
            bot.send_message(
                msg.chat.id,
                "The following keywords are saved for this sticker:",
            )
            .await?;
            send_chunked(&bot, msg.chat.id, &html::escape(&keywords.join("\n"))).await?;
        }
        Ok(_) => {
            bot.send_message(msg.chat.id, "No records found").await?;
        }
        Err(err) => {
            log::error!("get_keywords failed in chat {:?}: {:?}", msg.chat.id, err);
            bot.send_message(msg.chat.id, "Something went wrong, please try again")
                .await?;
        }
    }

    Ok(())
}
