use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;

use crate::database::queries::{self, MergePolicy};
use crate::handlers::send_message::send_chunked;
use crate::types::*;
use crate::util::split_keywords;

pub async fn receive_bind_sticker(
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
        "Binding sticker: {:?} in chat: {:?}",
        sticker.file.id,
        msg.chat.id
    );

    bot.send_message(
        msg.chat.id,
        "Now send the keywords or phrases for this sticker, one per line",
    )
    .await?;

    dialogue
        .update(ConversationState::ReceiveKeywordsForBind {
            sticker_id: sticker.file.id.clone(),
        })
        .await?;

    Ok(())
}

pub async fn receive_bind_keywords(
    db: DbType,
    bot: BotType,
    dialogue: DialogueWithState,
    sticker_id: String,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(
            msg.chat.id,
            "Please send me the keywords as text, one per line, or /cancel",
        )
        .await?;
        return Ok(());
    };

    let keywords = split_keywords(text);
    if keywords.is_empty() {
        bot.send_message(msg.chat.id, "No keywords provided").await?;
        return Ok(());
    }

    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.to_string();

    log::debug!("Got keywords: {:?} from {:?}", keywords, user_id);

    let existing = match queries::get_keywords(&db, user_id.clone(), sticker_id.clone()).await {
        Ok(existing) => existing,
        Err(err) => {
            log::error!("get_keywords failed in chat {:?}: {:?}", msg.chat.id, err);
            dialogue.exit().await?;
            bot.send_message(msg.chat.id, "Something went wrong, please try again")
                .await?;
            return Ok(());
        }
    };

    match bind_outcome(existing) {
        BindOutcome::Write => {
            let result = queries::upsert_keywords(
                &db,
                user_id,
                sticker_id,
                keywords,
                MergePolicy::Replace,
            )
            .await;
            dialogue.exit().await?;

            match result {
                Ok(()) => {
                    bot.send_message(msg.chat.id, "Done!").await?;
                }
                Err(err) => {
                    log::error!("upsert_keywords failed in chat {:?}: {:?}", msg.chat.id, err);
                    bot.send_message(msg.chat.id, "Something went wrong, please try again")
                        .await?;
                }
            }
        }
        BindOutcome::Conflict(existing) => {
            bot.send_message(
                msg.chat.id,
                "This sticker already has the following keywords:",
            )
            .await?;
            send_chunked(&bot, msg.chat.id, &html::escape(&existing.join("\n"))).await?;

            let markup = InlineKeyboardMarkup::new(vec![
                vec![InlineKeyboardButton::callback("Replace", "bind|replace")],
                vec![InlineKeyboardButton::callback("Merge", "bind|join")],
                vec![InlineKeyboardButton::callback("Cancel", "cancel")],
            ]);
            bot.send_message(
                msg.chat.id,
                "Merge both lists, replace the old one with the new one, or cancel?",
            )
            .reply_markup(markup)
            .await?;

            dialogue
                .update(ConversationState::ReceiveBindChoice {
                    sticker_id,
                    pending: keywords,
                })
                .await?;
        }
    }

    Ok(())
}

/// What to do with freshly submitted keywords, given what is already stored.
#[derive(Debug, PartialEq)]
enum BindOutcome {
    /// Nothing stored, write straight away.
    Write,
    /// The sticker already has keywords. That needs an explicit decision from
    /// the user, never a silent overwrite.
    Conflict(Vec<String>),
}

fn bind_outcome(existing: Option<Vec<String>>) -> BindOutcome {
    match existing.filter(|keys| !keys.is_empty()) {
        Some(existing) => BindOutcome::Conflict(existing),
        None => BindOutcome::Write,
    }
}

pub async fn receive_bind_choice(
    db: DbType,
    bot: BotType,
    dialogue: DialogueWithState,
    (sticker_id, pending): (String, Vec<String>),
    q: CallbackQuery,
) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let choice = q.data.as_deref().unwrap_or_default();
    let chat_id = dialogue.chat_id();

    log::debug!("Got bind choice: {:?} in chat: {:?}", choice, chat_id);

    if let Some(message) = q.regular_message() {
        bot.edit_message_reply_markup(message.chat.id, message.id)
            .await?;
    }

    if choice == "cancel" {
        dialogue.exit().await?;
        bot.send_message(chat_id, "Cancelled").await?;
        return Ok(());
    }

    let Some(policy) = MergePolicy::from_callback(choice) else {
        bot.send_message(chat_id, "Please pick one of the buttons, or /cancel")
            .await?;
        return Ok(());
    };

    let result =
        queries::upsert_keywords(&db, q.from.id.to_string(), sticker_id, pending, policy).await;
    dialogue.exit().await?;

    match result {
        Ok(()) => {
            let text = match policy {
                MergePolicy::Replace => "Keywords replaced",
                MergePolicy::Merge => "Keywords merged",
            };
            bot.send_message(chat_id, text).await?;
        }
        Err(err) => {
            log::error!("upsert_keywords failed in chat {:?}: {:?}", chat_id, err);
            bot.send_message(chat_id, "Something went wrong, please try again")
                .await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::types::DbConn;

    async fn test_db() -> DbConn {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    #[test]
    fn a_fresh_sticker_writes_straight_away() {
        assert_eq!(bind_outcome(None), BindOutcome::Write);
    }

    #[test]
    fn an_empty_stored_list_is_not_a_conflict() {
        assert_eq!(bind_outcome(Some(vec![])), BindOutcome::Write);
    }

    #[test]
    fn existing_keywords_force_a_conflict_choice() {
        let outcome = bind_outcome(Some(vec!["a".to_string()]));
        assert_eq!(outcome, BindOutcome::Conflict(vec!["a".to_string()]));
    }

    #[tokio::test]
    async fn a_stored_record_is_never_silently_overwritten() {
        let db = test_db().await;

        queries::upsert_keywords(
            &db,
            "42".to_string(),
            "stk1".to_string(),
            vec!["a".to_string()],
            MergePolicy::Replace,
        )
        .await
        .unwrap();

        // New keywords for this sticker must go through the
        // replace/merge/cancel choice.
        let existing = queries::get_keywords(&db, "42".to_string(), "stk1".to_string())
            .await
            .unwrap();
        assert_eq!(
            bind_outcome(existing),
            BindOutcome::Conflict(vec!["a".to_string()])
        );
    }
}
