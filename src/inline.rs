use teloxide::payloads::AnswerInlineQuerySetters;
use teloxide::prelude::*;
use teloxide::types::{InlineQueryResult, InlineQueryResultCachedSticker};
use uuid::Uuid;

use crate::database::queries;
use crate::types::{BotType, DbType, HandlerResult};

pub const PAGE_SIZE: u32 = 10;

/// Answers an inline query with one page of matching stickers. Stateless:
/// search runs against whatever is stored, independent of any dialogue.
pub async fn receive_inline_query(
    db: DbType,
    bot: BotType,
    cache_time: u32,
    q: InlineQuery,
) -> HandlerResult {
    let user_id = q.from.id.to_string();
    let offset: u32 = q.offset.parse().unwrap_or(0);

    log::debug!(
        "Got inline query: {:?} at offset {:?} from {:?}",
        q.query,
        offset,
        user_id
    );

    let stickers = queries::search_stickers(&db, user_id, &q.query, offset, PAGE_SIZE).await?;

    // Result ids are a client-side cache key, so every answer gets fresh ones
    let results = stickers.iter().map(|sticker_id| {
        InlineQueryResult::CachedSticker(InlineQueryResultCachedSticker {
            id: Uuid::new_v4().simple().to_string(),
            sticker_file_id: sticker_id.to_owned(),
            input_message_content: None,
            reply_markup: None,
        })
    });

    // An empty page leaves next_offset at its dead end, clients stop there
    let next_offset = offset + stickers.len() as u32;

    bot.answer_inline_query(q.id.clone(), results)
        .is_personal(true)
        .next_offset(next_offset.to_string())
        .cache_time(cache_time)
        .await?;

    Ok(())
}
