use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use teloxide::prelude::*;

mod config;
mod database;
mod handlers;
mod inline;
mod storage;
mod types;
mod util;

use config::Config;
use handlers::Command;
use storage::StateStorage;
use types::ConversationState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    log::info!("Starting keysticker");

    let config = Config::from_env()?;
    log::debug!("Debug mode: {:?}", config.debug);
    log::debug!("Database location: {:?}", config.database_location);

    log::debug!("Opening/creating and migrating database");
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.database_location))?
        .create_if_missing(true);
    let db = Arc::new(SqlitePoolOptions::new().connect_with(options).await?);
    sqlx::migrate!().run(db.as_ref()).await?;
    log::debug!("Successfully opened database");

    let bot = Bot::new(&config.token).parse_mode(teloxide::types::ParseMode::Html);
    let storage = StateStorage::new(db.clone());

    let message_tree = Update::filter_message()
        .enter_dialogue::<Message, StateStorage, ConversationState>()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handlers::receive_command),
        )
        .branch(
            dptree::case![ConversationState::ReceiveStickerForBind]
                .endpoint(handlers::receive_bind_sticker),
        )
        .branch(
            dptree::case![ConversationState::ReceiveKeywordsForBind { sticker_id }].endpoint({
                let db = db.clone();
                move |bot, dialogue, sticker_id, msg| {
                    handlers::receive_bind_keywords(db.clone(), bot, dialogue, sticker_id, msg)
                }
            }),
        )
        .branch(
            dptree::case![ConversationState::ReceiveStickerForRemoval]
                .endpoint(handlers::receive_removal_sticker),
        )
        .branch(
            dptree::case![ConversationState::ReceiveStickerForInfo].endpoint({
                let db = db.clone();
                move |bot, dialogue, msg| {
                    handlers::receive_info_sticker(db.clone(), bot, dialogue, msg)
                }
            }),
        )
        .endpoint(handlers::receive_other);

    let callback_tree = Update::filter_callback_query()
        .enter_dialogue::<CallbackQuery, StateStorage, ConversationState>()
        .branch(
            dptree::case![ConversationState::ReceiveBindChoice { sticker_id, pending }].endpoint({
                let db = db.clone();
                move |bot, dialogue, payload, q| {
                    handlers::receive_bind_choice(db.clone(), bot, dialogue, payload, q)
                }
            }),
        )
        .branch(
            dptree::case![ConversationState::ReceiveRemovalConfirm { sticker_id }].endpoint({
                let db = db.clone();
                move |bot, dialogue, sticker_id, q| {
                    handlers::receive_removal_confirm(db.clone(), bot, dialogue, sticker_id, q)
                }
            }),
        )
        .endpoint(handlers::receive_stray_callback);

    let inline_tree = Update::filter_inline_query().endpoint({
        let db = db.clone();
        let cache_time = config.query_cache_time;
        move |bot, q| inline::receive_inline_query(db.clone(), bot, cache_time, q)
    });

    let tree = dptree::entry()
        .branch(message_tree)
        .branch(callback_tree)
        .branch(inline_tree);

    log::debug!("Starting dispatcher");

    Dispatcher::builder(bot, tree)
        .dependencies(dptree::deps![storage])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
