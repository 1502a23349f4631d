use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use teloxide::{adaptors::DefaultParseMode, prelude::Dialogue, Bot};

use crate::storage::StateStorage;

pub type HandlerResult = anyhow::Result<()>;
pub type DialogueWithState = Dialogue<ConversationState, StateStorage>;

pub type BotType = DefaultParseMode<Bot>;
pub type DbConn = Pool<Sqlite>;
pub type DbType = Arc<DbConn>;

/// Per-chat dialogue state. The scratch data a flow accumulates lives in the
/// variant fields, so switching variants always drops the old payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ConversationState {
    #[default]
    Idle,

    ReceiveStickerForBind,
    ReceiveKeywordsForBind {
        sticker_id: String,
    },
    ReceiveBindChoice {
        sticker_id: String,
        pending: Vec<String>,
    },

    ReceiveStickerForRemoval,
    ReceiveRemovalConfirm {
        sticker_id: String,
    },

    ReceiveStickerForInfo,
}
