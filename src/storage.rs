use futures::future::BoxFuture;
use std::sync::Arc;
use teloxide::dispatching::dialogue::Storage;
use teloxide::types::ChatId;

use crate::types::{ConversationState, DbType};

#[derive(Debug, thiserror::Error)]
pub enum StateStorageError {
    #[error("dialogue state serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("dialogue state database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Dialogue storage backed by the bot database, so conversation progress
/// survives restarts and is shared between processes pointed at the same file.
pub struct StateStorage {
    db: DbType,
}

impl StateStorage {
    pub fn new(db: DbType) -> Arc<StateStorage> {
        Arc::new(StateStorage { db })
    }

    /// A chat without a stored row is simply `Idle`, never an error.
    pub async fn load(&self, chat_id: ChatId) -> Result<ConversationState, StateStorageError> {
        Ok(self.read(chat_id).await?.unwrap_or_default())
    }

    async fn read(
        &self,
        chat_id: ChatId,
    ) -> Result<Option<ConversationState>, StateStorageError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT state FROM dialogue_state WHERE chat_id = $1")
                .bind(chat_id.0)
                .fetch_optional(self.db.as_ref())
                .await?;

        Ok(row
            .map(|(state,)| serde_json::from_str(&state))
            .transpose()?)
    }

    async fn write(
        &self,
        chat_id: ChatId,
        state: ConversationState,
    ) -> Result<(), StateStorageError> {
        log::debug!("write dialogue state {:?} for chat_id: {:?}", state, chat_id);

        let state = serde_json::to_string(&state)?;

        sqlx::query(
            "INSERT INTO dialogue_state (chat_id, state) VALUES ($1, $2) \
            ON CONFLICT (chat_id) DO UPDATE SET state = excluded.state",
        )
        .bind(chat_id.0)
        .bind(state)
        .execute(self.db.as_ref())
        .await?;

        Ok(())
    }

    // Clearing a chat that has no row is fine, a missing row already reads
    // back as Idle.
    async fn delete(&self, chat_id: ChatId) -> Result<(), StateStorageError> {
        log::debug!("clear dialogue state for chat_id: {:?}", chat_id);

        sqlx::query("DELETE FROM dialogue_state WHERE chat_id = $1")
            .bind(chat_id.0)
            .execute(self.db.as_ref())
            .await?;

        Ok(())
    }
}

impl Storage<ConversationState> for StateStorage {
    type Error = StateStorageError;

    fn remove_dialogue(
        self: Arc<Self>,
        chat_id: ChatId,
    ) -> BoxFuture<'static, Result<(), Self::Error>> {
        Box::pin(async move { self.delete(chat_id).await })
    }

    fn update_dialogue(
        self: Arc<Self>,
        chat_id: ChatId,
        dialogue: ConversationState,
    ) -> BoxFuture<'static, Result<(), Self::Error>> {
        Box::pin(async move { self.write(chat_id, dialogue).await })
    }

    fn get_dialogue(
        self: Arc<Self>,
        chat_id: ChatId,
    ) -> BoxFuture<'static, Result<Option<ConversationState>, Self::Error>> {
        Box::pin(async move { self.read(chat_id).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_storage() -> Arc<StateStorage> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        StateStorage::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn unknown_chat_loads_as_idle() {
        let storage = test_storage().await;

        let state = storage.load(ChatId(1)).await.unwrap();

        assert_eq!(state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn state_with_payload_survives_a_roundtrip() {
        let storage = test_storage().await;
        let state = ConversationState::ReceiveBindChoice {
            sticker_id: "stk1".to_string(),
            pending: vec!["cat".to_string(), "meme".to_string()],
        };

        storage
            .clone()
            .update_dialogue(ChatId(1), state.clone())
            .await
            .unwrap();

        assert_eq!(storage.load(ChatId(1)).await.unwrap(), state);
    }

    #[tokio::test]
    async fn chats_are_tracked_independently() {
        let storage = test_storage().await;

        storage
            .clone()
            .update_dialogue(ChatId(1), ConversationState::ReceiveStickerForBind)
            .await
            .unwrap();

        assert_eq!(
            storage.load(ChatId(1)).await.unwrap(),
            ConversationState::ReceiveStickerForBind
        );
        assert_eq!(storage.load(ChatId(2)).await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn removing_resets_to_idle() {
        let storage = test_storage().await;

        storage
            .clone()
            .update_dialogue(ChatId(1), ConversationState::ReceiveStickerForRemoval)
            .await
            .unwrap();
        storage.clone().remove_dialogue(ChatId(1)).await.unwrap();

        assert_eq!(storage.load(ChatId(1)).await.unwrap(), ConversationState::Idle);
    }

    #[tokio::test]
    async fn removing_an_unknown_chat_is_not_an_error() {
        let storage = test_storage().await;

        storage.clone().remove_dialogue(ChatId(404)).await.unwrap();
    }

    #[tokio::test]
    async fn switching_state_discards_the_old_payload() {
        let storage = test_storage().await;

        storage
            .clone()
            .update_dialogue(
                ChatId(1),
                ConversationState::ReceiveKeywordsForBind {
                    sticker_id: "x".to_string(),
                },
            )
            .await
            .unwrap();

        // A global command in the middle of a flow overwrites the whole state.
        storage
            .clone()
            .update_dialogue(ChatId(1), ConversationState::ReceiveStickerForRemoval)
            .await
            .unwrap();

        assert_eq!(
            storage.load(ChatId(1)).await.unwrap(),
            ConversationState::ReceiveStickerForRemoval
        );
    }
}
