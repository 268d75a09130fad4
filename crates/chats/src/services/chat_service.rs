//! Chat service for listing and opening private chats.
//!
//! Chats are never created here; they come into existence through the
//! marketplace accept flow, one per accepted offer.

use campusgig_database::{Chat, ChatError, ChatRepository, ChatResult};
use sqlx::SqlitePool;

/// Service for chat operations
pub struct ChatService {
    chat_repository: ChatRepository,
}

impl ChatService {
    /// Create a new chat service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chat_repository: ChatRepository::new(pool),
        }
    }

    /// All chats the principal participates in, most recently active
    /// first.
    pub async fn list_chats(&self, principal_id: &str) -> ChatResult<Vec<Chat>> {
        self.chat_repository.find_for_participant(principal_id).await
    }

    /// Open a single chat. Non-participants get the same answer as for
    /// a chat that does not exist at all.
    pub async fn get_chat(&self, public_id: &str, principal_id: &str) -> ChatResult<Chat> {
        let chat = self
            .chat_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        if !chat.has_participant(principal_id) {
            return Err(ChatError::ChatNotFound);
        }

        Ok(chat)
    }

    /// Delete a chat together with its messages. Either participant may
    /// do this; returns the number of messages removed.
    pub async fn delete_chat(&self, public_id: &str, principal_id: &str) -> ChatResult<u64> {
        let chat = self.get_chat(public_id, principal_id).await?;
        self.chat_repository.delete_cascade(chat.id).await
    }
}
