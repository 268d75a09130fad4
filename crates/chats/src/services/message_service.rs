//! Message service: sending, history, read tracking and live feeds for
//! private chats.

use crate::blob_store::BlobStore;
use crate::feed::{FeedRegistry, FeedSubscription};
use crate::media::{MediaPolicy, MediaUpload};
use campusgig_config::MediaConfig;
use campusgig_database::{
    Chat, ChatError, ChatMessage, ChatRepository, ChatResult, CreateMessageRequest, MediaInfo,
    MessageRepository, ProfileRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

/// Service for message operations within private chats
pub struct MessageService {
    chat_repository: ChatRepository,
    message_repository: MessageRepository,
    profile_repository: ProfileRepository,
    blob_store: Arc<dyn BlobStore>,
    policy: MediaPolicy,
    feeds: Arc<FeedRegistry<ChatMessage>>,
}

impl MessageService {
    /// Create a new message service instance
    pub fn new(
        pool: SqlitePool,
        media_config: &MediaConfig,
        blob_store: Arc<dyn BlobStore>,
        feeds: Arc<FeedRegistry<ChatMessage>>,
    ) -> Self {
        Self {
            chat_repository: ChatRepository::new(pool.clone()),
            message_repository: MessageRepository::new(pool.clone()),
            profile_repository: ProfileRepository::new(pool),
            blob_store,
            policy: MediaPolicy::new(media_config),
            feeds,
        }
    }

    /// Resolve a chat and verify the principal belongs to it.
    /// Outsiders get `ChatNotFound`, never a hint the chat exists.
    async fn resolve_chat(&self, chat_public_id: &str, principal_id: &str) -> ChatResult<Chat> {
        let chat = self
            .chat_repository
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        if !chat.has_participant(principal_id) {
            return Err(ChatError::ChatNotFound);
        }
        Ok(chat)
    }

    async fn sender_name(&self, principal_id: &str) -> ChatResult<String> {
        let profile = self
            .profile_repository
            .find_by_principal(principal_id)
            .await
            .map_err(|e| ChatError::DatabaseError(e.to_string()))?;

        Ok(profile
            .map(|p| p.display_name())
            .unwrap_or_else(|| principal_id.to_string()))
    }

    async fn append_and_publish(
        &self,
        chat: &Chat,
        request: CreateMessageRequest,
    ) -> ChatResult<ChatMessage> {
        request.validate().map_err(ChatError::Validation)?;
        let message = self.message_repository.append(&request).await?;
        self.refresh_feed(chat).await;
        Ok(message)
    }

    /// Re-publish the chat's full ordered message list to live
    /// subscribers. Feed delivery is best-effort; the write has already
    /// committed.
    async fn refresh_feed(&self, chat: &Chat) {
        match self.message_repository.list_for_chat(chat.id).await {
            Ok(messages) => self.feeds.publish(&chat.public_id, messages),
            Err(error) => {
                warn!(chat = %chat.public_id, %error, "failed to refresh live feed");
            }
        }
    }

    /// Send a text message into a chat the sender participates in.
    pub async fn send_text(
        &self,
        chat_public_id: &str,
        sender_id: &str,
        content: String,
    ) -> ChatResult<ChatMessage> {
        let chat = self.resolve_chat(chat_public_id, sender_id).await?;
        let sender_name = self.sender_name(sender_id).await?;

        self.append_and_publish(
            &chat,
            CreateMessageRequest {
                chat_id: chat.id,
                sender_id: sender_id.to_string(),
                sender_name,
                content,
                kind: campusgig_database::MessageKind::Text,
                media: None,
            },
        )
        .await
    }

    /// Send a media message. The upload is admitted against the media
    /// policy and stored before the message row is written; if the write
    /// fails the stored blob is removed again.
    pub async fn send_media(
        &self,
        chat_public_id: &str,
        sender_id: &str,
        caption: String,
        upload: MediaUpload,
    ) -> ChatResult<ChatMessage> {
        let chat = self.resolve_chat(chat_public_id, sender_id).await?;
        self.policy.admit(&upload)?;

        let sender_name = self.sender_name(sender_id).await?;
        let size_bytes = upload.data.len() as i64;
        let url = self
            .blob_store
            .put(upload.data.clone(), &upload.file_name)
            .await?;

        let request = CreateMessageRequest {
            chat_id: chat.id,
            sender_id: sender_id.to_string(),
            sender_name,
            content: caption,
            kind: upload.kind,
            media: Some(MediaInfo {
                url: url.clone(),
                name: Some(upload.file_name.clone()),
                size_bytes: Some(size_bytes),
                duration: upload.duration,
            }),
        };

        match self.append_and_publish(&chat, request).await {
            Ok(message) => Ok(message),
            Err(err) => {
                if let Err(cleanup) = self.blob_store.delete(&url).await {
                    warn!(%url, %cleanup, "failed to clean up orphaned blob");
                }
                Err(err)
            }
        }
    }

    /// Full ordered history of a chat, read sets included.
    pub async fn list_messages(
        &self,
        chat_public_id: &str,
        principal_id: &str,
    ) -> ChatResult<Vec<ChatMessage>> {
        let chat = self.resolve_chat(chat_public_id, principal_id).await?;
        self.message_repository.list_for_chat(chat.id).await
    }

    /// Mark everything in the chat as read by the principal. Returns how
    /// many messages were newly marked.
    pub async fn mark_read(&self, chat_public_id: &str, principal_id: &str) -> ChatResult<u64> {
        let chat = self.resolve_chat(chat_public_id, principal_id).await?;
        let marked = self.message_repository.mark_read(chat.id, principal_id).await?;
        if marked > 0 {
            self.refresh_feed(&chat).await;
        }
        Ok(marked)
    }

    /// Open a live subscription onto the chat, seeded with its current
    /// history. Dropping the subscription unsubscribes.
    pub async fn subscribe(
        &self,
        chat_public_id: &str,
        principal_id: &str,
    ) -> ChatResult<FeedSubscription<ChatMessage>> {
        let chat = self.resolve_chat(chat_public_id, principal_id).await?;

        // Register before listing, then publish the listing: a message
        // appended between the two steps still reaches the subscriber,
        // and a stale pre-existing channel is refreshed.
        let subscription = self.feeds.subscribe(&chat.public_id, Vec::new());
        let messages = self.message_repository.list_for_chat(chat.id).await?;
        self.feeds.publish(&chat.public_id, messages);
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::FsBlobStore;
    use bytes::Bytes;
    use campusgig_config::DatabaseConfig;
    use campusgig_database::{initialize_database, MessageKind, ProvisionChatRequest};
    use tempfile::TempDir;

    async fn create_test_service() -> (MessageService, Chat, SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_message_service.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };
        let pool = initialize_database(&config).await.unwrap();

        sqlx::query(
            "INSERT INTO gigs (public_id, title, description, category, budget, deadline, \
             location, college, posted_by, posted_by_name, status, created_at, updated_at) \
             VALUES ('g1', 'Gig', 'Desc', 'other', 100.0, '2099-01-01T00:00:00Z', 'Here', \
             'Hillview', 'principal-a', 'Asha', 'in_progress', '2026-01-01T00:00:00Z', \
             '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO offers (public_id, gig_id, gig_title, gig_posted_by, offered_by, \
             offered_by_name, message, proposed_budget, status, created_at, updated_at) \
             VALUES ('o1', 1, 'Gig', 'principal-a', 'principal-b', 'Ben', 'hi', 90.0, \
             'accepted', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let (chat, _) = ChatRepository::new(pool.clone())
            .create_for_offer(&ProvisionChatRequest {
                offer_id: 1,
                gig_id: 1,
                gig_title: "Gig".to_string(),
                participant_a: "principal-a".to_string(),
                participant_a_name: "Asha".to_string(),
                participant_b: "principal-b".to_string(),
                participant_b_name: "Ben".to_string(),
            })
            .await
            .unwrap();

        let media_config = campusgig_config::MediaConfig {
            blob_root: temp_dir.path().join("blobs").display().to_string(),
            max_image_bytes: 1024,
            max_media_bytes: 512,
            max_video_seconds: 15,
        };
        let blob_store = FsBlobStore::new(temp_dir.path().join("blobs")).await.unwrap();

        let service = MessageService::new(
            pool.clone(),
            &media_config,
            Arc::new(blob_store),
            Arc::new(FeedRegistry::new()),
        );
        (service, chat, pool, temp_dir)
    }

    #[tokio::test]
    async fn test_send_requires_participation() {
        let (service, chat, _pool, _temp_dir) = create_test_service().await;

        let outsider = service
            .send_text(&chat.public_id, "principal-x", "let me in".to_string())
            .await;
        assert!(matches!(outsider, Err(ChatError::ChatNotFound)));

        let sent = service
            .send_text(&chat.public_id, "principal-b", "hello".to_string())
            .await
            .unwrap();
        assert_eq!(sent.content, "hello");
        assert_eq!(sent.read_by, vec!["principal-b".to_string()]);
    }

    #[tokio::test]
    async fn test_live_feed_sees_new_messages() {
        let (service, chat, _pool, _temp_dir) = create_test_service().await;

        let mut sub = service.subscribe(&chat.public_id, "principal-a").await.unwrap();
        assert!(sub.current().is_empty());

        service
            .send_text(&chat.public_id, "principal-b", "ping".to_string())
            .await
            .unwrap();

        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].content, "ping");
    }

    #[tokio::test]
    async fn test_media_rejection_stores_nothing() {
        let (service, chat, _pool, temp_dir) = create_test_service().await;

        let oversized = MediaUpload {
            file_name: "big.png".to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from(vec![0u8; 4096]),
            kind: MessageKind::Image,
            duration: None,
        };
        let result = service
            .send_media(&chat.public_id, "principal-b", String::new(), oversized)
            .await;
        assert!(matches!(result, Err(ChatError::MediaRejected(_))));

        let mut entries = tokio::fs::read_dir(temp_dir.path().join("blobs")).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_media_message_round_trip() {
        let (service, chat, _pool, _temp_dir) = create_test_service().await;

        let upload = MediaUpload {
            file_name: "notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            data: Bytes::from_static(b"%PDF-1.4"),
            kind: MessageKind::Document,
            duration: None,
        };
        let sent = service
            .send_media(&chat.public_id, "principal-a", String::new(), upload)
            .await
            .unwrap();

        let media = sent.media.unwrap();
        assert!(media.url.starts_with("file://"));
        assert_eq!(media.name.as_deref(), Some("notes.pdf"));

        let history = service.list_messages(&chat.public_id, "principal-b").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, MessageKind::Document);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_history_appended_behind_the_feed() {
        let (service, chat, pool, _temp_dir) = create_test_service().await;

        // Keep the channel alive so a later subscriber joins it instead
        // of opening a fresh one
        let _early = service.subscribe(&chat.public_id, "principal-a").await.unwrap();

        // Appended straight through the repository, so no feed publish
        // has happened for it
        MessageRepository::new(pool)
            .append(&CreateMessageRequest {
                chat_id: chat.id,
                sender_id: "principal-b".to_string(),
                sender_name: "Ben".to_string(),
                content: "slipped in".to_string(),
                kind: MessageKind::Text,
                media: None,
            })
            .await
            .unwrap();

        let late = service.subscribe(&chat.public_id, "principal-b").await.unwrap();
        let snapshot = late.current();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].content, "slipped in");
    }

    #[tokio::test]
    async fn test_mark_read() {
        let (service, chat, _pool, _temp_dir) = create_test_service().await;

        service
            .send_text(&chat.public_id, "principal-b", "one".to_string())
            .await
            .unwrap();
        service
            .send_text(&chat.public_id, "principal-b", "two".to_string())
            .await
            .unwrap();

        assert_eq!(service.mark_read(&chat.public_id, "principal-a").await.unwrap(), 2);
        assert_eq!(service.mark_read(&chat.public_id, "principal-a").await.unwrap(), 0);
    }
}
