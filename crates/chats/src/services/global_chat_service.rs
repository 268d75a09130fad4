//! The single campus-wide chat room.
//!
//! Every signed-in student can read and post; there is no membership
//! and no read tracking. History is served as a window of the most
//! recent messages rather than the full log.

use crate::blob_store::BlobStore;
use crate::feed::{FeedRegistry, FeedSubscription};
use crate::media::{MediaPolicy, MediaUpload};
use campusgig_config::MediaConfig;
use campusgig_database::{
    ChatError, ChatResult, CreateGlobalMessageRequest, GlobalMessage, GlobalMessageRepository,
    MediaInfo, MessageKind, ProfileRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::warn;

/// How many trailing messages the global room serves and feeds.
pub const GLOBAL_FEED_WINDOW: i64 = 200;

const GLOBAL_FEED_KEY: &str = "global";

/// Service for the campus-wide chat room
pub struct GlobalChatService {
    global_repository: GlobalMessageRepository,
    profile_repository: ProfileRepository,
    blob_store: Arc<dyn BlobStore>,
    policy: MediaPolicy,
    feeds: Arc<FeedRegistry<GlobalMessage>>,
}

impl GlobalChatService {
    /// Create a new global chat service instance
    pub fn new(
        pool: SqlitePool,
        media_config: &MediaConfig,
        blob_store: Arc<dyn BlobStore>,
        feeds: Arc<FeedRegistry<GlobalMessage>>,
    ) -> Self {
        Self {
            global_repository: GlobalMessageRepository::new(pool.clone()),
            profile_repository: ProfileRepository::new(pool),
            blob_store,
            policy: MediaPolicy::new(media_config),
            feeds,
        }
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
        request: CreateGlobalMessageRequest,
    ) -> ChatResult<GlobalMessage> {
        request.validate().map_err(ChatError::Validation)?;
        let message = self.global_repository.append(&request).await?;

        match self.global_repository.list_recent(GLOBAL_FEED_WINDOW).await {
            Ok(window) => self.feeds.publish(GLOBAL_FEED_KEY, window),
            Err(error) => warn!(%error, "failed to refresh global feed"),
        }
        Ok(message)
    }

    /// Post a text message to the global room.
    pub async fn send_text(&self, sender_id: &str, content: String) -> ChatResult<GlobalMessage> {
        let sender_name = self.sender_name(sender_id).await?;

        self.append_and_publish(CreateGlobalMessageRequest {
            sender_id: sender_id.to_string(),
            sender_name,
            content,
            kind: MessageKind::Text,
            media: None,
        })
        .await
    }

    /// Post a media message to the global room. Uploads pass the same
    /// admission policy as private chats.
    pub async fn send_media(
        &self,
        sender_id: &str,
        caption: String,
        upload: MediaUpload,
    ) -> ChatResult<GlobalMessage> {
        self.policy.admit(&upload)?;

        let sender_name = self.sender_name(sender_id).await?;
        let size_bytes = upload.data.len() as i64;
        let url = self
            .blob_store
            .put(upload.data.clone(), &upload.file_name)
            .await?;

        let request = CreateGlobalMessageRequest {
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

        match self.append_and_publish(request).await {
            Ok(message) => Ok(message),
            Err(err) => {
                if let Err(cleanup) = self.blob_store.delete(&url).await {
                    warn!(%url, %cleanup, "failed to clean up orphaned blob");
                }
                Err(err)
            }
        }
    }

    /// The trailing window of the global room, oldest-first.
    pub async fn latest(&self) -> ChatResult<Vec<GlobalMessage>> {
        self.global_repository.list_recent(GLOBAL_FEED_WINDOW).await
    }

    /// Open a live subscription onto the room, seeded with the current
    /// window.
    pub async fn subscribe(&self) -> ChatResult<FeedSubscription<GlobalMessage>> {
        // Register before listing so a message posted in between is not
        // lost to this subscriber
        let subscription = self.feeds.subscribe(GLOBAL_FEED_KEY, Vec::new());
        let window = self.latest().await?;
        self.feeds.publish(GLOBAL_FEED_KEY, window);
        Ok(subscription)
    }
}
