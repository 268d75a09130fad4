//! Repository for message data access operations.

use crate::entities::{ChatMessage, CreateMessageRequest, MediaInfo, MessageKind};
use crate::types::{ChatError, ChatResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

/// Repository for message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<ChatMessage, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let media_url: Option<String> = row.try_get("media_url")?;

        let media = media_url.map(|url| {
            Ok::<_, sqlx::Error>(MediaInfo {
                url,
                name: row.try_get("media_name")?,
                size_bytes: row.try_get("media_size")?,
                duration: row.try_get("media_duration")?,
            })
        });

        Ok(ChatMessage {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            chat_id: row.try_get("chat_id")?,
            sender_id: row.try_get("sender_id")?,
            sender_name: row.try_get("sender_name")?,
            content: row.try_get("content")?,
            kind: MessageKind::from(kind.as_str()),
            media: media.transpose()?,
            created_at: row.try_get("created_at")?,
            read_by: Vec::new(),
        })
    }

    /// Append a message to its chat.
    ///
    /// The sender is seeded into the read set and the parent chat's
    /// `last_message`/`last_message_time`/`updated_at` are refreshed in
    /// the same transaction; the denormalization must never drift from
    /// the message log.
    pub async fn append(&self, request: &CreateMessageRequest) -> ChatResult<ChatMessage> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();
        let preview = request.preview();

        let media = request.media.as_ref();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO messages (public_id, chat_id, sender_id, sender_name, content, kind, \
             media_url, media_name, media_size, media_duration, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(request.chat_id)
        .bind(&request.sender_id)
        .bind(&request.sender_name)
        .bind(&request.content)
        .bind(request.kind.as_str())
        .bind(media.map(|m| m.url.clone()))
        .bind(media.and_then(|m| m.name.clone()))
        .bind(media.and_then(|m| m.size_bytes))
        .bind(media.and_then(|m| m.duration))
        .bind(&now)
        .execute(&mut *tx)
        .await;

        let message_id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err))
                if db_err.kind() == sqlx::error::ErrorKind::ForeignKeyViolation =>
            {
                return Err(ChatError::ChatNotFound);
            }
            Err(err) => return Err(err.into()),
        };

        sqlx::query("INSERT INTO message_reads (message_id, principal_id, read_at) VALUES (?, ?, ?)")
            .bind(message_id)
            .bind(&request.sender_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            "UPDATE chats SET last_message = ?, last_message_time = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&preview)
        .bind(&now)
        .bind(&now)
        .bind(request.chat_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ChatError::ChatNotFound);
        }

        tx.commit().await?;

        info!(
            message_id = message_id,
            chat_id = request.chat_id,
            sender = %request.sender_id,
            kind = %request.kind,
            "appended message"
        );

        Ok(ChatMessage {
            id: message_id,
            public_id,
            chat_id: request.chat_id,
            sender_id: request.sender_id.clone(),
            sender_name: request.sender_name.clone(),
            content: request.content.clone(),
            kind: request.kind,
            media: request.media.clone(),
            created_at: now,
            read_by: vec![request.sender_id.clone()],
        })
    }

    /// All messages for a chat, ascending by creation time with the
    /// insertion order (rowid) breaking ties, read sets attached.
    pub async fn list_for_chat(&self, chat_id: i64) -> ChatResult<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT id, public_id, chat_id, sender_id, sender_name, content, kind, \
             media_url, media_name, media_size, media_duration, created_at \
             FROM messages WHERE chat_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()?;

        let read_rows = sqlx::query(
            "SELECT mr.message_id, mr.principal_id FROM message_reads mr \
             JOIN messages m ON m.id = mr.message_id \
             WHERE m.chat_id = ? ORDER BY mr.read_at ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        let mut read_sets: HashMap<i64, Vec<String>> = HashMap::new();
        for row in &read_rows {
            let message_id: i64 = row.try_get("message_id")?;
            let principal_id: String = row.try_get("principal_id")?;
            read_sets.entry(message_id).or_default().push(principal_id);
        }

        for message in &mut messages {
            if let Some(read_by) = read_sets.remove(&message.id) {
                message.read_by = read_by;
            }
        }

        Ok(messages)
    }

    /// Mark every message in the chat as read by `principal_id`.
    ///
    /// A batch of independent per-message inserts, not one atomic write:
    /// a mid-batch failure leaves some messages marked, which the next
    /// call heals. The read set only ever grows. Returns how many
    /// messages were newly marked.
    pub async fn mark_read(&self, chat_id: i64, principal_id: &str) -> ChatResult<u64> {
        let unread: Vec<i64> = sqlx::query_scalar(
            "SELECT m.id FROM messages m \
             WHERE m.chat_id = ? AND NOT EXISTS \
             (SELECT 1 FROM message_reads mr WHERE mr.message_id = m.id AND mr.principal_id = ?)",
        )
        .bind(chat_id)
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;

        let now = chrono::Utc::now().to_rfc3339();
        let mut marked = 0u64;

        for message_id in unread {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO message_reads (message_id, principal_id, read_at) \
                 VALUES (?, ?, ?)",
            )
            .bind(message_id)
            .bind(principal_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;
            marked += result.rows_affected();
        }

        if marked > 0 {
            debug!(chat_id, principal = %principal_id, marked, "marked messages as read");
        }

        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::prepare_database;
    use crate::entities::{
        CreateGigRequest, CreateOfferRequest, GigCategory, ProvisionChatRequest,
    };
    use crate::migrations::run_migrations;
    use crate::repos::{ChatRepository, GigRepository, OfferRepository};
    use campusgig_config::DatabaseConfig;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_messages.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    async fn seed_chat(pool: &SqlitePool) -> i64 {
        let gigs = GigRepository::new(pool.clone());
        let offers = OfferRepository::new(pool.clone());
        let chats = ChatRepository::new(pool.clone());

        let gig = gigs
            .create(&CreateGigRequest {
                title: "Essay editing".to_string(),
                description: "Proofread a 5 page essay".to_string(),
                category: GigCategory::Academic,
                budget: 300.0,
                deadline: Utc::now() + Duration::days(3),
                location: "Library".to_string(),
                college: "Hillview".to_string(),
                posted_by: "principal-a".to_string(),
                posted_by_name: "Asha Patel".to_string(),
            })
            .await
            .unwrap();

        let offer = offers
            .create(
                &gig,
                &CreateOfferRequest {
                    gig_public_id: gig.public_id.clone(),
                    offered_by: "principal-b".to_string(),
                    offered_by_name: "Ben Cole".to_string(),
                    message: "I can do this by Friday".to_string(),
                    proposed_budget: 250.0,
                },
            )
            .await
            .unwrap();

        let (chat, _) = chats
            .create_for_offer(&ProvisionChatRequest {
                offer_id: offer.id,
                gig_id: gig.id,
                gig_title: gig.title,
                participant_a: "principal-a".to_string(),
                participant_a_name: "Asha Patel".to_string(),
                participant_b: "principal-b".to_string(),
                participant_b_name: "Ben Cole".to_string(),
            })
            .await
            .unwrap();

        chat.id
    }

    fn text(chat_id: i64, sender: &str, content: &str) -> CreateMessageRequest {
        CreateMessageRequest {
            chat_id,
            sender_id: sender.to_string(),
            sender_name: sender.to_string(),
            content: content.to_string(),
            kind: MessageKind::Text,
            media: None,
        }
    }

    #[tokio::test]
    async fn test_append_seeds_sender_read_and_denormalizes() {
        let (pool, _temp_dir) = create_test_pool().await;
        let chat_id = seed_chat(&pool).await;
        let repo = MessageRepository::new(pool.clone());

        let message = repo.append(&text(chat_id, "principal-b", "hello")).await.unwrap();
        assert_eq!(message.read_by, vec!["principal-b".to_string()]);

        // The timestamp is persisted, not just echoed back
        let stored: String = sqlx::query_scalar("SELECT created_at FROM messages WHERE id = ?")
            .bind(message.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, message.created_at);

        let (last_message, last_message_time): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT last_message, last_message_time FROM chats WHERE id = ?")
                .bind(chat_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(last_message.as_deref(), Some("hello"));
        assert_eq!(last_message_time.as_deref(), Some(message.created_at.as_str()));
    }

    #[tokio::test]
    async fn test_append_to_missing_chat() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let result = repo.append(&text(9999, "principal-b", "hello")).await;
        assert!(matches!(result, Err(ChatError::ChatNotFound)));
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let (pool, _temp_dir) = create_test_pool().await;
        let chat_id = seed_chat(&pool).await;
        let repo = MessageRepository::new(pool);

        repo.append(&text(chat_id, "principal-b", "first")).await.unwrap();
        repo.append(&text(chat_id, "principal-a", "second")).await.unwrap();
        repo.append(&text(chat_id, "principal-b", "third")).await.unwrap();

        let messages = repo.list_for_chat(chat_id).await.unwrap();
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);

        let mut sorted = messages.clone();
        sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        assert_eq!(messages, sorted);
    }

    #[tokio::test]
    async fn test_mark_read_grows_monotonically() {
        let (pool, _temp_dir) = create_test_pool().await;
        let chat_id = seed_chat(&pool).await;
        let repo = MessageRepository::new(pool);

        repo.append(&text(chat_id, "principal-b", "one")).await.unwrap();
        repo.append(&text(chat_id, "principal-b", "two")).await.unwrap();

        let marked = repo.mark_read(chat_id, "principal-a").await.unwrap();
        assert_eq!(marked, 2);

        // Second call is a no-op; nothing is ever removed
        let again = repo.mark_read(chat_id, "principal-a").await.unwrap();
        assert_eq!(again, 0);

        let messages = repo.list_for_chat(chat_id).await.unwrap();
        for message in &messages {
            assert!(message.read_by.contains(&"principal-b".to_string()));
            assert!(message.read_by.contains(&"principal-a".to_string()));
        }
    }

    #[tokio::test]
    async fn test_media_round_trip() {
        let (pool, _temp_dir) = create_test_pool().await;
        let chat_id = seed_chat(&pool).await;
        let repo = MessageRepository::new(pool);

        let mut request = text(chat_id, "principal-b", "");
        request.kind = MessageKind::Image;
        request.media = Some(MediaInfo {
            url: "file:///blobs/pic.png".to_string(),
            name: Some("pic.png".to_string()),
            size_bytes: Some(2048),
            duration: None,
        });

        repo.append(&request).await.unwrap();
        let messages = repo.list_for_chat(chat_id).await.unwrap();
        let media = messages[0].media.as_ref().unwrap();
        assert_eq!(media.url, "file:///blobs/pic.png");
        assert_eq!(media.size_bytes, Some(2048));
        assert_eq!(messages[0].kind, MessageKind::Image);
    }
}
