//! Repository for the campus-wide chat feed.

use crate::entities::{CreateGlobalMessageRequest, GlobalMessage, MediaInfo, MessageKind};
use crate::types::ChatResult;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for global chat database operations
pub struct GlobalMessageRepository {
    pool: SqlitePool,
}

impl GlobalMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<GlobalMessage, sqlx::Error> {
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

        Ok(GlobalMessage {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            sender_id: row.try_get("sender_id")?,
            sender_name: row.try_get("sender_name")?,
            content: row.try_get("content")?,
            kind: MessageKind::from(kind.as_str()),
            media: media.transpose()?,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Append a message to the global feed. Append-only; there is no
    /// per-reader tracking on this table.
    pub async fn append(&self, request: &CreateGlobalMessageRequest) -> ChatResult<GlobalMessage> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();
        let media = request.media.as_ref();

        let result = sqlx::query(
            "INSERT INTO global_messages (public_id, sender_id, sender_name, content, kind, \
             media_url, media_name, media_size, media_duration, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&request.sender_id)
        .bind(&request.sender_name)
        .bind(&request.content)
        .bind(request.kind.as_str())
        .bind(media.map(|m| m.url.clone()))
        .bind(media.and_then(|m| m.name.clone()))
        .bind(media.and_then(|m| m.size_bytes))
        .bind(media.and_then(|m| m.duration))
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let message_id = result.last_insert_rowid();
        info!(message_id, sender = %request.sender_id, "appended global message");

        Ok(GlobalMessage {
            id: message_id,
            public_id,
            sender_id: request.sender_id.clone(),
            sender_name: request.sender_name.clone(),
            content: request.content.clone(),
            kind: request.kind,
            media: request.media.clone(),
            created_at: now,
        })
    }

    /// The most recent `limit` messages, returned oldest-first so the
    /// caller can render them as a conversation.
    pub async fn list_recent(&self, limit: i64) -> ChatResult<Vec<GlobalMessage>> {
        let rows = sqlx::query(
            "SELECT id, public_id, sender_id, sender_name, content, kind, \
             media_url, media_name, media_size, media_duration, created_at \
             FROM global_messages ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }
}
