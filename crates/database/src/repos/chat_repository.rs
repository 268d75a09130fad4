//! Repository for chat data access operations.

use crate::entities::{Chat, ProvisionChatRequest};
use crate::types::{ChatError, ChatResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

const CHAT_COLUMNS: &str = "id, public_id, offer_id, gig_id, gig_title, participant_a, \
     participant_a_name, participant_b, participant_b_name, last_message, last_message_time, \
     created_at, updated_at";

/// Repository for chat database operations
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Chat, sqlx::Error> {
        Ok(Chat {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            offer_id: row.try_get("offer_id")?,
            gig_id: row.try_get("gig_id")?,
            gig_title: row.try_get("gig_title")?,
            participant_a: row.try_get("participant_a")?,
            participant_a_name: row.try_get("participant_a_name")?,
            participant_b: row.try_get("participant_b")?,
            participant_b_name: row.try_get("participant_b_name")?,
            last_message: row.try_get("last_message")?,
            last_message_time: row.try_get("last_message_time")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Provision the chat for an accepted offer, idempotently.
    ///
    /// `chats.offer_id` is UNIQUE, so this is check-then-create with the
    /// constraint as the backstop: a concurrent duplicate accept that
    /// slips past the existence check trips the unique violation and we
    /// return the winning row instead. Returns `(chat, created)`.
    pub async fn create_for_offer(&self, request: &ProvisionChatRequest) -> ChatResult<(Chat, bool)> {
        if let Some(existing) = self.find_by_offer_id(request.offer_id).await? {
            return Ok((existing, false));
        }

        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO chats (public_id, offer_id, gig_id, gig_title, participant_a, \
             participant_a_name, participant_b, participant_b_name, last_message, \
             last_message_time, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?, ?)",
        )
        .bind(&public_id)
        .bind(request.offer_id)
        .bind(request.gig_id)
        .bind(&request.gig_title)
        .bind(&request.participant_a)
        .bind(&request.participant_a_name)
        .bind(&request.participant_b)
        .bind(&request.participant_b_name)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        let chat_id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err))
                if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation =>
            {
                warn!(
                    offer_id = request.offer_id,
                    "lost chat provisioning race, returning existing chat"
                );
                let existing = self
                    .find_by_offer_id(request.offer_id)
                    .await?
                    .ok_or(ChatError::ChatNotFound)?;
                return Ok((existing, false));
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            chat_id = chat_id,
            public_id = %public_id,
            offer_id = request.offer_id,
            "provisioned chat for accepted offer"
        );

        Ok((
            Chat {
                id: chat_id,
                public_id,
                offer_id: request.offer_id,
                gig_id: request.gig_id,
                gig_title: request.gig_title.clone(),
                participant_a: request.participant_a.clone(),
                participant_a_name: request.participant_a_name.clone(),
                participant_b: request.participant_b.clone(),
                participant_b_name: request.participant_b_name.clone(),
                last_message: None,
                last_message_time: None,
                created_at: now.clone(),
                updated_at: now,
            },
            true,
        ))
    }

    /// Find the chat created from an offer, if any
    pub async fn find_by_offer_id(&self, offer_id: i64) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE offer_id = ?"
        ))
        .bind(offer_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose().map_err(Into::into)
    }

    /// Find chat by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> ChatResult<Option<Chat>> {
        let row = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose().map_err(Into::into)
    }

    /// Chats a principal participates in, newest-updated first
    pub async fn find_for_participant(&self, principal_id: &str) -> ChatResult<Vec<Chat>> {
        let rows = sqlx::query(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats \
             WHERE participant_a = ? OR participant_b = ? \
             ORDER BY updated_at DESC"
        ))
        .bind(principal_id)
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Hard-delete a chat and its messages; returns the message count.
    pub async fn delete_cascade(&self, chat_id: i64) -> ChatResult<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM message_reads WHERE message_id IN \
             (SELECT id FROM messages WHERE chat_id = ?)",
        )
        .bind(chat_id)
        .execute(&mut *tx)
        .await?;

        let messages = sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let chats = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        if chats == 0 {
            return Err(ChatError::ChatNotFound);
        }

        info!(chat_id, messages, "deleted chat with message cascade");
        Ok(messages)
    }
}
