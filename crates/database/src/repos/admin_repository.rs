//! Administrative cascade deletions.
//!
//! These run as single transactions so a partially applied cascade can
//! never leave orphaned offers, chats or messages behind.

use crate::types::{
    CascadeReport, GigCascadeReport, GigError, GigResult, ProfileError, ProfileResult,
};
use sqlx::SqlitePool;
use tracing::info;

/// Repository for admin-only destructive operations
pub struct AdminRepository {
    pool: SqlitePool,
}

impl AdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete a principal and their entire footprint: gigs they posted,
    /// offers they made or received, every chat they participate in and
    /// all messages within those chats. Returns exact per-table counts.
    ///
    /// Deletion order follows the foreign keys bottom-up. Every chat
    /// touching one of the principal's offers has the principal as a
    /// participant, so the participant match covers all dependent chats.
    pub async fn delete_user_cascade(&self, principal_id: &str) -> ProfileResult<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM profiles WHERE principal_id = ?")
            .bind(principal_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(ProfileError::ProfileNotFound);
        }

        sqlx::query(
            "DELETE FROM message_reads WHERE message_id IN \
             (SELECT m.id FROM messages m JOIN chats c ON c.id = m.chat_id \
              WHERE c.participant_a = ? OR c.participant_b = ?)",
        )
        .bind(principal_id)
        .bind(principal_id)
        .execute(&mut *tx)
        .await?;

        let messages = sqlx::query(
            "DELETE FROM messages WHERE chat_id IN \
             (SELECT id FROM chats WHERE participant_a = ? OR participant_b = ?)",
        )
        .bind(principal_id)
        .bind(principal_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let chats = sqlx::query("DELETE FROM chats WHERE participant_a = ? OR participant_b = ?")
            .bind(principal_id)
            .bind(principal_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let offers = sqlx::query("DELETE FROM offers WHERE offered_by = ? OR gig_posted_by = ?")
            .bind(principal_id)
            .bind(principal_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let gigs = sqlx::query("DELETE FROM gigs WHERE posted_by = ?")
            .bind(principal_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM profiles WHERE principal_id = ?")
            .bind(principal_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let report = CascadeReport {
            gigs,
            offers,
            chats,
            messages,
        };
        info!(
            principal = %principal_id,
            gigs = report.gigs,
            offers = report.offers,
            chats = report.chats,
            messages = report.messages,
            "cascaded user deletion"
        );

        Ok(report)
    }

    /// Delete a gig together with its offers, the chats those offers
    /// spawned, and all their messages.
    pub async fn delete_gig_cascade(&self, gig_id: i64) -> GigResult<GigCascadeReport> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM message_reads WHERE message_id IN \
             (SELECT m.id FROM messages m JOIN chats c ON c.id = m.chat_id WHERE c.gig_id = ?)",
        )
        .bind(gig_id)
        .execute(&mut *tx)
        .await?;

        let messages = sqlx::query(
            "DELETE FROM messages WHERE chat_id IN (SELECT id FROM chats WHERE gig_id = ?)",
        )
        .bind(gig_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let chats = sqlx::query("DELETE FROM chats WHERE gig_id = ?")
            .bind(gig_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let offers = sqlx::query("DELETE FROM offers WHERE gig_id = ?")
            .bind(gig_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM gigs WHERE id = ?")
            .bind(gig_id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(GigError::GigNotFound);
        }

        tx.commit().await?;

        let report = GigCascadeReport {
            offers,
            chats,
            messages,
        };
        info!(
            gig_id,
            offers = report.offers,
            chats = report.chats,
            messages = report.messages,
            "cascaded gig deletion"
        );

        Ok(report)
    }
}
