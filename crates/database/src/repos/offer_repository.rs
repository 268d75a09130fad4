//! Repository for offer data access operations.

use crate::entities::{CreateOfferRequest, Gig, Offer, OfferStatus, UpdateOfferRequest};
use crate::types::{OfferError, OfferResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const OFFER_COLUMNS: &str = "id, public_id, gig_id, gig_title, gig_posted_by, offered_by, \
     offered_by_name, message, proposed_budget, status, created_at, updated_at";

/// Repository for offer database operations
pub struct OfferRepository {
    pool: SqlitePool,
}

impl OfferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Offer, sqlx::Error> {
        let status: String = row.try_get("status")?;

        Ok(Offer {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            gig_id: row.try_get("gig_id")?,
            gig_title: row.try_get("gig_title")?,
            gig_posted_by: row.try_get("gig_posted_by")?,
            offered_by: row.try_get("offered_by")?,
            offered_by_name: row.try_get("offered_by_name")?,
            message: row.try_get("message")?,
            proposed_budget: row.try_get("proposed_budget")?,
            status: OfferStatus::from(status.as_str()),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Create a pending offer against a resolved gig. Gig title and
    /// poster are denormalized here and never refreshed afterwards.
    pub async fn create(&self, gig: &Gig, request: &CreateOfferRequest) -> OfferResult<Offer> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO offers (public_id, gig_id, gig_title, gig_posted_by, offered_by, \
             offered_by_name, message, proposed_budget, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(gig.id)
        .bind(&gig.title)
        .bind(&gig.posted_by)
        .bind(&request.offered_by)
        .bind(&request.offered_by_name)
        .bind(&request.message)
        .bind(request.proposed_budget)
        .bind(OfferStatus::Pending.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let offer_id = result.last_insert_rowid();

        info!(
            offer_id = offer_id,
            public_id = %public_id,
            gig_id = gig.id,
            offered_by = %request.offered_by,
            "created new offer"
        );

        Ok(Offer {
            id: offer_id,
            public_id,
            gig_id: gig.id,
            gig_title: gig.title.clone(),
            gig_posted_by: gig.posted_by.clone(),
            offered_by: request.offered_by.clone(),
            offered_by_name: request.offered_by_name.clone(),
            message: request.message.clone(),
            proposed_budget: request.proposed_budget,
            status: OfferStatus::Pending,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Find offer by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> OfferResult<Option<Offer>> {
        let row = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose().map_err(Into::into)
    }

    /// Offers against one gig, newest first
    pub async fn find_for_gig(&self, gig_id: i64) -> OfferResult<Vec<Offer>> {
        let rows = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE gig_id = ? ORDER BY created_at DESC"
        ))
        .bind(gig_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Offers received by a principal across their gigs, newest first
    pub async fn find_received(&self, principal_id: &str) -> OfferResult<Vec<Offer>> {
        let rows = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE gig_posted_by = ? ORDER BY created_at DESC"
        ))
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Offers made by a principal, newest first
    pub async fn find_made(&self, principal_id: &str) -> OfferResult<Vec<Offer>> {
        let rows = sqlx::query(&format!(
            "SELECT {OFFER_COLUMNS} FROM offers WHERE offered_by = ? ORDER BY created_at DESC"
        ))
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Edit a pending offer; message and proposed budget only.
    pub async fn update(&self, public_id: &str, request: &UpdateOfferRequest) -> OfferResult<Offer> {
        let offer = self
            .find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        if !offer.is_mutable() {
            return Err(OfferError::ImmutableState {
                status: offer.status.to_string(),
            });
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE offers SET message = COALESCE(?, message), \
             proposed_budget = COALESCE(?, proposed_budget), updated_at = ? \
             WHERE public_id = ? AND status = 'pending'",
        )
        .bind(&request.message)
        .bind(request.proposed_budget)
        .bind(&now)
        .bind(public_id)
        .execute(&self.pool)
        .await?;

        self.find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)
    }

    /// Delete a pending offer
    pub async fn delete(&self, public_id: &str) -> OfferResult<()> {
        let offer = self
            .find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        if !offer.is_mutable() {
            return Err(OfferError::ImmutableState {
                status: offer.status.to_string(),
            });
        }

        sqlx::query("DELETE FROM offers WHERE id = ?")
            .bind(offer.id)
            .execute(&self.pool)
            .await?;

        info!(offer_id = offer.id, public_id = %public_id, "deleted pending offer");
        Ok(())
    }

    /// Move an offer out of `pending`. The accepted/rejected states are
    /// terminal; any other transition is rejected here.
    pub async fn set_status(&self, offer_id: i64, from: OfferStatus, to: OfferStatus) -> OfferResult<()> {
        if from != OfferStatus::Pending || to == OfferStatus::Pending {
            return Err(OfferError::IllegalTransition {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE offers SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(to.as_str())
        .bind(&now)
        .bind(offer_id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(OfferError::OfferNotFound);
        }

        info!(offer_id, status = %to, "offer status changed");
        Ok(())
    }
}
