//! Offer service for bidding on gigs.

use campusgig_database::{
    CreateOfferRequest, GigRepository, Offer, OfferError, OfferRepository, OfferResult,
    OfferStatus, UpdateOfferRequest,
};
use sqlx::SqlitePool;
use tracing::info;

/// Service for offer operations
pub struct OfferService {
    offer_repository: OfferRepository,
    gig_repository: GigRepository,
}

impl OfferService {
    /// Create a new offer service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            offer_repository: OfferRepository::new(pool.clone()),
            gig_repository: GigRepository::new(pool),
        }
    }

    /// Place an offer on a gig. Posters cannot bid on their own gigs.
    pub async fn create_offer(&self, request: CreateOfferRequest) -> OfferResult<Offer> {
        request.validate().map_err(OfferError::Validation)?;

        let gig = self
            .gig_repository
            .find_by_public_id(&request.gig_public_id)
            .await
            .map_err(|e| OfferError::DatabaseError(e.to_string()))?
            .ok_or(OfferError::GigNotFound)?;

        if gig.posted_by == request.offered_by {
            return Err(OfferError::SelfOffer);
        }

        self.offer_repository.create(&gig, &request).await
    }

    /// All offers on one of the principal's gigs
    pub async fn list_offers_for_gig(
        &self,
        gig_public_id: &str,
        principal_id: &str,
    ) -> OfferResult<Vec<Offer>> {
        let gig = self
            .gig_repository
            .find_by_public_id(gig_public_id)
            .await
            .map_err(|e| OfferError::DatabaseError(e.to_string()))?
            .ok_or(OfferError::GigNotFound)?;

        if gig.posted_by != principal_id {
            return Err(OfferError::NotOwner);
        }

        self.offer_repository.find_for_gig(gig.id).await
    }

    /// Offers other students placed on the principal's gigs
    pub async fn list_received(&self, principal_id: &str) -> OfferResult<Vec<Offer>> {
        self.offer_repository.find_received(principal_id).await
    }

    /// Offers the principal has placed on other students' gigs
    pub async fn list_made(&self, principal_id: &str) -> OfferResult<Vec<Offer>> {
        self.offer_repository.find_made(principal_id).await
    }

    /// Revise a pending offer's message or proposed budget. Only the
    /// bidder may do this, and only while the offer is still pending.
    pub async fn update_offer(
        &self,
        public_id: &str,
        principal_id: &str,
        request: UpdateOfferRequest,
    ) -> OfferResult<Offer> {
        request.validate().map_err(OfferError::Validation)?;

        let offer = self
            .offer_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        if offer.offered_by != principal_id {
            return Err(OfferError::NotOwner);
        }

        self.offer_repository.update(public_id, &request).await
    }

    /// Withdraw a pending offer
    pub async fn withdraw_offer(&self, public_id: &str, principal_id: &str) -> OfferResult<()> {
        let offer = self
            .offer_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        if offer.offered_by != principal_id {
            return Err(OfferError::NotOwner);
        }

        self.offer_repository.delete(public_id).await?;
        info!(public_id = %public_id, principal = %principal_id, "offer withdrawn");
        Ok(())
    }

    /// Reject a pending offer on the principal's gig. Rejection is
    /// terminal; a rejected offer can never become accepted.
    pub async fn reject_offer(&self, public_id: &str, principal_id: &str) -> OfferResult<Offer> {
        let offer = self
            .offer_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        if offer.gig_posted_by != principal_id {
            return Err(OfferError::NotOwner);
        }

        if offer.status != OfferStatus::Pending {
            return Err(OfferError::IllegalTransition {
                from: offer.status.to_string(),
                to: OfferStatus::Rejected.to_string(),
            });
        }

        self.offer_repository
            .set_status(offer.id, OfferStatus::Pending, OfferStatus::Rejected)
            .await?;

        self.offer_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)
    }
}
