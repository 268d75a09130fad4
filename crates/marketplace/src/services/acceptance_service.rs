//! Offer acceptance and chat provisioning.
//!
//! Accepting an offer is the one place where the marketplace and the
//! messaging side meet: the offer flips to `accepted`, the gig moves to
//! `in_progress`, and a private chat between poster and bidder comes
//! into existence exactly once per offer.

use crate::types::{AcceptOutcome, AcceptanceError, AcceptanceResult};
use campusgig_database::{
    ChatRepository, GigRepository, GigStatus, OfferError, OfferRepository, OfferStatus,
    ProfileRepository, ProvisionChatRequest,
};
use sqlx::SqlitePool;
use tracing::info;

/// Service that drives the accept flow
pub struct AcceptanceService {
    offer_repository: OfferRepository,
    gig_repository: GigRepository,
    chat_repository: ChatRepository,
    profile_repository: ProfileRepository,
}

impl AcceptanceService {
    /// Create a new acceptance service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            offer_repository: OfferRepository::new(pool.clone()),
            gig_repository: GigRepository::new(pool.clone()),
            chat_repository: ChatRepository::new(pool.clone()),
            profile_repository: ProfileRepository::new(pool),
        }
    }

    /// Accept an offer on the principal's gig.
    ///
    /// Accepting an already-accepted offer is not an error: the call
    /// re-enters chat provisioning and converges on the existing chat,
    /// so a retried or double-tapped accept always lands on the same
    /// state. Accepting a rejected offer is refused.
    pub async fn accept_offer(
        &self,
        offer_public_id: &str,
        principal_id: &str,
    ) -> AcceptanceResult<AcceptOutcome> {
        let offer = self
            .offer_repository
            .find_by_public_id(offer_public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        if offer.gig_posted_by != principal_id {
            return Err(OfferError::NotOwner.into());
        }

        match offer.status {
            OfferStatus::Pending => {
                self.offer_repository
                    .set_status(offer.id, OfferStatus::Pending, OfferStatus::Accepted)
                    .await?;
                self.gig_repository
                    .set_status(offer.gig_id, GigStatus::InProgress)
                    .await?;
            }
            OfferStatus::Accepted => {
                // Fall through to provisioning; it converges on the
                // chat created by the first accept. The gig flip is
                // re-applied too, in case the first attempt died
                // between the two writes.
                self.gig_repository
                    .set_status(offer.gig_id, GigStatus::InProgress)
                    .await?;
            }
            OfferStatus::Rejected => {
                return Err(AcceptanceError::Offer(OfferError::IllegalTransition {
                    from: OfferStatus::Rejected.to_string(),
                    to: OfferStatus::Accepted.to_string(),
                }));
            }
        }

        let poster_name = match self
            .profile_repository
            .find_by_principal(&offer.gig_posted_by)
            .await?
        {
            Some(profile) => profile.display_name(),
            None => offer.gig_posted_by.clone(),
        };

        let (chat, chat_created) = self
            .chat_repository
            .create_for_offer(&ProvisionChatRequest {
                offer_id: offer.id,
                gig_id: offer.gig_id,
                gig_title: offer.gig_title.clone(),
                participant_a: offer.gig_posted_by.clone(),
                participant_a_name: poster_name,
                participant_b: offer.offered_by.clone(),
                participant_b_name: offer.offered_by_name.clone(),
            })
            .await?;

        let offer = self
            .offer_repository
            .find_by_public_id(offer_public_id)
            .await?
            .ok_or(OfferError::OfferNotFound)?;

        info!(
            offer = %offer_public_id,
            chat = %chat.public_id,
            chat_created,
            "offer accepted"
        );

        Ok(AcceptOutcome {
            offer,
            chat,
            chat_created,
        })
    }
}
