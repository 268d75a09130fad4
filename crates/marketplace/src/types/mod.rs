//! Shared types for the marketplace services

use campusgig_database::{Chat, ChatError, GigError, Offer, OfferError, ProfileError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can surface while accepting an offer. Acceptance spans
/// the offer, gig and chat tables, so it needs a wider error than any
/// single repository.
#[derive(Error, Debug)]
pub enum AcceptanceError {
    #[error(transparent)]
    Offer(#[from] OfferError),

    #[error(transparent)]
    Gig(#[from] GigError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

pub type AcceptanceResult<T> = Result<T, AcceptanceError>;

/// What came out of accepting an offer. `chat_created` is false when a
/// previous acceptance already provisioned the chat and this call only
/// converged on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptOutcome {
    pub offer: Offer,
    pub chat: Chat,
    pub chat_created: bool,
}
