//! Error types for the storage layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// Profile-specific errors
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Profile already exists for principal")]
    ProfileAlreadyExists,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Gig-specific errors
#[derive(Debug, Error)]
pub enum GigError {
    #[error("Gig not found")]
    GigNotFound,

    #[error("Not the gig owner")]
    NotOwner,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Offer-specific errors
#[derive(Debug, Error)]
pub enum OfferError {
    #[error("Offer not found")]
    OfferNotFound,

    #[error("Gig not found")]
    GigNotFound,

    #[error("Cannot offer on your own gig")]
    SelfOffer,

    #[error("Offer is {status} and immutable in that state")]
    ImmutableState { status: String },

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Not authorized for this offer")]
    NotOwner,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Chat and message errors
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat not found")]
    ChatNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Not a participant of this chat")]
    NotParticipant,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Media rejected: {0}")]
    MediaRejected(String),

    #[error("Blob storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn media_rejected(message: impl Into<String>) -> Self {
        Self::MediaRejected(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<sqlx::Error> for ProfileError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<sqlx::Error> for GigError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl From<sqlx::Error> for OfferError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}
