//! Shared types for the storage layer

pub mod errors;

pub use errors::{ChatError, DatabaseError, GigError, OfferError, ProfileError};

/// Result type aliases used throughout the workspace
pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type ProfileResult<T> = Result<T, ProfileError>;
pub type GigResult<T> = Result<T, GigError>;
pub type OfferResult<T> = Result<T, OfferError>;
pub type ChatResult<T> = Result<T, ChatError>;

use serde::{Deserialize, Serialize};

/// Counts reported back from an admin user cascade. The numbers must
/// match the principal's footprint exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub gigs: u64,
    pub offers: u64,
    pub chats: u64,
    pub messages: u64,
}

/// Counts from cascading a single gig deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigCascadeReport {
    pub offers: u64,
    pub chats: u64,
    pub messages: u64,
}
