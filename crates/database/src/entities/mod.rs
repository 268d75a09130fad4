//! Domain entities for the marketplace storage layer.

pub mod chat;
pub mod gig;
pub mod global_message;
pub mod message;
pub mod offer;
pub mod profile;

pub use chat::{Chat, ProvisionChatRequest};
pub use gig::{CreateGigRequest, Gig, GigCategory, GigStatus, UpdateGigRequest};
pub use global_message::{CreateGlobalMessageRequest, GlobalMessage};
pub use message::{ChatMessage, CreateMessageRequest, MediaInfo, MessageKind};
pub use offer::{CreateOfferRequest, Offer, OfferStatus, UpdateOfferRequest};
pub use profile::{CreateProfileRequest, Profile, UpdateProfileRequest};
