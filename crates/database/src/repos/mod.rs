//! Repository implementations for data access

pub mod admin_repository;
pub mod chat_repository;
pub mod gig_repository;
pub mod global_message_repository;
pub mod message_repository;
pub mod offer_repository;
pub mod profile_repository;

pub use admin_repository::AdminRepository;
pub use chat_repository::ChatRepository;
pub use gig_repository::GigRepository;
pub use global_message_repository::GlobalMessageRepository;
pub use message_repository::MessageRepository;
pub use offer_repository::OfferRepository;
pub use profile_repository::ProfileRepository;
