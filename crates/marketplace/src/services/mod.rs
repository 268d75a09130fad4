//! Business logic services for the marketplace

pub mod acceptance_service;
pub mod gig_service;
pub mod offer_service;

pub use acceptance_service::AcceptanceService;
pub use gig_service::GigService;
pub use offer_service::OfferService;
