//! # CampusGig Marketplace Crate
//!
//! This crate provides the core business logic for the gig marketplace:
//! posting gigs to a college board, bidding on them with offers, and the
//! accept flow that turns a winning offer into a private chat.
//!
//! ## Architecture
//!
//! - **Services**: Business logic layer over the storage repositories
//! - **Types**: Shared types for the accept flow

pub mod services;
pub mod types;

// Re-export main types for convenience
pub use services::{AcceptanceService, GigService, OfferService};
pub use types::{AcceptOutcome, AcceptanceError, AcceptanceResult};
