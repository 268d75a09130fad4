//! # CampusGig Users Crate
//!
//! Profile lifecycle (creation on first sign-in, owner updates) and the
//! admin moderation operations that remove users or gigs together with
//! their entire footprint.

pub mod services;

// Re-export main types for convenience
pub use services::{AdminService, ProfileService};
