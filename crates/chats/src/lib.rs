//! # CampusGig Chats Crate
//!
//! This crate provides the messaging side of CampusGig: the private
//! chats spawned by accepted offers, the campus-wide global room, media
//! uploads, and live feeds for connected clients.
//!
//! ## Architecture
//!
//! - **Services**: Business logic over the storage repositories
//! - **Feed**: Watch-channel based live subscriptions
//! - **Media**: Upload admission policy
//! - **Blob store**: Where media bytes actually live

pub mod blob_store;
pub mod feed;
pub mod media;
pub mod services;

// Re-export main types for convenience
pub use blob_store::{BlobStore, FsBlobStore};
pub use feed::{FeedRegistry, FeedSubscription};
pub use media::{MediaPolicy, MediaUpload};
pub use services::{ChatService, GlobalChatService, MessageService, GLOBAL_FEED_WINDOW};
