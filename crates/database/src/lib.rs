//! CampusGig Database Crate
//!
//! This crate provides storage for the CampusGig marketplace, including
//! connection management, migrations, and repository implementations.

use campusgig_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{
    AdminRepository, ChatRepository, GigRepository, GlobalMessageRepository, MessageRepository,
    OfferRepository, ProfileRepository,
};

// Re-export entities
pub use entities::{
    chat::{Chat, ProvisionChatRequest},
    gig::{CreateGigRequest, Gig, GigCategory, GigStatus, UpdateGigRequest},
    global_message::{CreateGlobalMessageRequest, GlobalMessage},
    message::{ChatMessage, CreateMessageRequest, MediaInfo, MessageKind},
    offer::{CreateOfferRequest, Offer, OfferStatus, UpdateOfferRequest},
    profile::{CreateProfileRequest, Profile, UpdateProfileRequest},
};

// Re-export types
pub use types::{
    errors::{ChatError, DatabaseError, GigError, OfferError, ProfileError},
    CascadeReport, ChatResult, DatabaseResult, GigCascadeReport, GigResult, OfferResult,
    ProfileResult,
};

/// Re-export commonly used types for convenience
pub use sqlx::Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_database() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (_pool, _temp_dir) = create_test_database().await;
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (pool, _temp_dir) = create_test_database().await;

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(result.0);
    }
}
