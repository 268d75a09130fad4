//! Administrative moderation operations.

use campusgig_database::{
    AdminRepository, CascadeReport, ChatError, ChatRepository, ChatResult, GigCascadeReport,
    GigError, GigRepository, GigResult, ProfileResult,
};
use sqlx::SqlitePool;
use tracing::warn;

/// Service for admin-only destructive operations. Callers are expected
/// to have verified the admin role before reaching this layer.
pub struct AdminService {
    admin_repository: AdminRepository,
    gig_repository: GigRepository,
    chat_repository: ChatRepository,
}

impl AdminService {
    /// Create a new admin service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            admin_repository: AdminRepository::new(pool.clone()),
            gig_repository: GigRepository::new(pool.clone()),
            chat_repository: ChatRepository::new(pool),
        }
    }

    /// Remove a user and everything tied to them. The returned report
    /// accounts for every deleted gig, offer, chat and message.
    pub async fn remove_user(&self, principal_id: &str) -> ProfileResult<CascadeReport> {
        warn!(principal = %principal_id, "admin user removal requested");
        self.admin_repository.delete_user_cascade(principal_id).await
    }

    /// Remove a single gig with its offers, chats and messages.
    pub async fn remove_gig(&self, gig_public_id: &str) -> GigResult<GigCascadeReport> {
        let gig = self
            .gig_repository
            .find_by_public_id(gig_public_id)
            .await?
            .ok_or(GigError::GigNotFound)?;

        warn!(gig = %gig_public_id, "admin gig removal requested");
        self.admin_repository.delete_gig_cascade(gig.id).await
    }

    /// Remove a single chat and its messages; returns the message count.
    pub async fn remove_chat(&self, chat_public_id: &str) -> ChatResult<u64> {
        let chat = self
            .chat_repository
            .find_by_public_id(chat_public_id)
            .await?
            .ok_or(ChatError::ChatNotFound)?;

        warn!(chat = %chat_public_id, "admin chat removal requested");
        self.chat_repository.delete_cascade(chat.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusgig_config::DatabaseConfig;
    use campusgig_database::{
        initialize_database, CreateGigRequest, CreateProfileRequest, GigCategory,
        ProfileRepository,
    };
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_admin_service.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_remove_gig_by_public_id() {
        let (pool, _temp_dir) = create_test_pool().await;

        let gig = GigRepository::new(pool.clone())
            .create(&CreateGigRequest {
                title: "Dorm cleaning".to_string(),
                description: "Deep clean before inspection".to_string(),
                category: GigCategory::Errands,
                budget: 100.0,
                deadline: Utc::now() + Duration::days(1),
                location: "Dorm C".to_string(),
                college: "Hillview".to_string(),
                posted_by: "principal-a".to_string(),
                posted_by_name: "Asha Patel".to_string(),
            })
            .await
            .unwrap();

        let service = AdminService::new(pool);
        let report = service.remove_gig(&gig.public_id).await.unwrap();
        assert_eq!(report, GigCascadeReport::default());

        let missing = service.remove_gig(&gig.public_id).await;
        assert!(matches!(missing, Err(GigError::GigNotFound)));
    }

    #[tokio::test]
    async fn test_remove_user() {
        let (pool, _temp_dir) = create_test_pool().await;

        ProfileRepository::new(pool.clone())
            .create(&CreateProfileRequest {
                principal_id: "principal-a".to_string(),
                email: None,
                first_name: "Asha".to_string(),
                last_name: "Patel".to_string(),
                college: "Hillview".to_string(),
                year: None,
                branch: None,
                phone: None,
                avatar_url: None,
            })
            .await
            .unwrap();

        let service = AdminService::new(pool.clone());
        let report = service.remove_user("principal-a").await.unwrap();
        assert_eq!(report, CascadeReport::default());

        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(profiles, 0);
    }
}
