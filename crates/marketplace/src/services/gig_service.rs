//! Gig service for posting and managing gigs.

use campusgig_database::{
    AdminRepository, CreateGigRequest, Gig, GigCascadeReport, GigError, GigRepository, GigResult,
    UpdateGigRequest,
};
use sqlx::SqlitePool;
use tracing::info;

/// Service for gig operations
pub struct GigService {
    gig_repository: GigRepository,
    admin_repository: AdminRepository,
}

impl GigService {
    /// Create a new gig service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            gig_repository: GigRepository::new(pool.clone()),
            admin_repository: AdminRepository::new(pool),
        }
    }

    /// Post a new gig. The budget must be a positive finite amount and
    /// the deadline must lie in the future at posting time.
    pub async fn create_gig(&self, request: CreateGigRequest) -> GigResult<Gig> {
        request
            .validate(chrono::Utc::now())
            .map_err(GigError::Validation)?;

        self.gig_repository.create(&request).await
    }

    /// Open gigs visible on a college's board, newest first
    pub async fn list_college_gigs(&self, college: &str) -> GigResult<Vec<Gig>> {
        self.gig_repository.find_open_by_college(college).await
    }

    /// All gigs a principal has posted, regardless of status
    pub async fn list_my_gigs(&self, principal_id: &str) -> GigResult<Vec<Gig>> {
        self.gig_repository.find_by_poster(principal_id).await
    }

    /// Fetch a single gig
    pub async fn get_gig(&self, public_id: &str) -> GigResult<Gig> {
        self.gig_repository
            .find_by_public_id(public_id)
            .await?
            .ok_or(GigError::GigNotFound)
    }

    /// Update a gig's listing fields. Only the poster may do this.
    pub async fn update_gig(
        &self,
        public_id: &str,
        principal_id: &str,
        request: UpdateGigRequest,
    ) -> GigResult<Gig> {
        let gig = self.get_gig(public_id).await?;
        if gig.posted_by != principal_id {
            return Err(GigError::NotOwner);
        }

        request
            .validate(chrono::Utc::now())
            .map_err(GigError::Validation)?;

        if request.is_empty() {
            return Ok(gig);
        }

        self.gig_repository.update(public_id, &request).await
    }

    /// Delete a gig the principal posted. Offers, their chats and all
    /// chat messages go with it so that nothing dangles afterwards.
    pub async fn delete_gig(
        &self,
        public_id: &str,
        principal_id: &str,
    ) -> GigResult<GigCascadeReport> {
        let gig = self.get_gig(public_id).await?;
        if gig.posted_by != principal_id {
            return Err(GigError::NotOwner);
        }

        let report = self.admin_repository.delete_gig_cascade(gig.id).await?;

        info!(public_id = %public_id, principal = %principal_id, "gig deleted by poster");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusgig_config::DatabaseConfig;
    use campusgig_database::{initialize_database, GigCategory, GigStatus};
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_gig_service.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    fn request(poster: &str, college: &str) -> CreateGigRequest {
        CreateGigRequest {
            title: "Move-in help".to_string(),
            description: "Carry boxes to the third floor".to_string(),
            category: GigCategory::Errands,
            budget: 200.0,
            deadline: Utc::now() + Duration::days(1),
            location: "Dorm B".to_string(),
            college: college.to_string(),
            posted_by: poster.to_string(),
            posted_by_name: poster.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_past_deadline() {
        let (pool, _temp_dir) = create_test_pool().await;
        let service = GigService::new(pool);

        let mut stale = request("principal-a", "Hillview");
        stale.deadline = Utc::now() - Duration::hours(1);
        let result = service.create_gig(stale).await;
        assert!(matches!(result, Err(GigError::Validation(_))));
    }

    #[tokio::test]
    async fn test_college_board_scoping() {
        let (pool, _temp_dir) = create_test_pool().await;
        let service = GigService::new(pool);

        service.create_gig(request("principal-a", "Hillview")).await.unwrap();
        service.create_gig(request("principal-b", "Lakeside")).await.unwrap();

        let board = service.list_college_gigs("Hillview").await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].college, "Hillview");
        assert_eq!(board[0].status, GigStatus::Open);
    }

    #[tokio::test]
    async fn test_update_requires_ownership() {
        let (pool, _temp_dir) = create_test_pool().await;
        let service = GigService::new(pool);

        let gig = service.create_gig(request("principal-a", "Hillview")).await.unwrap();

        let update = UpdateGigRequest {
            budget: Some(250.0),
            ..Default::default()
        };
        let forbidden = service
            .update_gig(&gig.public_id, "principal-b", update.clone())
            .await;
        assert!(matches!(forbidden, Err(GigError::NotOwner)));

        let updated = service
            .update_gig(&gig.public_id, "principal-a", update)
            .await
            .unwrap();
        assert_eq!(updated.budget, 250.0);
    }

    #[tokio::test]
    async fn test_delete_requires_ownership() {
        let (pool, _temp_dir) = create_test_pool().await;
        let service = GigService::new(pool);

        let gig = service.create_gig(request("principal-a", "Hillview")).await.unwrap();

        let forbidden = service.delete_gig(&gig.public_id, "principal-b").await;
        assert!(matches!(forbidden, Err(GigError::NotOwner)));

        let report = service.delete_gig(&gig.public_id, "principal-a").await.unwrap();
        assert_eq!(report.offers, 0);
        assert!(matches!(
            service.get_gig(&gig.public_id).await,
            Err(GigError::GigNotFound)
        ));
    }
}
