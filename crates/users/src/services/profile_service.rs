//! Profile service: the bridge from identity claims to stored profiles.

use campusgig_auth::IdentityClaims;
use campusgig_database::{
    CreateProfileRequest, Profile, ProfileError, ProfileRepository, ProfileResult,
    UpdateProfileRequest,
};
use sqlx::SqlitePool;
use tracing::info;

/// Service for profile operations
pub struct ProfileService {
    profile_repository: ProfileRepository,
}

impl ProfileService {
    /// Create a new profile service instance
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            profile_repository: ProfileRepository::new(pool),
        }
    }

    /// Fetch a profile by principal id
    pub async fn get_profile(&self, principal_id: &str) -> ProfileResult<Profile> {
        self.profile_repository
            .find_by_principal(principal_id)
            .await?
            .ok_or(ProfileError::ProfileNotFound)
    }

    /// Ensure a profile exists for a signed-in principal, creating one
    /// from the identity claims on first sign-in. Concurrent first
    /// sign-ins converge on the single created row.
    pub async fn ensure_profile(
        &self,
        claims: &IdentityClaims,
        college: &str,
    ) -> ProfileResult<Profile> {
        if let Some(existing) = self
            .profile_repository
            .find_by_principal(&claims.principal_id)
            .await?
        {
            return Ok(existing);
        }

        let (first_name, last_name) = claims.name_parts();
        let request = CreateProfileRequest {
            principal_id: claims.principal_id.clone(),
            email: claims.email.clone(),
            first_name,
            last_name,
            college: college.to_string(),
            year: None,
            branch: None,
            phone: claims.phone.clone(),
            avatar_url: claims.photo_url.clone(),
        };
        request.validate().map_err(ProfileError::Validation)?;

        match self.profile_repository.create(&request).await {
            Ok(profile) => {
                info!(principal = %profile.principal_id, "profile created on first sign-in");
                Ok(profile)
            }
            // Lost a race against another first sign-in; use its row
            Err(ProfileError::ProfileAlreadyExists) => self
                .profile_repository
                .find_by_principal(&claims.principal_id)
                .await?
                .ok_or(ProfileError::ProfileNotFound),
            Err(err) => Err(err),
        }
    }

    /// Apply an owner-driven update to the principal's own profile
    pub async fn update_profile(
        &self,
        principal_id: &str,
        request: UpdateProfileRequest,
    ) -> ProfileResult<Profile> {
        request.validate().map_err(ProfileError::Validation)?;
        self.profile_repository.update(principal_id, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusgig_config::DatabaseConfig;
    use campusgig_database::initialize_database;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_profile_service.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    fn claims() -> IdentityClaims {
        IdentityClaims {
            principal_id: "principal-a".to_string(),
            email: Some("asha@campus.edu".to_string()),
            display_name: Some("Asha Patel".to_string()),
            photo_url: Some("https://photos.example/asha.png".to_string()),
            phone: Some("+15550001111".to_string()),
        }
    }

    #[tokio::test]
    async fn test_ensure_profile_creates_once() {
        let (pool, _temp_dir) = create_test_pool().await;
        let service = ProfileService::new(pool);

        let created = service.ensure_profile(&claims(), "Hillview").await.unwrap();
        assert_eq!(created.first_name, "Asha");
        assert_eq!(created.last_name, "Patel");
        assert_eq!(created.college, "Hillview");

        // A second sign-in finds the same row, even with changed claims
        let mut later = claims();
        later.display_name = Some("A. Patel".to_string());
        let found = service.ensure_profile(&later, "Lakeside").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.first_name, "Asha");
        assert_eq!(found.college, "Hillview");
    }

    #[tokio::test]
    async fn test_update_own_profile() {
        let (pool, _temp_dir) = create_test_pool().await;
        let service = ProfileService::new(pool);

        service.ensure_profile(&claims(), "Hillview").await.unwrap();
        let updated = service
            .update_profile(
                "principal-a",
                UpdateProfileRequest {
                    branch: Some("Mechanical".to_string()),
                    year: Some("4".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.branch.as_deref(), Some("Mechanical"));

        let missing = service
            .update_profile("principal-x", UpdateProfileRequest::default())
            .await;
        assert!(matches!(missing, Err(ProfileError::ProfileNotFound)));
    }
}
