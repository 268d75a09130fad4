//! Repository for profile data access operations.

use crate::entities::{CreateProfileRequest, Profile, UpdateProfileRequest};
use crate::types::{ProfileError, ProfileResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const PROFILE_COLUMNS: &str = "id, principal_id, email, first_name, last_name, college, year, \
     branch, phone, avatar_url, created_at, updated_at";

/// Repository for profile database operations
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Profile, sqlx::Error> {
        Ok(Profile {
            id: row.try_get("id")?,
            principal_id: row.try_get("principal_id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            college: row.try_get("college")?,
            year: row.try_get("year")?,
            branch: row.try_get("branch")?,
            phone: row.try_get("phone")?,
            avatar_url: row.try_get("avatar_url")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Create a profile for a newly signed-in principal
    pub async fn create(&self, request: &CreateProfileRequest) -> ProfileResult<Profile> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO profiles (principal_id, email, first_name, last_name, college, year, \
             branch, phone, avatar_url, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&request.principal_id)
        .bind(&request.email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.college)
        .bind(&request.year)
        .bind(&request.branch)
        .bind(&request.phone)
        .bind(&request.avatar_url)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        let profile_id = match result {
            Ok(done) => done.last_insert_rowid(),
            Err(sqlx::Error::Database(db_err))
                if db_err.kind() == sqlx::error::ErrorKind::UniqueViolation =>
            {
                return Err(ProfileError::ProfileAlreadyExists);
            }
            Err(err) => return Err(err.into()),
        };

        info!(profile_id, principal = %request.principal_id, "created profile");

        Ok(Profile {
            id: profile_id,
            principal_id: request.principal_id.clone(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            college: request.college.clone(),
            year: request.year.clone(),
            branch: request.branch.clone(),
            phone: request.phone.clone(),
            avatar_url: request.avatar_url.clone(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Find profile by principal ID
    pub async fn find_by_principal(&self, principal_id: &str) -> ProfileResult<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE principal_id = ?"
        ))
        .bind(principal_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose().map_err(Into::into)
    }

    /// Find profile by phone number (used by OTP sign-in to answer
    /// whether the phone belongs to a returning user)
    pub async fn find_by_phone(&self, phone: &str) -> ProfileResult<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE phone = ?"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose().map_err(Into::into)
    }

    /// Apply an owner-driven update and refresh `updated_at`
    pub async fn update(
        &self,
        principal_id: &str,
        request: &UpdateProfileRequest,
    ) -> ProfileResult<Profile> {
        if self.find_by_principal(principal_id).await?.is_none() {
            return Err(ProfileError::ProfileNotFound);
        }

        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE profiles SET \
             first_name = COALESCE(?, first_name), \
             last_name = COALESCE(?, last_name), \
             college = COALESCE(?, college), \
             year = COALESCE(?, year), \
             branch = COALESCE(?, branch), \
             phone = COALESCE(?, phone), \
             avatar_url = COALESCE(?, avatar_url), \
             updated_at = ? \
             WHERE principal_id = ?",
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.college)
        .bind(&request.year)
        .bind(&request.branch)
        .bind(&request.phone)
        .bind(&request.avatar_url)
        .bind(&now)
        .bind(principal_id)
        .execute(&self.pool)
        .await?;

        self.find_by_principal(principal_id)
            .await?
            .ok_or(ProfileError::ProfileNotFound)
    }

    /// Remove a profile row. Dependent entities are the admin cascade's
    /// concern, not this repository's.
    pub async fn delete(&self, principal_id: &str) -> ProfileResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE principal_id = ?")
            .bind(principal_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProfileError::ProfileNotFound);
        }

        info!(principal = %principal_id, "deleted profile");
        Ok(())
    }
}
