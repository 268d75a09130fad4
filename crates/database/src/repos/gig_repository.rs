//! Repository for gig data access operations.

use crate::entities::{CreateGigRequest, Gig, GigCategory, GigStatus, UpdateGigRequest};
use crate::types::{GigError, GigResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

const GIG_COLUMNS: &str = "id, public_id, title, description, category, budget, deadline, \
     location, college, posted_by, posted_by_name, status, created_at, updated_at";

/// Repository for gig database operations
pub struct GigRepository {
    pool: SqlitePool,
}

impl GigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &SqliteRow) -> Result<Gig, sqlx::Error> {
        let category: String = row.try_get("category")?;
        let status: String = row.try_get("status")?;

        Ok(Gig {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            category: GigCategory::from(category.as_str()),
            budget: row.try_get("budget")?,
            deadline: row.try_get("deadline")?,
            location: row.try_get("location")?,
            college: row.try_get("college")?,
            posted_by: row.try_get("posted_by")?,
            posted_by_name: row.try_get("posted_by_name")?,
            status: GigStatus::from(status.as_str()),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Create a new gig with status `open`
    pub async fn create(&self, request: &CreateGigRequest) -> GigResult<Gig> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();
        let deadline = request.deadline.to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO gigs (public_id, title, description, category, budget, deadline, \
             location, college, posted_by, posted_by_name, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.category.as_str())
        .bind(request.budget)
        .bind(&deadline)
        .bind(&request.location)
        .bind(&request.college)
        .bind(&request.posted_by)
        .bind(&request.posted_by_name)
        .bind(GigStatus::Open.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let gig_id = result.last_insert_rowid();

        info!(
            gig_id = gig_id,
            public_id = %public_id,
            posted_by = %request.posted_by,
            college = %request.college,
            "created new gig"
        );

        Ok(Gig {
            id: gig_id,
            public_id,
            title: request.title.clone(),
            description: request.description.clone(),
            category: request.category,
            budget: request.budget,
            deadline,
            location: request.location.clone(),
            college: request.college.clone(),
            posted_by: request.posted_by.clone(),
            posted_by_name: request.posted_by_name.clone(),
            status: GigStatus::Open,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Find gig by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> GigResult<Option<Gig>> {
        let row = sqlx::query(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::map_row).transpose().map_err(Into::into)
    }

    /// Open gigs for a college, newest first.
    ///
    /// Primary path is one compound query. If the backing store rejects
    /// it (a deployment without the supporting index), the listing must
    /// stay available, so we degrade to a broad fetch on the college
    /// alone and filter/sort here.
    pub async fn find_open_by_college(&self, college: &str) -> GigResult<Vec<Gig>> {
        let compound = sqlx::query(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE college = ? AND status = 'open' \
             ORDER BY created_at DESC"
        ))
        .bind(college)
        .fetch_all(&self.pool)
        .await;

        let rows = match compound {
            Ok(rows) => rows,
            Err(error) => {
                warn!(%college, %error, "compound gig query failed, degrading to broad fetch");
                let gigs = self.find_by_college(college).await?;
                return Ok(Self::open_newest_first(gigs));
            }
        };

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// In-memory equivalent of the compound board query, used when the
    /// degraded fallback path has fetched broadly.
    fn open_newest_first(mut gigs: Vec<Gig>) -> Vec<Gig> {
        gigs.retain(|gig| gig.status == GigStatus::Open);
        gigs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        gigs
    }

    /// All gigs for a college regardless of status
    pub async fn find_by_college(&self, college: &str) -> GigResult<Vec<Gig>> {
        let rows = sqlx::query(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE college = ?"
        ))
        .bind(college)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Gigs posted by a principal, newest first
    pub async fn find_by_poster(&self, principal_id: &str) -> GigResult<Vec<Gig>> {
        let rows = sqlx::query(&format!(
            "SELECT {GIG_COLUMNS} FROM gigs WHERE posted_by = ? ORDER BY created_at DESC"
        ))
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::map_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Update the mutable gig fields and refresh `updated_at`
    pub async fn update(&self, public_id: &str, request: &UpdateGigRequest) -> GigResult<Gig> {
        if self.find_by_public_id(public_id).await?.is_none() {
            return Err(GigError::GigNotFound);
        }

        let mut update_fields = Vec::new();
        let mut values = Vec::new();

        if let Some(title) = &request.title {
            update_fields.push("title = ?");
            values.push(title.clone());
        }
        if let Some(description) = &request.description {
            update_fields.push("description = ?");
            values.push(description.clone());
        }
        if let Some(category) = &request.category {
            update_fields.push("category = ?");
            values.push(category.as_str().to_string());
        }
        if let Some(budget) = request.budget {
            update_fields.push("budget = ?");
            values.push(budget.to_string());
        }
        if let Some(deadline) = request.deadline {
            update_fields.push("deadline = ?");
            values.push(deadline.to_rfc3339());
        }
        if let Some(location) = &request.location {
            update_fields.push("location = ?");
            values.push(location.clone());
        }

        if update_fields.is_empty() {
            return self
                .find_by_public_id(public_id)
                .await?
                .ok_or(GigError::GigNotFound);
        }

        let now = chrono::Utc::now().to_rfc3339();
        update_fields.push("updated_at = ?");
        values.push(now);

        let query = format!("UPDATE gigs SET {} WHERE public_id = ?", update_fields.join(", "));
        values.push(public_id.to_string());

        let mut query_builder = sqlx::query(&query);
        for value in &values {
            query_builder = query_builder.bind(value);
        }
        query_builder.execute(&self.pool).await?;

        self.find_by_public_id(public_id)
            .await?
            .ok_or(GigError::GigNotFound)
    }

    /// Move a gig to a new status
    pub async fn set_status(&self, gig_id: i64, status: GigStatus) -> GigResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query("UPDATE gigs SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(&now)
            .bind(gig_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GigError::GigNotFound);
        }

        info!(gig_id, status = %status, "gig status changed");
        Ok(())
    }
}
