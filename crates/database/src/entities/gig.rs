//! Gig entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A posted gig. `posted_by_name` is a snapshot of the poster's display
/// name at creation time, not a live join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gig {
    pub id: i64,
    pub public_id: String,
    pub title: String,
    pub description: String,
    pub category: GigCategory,
    pub budget: f64,
    pub deadline: String,
    pub location: String,
    pub college: String,
    pub posted_by: String,
    pub posted_by_name: String,
    pub status: GigStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Closed category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GigCategory {
    Academic,
    Creative,
    Tech,
    Errands,
    Events,
    Other,
}

impl GigCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GigCategory::Academic => "academic",
            GigCategory::Creative => "creative",
            GigCategory::Tech => "tech",
            GigCategory::Errands => "errands",
            GigCategory::Events => "events",
            GigCategory::Other => "other",
        }
    }
}

impl From<&str> for GigCategory {
    fn from(s: &str) -> Self {
        match s {
            "academic" => GigCategory::Academic,
            "creative" => GigCategory::Creative,
            "tech" => GigCategory::Tech,
            "errands" => GigCategory::Errands,
            "events" => GigCategory::Events,
            _ => GigCategory::Other,
        }
    }
}

impl std::fmt::Display for GigCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gig status enum. Transitions are monotonic in practice
/// (open -> in_progress/cancelled -> completed); only the accept-offer
/// path enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl GigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GigStatus::Open => "open",
            GigStatus::InProgress => "in_progress",
            GigStatus::Completed => "completed",
            GigStatus::Cancelled => "cancelled",
        }
    }
}

impl From<&str> for GigStatus {
    fn from(s: &str) -> Self {
        match s {
            "in_progress" => GigStatus::InProgress,
            "completed" => GigStatus::Completed,
            "cancelled" => GigStatus::Cancelled,
            _ => GigStatus::Open,
        }
    }
}

impl std::fmt::Display for GigStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create a new gig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGigRequest {
    pub title: String,
    pub description: String,
    pub category: GigCategory,
    pub budget: f64,
    pub deadline: DateTime<Utc>,
    pub location: String,
    pub college: String,
    pub posted_by: String,
    pub posted_by_name: String,
}

impl CreateGigRequest {
    /// Validate against the creation constraints: non-empty title,
    /// positive budget and a deadline strictly after `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Gig title cannot be empty".to_string());
        }
        if self.title.len() > 255 {
            return Err("Gig title too long (max 255 characters)".to_string());
        }
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err("Budget must be a positive number".to_string());
        }
        if self.deadline <= now {
            return Err("Deadline must be in the future".to_string());
        }
        if self.college.trim().is_empty() {
            return Err("College cannot be empty".to_string());
        }
        if self.posted_by.trim().is_empty() {
            return Err("Poster principal id cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Request to edit a gig. Only these fields are mutable; ownership and
/// status travel other paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGigRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<GigCategory>,
    pub budget: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl UpdateGigRequest {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err("Gig title cannot be empty".to_string());
            }
            if title.len() > 255 {
                return Err("Gig title too long (max 255 characters)".to_string());
            }
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err("Budget must be a positive number".to_string());
            }
        }
        if let Some(deadline) = self.deadline {
            if deadline <= now {
                return Err("Deadline must be in the future".to_string());
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.budget.is_none()
            && self.deadline.is_none()
            && self.location.is_none()
    }
}
