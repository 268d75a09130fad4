//! Offer entity definitions

use serde::{Deserialize, Serialize};

/// An offer made against a gig. `gig_title` and `gig_posted_by` are
/// denormalized at creation time for reverse lookups and never updated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub public_id: String,
    pub gig_id: i64,
    pub gig_title: String,
    pub gig_posted_by: String,
    pub offered_by: String,
    pub offered_by_name: String,
    pub message: String,
    pub proposed_budget: f64,
    pub status: OfferStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Offer {
    /// Only pending offers may be edited, deleted, accepted or rejected.
    pub fn is_mutable(&self) -> bool {
        self.status == OfferStatus::Pending
    }
}

/// Offer status enum. `accepted` and `rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Rejected => "rejected",
        }
    }
}

impl From<&str> for OfferStatus {
    fn from(s: &str) -> Self {
        match s {
            "accepted" => OfferStatus::Accepted,
            "rejected" => OfferStatus::Rejected,
            _ => OfferStatus::Pending,
        }
    }
}

impl std::fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create an offer. The gig is referenced by public id; title
/// and poster are denormalized by the service once the gig is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOfferRequest {
    pub gig_public_id: String,
    pub offered_by: String,
    pub offered_by_name: String,
    pub message: String,
    pub proposed_budget: f64,
}

impl CreateOfferRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.gig_public_id.trim().is_empty() {
            return Err("Gig id cannot be empty".to_string());
        }
        if self.offered_by.trim().is_empty() {
            return Err("Offerer principal id cannot be empty".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("Offer message cannot be empty".to_string());
        }
        if !self.proposed_budget.is_finite() || self.proposed_budget <= 0.0 {
            return Err("Proposed budget must be a positive number".to_string());
        }
        Ok(())
    }
}

/// Request to edit a pending offer; only message and budget are mutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOfferRequest {
    pub message: Option<String>,
    pub proposed_budget: Option<f64>,
}

impl UpdateOfferRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref message) = self.message {
            if message.trim().is_empty() {
                return Err("Offer message cannot be empty".to_string());
            }
        }
        if let Some(budget) = self.proposed_budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err("Proposed budget must be a positive number".to_string());
            }
        }
        Ok(())
    }
}
