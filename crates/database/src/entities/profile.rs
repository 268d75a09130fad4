//! Profile entity definitions

use serde::{Deserialize, Serialize};

/// A student profile, keyed by the opaque principal id issued by the
/// identity provider. Created on first successful sign-in and mutated
/// only by its owner; admins may cascade-delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub principal_id: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Profile {
    /// Display name used when denormalizing into gigs, offers and chats.
    /// Those copies are snapshots at creation time; a later rename does
    /// not rewrite them.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Request for creating a profile on first sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub principal_id: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl CreateProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.principal_id.trim().is_empty() {
            return Err("Principal id cannot be empty".to_string());
        }
        if self.first_name.trim().is_empty() {
            return Err("First name cannot be empty".to_string());
        }
        if self.college.trim().is_empty() {
            return Err("College cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Owner-driven profile update. The principal id and email are not
/// mutable through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub college: Option<String>,
    pub year: Option<String>,
    pub branch: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref first_name) = self.first_name {
            if first_name.trim().is_empty() {
                return Err("First name cannot be empty".to_string());
            }
        }
        if let Some(ref college) = self.college {
            if college.trim().is_empty() {
                return Err("College cannot be empty".to_string());
            }
        }
        Ok(())
    }
}
