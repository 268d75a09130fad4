//! Global chat entity definitions

use super::message::{MediaInfo, MessageKind};
use serde::{Deserialize, Serialize};

/// A message in the single campus-wide room. Append-only, no participant
/// restriction and no read tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMessage {
    pub id: i64,
    pub public_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub media: Option<MediaInfo>,
    pub created_at: String,
}

/// Request to append to the global feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGlobalMessageRequest {
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub media: Option<MediaInfo>,
}

impl CreateGlobalMessageRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.sender_id.trim().is_empty() {
            return Err("Sender principal id cannot be empty".to_string());
        }
        match self.kind {
            MessageKind::Text => {
                if self.content.trim().is_empty() {
                    return Err("Message content cannot be empty".to_string());
                }
            }
            _ => {
                if self.media.as_ref().map_or(true, |m| m.url.trim().is_empty()) {
                    return Err("Media message requires a stored media URL".to_string());
                }
            }
        }
        Ok(())
    }
}
