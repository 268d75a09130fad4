//! Message entity definitions

use serde::{Deserialize, Serialize};

/// A message inside a chat. Messages are never edited; the only mutation
/// after creation is growth of the `read_by` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub public_id: String,
    pub chat_id: i64,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub media: Option<MediaInfo>,
    pub created_at: String,
    /// Principals that have seen this message. Always contains the
    /// sender from the moment of creation, and only ever grows.
    pub read_by: Vec<String>,
}

/// Message kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Document,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Video => "video",
            MessageKind::Document => "document",
        }
    }

    pub fn is_media(&self) -> bool {
        !matches!(self, MessageKind::Text)
    }
}

impl From<&str> for MessageKind {
    fn from(s: &str) -> Self {
        match s {
            "image" => MessageKind::Image,
            "video" => MessageKind::Video,
            "document" => MessageKind::Document,
            _ => MessageKind::Text,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media metadata carried by non-text messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Durable URL issued by the blob store.
    pub url: String,
    pub name: Option<String>,
    pub size_bytes: Option<i64>,
    /// Seconds; only meaningful for video.
    pub duration: Option<f64>,
}

/// Request to append a message to a chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub chat_id: i64,
    pub sender_id: String,
    pub sender_name: String,
    pub content: String,
    pub kind: MessageKind,
    pub media: Option<MediaInfo>,
}

impl CreateMessageRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.sender_id.trim().is_empty() {
            return Err("Sender principal id cannot be empty".to_string());
        }
        match self.kind {
            MessageKind::Text => {
                if self.content.trim().is_empty() {
                    return Err("Message content cannot be empty".to_string());
                }
                if self.content.len() > 100_000 {
                    return Err("Message content too long (max 100,000 characters)".to_string());
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

    /// Preview text denormalized onto the parent chat.
    pub fn preview(&self) -> String {
        match self.kind {
            MessageKind::Text => self.content.clone(),
            MessageKind::Image => "\u{1F4F7} Photo".to_string(),
            MessageKind::Video => "\u{1F3A5} Video".to_string(),
            MessageKind::Document => "\u{1F4C4} Document".to_string(),
        }
    }
}
