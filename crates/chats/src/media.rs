//! Media admission policy for chat uploads.

use campusgig_config::MediaConfig;
use campusgig_database::{ChatError, MessageKind};

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm", "video/quicktime"];
const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// An upload as it arrives from a client, before any bytes are stored.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: bytes::Bytes,
    pub kind: MessageKind,
    /// Playback length in seconds; only meaningful for videos.
    pub duration: Option<f64>,
}

/// Size and format limits for uploads. Images get a larger budget than
/// other media; videos additionally have a playback-length cap.
#[derive(Debug, Clone)]
pub struct MediaPolicy {
    max_image_bytes: u64,
    max_media_bytes: u64,
    max_video_seconds: u64,
}

impl MediaPolicy {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            max_image_bytes: config.max_image_bytes,
            max_media_bytes: config.max_media_bytes,
            max_video_seconds: config.max_video_seconds,
        }
    }

    /// Admit or reject an upload. Checks run before any bytes touch the
    /// blob store, so a rejection leaves nothing to clean up.
    pub fn admit(&self, upload: &MediaUpload) -> Result<(), ChatError> {
        let allowed: &[&str] = match upload.kind {
            MessageKind::Image => IMAGE_TYPES,
            MessageKind::Video => VIDEO_TYPES,
            MessageKind::Document => DOCUMENT_TYPES,
            MessageKind::Text => {
                return Err(ChatError::MediaRejected(
                    "text messages carry no media".to_string(),
                ))
            }
        };

        if !allowed.contains(&upload.content_type.as_str()) {
            return Err(ChatError::MediaRejected(format!(
                "unsupported {} type: {}",
                upload.kind, upload.content_type
            )));
        }

        let max_bytes = match upload.kind {
            MessageKind::Image => self.max_image_bytes,
            _ => self.max_media_bytes,
        };
        if upload.data.len() as u64 > max_bytes {
            return Err(ChatError::MediaRejected(format!(
                "{} exceeds the {} byte limit",
                upload.kind, max_bytes
            )));
        }

        if upload.kind == MessageKind::Video {
            match upload.duration {
                Some(seconds) if seconds.is_finite() && seconds > 0.0 => {
                    if seconds > self.max_video_seconds as f64 {
                        return Err(ChatError::MediaRejected(format!(
                            "video exceeds the {} second limit",
                            self.max_video_seconds
                        )));
                    }
                }
                _ => {
                    return Err(ChatError::MediaRejected(
                        "video uploads must declare a positive duration".to_string(),
                    ))
                }
            }
        }

        Ok(())
    }
}
