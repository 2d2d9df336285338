//! Data models for the media playlist
//!
//! This module contains the wire format of the remote listing endpoint and
//! the immutable descriptors handed to the playback scheduler.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default display duration for images without an explicit duration
pub const DEFAULT_IMAGE_DURATION: Duration = Duration::from_millis(5000);

/// Default display duration for videos without an explicit duration
pub const DEFAULT_VIDEO_DURATION: Duration = Duration::from_millis(15000);

// ============================================================================
// Media kinds
// ============================================================================

/// Kind of media referenced by a playlist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image, displayed for exactly its requested duration
    Image,
    /// Video, displayed for min(requested, natural length)
    Video,
}

impl MediaKind {
    /// Parse a kind from the listing's `type` field
    ///
    /// Matching is case-insensitive; unknown values fall back to `Image`.
    pub fn from_type_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("video") {
            Self::Video
        } else {
            Self::Image
        }
    }

    /// Check if this is a video
    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// An immutable playlist entry: where to fetch the media and how long to
/// show it
///
/// Descriptors are created by the playlist provider and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    source_uri: String,
    kind: MediaKind,
    duration: Duration,
}

impl MediaDescriptor {
    /// Create a new descriptor
    pub fn new(source_uri: impl Into<String>, kind: MediaKind, duration: Duration) -> Self {
        Self {
            source_uri: source_uri.into(),
            kind,
            duration,
        }
    }

    /// Remote locator of the media
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    /// Kind of media
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Requested display duration (an upper bound for videos)
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

// ============================================================================
// Wire format
// ============================================================================

/// One entry of the remote listing
///
/// ```json
/// {"url": "https://cdn.example.com/spot.mp4", "type": "video", "durationInSeconds": 20}
/// ```
///
/// The same shape is accepted from the YAML fallback file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemEntry {
    /// Remote locator of the media
    pub url: String,
    /// `"video"` or `"image"`; anything else is treated as an image
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Explicit display duration in seconds
    pub duration_in_seconds: Option<u64>,
}

impl MediaItemEntry {
    /// Convert the wire entry into a descriptor
    ///
    /// An explicit duration wins; otherwise images default to 5 s and
    /// videos to 15 s.
    pub fn into_descriptor(self) -> MediaDescriptor {
        let kind = self
            .kind
            .as_deref()
            .map(MediaKind::from_type_str)
            .unwrap_or(MediaKind::Image);

        let duration = match self.duration_in_seconds {
            Some(secs) => Duration::from_secs(secs),
            None if kind.is_video() => DEFAULT_VIDEO_DURATION,
            None => DEFAULT_IMAGE_DURATION,
        };

        MediaDescriptor::new(self.url, kind, duration)
    }
}
