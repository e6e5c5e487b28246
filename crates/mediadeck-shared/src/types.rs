use std::borrow::Borrow;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TimestampError;
use crate::time::parse_timestamp;

// ---------------------------------------------------------------------------
// MediaId
// ---------------------------------------------------------------------------

/// Opaque post identifier assigned by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for MediaId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MediaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// MediaEntry
// ---------------------------------------------------------------------------

/// One user post with its attached media.
///
/// Entries are treated as immutable once indexed; an update is a fresh entry
/// with the same id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    pub id: MediaId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Publishing state. Open-ended: providers add labels over time.
    pub status: String,
    /// Raw provider timestamp; see [`MediaEntry::created_at_utc`].
    pub created_at: String,
    #[serde(default)]
    pub target_platforms: BTreeSet<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl MediaEntry {
    pub fn new(
        id: impl Into<MediaId>,
        status: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: None,
            status: status.into(),
            created_at: created_at.into(),
            target_platforms: BTreeSet::new(),
            tags: BTreeSet::new(),
            video_url: None,
            image_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Parse `created_at` into a UTC instant.
    pub fn created_at_utc(&self) -> Result<DateTime<Utc>, TimestampError> {
        parse_timestamp(&self.created_at)
    }

    /// Whether the post carries at least one playable or viewable reference.
    pub fn has_media(&self) -> bool {
        self.video_url.is_some() || self.image_url.is_some()
    }

    /// Key used for the thumbnail cache: the still image, else the video.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.image_url.as_deref().or(self.video_url.as_deref())
    }
}

// ---------------------------------------------------------------------------
// PromptEntry
// ---------------------------------------------------------------------------

/// A prompt submitted to the image generator, with the parameters used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromptEntry {
    pub id: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
    pub style: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PromptEntry {
    /// Record a new prompt with a fresh id, stamped now.
    pub fn new(
        prompt: impl Into<String>,
        size: impl Into<String>,
        quality: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            size: size.into(),
            quality: quality.into(),
            style: style.into(),
            timestamp: Utc::now(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_entry_from_provider_json() {
        let json = r#"{
            "id": "post-1",
            "title": "Sunset",
            "status": "published",
            "createdAt": "2024-03-10T18:00:00Z",
            "targetPlatforms": ["youtube", "instagram"],
            "tags": ["travel"],
            "imageUrl": "https://cdn.example/sunset.jpg"
        }"#;

        let entry: MediaEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id.as_str(), "post-1");
        assert_eq!(entry.target_platforms.len(), 2);
        assert!(entry.content.is_none());
        assert!(entry.video_url.is_none());
        assert!(entry.has_media());
        assert!(entry.created_at_utc().is_ok());
    }

    #[test]
    fn test_thumbnail_url_prefers_image() {
        let both = MediaEntry::new("a", "draft", "2024-01-01")
            .with_video("v.mp4")
            .with_image("i.jpg");
        assert_eq!(both.thumbnail_url(), Some("i.jpg"));

        let video_only = MediaEntry::new("b", "draft", "2024-01-01").with_video("v.mp4");
        assert_eq!(video_only.thumbnail_url(), Some("v.mp4"));

        let bare = MediaEntry::new("c", "draft", "2024-01-01");
        assert!(!bare.has_media());
        assert_eq!(bare.thumbnail_url(), None);
    }

    #[test]
    fn test_prompt_entry_ids_are_unique() {
        let a = PromptEntry::new("a cat", "1024x1024", "hd", "vivid");
        let b = PromptEntry::new("a cat", "1024x1024", "hd", "vivid");
        assert_ne!(a.id, b.id);
        assert!(a.image_url.is_none());
    }
}
