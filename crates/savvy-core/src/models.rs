//! Data models for Savvy
//!
//! Defines the core data structures: Link, Category, and the LinkType tag.
//! Field names mirror the remote table schema so rows map cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of content a saved link points at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// A regular web page or article
    Link,
    /// Video content (YouTube, Vimeo, ...)
    Video,
    /// An image, either uploaded or hosted
    Image,
    /// Music or podcast content
    Music,
    /// A plain text note
    Text,
    /// Anything that doesn't fit the other buckets
    Other,
}

impl LinkType {
    /// Classify a URL by well-known host and extension patterns
    ///
    /// Falls back to `Link` for ordinary web pages. The checks are
    /// case-insensitive substring matches, same as the mobile app's parser.
    pub fn detect(url: &str) -> Self {
        let url = url.to_lowercase();

        // Music platforms (podcast hosts land here too)
        if url.contains("spotify.com/track")
            || url.contains("spotify.com/album")
            || url.contains("spotify.com/playlist")
            || url.contains("spotify.com/episode")
            || url.contains("music.apple.com")
            || url.contains("podcasts.apple.com")
            || url.contains("soundcloud.com")
            || url.contains("bandcamp.com")
            || url.contains("anchor.fm")
            || url.contains("music.youtube.com")
        {
            return LinkType::Music;
        }

        // Video platforms
        if url.contains("youtube.com")
            || url.contains("youtu.be")
            || url.contains("vimeo.com")
            || url.contains("twitch.tv")
            || url.contains("dailymotion.com")
            || url.contains("tiktok.com")
        {
            return LinkType::Video;
        }

        // Image hosting and raw image files
        if url.contains("flickr.com")
            || url.contains("imgur.com")
            || url.contains("instagram.com/p/")
            || has_extension(&url, &["jpg", "jpeg", "png", "gif", "webp"])
        {
            return LinkType::Image;
        }

        // Document hosts and office formats
        if url.contains("docs.google.com")
            || url.contains("dropbox.com")
            || has_extension(&url, &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx"])
        {
            return LinkType::Other;
        }

        LinkType::Link
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            LinkType::Link => "link",
            LinkType::Video => "video",
            LinkType::Image => "image",
            LinkType::Music => "music",
            LinkType::Text => "text",
            LinkType::Other => "other",
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LinkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "link" => Ok(LinkType::Link),
            "video" => Ok(LinkType::Video),
            "image" => Ok(LinkType::Image),
            "music" => Ok(LinkType::Music),
            "text" => Ok(LinkType::Text),
            "other" => Ok(LinkType::Other),
            other => Err(format!("unknown link type: {}", other)),
        }
    }
}

/// Check whether the URL path ends with one of the given extensions,
/// allowing a trailing query string.
fn has_extension(url: &str, exts: &[&str]) -> bool {
    let path = url.split('?').next().unwrap_or(url);
    exts.iter().any(|ext| {
        path.rsplit('.')
            .next()
            .map(|tail| tail == *ext)
            .unwrap_or(false)
    })
}

/// A saved item ("savvy"): URL, image, or note with a type tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    /// Unique identifier
    pub id: Uuid,
    /// The URL (for uploaded images this is the public object URL)
    pub url: String,
    /// Display title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Optional thumbnail URL
    pub thumbnail: Option<String>,
    /// Content type tag
    pub kind: LinkType,
    /// Categories this link belongs to
    pub category_ids: Vec<Uuid>,
    /// Whether the link has been read/watched
    pub is_read: bool,
    /// When the link was marked read
    pub read_at: Option<DateTime<Utc>>,
    /// Reading/watching progress, 0-100
    pub progress: Option<u8>,
    /// When this link was created
    pub created_at: DateTime<Utc>,
    /// When this link was last updated
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Create a new link with defaults: unread, no progress, type detected
    /// from the URL, timestamps set to now.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: url.clone(),
            kind: LinkType::detect(&url),
            url,
            description: None,
            thumbnail: None,
            category_ids: Vec::new(),
            is_read: false,
            read_at: None,
            progress: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Update the description
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Update the thumbnail URL
    pub fn set_thumbnail(&mut self, thumbnail: Option<String>) {
        self.thumbnail = thumbnail;
        self.touch();
    }

    /// Override the detected type
    pub fn set_kind(&mut self, kind: LinkType) {
        self.kind = kind;
        self.touch();
    }

    /// Mark the link read, recording when
    pub fn mark_read(&mut self) {
        self.is_read = true;
        self.read_at = Some(Utc::now());
        self.touch();
    }

    /// Mark the link unread again
    pub fn mark_unread(&mut self) {
        self.is_read = false;
        self.read_at = None;
        self.touch();
    }

    /// Set progress, clamped to 0-100
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = Some(progress.min(100));
        self.touch();
    }

    /// Attach a category (idempotent)
    pub fn add_category(&mut self, category_id: Uuid) {
        if !self.category_ids.contains(&category_id) {
            self.category_ids.push(category_id);
            self.touch();
        }
    }

    /// Detach a category if present
    pub fn remove_category(&mut self, category_id: Uuid) {
        if let Some(pos) = self.category_ids.iter().position(|id| *id == category_id) {
            self.category_ids.remove(pos);
            self.touch();
        }
    }

    /// Replace all category associations
    pub fn set_categories(&mut self, category_ids: Vec<Uuid>) {
        self.category_ids = category_ids;
        self.touch();
    }

    /// Whether this link belongs to the given category
    pub fn in_category(&self, category_id: Uuid) -> bool {
        self.category_ids.contains(&category_id)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A user-defined grouping with a display color
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Hex color, e.g. "#0A84FF"
    pub color: String,
    /// Optional icon name
    pub icon: Option<String>,
    /// When this category was created
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            icon: None,
            created_at: Utc::now(),
        }
    }

    /// The categories seeded into a fresh account
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new("Articles", "#0A84FF"),
            Category::new("Technology", "#FF2D55"),
            Category::new("Tutorials", "#5856D6"),
            Category::new("Business", "#FF9500"),
        ]
    }

    /// Rename the category, optionally changing its color
    pub fn edit(&mut self, name: impl Into<String>, color: Option<String>) {
        self.name = name.into();
        if let Some(color) = color {
            self.color = color;
        }
    }
}
