//! Validation of video links submitted for analysis
//!
//! Accepts the three YouTube link shapes, each with optional scheme and
//! `www.` prefix. Only the prefix is matched, so trailing query parameters
//! such as `&t=30s` are allowed.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    /// `youtube.com/watch?v=<id>`
    Watch,
    /// `youtube.com/shorts/<id>`
    Shorts,
    /// `youtu.be/<id>`
    Short,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidVideoUrl {
    #[error("Please enter a YouTube URL")]
    Empty,
    #[error("Invalid YouTube URL format")]
    Unrecognized,
}

static PATTERNS: LazyLock<[(UrlShape, Regex); 3]> = LazyLock::new(|| {
    [
        (
            UrlShape::Watch,
            Regex::new(r"^(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]+)")
                .expect("watch pattern"),
        ),
        (
            UrlShape::Short,
            Regex::new(r"^(?:https?://)?(?:www\.)?youtu\.be/([A-Za-z0-9_-]+)")
                .expect("short-domain pattern"),
        ),
        (
            UrlShape::Shorts,
            Regex::new(r"^(?:https?://)?(?:www\.)?youtube\.com/shorts/([A-Za-z0-9_-]+)")
                .expect("shorts pattern"),
        ),
    ]
});

/// A link that matched one of the recognized shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUrl {
    raw: String,
    video_id: String,
    shape: UrlShape,
}

impl VideoUrl {
    pub fn parse(input: &str) -> Result<Self, InvalidVideoUrl> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(InvalidVideoUrl::Empty);
        }

        PATTERNS
            .iter()
            .find_map(|(shape, pattern)| {
                pattern.captures(raw).map(|caps| VideoUrl {
                    raw: raw.to_string(),
                    video_id: caps[1].to_string(),
                    shape: *shape,
                })
            })
            .ok_or(InvalidVideoUrl::Unrecognized)
    }

    /// The submitted link, trimmed
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn shape(&self) -> UrlShape {
        self.shape
    }

    /// Fully-qualified https form of the link, for handing to downloaders
    /// that need a scheme.
    pub fn canonical(&self) -> String {
        match self.shape {
            UrlShape::Watch => format!("https://www.youtube.com/watch?v={}", self.video_id),
            UrlShape::Shorts => format!("https://www.youtube.com/shorts/{}", self.video_id),
            UrlShape::Short => format!("https://youtu.be/{}", self.video_id),
        }
    }
}

impl std::fmt::Display for VideoUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
