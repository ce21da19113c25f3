//! Video link recognition.
//!
//! Only YouTube links are accepted. The 11-character video id is what gets
//! stored and compared for de-duplication; the submitted URL is kept for
//! display only.

use std::sync::LazyLock;

use regex::Regex;

use crate::{AppError, AppResult};

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:https?://)?
        (?:
            (?:www\.)?youtube\.com/(?:watch\?v=|embed/|v/)
            |
            youtu\.be/
        )
        ([A-Za-z0-9_-]{11})
        ",
    )
    .expect("youtube regex is valid")
});

/// Extract the platform video id from a link, if it is a recognized one.
#[must_use]
pub fn extract_video_id(url: &str) -> Option<String> {
    YOUTUBE_RE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Like [`extract_video_id`], but reports unrecognized links as a validation error.
pub fn validate_video_url(url: &str) -> AppResult<String> {
    extract_video_id(url)
        .ok_or_else(|| AppError::Validation(format!("Not a valid YouTube link: {}", url.trim())))
}
