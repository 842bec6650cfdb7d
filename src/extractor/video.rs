use regex::Regex;
use std::sync::LazyLock;

use crate::extractor::model::ContentType;

static VIDEO_HOST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://)?(?:www\.|m\.)?(?:youtube|youtu|youtube-nocookie)\.(?:com|be)/")
        .expect("Failed to compile video host regex")
});

/// Tried in order; the first capture wins.
static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:youtube\.com/watch\?v=|youtu\.be/|youtube(?:-nocookie)?\.com/embed/)([^&\n?#/]+)",
        r"(?i)youtube\.com/watch\?(?:.*&)?v=([^&\n?#]+)",
        r"(?i)youtu\.be/([^?&#/]+)",
        r"(?i)youtube(?:-nocookie)?\.com/embed/([^?&#/]+)",
        r"(?i)youtube\.com/shorts/([^?&#/]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile video id regex"))
    .collect()
});

/// Route a URL to the video or article path.
pub fn classify(url: &str) -> ContentType {
    if VIDEO_HOST_REGEX.is_match(url.trim()) {
        ContentType::Video
    } else {
        ContentType::Article
    }
}

/// Pull the video identifier out of any of the supported URL forms.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}
