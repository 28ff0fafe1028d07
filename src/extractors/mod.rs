use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `watch?v=ID` and any other URL carrying a `v=` parameter
static QUERY_PARAM_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v=([^&#]+)").expect("query-parameter pattern is valid"));

/// `youtu.be/ID` short links
static SHORT_LINK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"youtu\.be/([^&#]+)").expect("short-link pattern is valid"));

/// Which URL shape an identifier was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlShape {
    QueryParameter,
    ShortLink,
    /// Supplied as a bare identifier rather than a URL
    Bare,
}

/// A video identifier extracted from user input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub id: String,
    pub shape: UrlShape,
}

impl VideoReference {
    /// Accept either a URL or a bare identifier.
    ///
    /// Bare identifiers are only accepted when they contain no URL punctuation, so
    /// `https://example.com/video` is still rejected.
    pub fn from_input(input: &str) -> Option<Self> {
        if let Some(reference) = extract_video_id(input) {
            return Some(reference);
        }

        let trimmed = input.trim();
        let looks_bare = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        looks_bare.then(|| Self {
            id: trimmed.to_string(),
            shape: UrlShape::Bare,
        })
    }

    /// Canonical watch URL for display
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Extract a video identifier from a URL.
///
/// The query-parameter form is tried before the short-link form. The identifier runs
/// up to the next `&` or `#`; nothing else about its format is checked.
pub fn extract_video_id(url: &str) -> Option<VideoReference> {
    let capture = |re: &Regex| {
        re.captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    if let Some(id) = capture(&QUERY_PARAM_ID) {
        return Some(VideoReference {
            id,
            shape: UrlShape::QueryParameter,
        });
    }

    capture(&SHORT_LINK_ID).map(|id| VideoReference {
        id,
        shape: UrlShape::ShortLink,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url_with_extra_params() {
        let reference =
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&feature=share").unwrap();
        assert_eq!(reference.id, "dQw4w9WgXcQ");
        assert_eq!(reference.shape, UrlShape::QueryParameter);
    }

    #[test]
    fn test_short_link() {
        let reference = extract_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(reference.id, "dQw4w9WgXcQ");
        assert_eq!(reference.shape, UrlShape::ShortLink);
    }

    #[test]
    fn test_fragment_terminates_id() {
        let reference = extract_video_id("https://youtu.be/abc123#t=30").unwrap();
        assert_eq!(reference.id, "abc123");

        let reference = extract_video_id("https://m.youtube.com/watch?v=xyz#comments").unwrap();
        assert_eq!(reference.id, "xyz");
    }

    #[test]
    fn test_query_parameter_wins_over_short_link() {
        let reference = extract_video_id("https://youtu.be/short?v=long").unwrap();
        assert_eq!(reference.id, "long");
    }

    #[test]
    fn test_unrecognized_url() {
        assert_eq!(extract_video_id("https://example.com/video"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn test_from_input_accepts_bare_ids() {
        let reference = VideoReference::from_input("dQw4w9WgXcQ").unwrap();
        assert_eq!(reference.id, "dQw4w9WgXcQ");
        assert_eq!(reference.shape, UrlShape::Bare);

        assert!(VideoReference::from_input("https://example.com/video").is_none());
        assert!(VideoReference::from_input("   ").is_none());
    }

    #[test]
    fn test_watch_url() {
        let reference = extract_video_id("https://youtu.be/abc").unwrap();
        assert_eq!(reference.watch_url(), "https://www.youtube.com/watch?v=abc");
        assert_eq!(reference.to_string(), "abc");
    }
}
