//! Comment records as the scheduler consumes them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest comment (in characters) the submission form accepts.
pub const MAX_COMMENT_CHARS: usize = 40;

/// Identifier assigned to a comment by the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A persisted comment.
///
/// Immutable apart from `likes_count`, which only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes_count: u32,
}

impl Comment {
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CommentId::new(id),
            text: text.into(),
            created_at,
            likes_count: 0,
        }
    }

    #[must_use]
    pub fn with_likes(mut self, likes_count: u32) -> Self {
        self.likes_count = likes_count;
        self
    }

    /// Whether this comment may ever be released onto the screen.
    ///
    /// Rows with a blank id or whitespace-only text are skipped silently.
    pub fn is_displayable(&self) -> bool {
        !self.id.is_empty() && !self.text.trim().is_empty()
    }
}

/// Trims a user submission and enforces the length cap.
///
/// Returns `None` for blank input. Overlong input is cut at
/// [`MAX_COMMENT_CHARS`] characters rather than rejected.
pub fn normalize_submission(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_COMMENT_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_displayable_rules() {
        assert!(Comment::new("1", "hi", at(0)).is_displayable());
        assert!(!Comment::new("2", "   ", at(0)).is_displayable());
        assert!(!Comment::new("", "hello", at(0)).is_displayable());
        assert!(!Comment::new("3", "\n\t", at(0)).is_displayable());
    }

    #[test]
    fn test_normalize_submission() {
        assert_eq!(normalize_submission("  hello  "), Some("hello".to_string()));
        assert_eq!(normalize_submission("   "), None);

        let long = "가".repeat(MAX_COMMENT_CHARS + 10);
        let normalized = normalize_submission(&long).unwrap();
        assert_eq!(normalized.chars().count(), MAX_COMMENT_CHARS);
    }

    #[test]
    fn test_comment_json_shape() {
        let comment = Comment::new("abc", "hi", at(10)).with_likes(3);
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["likesCount"], 3);
        assert!(json.get("createdAt").is_some());
    }
}
