//! Comment records as they enter and leave the normalizer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving normalized comment ids (UUIDv5).
const COMMENT_NAMESPACE: Uuid = Uuid::from_u128(0x6b61_6e6f_0001_4c0e_8a3d_5e2f_1c7b_9d40);

/// Identifier of a comment, raw or normalized
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id for the normalized form of `original` at input
    /// position `position`. Replaying normalization yields the same ids.
    pub fn derived(original: &CommentId, position: usize) -> Self {
        let name = format!("{}:{}", position, original.0);
        Self(Uuid::new_v5(&COMMENT_NAMESPACE, name.as_bytes()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CommentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A review as delivered by an ingestion source.
///
/// Immutable once created; only the normalizer reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub id: CommentId,
    pub text: String,
    /// Where the comment came from (e.g., "app_store", "text_input")
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Star rating, when the platform provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl RawComment {
    pub fn new(id: impl Into<CommentId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source: String::new(),
            timestamp: None,
            rating: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// A comment that survived cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedComment {
    pub id: CommentId,
    pub cleaned_text: String,
    pub original_id: CommentId,
}

impl NormalizedComment {
    pub fn new(id: CommentId, cleaned_text: impl Into<String>, original_id: CommentId) -> Self {
        Self {
            id,
            cleaned_text: cleaned_text.into(),
            original_id,
        }
    }
}
