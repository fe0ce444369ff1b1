//! Opinion fragments: feature-scoped judgments taken from a comment

use super::sentiment::SentimentLabel;
use crate::comment::CommentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving fragment ids (UUIDv5).
const FRAGMENT_NAMESPACE: Uuid = Uuid::from_u128(0x6b61_6e6f_0002_4f4a_9b1e_3c5d_7a8f_2e61);

/// Unique identifier for a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(Uuid);

impl FragmentId {
    /// Deterministic id of the `ordinal`-th fragment of a comment.
    pub fn derive(comment_id: &CommentId, ordinal: usize) -> Self {
        let name = format!("{}#{}", comment_id, ordinal);
        Self(Uuid::new_v5(&FRAGMENT_NAMESPACE, name.as_bytes()))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A snippet of a comment carrying one sentiment judgment about one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionFragment {
    pub id: FragmentId,
    /// Normalized comment the fragment was cut from
    pub comment_id: CommentId,
    pub feature: String,
    /// Evidence text, equal to `cleaned_text[span.0..span.1]`
    pub raw_text: String,
    pub sentiment_label: SentimentLabel,
    pub confidence: f64,
    /// Byte range into the owning comment's cleaned text
    pub span: (usize, usize),
    pub context: String,
}
