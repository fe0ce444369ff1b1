//! Comment records and the normalization stage

mod normalize;
mod types;

pub use normalize::{compile_filter_pattern, normalize, CleaningStats, NormalizeOptions};
pub use types::{CommentId, NormalizedComment, RawComment};
