//! Opinion extraction: comment text to feature-scoped sentiment fragments
//!
//! Rule-based: keyword dictionaries detect features, cue-phrase buckets
//! score sentiment, and a negation pass flips polarity. Everything is
//! deterministic for a given configuration.

mod cancel;
mod dictionary;
mod extractor;
mod fragment;
mod sentence;
mod sentiment;

pub use cancel::CancellationToken;
pub use dictionary::{Dictionaries, FeatureDictionary, FeatureEntry, CATCH_ALL_FEATURE};
pub use extractor::{
    extract_fragments, ExtractError, ExtractOptions, FragmentExtractor, Progress,
    FALLBACK_MIN_CONFIDENCE, MAX_CONFIDENCE,
};
pub use fragment::{FragmentId, OpinionFragment};
pub use sentiment::{Polarity, SentimentDictionary, SentimentLabel};
