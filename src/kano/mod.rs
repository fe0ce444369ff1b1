//! Kano classification: sentiment labels to categories and coefficients

mod category;
mod classify;
mod matrix;

pub(crate) use classify::round_to;

pub use category::KanoCategory;
pub use classify::{classify, tally, ClassifiedFeature, FeatureVoteTally, Votes, MAX_EVIDENCE_TEXTS};
pub use matrix::{answer_pair, evaluate, vote_for, KanoAnswer, KANO_MATRIX, SENTIMENT_ANSWERS};
