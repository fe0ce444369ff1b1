//! Kanoscope: Feedback-to-Kano Insight Pipeline
//!
//! Turns free-form product reviews into a prioritized feature report using
//! the Kano model. Every mentioned attribute is classified as Must-be,
//! One-dimensional, Attractive, Indifferent, Reverse or Questionable, with
//! Better/Worse coefficients and a ranked list of actions.
//!
//! # Stages
//!
//! - **Normalize**: drop short and duplicate comments, strip noise patterns
//! - **Extract**: split comments into feature-scoped opinion fragments with
//!   a sentiment label and confidence
//! - **Classify**: map each fragment to a Kano vote, aggregate per feature
//! - **Recommend**: turn the classified features into tiered action items
//!
//! Each stage is a pure function over the previous stage's output;
//! [`Pipeline`] runs them in order with validation and invariant checks.
//!
//! # Example
//!
//! ```
//! use kanoscope::{KanoCategory, Pipeline, PipelineConfig, RawComment};
//!
//! let comments = vec![
//!     RawComment::new("1", "电池很差，一天要充三次电"),
//!     RawComment::new("2", "电池太差了，非常失望"),
//! ];
//! let report = Pipeline::new(PipelineConfig::default())?.run(&comments)?;
//!
//! let battery = &report.features[0];
//! assert_eq!(battery.feature, "battery");
//! assert_eq!(battery.final_category, KanoCategory::MustBe);
//! # Ok::<(), kanoscope::PipelineError>(())
//! ```

pub mod comment;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod kano;
pub mod pipeline;
pub mod recommend;
pub mod report;

pub use comment::{normalize, CleaningStats, CommentId, NormalizeOptions, NormalizedComment, RawComment};
pub use config::{ConfigError, PipelineConfig};
pub use extract::{
    extract_fragments, CancellationToken, Dictionaries, ExtractError, ExtractOptions, FragmentExtractor,
    OpinionFragment, Progress, SentimentLabel,
};
pub use ingest::{CommentSource, IngestError, JsonSource, TextSource};
pub use kano::{classify, ClassifiedFeature, FeatureVoteTally, KanoCategory, Votes};
pub use pipeline::{InvariantViolation, Pipeline, PipelineError, PipelineReport, RunStatus};
pub use recommend::{recommend, Priority, RecommendThresholds, Recommendation, TopN};
pub use report::{kano_table, read_table_csv, write_table_csv, ExtractionSummary, KanoTableRow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
