//! End-to-end pipeline: raw comments in, Kano report out
//!
//! Stages run strictly in order over immutable snapshots:
//! normalize → extract → classify → recommend. Configuration is validated
//! once, before anything runs. Input-quality problems (nothing to analyze)
//! are reported through [`RunStatus`] on an otherwise empty report;
//! internal invariant violations abort the run with
//! [`PipelineError::Invariant`].

use crate::comment::{normalize, CleaningStats, CommentId, NormalizedComment, RawComment};
use crate::config::PipelineConfig;
use crate::extract::{
    CancellationToken, ExtractError, FragmentExtractor, FragmentId, OpinionFragment, Progress,
    MAX_CONFIDENCE,
};
use crate::kano::{classify, ClassifiedFeature};
use crate::recommend::{recommend, Recommendation};
use crate::report::{
    category_distribution, kano_table, render_table, CategoryCount, ExtractionSummary, KanoTableRow,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a run with respect to input quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// No comments were supplied
    EmptyCorpus,
    /// Every comment was dropped by normalization
    AllFiltered,
    /// Comments survived but produced no fragments
    NoFragments,
}

impl RunStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Completed => "analysis completed",
            Self::EmptyCorpus => "no comments to analyze: the input is empty",
            Self::AllFiltered => "all comments were filtered out during cleaning",
            Self::NoFragments => "no opinion fragments could be extracted",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A broken internal guarantee. Always a bug, never bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("fragment {fragment} span {start}..{end} is outside comment {comment} ({len} bytes)")]
    SpanOutOfBounds {
        fragment: FragmentId,
        comment: CommentId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("fragment {fragment} raw text does not match its span")]
    SpanTextMismatch { fragment: FragmentId },

    #[error("fragment {fragment} references unknown comment {comment}")]
    UnknownComment {
        fragment: FragmentId,
        comment: CommentId,
    },

    #[error("fragment {fragment} confidence {confidence} is outside [{threshold}, {max}]")]
    ConfidenceOutOfRange {
        fragment: FragmentId,
        confidence: f64,
        threshold: f64,
        max: f64,
    },

    #[error("feature '{feature}' has {votes} votes for {fragments} fragments")]
    VoteSumMismatch {
        feature: String,
        votes: u32,
        fragments: usize,
    },
}

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("pipeline cancelled after {processed} comments")]
    Cancelled { processed: usize },

    #[error("extraction worker failed: {0}")]
    Worker(String),
}

impl From<ExtractError> for PipelineError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::InvalidConfig(errors) => Self::InvalidConfig(errors),
            ExtractError::Pattern(e) => Self::InvalidConfig(vec![e.to_string()]),
            ExtractError::Cancelled { processed } => Self::Cancelled { processed },
            ExtractError::Worker(msg) => Self::Worker(msg),
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub status: RunStatus,
    pub message: String,
    pub cleaning: CleaningStats,
    pub comments: Vec<NormalizedComment>,
    pub fragments: Vec<OpinionFragment>,
    pub features: Vec<ClassifiedFeature>,
    pub table: Vec<KanoTableRow>,
    pub recommendations: Vec<Recommendation>,
    pub summary: ExtractionSummary,
    pub category_distribution: Vec<CategoryCount>,
}

impl PipelineReport {
    /// Terminal rendering: status line, then the table and action items.
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{} ({} comments, {} fragments, {} features)\n\n",
            self.status,
            self.comments.len(),
            self.fragments.len(),
            self.features.len()
        );
        text.push_str(&render_table(&self.table, &self.recommendations));
        text
    }
}

/// Check every fragment against the comment it was cut from.
pub fn verify_fragments(
    comments: &[NormalizedComment],
    fragments: &[OpinionFragment],
    threshold: f64,
) -> Result<(), InvariantViolation> {
    let by_id: HashMap<&CommentId, &NormalizedComment> = comments.iter().map(|c| (&c.id, c)).collect();

    for fragment in fragments {
        let comment = by_id
            .get(&fragment.comment_id)
            .ok_or_else(|| InvariantViolation::UnknownComment {
                fragment: fragment.id,
                comment: fragment.comment_id.clone(),
            })?;

        let text = comment.cleaned_text.as_str();
        let (start, end) = fragment.span;
        if start > end || end > text.len() {
            return Err(InvariantViolation::SpanOutOfBounds {
                fragment: fragment.id,
                comment: comment.id.clone(),
                start,
                end,
                len: text.len(),
            });
        }
        if text.get(start..end) != Some(fragment.raw_text.as_str()) {
            return Err(InvariantViolation::SpanTextMismatch { fragment: fragment.id });
        }

        if fragment.confidence < threshold || fragment.confidence > MAX_CONFIDENCE {
            return Err(InvariantViolation::ConfidenceOutOfRange {
                fragment: fragment.id,
                confidence: fragment.confidence,
                threshold,
                max: MAX_CONFIDENCE,
            });
        }
    }
    Ok(())
}

/// Check that every feature's votes add up to its fragment count.
pub fn verify_classification(
    fragments: &[OpinionFragment],
    classified: &[ClassifiedFeature],
) -> Result<(), InvariantViolation> {
    let mut mentions: HashMap<&str, usize> = HashMap::new();
    for fragment in fragments {
        *mentions.entry(fragment.feature.as_str()).or_default() += 1;
    }

    for feature in classified {
        let expected = mentions.get(feature.feature.as_str()).copied().unwrap_or(0);
        let votes = feature.votes.total();
        if votes != feature.total_votes || votes as usize != expected {
            return Err(InvariantViolation::VoteSumMismatch {
                feature: feature.feature.clone(),
                votes,
                fragments: expected,
            });
        }
    }
    Ok(())
}

/// A validated configuration with its compiled extractor.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Arc<FragmentExtractor>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(PipelineError::InvalidConfig(errors));
        }
        let extractor = FragmentExtractor::new(&config.dictionaries, config.extraction.clone())?;
        Ok(Self {
            config,
            extractor: Arc::new(extractor),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage sequentially.
    pub fn run(&self, raw: &[RawComment]) -> Result<PipelineReport, PipelineError> {
        self.run_with(raw, None, &CancellationToken::new())
    }

    /// Run sequentially with extraction progress and cancellation.
    pub fn run_with(
        &self,
        raw: &[RawComment],
        on_progress: Option<&dyn Fn(Progress)>,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let (comments, cleaning) = normalize(raw, &self.config.processing);
        let fragments = if comments.is_empty() {
            Vec::new()
        } else {
            self.extractor.extract_batch(&comments, on_progress, cancel)?
        };
        self.finish(raw.len(), cleaning, comments, fragments)
    }

    /// Run with extraction spread over `workers` blocking threads.
    ///
    /// Produces the same report contents as [`run`](Self::run).
    pub async fn run_parallel(
        &self,
        raw: &[RawComment],
        workers: usize,
        cancel: &CancellationToken,
        on_progress: Option<&(dyn Fn(Progress) + Sync)>,
    ) -> Result<PipelineReport, PipelineError> {
        let (comments, cleaning) = normalize(raw, &self.config.processing);
        let fragments = if comments.is_empty() {
            Vec::new()
        } else {
            let shared: Arc<[NormalizedComment]> = comments.clone().into();
            Arc::clone(&self.extractor)
                .extract_batch_parallel(shared, workers, cancel, on_progress)
                .await?
        };
        self.finish(raw.len(), cleaning, comments, fragments)
    }

    fn finish(
        &self,
        input: usize,
        cleaning: CleaningStats,
        comments: Vec<NormalizedComment>,
        fragments: Vec<OpinionFragment>,
    ) -> Result<PipelineReport, PipelineError> {
        verify_fragments(&comments, &fragments, self.config.extraction.confidence_threshold)?;

        let features = classify(&fragments);
        verify_classification(&fragments, &features)?;
        debug!(features = features.len(), "classified features");

        let recommendations = recommend(&features, &self.config.thresholds);
        debug!(recommendations = recommendations.len(), "synthesized recommendations");

        let status = if input == 0 {
            RunStatus::EmptyCorpus
        } else if comments.is_empty() {
            RunStatus::AllFiltered
        } else if fragments.is_empty() {
            RunStatus::NoFragments
        } else {
            RunStatus::Completed
        };

        let report = PipelineReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            status,
            message: status.message().to_string(),
            cleaning,
            table: kano_table(&features),
            summary: ExtractionSummary::from_fragments(&fragments, comments.len()),
            category_distribution: category_distribution(&features),
            comments,
            fragments,
            features,
            recommendations,
        };

        if status.is_completed() {
            info!(
                run_id = %report.run_id,
                comments = report.comments.len(),
                fragments = report.fragments.len(),
                features = report.features.len(),
                "analysis completed"
            );
        } else {
            warn!(run_id = %report.run_id, status = ?status, "{}", status.message());
        }

        Ok(report)
    }
}
