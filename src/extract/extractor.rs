//! Opinion fragment extractor
//!
//! Per comment: split into sentences, detect features per sentence, score
//! each feature's part of the sentence against the sentiment buckets, keep
//! fragments that meet the confidence threshold, stop at the per-comment
//! cap. A comment with text but no surviving fragment gets one catch-all
//! fragment over the whole text.
//!
//! Extraction of one comment never looks at another, so batches can be
//! split into disjoint chunks and run on worker threads. Chunk results are
//! concatenated in input order, which keeps evidence selection downstream
//! reproducible.

use super::cancel::CancellationToken;
use super::dictionary::{DetectedFeature, Dictionaries, FeatureMatcher, MatchKind};
use super::fragment::{FragmentId, OpinionFragment};
use super::sentence::{
    clause_separator, context_window, split_clauses, split_sentences, Sentence, MIN_SENTENCE_CHARS,
};
use super::sentiment::{SentimentScore, SentimentScorer};
use crate::comment::NormalizedComment;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Highest confidence the extractor ever assigns.
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Floor for the catch-all fragment emitted when nothing else survived.
pub const FALLBACK_MIN_CONFIDENCE: f64 = 0.3;

const MAX_FRAGMENTS_LIMIT: usize = 50;
const CONTEXT_RADIUS: usize = 20;

// Confidence is accumulated in hundredths to keep threshold comparisons exact.
const BASE_POINTS: u32 = 50;
const PER_HIT_POINTS: u32 = 20;
const LENGTH_BONUS_POINTS: u32 = 10;
const LENGTH_BONUS_MIN_CHARS: usize = 10;
const SPECIFIC_FEATURE_POINTS: u32 = 10;
const CAP_POINTS: u32 = 95;

/// Extraction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub max_fragments_per_comment: usize,
    /// Fragments below this confidence are discarded
    pub confidence_threshold: f64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_fragments_per_comment: 10,
            confidence_threshold: 0.5,
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(1..=MAX_FRAGMENTS_LIMIT).contains(&self.max_fragments_per_comment) {
            errors.push(format!(
                "max_fragments_per_comment must be between 1 and {} (got {})",
                MAX_FRAGMENTS_LIMIT, self.max_fragments_per_comment
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            errors.push(format!(
                "confidence_threshold must be within [0, 1] (got {})",
                self.confidence_threshold
            ));
        } else if self.confidence_threshold > MAX_CONFIDENCE {
            errors.push(format!(
                "confidence_threshold {} exceeds the maximum assignable confidence {}",
                self.confidence_threshold, MAX_CONFIDENCE
            ));
        }
        errors
    }
}

/// Batch progress after each processed comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction of comments processed, in [0, 1]. An empty batch is done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Errors from fragment extraction
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid extraction configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("failed to compile pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("extraction cancelled after {processed} comments")]
    Cancelled { processed: usize },

    #[error("extraction worker failed: {0}")]
    Worker(String),
}

fn confidence_points(hits: u32, sentence_chars: usize, specific_feature: bool) -> u32 {
    let mut points = BASE_POINTS.saturating_add(PER_HIT_POINTS.saturating_mul(hits));
    if sentence_chars > LENGTH_BONUS_MIN_CHARS {
        points += LENGTH_BONUS_POINTS;
    }
    if specific_feature {
        points += SPECIFIC_FEATURE_POINTS;
    }
    points.min(CAP_POINTS)
}

fn points_to_confidence(points: u32) -> f64 {
    points as f64 / 100.0
}

fn names_in(feature: &DetectedFeature<'_>, lower_clause: &str) -> bool {
    feature.matched.iter().any(|k| lower_clause.contains(k))
}

/// Text a feature's sentiment is judged on.
///
/// The whole sentence unless it names two or more features by keyword.
/// Then each feature gets the clauses naming it plus the keyword-less
/// clauses that follow them; keyword-less clauses before the first naming
/// clause go to the features that clause names.
fn feature_scope(
    feature: &DetectedFeature<'_>,
    detected: &[DetectedFeature<'_>],
    sentence: &str,
    clauses: &[&str],
) -> String {
    let keyword_features = detected.iter().filter(|d| d.kind == MatchKind::Keyword).count();
    if feature.kind != MatchKind::Keyword || keyword_features < 2 || clauses.len() <= 1 {
        return sentence.to_string();
    }

    let lowered: Vec<String> = clauses.iter().map(|c| c.to_lowercase()).collect();
    let names_any = |lower: &str| detected.iter().any(|d| names_in(d, lower));
    let mut owned = lowered
        .iter()
        .find(|lower| names_any(lower.as_str()))
        .is_some_and(|lower| names_in(feature, lower.as_str()));

    let mut scope: Vec<&str> = Vec::new();
    for (clause, lower) in clauses.iter().zip(&lowered) {
        if names_any(lower) {
            owned = names_in(feature, lower);
        }
        if owned {
            scope.push(*clause);
        }
    }
    if scope.is_empty() {
        sentence.to_string()
    } else {
        scope.join(" ")
    }
}

/// Extracts opinion fragments from normalized comments.
#[derive(Debug, Clone)]
pub struct FragmentExtractor {
    features: FeatureMatcher,
    scorer: SentimentScorer,
    clauses: Regex,
    options: ExtractOptions,
}

impl FragmentExtractor {
    /// Validate the configuration and compile the dictionaries.
    pub fn new(dictionaries: &Dictionaries, options: ExtractOptions) -> Result<Self, ExtractError> {
        let mut errors = options.validate();
        errors.extend(dictionaries.validate());
        if !errors.is_empty() {
            return Err(ExtractError::InvalidConfig(errors));
        }

        Ok(Self {
            features: FeatureMatcher::new(&dictionaries.features),
            scorer: SentimentScorer::new(&dictionaries.sentiment)?,
            clauses: clause_separator()?,
            options,
        })
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Fragments for one comment, in sentence order.
    pub fn extract(&self, comment: &NormalizedComment) -> Vec<OpinionFragment> {
        let text = comment.cleaned_text.as_str();
        let max = self.options.max_fragments_per_comment;
        let mut fragments: Vec<OpinionFragment> = Vec::new();

        'sentences: for sentence in split_sentences(text) {
            let chars = sentence.char_len();
            if chars < MIN_SENTENCE_CHARS {
                continue;
            }
            let clauses = split_clauses(sentence.text, &self.clauses);

            let detected = self.features.detect(sentence.text);

            for feature in &detected {
                if fragments.len() >= max {
                    break 'sentences;
                }
                let scope = feature_scope(feature, &detected, sentence.text, &clauses);
                let score = self.scorer.score(&scope);
                let confidence = points_to_confidence(confidence_points(
                    score.hits,
                    chars,
                    feature.kind != MatchKind::CatchAll,
                ));
                if confidence < self.options.confidence_threshold {
                    continue;
                }
                let ordinal = fragments.len();
                fragments.push(self.build_fragment(comment, ordinal, feature.name, &sentence, score, confidence));
            }
        }

        if fragments.is_empty() {
            if let Some(fallback) = self.fallback_fragment(comment) {
                fragments.push(fallback);
            }
        }

        fragments
    }

    /// One catch-all fragment over the whole text.
    ///
    /// Confidence is floored at both the fallback minimum and the retention
    /// threshold, so every emitted fragment satisfies the threshold.
    fn fallback_fragment(&self, comment: &NormalizedComment) -> Option<OpinionFragment> {
        let text = comment.cleaned_text.as_str();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let start = text.len() - text.trim_start().len();
        let whole = Sentence {
            text: trimmed,
            start,
            end: start + trimmed.len(),
        };
        let score = self.scorer.score(trimmed);
        let computed = points_to_confidence(confidence_points(score.hits, whole.char_len(), false));
        let confidence = computed
            .max(FALLBACK_MIN_CONFIDENCE)
            .max(self.options.confidence_threshold)
            .min(MAX_CONFIDENCE);

        Some(self.build_fragment(comment, 0, self.features.catch_all(), &whole, score, confidence))
    }

    fn build_fragment(
        &self,
        comment: &NormalizedComment,
        ordinal: usize,
        feature: &str,
        sentence: &Sentence<'_>,
        score: SentimentScore,
        confidence: f64,
    ) -> OpinionFragment {
        OpinionFragment {
            id: FragmentId::derive(&comment.id, ordinal),
            comment_id: comment.id.clone(),
            feature: feature.to_string(),
            raw_text: sentence.text.to_string(),
            sentiment_label: score.label,
            confidence,
            span: (sentence.start, sentence.end),
            context: context_window(&comment.cleaned_text, sentence.start, sentence.end, CONTEXT_RADIUS),
        }
    }

    /// Extract a batch in input order.
    ///
    /// Reports progress after every comment and checks `cancel` before each
    /// one.
    pub fn extract_batch(
        &self,
        comments: &[NormalizedComment],
        on_progress: Option<&dyn Fn(Progress)>,
        cancel: &CancellationToken,
    ) -> Result<Vec<OpinionFragment>, ExtractError> {
        let total = comments.len();
        let mut fragments = Vec::new();

        for (i, comment) in comments.iter().enumerate() {
            if let Err(e) = cancel.ensure_active(i) {
                debug!(processed = i, total, "extraction cancelled");
                return Err(e);
            }
            fragments.extend(self.extract(comment));
            if let Some(report) = on_progress {
                report(Progress {
                    completed: i + 1,
                    total,
                });
            }
        }

        debug!(comments = total, fragments = fragments.len(), "extracted opinion fragments");
        Ok(fragments)
    }

    /// Extract a batch on up to `workers` blocking threads.
    ///
    /// Each worker owns a disjoint, contiguous chunk; results are merged in
    /// input order after the workers finish, so the output equals
    /// [`extract_batch`](Self::extract_batch). Progress is reported per
    /// finished chunk.
    pub async fn extract_batch_parallel(
        self: Arc<Self>,
        comments: Arc<[NormalizedComment]>,
        workers: usize,
        cancel: &CancellationToken,
        on_progress: Option<&(dyn Fn(Progress) + Sync)>,
    ) -> Result<Vec<OpinionFragment>, ExtractError> {
        let total = comments.len();
        let chunk_size = total.div_ceil(workers.max(1)).max(1);

        let mut handles = Vec::new();
        for start in (0..total).step_by(chunk_size) {
            let end = (start + chunk_size).min(total);
            let extractor = Arc::clone(&self);
            let comments = Arc::clone(&comments);
            let cancel = cancel.clone();
            let handle = tokio::task::spawn_blocking(move || {
                extractor.extract_batch(&comments[start..end], None, &cancel)
            });
            handles.push((handle, end - start));
        }

        let mut fragments = Vec::new();
        let mut processed = 0;
        let mut cancelled = false;
        for (handle, len) in handles {
            let chunk = handle
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))?;
            match chunk {
                Ok(chunk) => {
                    processed += len;
                    fragments.extend(chunk);
                    if let Some(report) = on_progress {
                        report(Progress {
                            completed: processed,
                            total,
                        });
                    }
                }
                Err(ExtractError::Cancelled { processed: done }) => {
                    processed += done;
                    cancelled = true;
                }
                Err(e) => return Err(e),
            }
        }

        if cancelled {
            debug!(processed, total, "parallel extraction cancelled");
            return Err(ExtractError::Cancelled { processed });
        }

        debug!(
            comments = total,
            fragments = fragments.len(),
            workers,
            "extracted opinion fragments in parallel"
        );
        Ok(fragments)
    }
}

/// Extract fragments for a batch of comments with a fresh extractor.
pub fn extract_fragments(
    comments: &[NormalizedComment],
    dictionaries: &Dictionaries,
    options: &ExtractOptions,
    on_progress: Option<&dyn Fn(Progress)>,
) -> Result<Vec<OpinionFragment>, ExtractError> {
    let extractor = FragmentExtractor::new(dictionaries, options.clone())?;
    extractor.extract_batch(comments, on_progress, &CancellationToken::new())
}
