//! Comment normalizer: filtering, deduplication and noise stripping
//!
//! Stages run in a fixed order: minimum-length filter, case-insensitive
//! deduplication on the trimmed text, pattern stripping, whitespace
//! collapse. First occurrence wins a duplicate. Nothing here fails: a
//! record that cannot be cleaned is dropped and counted.

use super::types::{CommentId, NormalizedComment, RawComment};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Options for the normalization stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Drop comments whose trimmed text is shorter than `min_length`
    pub remove_empty: bool,
    /// Drop repeated comments (trimmed, lower-cased comparison)
    pub remove_duplicates: bool,
    /// Minimum trimmed length in characters
    pub min_length: usize,
    /// Regex patterns stripped from the text (global, case-insensitive)
    pub filter_patterns: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            remove_empty: true,
            remove_duplicates: true,
            min_length: 5,
            filter_patterns: Vec::new(),
        }
    }
}

impl NormalizeOptions {
    /// Filter patterns that do not compile.
    ///
    /// [`normalize`] itself tolerates these; configuration loading rejects
    /// them up front.
    pub fn validate(&self) -> Vec<String> {
        self.filter_patterns
            .iter()
            .filter_map(|pattern| {
                compile_filter_pattern(pattern)
                    .err()
                    .map(|e| format!("filter pattern '{}' is invalid: {}", pattern, e))
            })
            .collect()
    }
}

/// Counts reported by [`normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningStats {
    /// Dropped by the minimum-length filter
    pub removed: usize,
    /// Dropped as duplicates of an earlier comment
    pub duplicates: usize,
    /// Dropped because nothing was left after pattern stripping
    pub emptied: usize,
    /// Comments that survived
    pub cleaned: usize,
}

/// Compile a filter pattern the way the normalizer applies it.
pub fn compile_filter_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Compile every valid pattern, skipping (and logging) the invalid ones.
fn compile_filters(patterns: &[String]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|pattern| match compile_filter_pattern(pattern) {
            Ok(regex) => Some(regex),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "skipping invalid filter pattern");
                None
            }
        })
        .collect()
}

/// Strip filter matches and collapse whitespace runs.
fn clean_text(text: &str, filters: &[Regex]) -> String {
    let mut cleaned = text.to_string();
    for filter in filters {
        cleaned = filter.replace_all(&cleaned, "").into_owned();
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize raw comments.
///
/// Returns surviving comments in input order together with drop counts.
pub fn normalize(
    raw: &[RawComment],
    options: &NormalizeOptions,
) -> (Vec<NormalizedComment>, CleaningStats) {
    let filters = compile_filters(&options.filter_patterns);
    let mut stats = CleaningStats::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut normalized = Vec::with_capacity(raw.len());

    for (position, comment) in raw.iter().enumerate() {
        let trimmed = comment.text.trim();

        if options.remove_empty && trimmed.chars().count() < options.min_length {
            stats.removed += 1;
            continue;
        }

        if options.remove_duplicates && !seen.insert(trimmed.to_lowercase()) {
            stats.duplicates += 1;
            continue;
        }

        let cleaned = clean_text(trimmed, &filters);
        if cleaned.is_empty() {
            stats.emptied += 1;
            continue;
        }

        normalized.push(NormalizedComment::new(
            CommentId::derived(&comment.id, position),
            cleaned,
            comment.id.clone(),
        ));
    }

    stats.cleaned = normalized.len();
    debug!(
        input = raw.len(),
        removed = stats.removed,
        duplicates = stats.duplicates,
        emptied = stats.emptied,
        cleaned = stats.cleaned,
        "normalized comments"
    );

    (normalized, stats)
}
