//! Recommendation synthesis
//!
//! A fixed cascade of rules over the classified features. Each rule filters,
//! sorts by its driving metric, keeps its own top N and yields at most one
//! recommendation naming those features. Rules are independent, so a
//! feature can appear under more than one rule.

use crate::kano::{ClassifiedFeature, KanoCategory};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Recommendation priority. Orders high before low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action item derived from the classified features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub action: String,
    pub rationale: String,
    pub related_features: Vec<String>,
}

/// Features named per recommendation, per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopN {
    pub killer: usize,
    pub removal: usize,
    pub core: usize,
    pub quick_wins: usize,
    pub maintenance: usize,
}

impl TopN {
    /// The same limit for every rule.
    pub fn uniform(n: usize) -> Self {
        Self {
            killer: n,
            removal: n,
            core: n,
            quick_wins: n,
            maintenance: n,
        }
    }

    fn named(&self) -> [(&'static str, usize); 5] {
        [
            ("killer", self.killer),
            ("removal", self.removal),
            ("core", self.core),
            ("quick_wins", self.quick_wins),
            ("maintenance", self.maintenance),
        ]
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self {
            killer: 3,
            removal: 3,
            core: 3,
            quick_wins: 2,
            maintenance: 2,
        }
    }
}

/// Thresholds driving the rule cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendThresholds {
    /// Must-be features with a worse coefficient below this are killer issues
    pub killer_worse: f64,
    /// Minimum mentions for a one-dimensional feature to count as core
    pub mention_threshold: u32,
    /// Attractive features with a better coefficient above this are quick wins
    pub quick_win_better: f64,
    pub top_n: TopN,
}

impl Default for RecommendThresholds {
    fn default() -> Self {
        Self {
            killer_worse: -80.0,
            mention_threshold: 5,
            quick_win_better: 50.0,
            top_n: TopN::default(),
        }
    }
}

impl RecommendThresholds {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(-100.0..=0.0).contains(&self.killer_worse) {
            errors.push(format!(
                "killer_worse must be within [-100, 0] (got {})",
                self.killer_worse
            ));
        }
        if !(0.0..=100.0).contains(&self.quick_win_better) {
            errors.push(format!(
                "quick_win_better must be within [0, 100] (got {})",
                self.quick_win_better
            ));
        }
        for (rule, n) in self.top_n.named() {
            if n == 0 {
                errors.push(format!("top_n.{} must be at least 1", rule));
            }
        }
        errors
    }
}

/// Filter, sort descending by `key` (stable) and keep the first `n`.
fn top_by<'a>(
    features: impl Iterator<Item = &'a ClassifiedFeature>,
    key: impl Fn(&ClassifiedFeature) -> f64,
    n: usize,
) -> Vec<&'a ClassifiedFeature> {
    let mut selected: Vec<&ClassifiedFeature> = features.collect();
    selected.sort_by(|a, b| key(*b).partial_cmp(&key(*a)).unwrap_or(Ordering::Equal));
    selected.truncate(n);
    selected
}

fn names(features: &[&ClassifiedFeature]) -> Vec<String> {
    features.iter().map(|f| f.feature.clone()).collect()
}

fn listed(features: &[&ClassifiedFeature], value: impl Fn(&ClassifiedFeature) -> String) -> String {
    features
        .iter()
        .map(|f| format!("{} ({})", f.feature, value(*f)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bucket(
    priority: Priority,
    category: &str,
    features: &[&ClassifiedFeature],
    action: impl FnOnce(&str) -> String,
    rationale: String,
) -> Option<Recommendation> {
    if features.is_empty() {
        return None;
    }
    let related_features = names(features);
    Some(Recommendation {
        priority,
        category: category.to_string(),
        action: action(&related_features.join(", ")),
        rationale,
        related_features,
    })
}

/// Run the rule cascade. Output is ordered high, medium, low.
pub fn recommend(classified: &[ClassifiedFeature], thresholds: &RecommendThresholds) -> Vec<Recommendation> {
    let top_n = thresholds.top_n;
    let is = |category: KanoCategory| move |f: &&ClassifiedFeature| f.final_category == category;
    let is_killer = |f: &ClassifiedFeature| {
        f.final_category == KanoCategory::MustBe && f.worse_coefficient < thresholds.killer_worse
    };

    let killers = top_by(
        classified.iter().filter(|&f| is_killer(f)),
        |f| f.worse_coefficient.abs(),
        top_n.killer,
    );
    let removals = top_by(
        classified.iter().filter(is(KanoCategory::Reverse)),
        |f| f.category_share,
        top_n.removal,
    );
    let core = top_by(
        classified
            .iter()
            .filter(is(KanoCategory::OneDimensional))
            .filter(|f| f.total_votes >= thresholds.mention_threshold),
        |f| f64::from(f.total_votes),
        top_n.core,
    );
    let quick_wins = top_by(
        classified
            .iter()
            .filter(is(KanoCategory::Attractive))
            .filter(|f| f.better_coefficient > thresholds.quick_win_better),
        |f| f.better_coefficient,
        top_n.quick_wins,
    );
    let maintenance = top_by(
        classified
            .iter()
            .filter(is(KanoCategory::MustBe))
            .filter(|&f| !is_killer(f)),
        |f| f.worse_coefficient.abs(),
        top_n.maintenance,
    );

    [
        bucket(
            Priority::High,
            "killer issues",
            &killers,
            |names| format!("Fix {} immediately", names),
            format!(
                "Must-be features whose absence drives dissatisfaction, worse coefficient below {}: {}",
                thresholds.killer_worse,
                listed(&killers, |f| format!("worse {:.2}", f.worse_coefficient))
            ),
        ),
        bucket(
            Priority::High,
            "reverse-feature removal",
            &removals,
            |names| format!("Reconsider or remove {}", names),
            format!(
                "Users react negatively to these features being present: {}",
                listed(&removals, |f| format!("{:.1}% of votes", f.category_share))
            ),
        ),
        bucket(
            Priority::Medium,
            "core performance",
            &core,
            |names| format!("Schedule improvements to {} for the next release", names),
            format!(
                "One-dimensional features mentioned at least {} times, satisfaction tracks quality: {}",
                thresholds.mention_threshold,
                listed(&core, |f| format!("{} mentions, better {:.2}", f.total_votes, f.better_coefficient))
            ),
        ),
        bucket(
            Priority::Medium,
            "quick wins",
            &quick_wins,
            |names| format!("Ship {} as a highlight in a minor release", names),
            format!(
                "Attractive features with better coefficient above {}: {}",
                thresholds.quick_win_better,
                listed(&quick_wins, |f| format!("better {:.2}", f.better_coefficient))
            ),
        ),
        bucket(
            Priority::Low,
            "maintenance",
            &maintenance,
            |names| format!("Keep monitoring {}", names),
            format!(
                "Must-be features currently within tolerance; a regression would hurt: {}",
                listed(&maintenance, |f| format!("worse {:.2}", f.worse_coefficient))
            ),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
