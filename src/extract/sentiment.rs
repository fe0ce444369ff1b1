//! Sentiment labels, cue-phrase dictionary and bucket scoring
//!
//! Scoring counts distinct cue phrases present per bucket. The bucket with
//! the most hits wins; ties go to the bucket declared first. A negation
//! marker outside the winning cues (and outside the exemption phrases)
//! flips the four polar labels.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentiment intensity attached to an opinion fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    StrongPraise,
    WeakPraise,
    Suggestion,
    Neutral,
    WeakComplaint,
    StrongComplaint,
    /// A label string this crate does not know (only produced when
    /// fragments are read back from external data)
    #[serde(other)]
    Unrecognized,
}

/// Coarse direction of a sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// The six scored labels in bucket declaration order.
    pub const ALL: [SentimentLabel; 6] = [
        SentimentLabel::StrongPraise,
        SentimentLabel::WeakPraise,
        SentimentLabel::Suggestion,
        SentimentLabel::Neutral,
        SentimentLabel::WeakComplaint,
        SentimentLabel::StrongComplaint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongPraise => "strong_praise",
            Self::WeakPraise => "weak_praise",
            Self::Suggestion => "suggestion",
            Self::Neutral => "neutral",
            Self::WeakComplaint => "weak_complaint",
            Self::StrongComplaint => "strong_complaint",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Label after a negation marker. Only the four polar labels swap.
    pub fn negated(self) -> Self {
        match self {
            Self::StrongPraise => Self::WeakComplaint,
            Self::WeakComplaint => Self::StrongPraise,
            Self::WeakPraise => Self::StrongComplaint,
            Self::StrongComplaint => Self::WeakPraise,
            other => other,
        }
    }

    pub fn polarity(&self) -> Polarity {
        match self {
            Self::StrongPraise | Self::WeakPraise => Polarity::Positive,
            Self::WeakComplaint | Self::StrongComplaint => Polarity::Negative,
            Self::Suggestion | Self::Neutral | Self::Unrecognized => Polarity::Neutral,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Default cue phrases ────────────────────────────────────

const STRONG_PRAISE: &[&str] = &[
    "非常好", "超棒", "完美", "惊艳", "爱了", "绝了", "太棒了", "超赞", "神器", "非常满意",
    "amazing", "excellent", "perfect", "awesome", "fantastic", "outstanding", "love it",
    "brilliant",
];

const WEAK_PRAISE: &[&str] = &[
    "不错", "还行", "可以", "挺好", "满意", "喜欢", "好用", "舒服", "漂亮", "好看",
    "good", "nice", "great", "decent", "beautiful", "solid", "smooth", "happy with",
];

const SUGGESTION: &[&str] = &[
    "希望", "建议", "最好", "如果", "要是", "能够", "应该", "期待",
    "hope", "suggest", "wish", "should", "would be nice", "please add",
];

const NEUTRAL: &[&str] = &[
    "一般", "普通", "正常", "还好", "凑合", "马马虎虎",
    "okay", "average", "ordinary", "so-so", "acceptable",
];

const WEAK_COMPLAINT: &[&str] = &[
    "有点", "稍微", "略微", "不太", "感觉", "似乎", "可能", "贵", "卡",
    "a bit", "a little", "slightly", "somewhat", "kind of", "expensive", "laggy",
];

const STRONG_COMPLAINT: &[&str] = &[
    "很差", "糟糕", "垃圾", "坑", "失望", "后悔", "不行", "太差", "烂",
    "terrible", "awful", "worst", "garbage", "disappointed", "useless", "broken", "hate",
    "bad",
];

const NEGATIONS: &[&str] = &[
    "不", "没", "无", "非", "未", "别", "勿",
    "not", "no", "never", "don't", "doesn't", "isn't", "wasn't", "can't", "won't", "without",
];

/// Phrases that contain a negation marker without negating anything.
const NEGATION_EXEMPTIONS: &[&str] = &[
    "非常", "无论", "不错", "不过", "无敌", "不得不说", "no doubt", "not only",
];

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Six ordered buckets of cue phrases plus negation handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentDictionary {
    pub strong_praise: Vec<String>,
    pub weak_praise: Vec<String>,
    pub suggestion: Vec<String>,
    pub neutral: Vec<String>,
    pub weak_complaint: Vec<String>,
    pub strong_complaint: Vec<String>,
    /// Markers that invert polarity. Alphabetic markers match whole words.
    pub negations: Vec<String>,
    pub negation_exemptions: Vec<String>,
}

impl Default for SentimentDictionary {
    fn default() -> Self {
        Self {
            strong_praise: owned(STRONG_PRAISE),
            weak_praise: owned(WEAK_PRAISE),
            suggestion: owned(SUGGESTION),
            neutral: owned(NEUTRAL),
            weak_complaint: owned(WEAK_COMPLAINT),
            strong_complaint: owned(STRONG_COMPLAINT),
            negations: owned(NEGATIONS),
            negation_exemptions: owned(NEGATION_EXEMPTIONS),
        }
    }
}

impl SentimentDictionary {
    /// Cue phrases for a label (empty for `Unrecognized`).
    pub fn cues(&self, label: SentimentLabel) -> &[String] {
        match label {
            SentimentLabel::StrongPraise => &self.strong_praise,
            SentimentLabel::WeakPraise => &self.weak_praise,
            SentimentLabel::Suggestion => &self.suggestion,
            SentimentLabel::Neutral => &self.neutral,
            SentimentLabel::WeakComplaint => &self.weak_complaint,
            SentimentLabel::StrongComplaint => &self.strong_complaint,
            SentimentLabel::Unrecognized => &[],
        }
    }

    /// Human-readable problems with the dictionary.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for label in SentimentLabel::ALL {
            if self.cues(label).iter().any(|c| c.trim().is_empty()) {
                errors.push(format!("sentiment bucket '{}' contains a blank cue phrase", label));
            }
        }
        if self.negations.iter().any(|n| n.trim().is_empty()) {
            errors.push("negation markers contain a blank entry".to_string());
        }
        errors
    }
}

/// Winning bucket for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SentimentScore {
    pub label: SentimentLabel,
    /// Cue phrases of the winning bucket found in the text
    pub hits: u32,
}

/// Sentiment dictionary compiled for matching.
#[derive(Debug, Clone)]
pub(crate) struct SentimentScorer {
    buckets: Vec<(SentimentLabel, Vec<String>)>,
    exemptions: Vec<String>,
    negation: Option<Regex>,
}

fn lowered(phrases: &[String]) -> Vec<String> {
    phrases
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

/// One alternation over all markers; alphabetic markers get word boundaries
/// so "no" does not fire inside "know".
fn negation_regex(markers: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = lowered(markers)
        .into_iter()
        .map(|marker| {
            let escaped = regex::escape(&marker);
            if marker.chars().all(|c| c.is_ascii_alphanumeric() || c == '\'') {
                format!(r"\b{}\b", escaped)
            } else {
                escaped
            }
        })
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&alternatives.join("|")).map(Some)
}

impl SentimentScorer {
    pub fn new(dictionary: &SentimentDictionary) -> Result<Self, regex::Error> {
        Ok(Self {
            buckets: SentimentLabel::ALL
                .iter()
                .map(|&label| (label, lowered(dictionary.cues(label))))
                .collect(),
            exemptions: lowered(&dictionary.negation_exemptions),
            negation: negation_regex(&dictionary.negations)?,
        })
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        let lower = text.to_lowercase();
        let mut label = SentimentLabel::Neutral;
        let mut winning: Vec<&str> = Vec::new();

        for (bucket, cues) in &self.buckets {
            let matched: Vec<&str> = cues
                .iter()
                .map(String::as_str)
                .filter(|cue| lower.contains(cue))
                .collect();
            // Strictly greater: earlier buckets win ties
            if matched.len() > winning.len() {
                label = *bucket;
                winning = matched;
            }
        }

        if !winning.is_empty() && self.is_negated(&lower, &winning) {
            label = label.negated();
        }

        SentimentScore {
            label,
            hits: winning.len() as u32,
        }
    }

    fn is_negated(&self, lower: &str, winning: &[&str]) -> bool {
        let Some(negation) = &self.negation else {
            return false;
        };
        let mut masked = lower.to_string();
        for phrase in winning.iter().copied().chain(self.exemptions.iter().map(String::as_str)) {
            masked = masked.replace(phrase, " ");
        }
        negation.is_match(&masked)
    }
}
