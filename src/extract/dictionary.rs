//! Feature keyword dictionary and feature detection
//!
//! A feature is a canonical name plus keyword aliases ("贵", "价格" and
//! "price" all detect `price`). Detection is a case-insensitive substring
//! scan in dictionary order. When no keyword hits, ordered fallback rules
//! (usage verbs, visual words, currency) apply; failing those the sentence
//! is attributed to the catch-all feature.

use super::sentiment::SentimentDictionary;
use serde::{Deserialize, Serialize};

/// Name used when nothing more specific is detected.
pub const CATCH_ALL_FEATURE: &str = "overall";

/// A canonical feature with the keywords that detect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

impl FeatureEntry {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Curated domain nouns plus fallback rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureDictionary {
    pub features: Vec<FeatureEntry>,
    /// Tried in order, first hit only, when no feature keyword matched
    pub fallbacks: Vec<FeatureEntry>,
    pub catch_all: String,
}

impl Default for FeatureDictionary {
    fn default() -> Self {
        Self {
            features: vec![
                FeatureEntry::new("battery", &["电池", "续航", "充电", "battery", "charging"]),
                FeatureEntry::new("screen", &["屏幕", "显示", "screen", "display"]),
                FeatureEntry::new("camera", &["摄像头", "拍照", "相机", "camera", "photo"]),
                FeatureEntry::new("audio", &["音质", "扬声器", "音量", "sound", "speaker", "audio"]),
                FeatureEntry::new(
                    "performance",
                    &["性能", "速度", "流畅", "卡顿", "卡", "发热", "performance", "speed", "laggy", "slow"],
                ),
                FeatureEntry::new("system", &["系统", "软件", "界面", "更新", "system", "software", "interface", "update"]),
                FeatureEntry::new("design", &["外观", "颜值", "设计", "颜色", "配色", "design", "color", "colour", "appearance"]),
                FeatureEntry::new(
                    "build quality",
                    &["手感", "握感", "材质", "工艺", "质感", "做工", "build quality", "material", "sturdy"],
                ),
                FeatureEntry::new("size & weight", &["重量", "厚度", "尺寸", "大小", "轻薄", "weight", "heavy", "size", "thick"]),
                FeatureEntry::new(
                    "usage experience",
                    &["操作", "体验", "便携", "舒适", "方便", "easy to use", "convenient", "experience"],
                ),
                FeatureEntry::new(
                    "price",
                    &["价格", "性价比", "成本", "便宜", "贵", "划算", "值得", "price", "expensive", "cheap", "value for money", "worth"],
                ),
                FeatureEntry::new("customer service", &["客服", "售后", "服务", "customer service", "support"]),
                FeatureEntry::new("delivery", &["物流", "配送", "快递", "发货", "delivery", "shipping"]),
                FeatureEntry::new("packaging", &["包装", "packaging"]),
            ],
            fallbacks: vec![
                FeatureEntry::new("usage experience", &["用", "using", "to use", "used to"]),
                FeatureEntry::new("design", &["看", "视觉", "looks", "visual"]),
                FeatureEntry::new("price", &["钱", "元", "¥", "$", "money", "dollar", "yuan"]),
            ],
            catch_all: CATCH_ALL_FEATURE.to_string(),
        }
    }
}

impl FeatureDictionary {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.catch_all.trim().is_empty() {
            errors.push("catch-all feature name must not be blank".to_string());
        }
        for (kind, entries) in [("feature", &self.features), ("fallback", &self.fallbacks)] {
            for (i, entry) in entries.iter().enumerate() {
                if entry.name.trim().is_empty() {
                    errors.push(format!("{} entry #{} has a blank name", kind, i + 1));
                }
                if entry.keywords.is_empty() {
                    errors.push(format!("{} '{}' has no keywords", kind, entry.name));
                }
                if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                    errors.push(format!("{} '{}' contains a blank keyword", kind, entry.name));
                }
            }
        }
        errors
    }
}

/// Both dictionaries the extractor consults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dictionaries {
    pub features: FeatureDictionary,
    pub sentiment: SentimentDictionary,
}

impl Dictionaries {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.features.validate();
        errors.extend(self.sentiment.validate());
        errors
    }
}

/// How a feature was attributed to a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MatchKind {
    Keyword,
    Fallback,
    CatchAll,
}

/// A feature found in one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DetectedFeature<'a> {
    pub name: &'a str,
    /// Lower-cased keywords that fired (empty for the catch-all)
    pub matched: Vec<&'a str>,
    pub kind: MatchKind,
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    name: String,
    keywords: Vec<String>,
}

impl CompiledEntry {
    fn compile(entry: &FeatureEntry) -> Self {
        Self {
            name: entry.name.trim().to_string(),
            keywords: entry
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn hits<'a>(&'a self, lower: &str) -> Vec<&'a str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(|k| lower.contains(k))
            .collect()
    }
}

/// Feature dictionary with keywords lower-cased once.
#[derive(Debug, Clone)]
pub(crate) struct FeatureMatcher {
    features: Vec<CompiledEntry>,
    fallbacks: Vec<CompiledEntry>,
    catch_all: String,
}

impl FeatureMatcher {
    pub fn new(dictionary: &FeatureDictionary) -> Self {
        Self {
            features: dictionary.features.iter().map(CompiledEntry::compile).collect(),
            fallbacks: dictionary.fallbacks.iter().map(CompiledEntry::compile).collect(),
            catch_all: dictionary.catch_all.trim().to_string(),
        }
    }

    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    /// Features mentioned in `sentence`, in dictionary order, one per name.
    /// Never empty: falls back to the catch-all.
    pub fn detect<'a>(&'a self, sentence: &str) -> Vec<DetectedFeature<'a>> {
        let lower = sentence.to_lowercase();
        let mut detected: Vec<DetectedFeature<'a>> = Vec::new();

        for entry in &self.features {
            let hits = entry.hits(&lower);
            if hits.is_empty() {
                continue;
            }
            match detected.iter_mut().find(|d| d.name == entry.name) {
                Some(existing) => existing.matched.extend(hits),
                None => detected.push(DetectedFeature {
                    name: &entry.name,
                    matched: hits,
                    kind: MatchKind::Keyword,
                }),
            }
        }

        if !detected.is_empty() {
            return detected;
        }

        if let Some((entry, hits)) = self
            .fallbacks
            .iter()
            .map(|entry| (entry, entry.hits(&lower)))
            .find(|(_, hits)| !hits.is_empty())
        {
            return vec![DetectedFeature {
                name: &entry.name,
                matched: hits,
                kind: MatchKind::Fallback,
            }];
        }

        vec![DetectedFeature {
            name: &self.catch_all,
            matched: Vec::new(),
            kind: MatchKind::CatchAll,
        }]
    }
}
