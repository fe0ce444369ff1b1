//! Per-feature vote aggregation and classification
//!
//! Every fragment casts one vote. Votes are grouped by feature name in
//! first-seen order, the winning category is the argmax under the
//! `M > O > A > I > R > Q` tie-break, and the Better/Worse coefficients are
//! computed over the valid votes (A, O, M, I).

use super::category::KanoCategory;
use super::matrix::vote_for;
use crate::extract::OpinionFragment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Evidence texts kept per feature.
pub const MAX_EVIDENCE_TEXTS: usize = 5;

/// Round half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Vote counts per Kano category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "O")]
    pub o: u32,
    #[serde(rename = "M")]
    pub m: u32,
    #[serde(rename = "I")]
    pub i: u32,
    #[serde(rename = "R")]
    pub r: u32,
    #[serde(rename = "Q")]
    pub q: u32,
}

impl Votes {
    pub fn get(&self, category: KanoCategory) -> u32 {
        match category {
            KanoCategory::Attractive => self.a,
            KanoCategory::OneDimensional => self.o,
            KanoCategory::MustBe => self.m,
            KanoCategory::Indifferent => self.i,
            KanoCategory::Reverse => self.r,
            KanoCategory::Questionable => self.q,
        }
    }

    pub fn add(&mut self, category: KanoCategory) {
        let slot = match category {
            KanoCategory::Attractive => &mut self.a,
            KanoCategory::OneDimensional => &mut self.o,
            KanoCategory::MustBe => &mut self.m,
            KanoCategory::Indifferent => &mut self.i,
            KanoCategory::Reverse => &mut self.r,
            KanoCategory::Questionable => &mut self.q,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        KanoCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// A + O + M + I: the votes that enter the coefficients.
    pub fn valid(&self) -> u32 {
        self.a + self.o + self.m + self.i
    }

    /// Category with the most votes; ties resolved by
    /// [`KanoCategory::TIE_BREAK_ORDER`]. No votes at all is Indifferent.
    pub fn winner(&self) -> KanoCategory {
        if self.total() == 0 {
            return KanoCategory::Indifferent;
        }
        let mut best = KanoCategory::TIE_BREAK_ORDER[0];
        for category in KanoCategory::TIE_BREAK_ORDER {
            if self.get(category) > self.get(best) {
                best = category;
            }
        }
        best
    }

    /// Better coefficient in [0, 100], 2 decimals.
    pub fn better(&self) -> f64 {
        let valid = self.valid();
        if valid == 0 {
            return 0.0;
        }
        round_to(f64::from(self.a + self.o) / f64::from(valid) * 100.0, 2)
    }

    /// Worse coefficient in [-100, 0], 2 decimals. Never `-0.0`.
    pub fn worse(&self) -> f64 {
        let valid = self.valid();
        if valid == 0 {
            return 0.0;
        }
        let magnitude = round_to(f64::from(self.o + self.m) / f64::from(valid) * 100.0, 2);
        if magnitude == 0.0 {
            0.0
        } else {
            -magnitude
        }
    }
}

/// Votes cast for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVoteTally {
    pub feature: String,
    pub votes: Votes,
}

/// A feature with its Kano category and impact coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedFeature {
    pub feature: String,
    pub total_votes: u32,
    pub votes: Votes,
    pub final_category: KanoCategory,
    /// Winning votes as a percentage of all votes, 1 decimal
    pub category_share: f64,
    pub better_coefficient: f64,
    pub worse_coefficient: f64,
    pub evidence_texts: Vec<String>,
}

impl ClassifiedFeature {
    pub fn from_tally(tally: FeatureVoteTally, evidence_texts: Vec<String>) -> Self {
        let votes = tally.votes;
        let total = votes.total();
        let final_category = votes.winner();
        let category_share = if total == 0 {
            0.0
        } else {
            round_to(f64::from(votes.get(final_category)) / f64::from(total) * 100.0, 1)
        };

        Self {
            feature: tally.feature,
            total_votes: total,
            votes,
            final_category,
            category_share,
            better_coefficient: votes.better(),
            worse_coefficient: votes.worse(),
            evidence_texts,
        }
    }
}

struct FeatureGroup {
    tally: FeatureVoteTally,
    evidence: Vec<String>,
}

fn group(fragments: &[OpinionFragment]) -> Vec<FeatureGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<FeatureGroup> = Vec::new();

    for fragment in fragments {
        let slot = *index.entry(fragment.feature.as_str()).or_insert_with(|| {
            groups.push(FeatureGroup {
                tally: FeatureVoteTally {
                    feature: fragment.feature.clone(),
                    votes: Votes::default(),
                },
                evidence: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.tally.votes.add(vote_for(fragment.sentiment_label));
        if group.evidence.len() < MAX_EVIDENCE_TEXTS {
            group.evidence.push(fragment.raw_text.clone());
        }
    }

    groups
}

/// One vote per fragment, grouped by feature in first-seen order.
pub fn tally(fragments: &[OpinionFragment]) -> Vec<FeatureVoteTally> {
    group(fragments).into_iter().map(|g| g.tally).collect()
}

/// Classify every feature seen in `fragments`, most-voted first.
pub fn classify(fragments: &[OpinionFragment]) -> Vec<ClassifiedFeature> {
    let mut classified: Vec<ClassifiedFeature> = group(fragments)
        .into_iter()
        .map(|g| ClassifiedFeature::from_tally(g.tally, g.evidence))
        .collect();
    // Stable: equal totals keep first-seen order
    classified.sort_by(|a, b| b.total_votes.cmp(&a.total_votes));
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentId;
    use crate::extract::{FragmentId, SentimentLabel};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn fragment(n: usize, feature: &str, label: SentimentLabel) -> OpinionFragment {
        let comment = CommentId::new(format!("c{}", n));
        let text = format!("{} remark {}", feature, n);
        OpinionFragment {
            id: FragmentId::derive(&comment, 0),
            comment_id: comment,
            feature: feature.to_string(),
            span: (0, text.len()),
            context: text.clone(),
            raw_text: text,
            sentiment_label: label,
            confidence: 0.8,
        }
    }

    fn fragments(labelled: &[(&str, SentimentLabel)]) -> Vec<OpinionFragment> {
        labelled.iter()
            .enumerate()
            .map(|(n, (feature, label))| fragment(n, feature, *label))
            .collect()
    }

    // === Scenario: Repeated strong complaints make a must-be feature ===
    #[test]
    fn strong_complaints_classify_as_must_be() {
        use SentimentLabel::StrongComplaint;
        let result = classify(&fragments(&[
            ("battery life", StrongComplaint),
            ("battery life", StrongComplaint),
        ]));

        assert_eq!(result.len(), 1);
        let battery = &result[0];
        assert_eq!(battery.final_category, KanoCategory::MustBe);
        assert_eq!(battery.votes, Votes { m: 2, ..Default::default() });
        assert_eq!(battery.better_coefficient, 0.0);
        assert_eq!(battery.worse_coefficient, -100.0);
        assert_eq!(battery.category_share, 100.0);
    }

    // === Scenario: Strong praise is attractive ===
    #[test]
    fn strong_praise_classifies_as_attractive() {
        let result = classify(&fragments(&[("screen", SentimentLabel::StrongPraise)]));
        let screen = &result[0];
        assert_eq!(screen.final_category, KanoCategory::Attractive);
        assert_eq!(screen.better_coefficient, 100.0);
        assert_eq!(screen.worse_coefficient, 0.0);
        assert!(screen.worse_coefficient.is_sign_positive());
    }

    // === Scenario: A one-one tie between I and M resolves to M ===
    #[test]
    fn indifferent_must_be_tie_resolves_to_must_be() {
        use SentimentLabel::*;
        // neutral votes I, strong_complaint votes M; I is seen first
        let result = classify(&fragments(&[("price", Neutral), ("price", StrongComplaint)]));
        let price = &result[0];
        assert_eq!(price.votes, Votes { i: 1, m: 1, ..Default::default() });
        assert_eq!(price.final_category, KanoCategory::MustBe);
        assert_eq!(price.category_share, 50.0);
        assert_eq!(price.better_coefficient, 0.0);
        assert_eq!(price.worse_coefficient, -50.0);
    }

    #[test]
    fn weak_complaint_and_neutral_both_vote_indifferent() {
        use SentimentLabel::*;
        let result = classify(&fragments(&[("price", Neutral), ("price", WeakComplaint)]));
        assert_eq!(result[0].votes, Votes { i: 2, ..Default::default() });
        assert_eq!(result[0].final_category, KanoCategory::Indifferent);
    }

    #[test]
    fn tie_break_follows_priority_not_insertion() {
        // A seen before O, tie resolves to O
        let votes = Votes { a: 2, o: 2, ..Default::default() };
        assert_eq!(votes.winner(), KanoCategory::OneDimensional);
        let votes = Votes { i: 3, r: 3, q: 3, ..Default::default() };
        assert_eq!(votes.winner(), KanoCategory::Indifferent);
        let votes = Votes { r: 1, q: 1, ..Default::default() };
        assert_eq!(votes.winner(), KanoCategory::Reverse);
    }

    #[test]
    fn coefficients_are_zero_without_valid_votes() {
        let tally = FeatureVoteTally {
            feature: "gimmick".to_string(),
            votes: Votes { r: 2, q: 1, ..Default::default() },
        };
        let classified = ClassifiedFeature::from_tally(tally, Vec::new());
        assert_eq!(classified.final_category, KanoCategory::Reverse);
        assert_eq!(classified.better_coefficient, 0.0);
        assert_eq!(classified.worse_coefficient, 0.0);
        assert!(classified.worse_coefficient.is_sign_positive());
        assert_eq!(classified.category_share, 66.7);
    }

    #[test]
    fn coefficients_round_to_two_decimals() {
        let votes = Votes { a: 1, o: 1, i: 1, ..Default::default() };
        assert_eq!(votes.better(), 66.67);
        assert_eq!(votes.worse(), -33.33);
    }

    #[test]
    fn unrecognized_label_votes_indifferent() {
        let result = classify(&fragments(&[("camera", SentimentLabel::Unrecognized)]));
        assert_eq!(result[0].votes.i, 1);
    }

    #[test]
    fn sorted_by_total_with_first_seen_ties() {
        use SentimentLabel::*;
        let result = classify(&fragments(&[
            ("screen", StrongPraise),
            ("battery", StrongComplaint),
            ("price", Neutral),
            ("price", Neutral),
            ("battery", WeakPraise),
            ("camera", Suggestion),
        ]));
        let order: Vec<&str> = result.iter().map(|c| c.feature.as_str()).collect();
        assert_eq!(order, vec!["battery", "price", "screen", "camera"]);
    }

    #[test]
    fn evidence_is_first_five_raw_texts_in_fragment_order() {
        let frags: Vec<OpinionFragment> = (0..7)
            .map(|n| fragment(n, "screen", SentimentLabel::WeakPraise))
            .collect();
        let result = classify(&frags);
        let expected: Vec<String> = frags[..5].iter().map(|f| f.raw_text.clone()).collect();
        assert_eq!(result[0].evidence_texts, expected);
        assert_eq!(result[0].total_votes, 7);
    }

    #[test]
    fn single_fragment_feature_is_kept() {
        let result = classify(&fragments(&[("packaging", SentimentLabel::Neutral)]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].total_votes, 1);
    }

    #[test]
    fn tally_matches_fragment_counts() {
        use SentimentLabel::*;
        let tallies = tally(&fragments(&[
            ("screen", StrongPraise),
            ("battery", StrongComplaint),
            ("screen", Suggestion),
        ]));
        assert_eq!(tallies.len(), 2);
        assert_eq!(tallies[0].feature, "screen");
        assert_eq!(tallies[0].votes, Votes { a: 1, o: 1, ..Default::default() });
    }

    #[test]
    fn empty_input_classifies_nothing() {
        assert!(classify(&[]).is_empty());
    }

    #[test]
    fn votes_serialize_with_letter_keys() {
        let json = serde_json::to_value(Votes { m: 2, ..Default::default() }).unwrap();
        assert_eq!(json["M"], 2);
        assert_eq!(json["A"], 0);
    }

    fn random_fragments(rng: &mut StdRng, count: usize) -> Vec<OpinionFragment> {
        let features = ["battery", "screen", "price", "camera", "design"];
        let labels = [
            SentimentLabel::StrongPraise,
            SentimentLabel::WeakPraise,
            SentimentLabel::Suggestion,
            SentimentLabel::Neutral,
            SentimentLabel::WeakComplaint,
            SentimentLabel::StrongComplaint,
            SentimentLabel::Unrecognized,
        ];
        (0..count)
            .map(|n| {
                let feature = features[rng.gen_range(0..features.len())];
                let label = labels[rng.gen_range(0..labels.len())];
                fragment(n, feature, label)
            })
            .collect()
    }

    // === Scenario: Classification invariants over random fragment sets ===
    #[test]
    fn random_fragment_sets_hold_classification_invariants() {
        let mut rng = StdRng::seed_from_u64(0x6b616e6f);
        for _ in 0..200 {
            let count = rng.gen_range(0..40);
            let frags = random_fragments(&mut rng, count);
            let result = classify(&frags);

            let total: u32 = result.iter().map(|c| c.total_votes).sum();
            assert_eq!(total as usize, frags.len());

            for feature in &result {
                let mentions = frags.iter().filter(|f| f.feature == feature.feature).count();
                assert_eq!(feature.votes.total(), feature.total_votes);
                assert_eq!(feature.total_votes as usize, mentions);

                let best = KanoCategory::ALL
                    .iter()
                    .map(|c| feature.votes.get(*c))
                    .max()
                    .unwrap_or(0);
                let expected = KanoCategory::TIE_BREAK_ORDER
                    .into_iter()
                    .find(|c| feature.votes.get(*c) == best)
                    .unwrap();
                assert_eq!(feature.final_category, expected);

                assert!((0.0..=100.0).contains(&feature.better_coefficient));
                assert!((-100.0..=0.0).contains(&feature.worse_coefficient));
                assert!(feature.evidence_texts.len() <= MAX_EVIDENCE_TEXTS);
            }

            for pair in result.windows(2) {
                assert!(pair[0].total_votes >= pair[1].total_votes);
            }
        }
    }

    // === Scenario: Classification is idempotent ===
    #[test]
    fn classifying_twice_is_identical() {
        let mut rng = StdRng::seed_from_u64(7);
        let frags = random_fragments(&mut rng, 60);
        assert_eq!(classify(&frags), classify(&frags));
    }
}
