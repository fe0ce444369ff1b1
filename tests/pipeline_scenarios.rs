//! End-to-end scenarios over the public pipeline API
//!
//! Runs the full pipeline on a mixed review corpus and checks the
//! guarantees each stage makes to the next: fragment spans and confidence,
//! vote sums and tie-breaks, table percentages and recommendation order.

mod common;

use common::mixed_corpus;
use kanoscope::extract::{Polarity, MAX_CONFIDENCE};
use kanoscope::{
    classify, extract_fragments, kano_table, normalize, recommend, CancellationToken, KanoCategory,
    Pipeline, PipelineConfig, PipelineError, RawComment, RunStatus,
};
use std::collections::{HashMap, HashSet};

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).expect("default config is valid")
}

#[test]
fn test_mixed_corpus_completes() {
    let corpus = mixed_corpus();
    let report = pipeline().run(&corpus.comments).unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.cleaning.removed, 2);
    assert_eq!(report.cleaning.duplicates, 1);
    assert_eq!(report.cleaning.cleaned, corpus.len() - 3);
    assert_eq!(report.summary.total_fragments, report.fragments.len());
}

#[test]
fn test_battery_complaints_are_a_killer_issue() {
    let report = pipeline().run(&mixed_corpus().comments).unwrap();

    let battery = report
        .features
        .iter()
        .find(|f| f.feature == "battery")
        .expect("battery is mentioned");
    assert_eq!(battery.final_category, KanoCategory::MustBe);
    assert_eq!(battery.worse_coefficient, -100.0);
    assert_eq!(report.features[0].feature, "battery");

    let killer = report
        .recommendations
        .iter()
        .find(|r| r.category == "killer issues")
        .expect("killer issues recommendation");
    assert!(killer.related_features.contains(&"battery".to_string()));
}

#[test]
fn test_duplicate_keeps_first_comment() {
    let comments = vec![
        RawComment::new("first", "电池很差，一天要充三次电"),
        RawComment::new("second", "电池很差，一天要充三次电"),
    ];
    let report = pipeline().run(&comments).unwrap();

    assert_eq!(report.comments.len(), 1);
    assert_eq!(report.comments[0].original_id.as_str(), "first");
}

// === Scenario: One comment, opposite opinions about different features ===
#[test]
fn test_mixed_opinion_comment_yields_opposite_polarity() {
    let comments = vec![RawComment::new("d", "这个东西又贵又卡，但是设计很漂亮。")];
    let report = pipeline().run(&comments).unwrap();

    let features: HashSet<&str> = report.fragments.iter().map(|f| f.feature.as_str()).collect();
    assert!(report.fragments.len() >= 2);
    assert!(features.len() >= 2);

    let polarity_of = |feature: &str| {
        report
            .fragments
            .iter()
            .find(|f| f.feature == feature)
            .map(|f| f.sentiment_label.polarity())
    };
    assert_eq!(polarity_of("design"), Some(Polarity::Positive));
    assert_eq!(polarity_of("price"), Some(Polarity::Negative));
}

#[test]
fn test_fragment_invariants_hold() {
    let report = pipeline().run(&mixed_corpus().comments).unwrap();
    let threshold = PipelineConfig::default().extraction.confidence_threshold;
    let texts: HashMap<_, _> = report
        .comments
        .iter()
        .map(|c| (c.id.clone(), c.cleaned_text.as_str()))
        .collect();

    for fragment in &report.fragments {
        let text = texts[&fragment.comment_id];
        let (start, end) = fragment.span;
        assert!(end <= text.len());
        assert_eq!(&text[start..end], fragment.raw_text);
        assert!(fragment.confidence >= threshold, "{:?}", fragment);
        assert!(fragment.confidence <= MAX_CONFIDENCE, "{:?}", fragment);
    }
}

#[test]
fn test_classification_invariants_hold() {
    let report = pipeline().run(&mixed_corpus().comments).unwrap();

    for feature in &report.features {
        let mentions = report
            .fragments
            .iter()
            .filter(|f| f.feature == feature.feature)
            .count();
        assert_eq!(feature.votes.total(), feature.total_votes);
        assert_eq!(feature.total_votes as usize, mentions);
        assert!((0.0..=100.0).contains(&feature.better_coefficient));
        assert!((-100.0..=0.0).contains(&feature.worse_coefficient));
        assert!(feature.evidence_texts.len() <= 5);
    }
    for pair in report.features.windows(2) {
        assert!(pair[0].total_votes >= pair[1].total_votes);
    }
}

#[test]
fn test_table_rows_sum_to_one_hundred() {
    let report = pipeline().run(&mixed_corpus().comments).unwrap();
    for row in &report.table {
        assert!((row.percentages.sum() - 100.0).abs() <= 0.5, "{:?}", row);
    }
}

#[test]
fn test_recommendations_ordered_and_unique_per_bucket() {
    let report = pipeline().run(&mixed_corpus().comments).unwrap();

    let priorities: Vec<_> = report.recommendations.iter().map(|r| r.priority).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);

    for rec in &report.recommendations {
        let unique: HashSet<&String> = rec.related_features.iter().collect();
        assert_eq!(unique.len(), rec.related_features.len());
        assert!(rec.related_features.len() <= 3);
    }
}

#[test]
fn test_stages_replay_to_the_same_result() {
    let corpus = mixed_corpus();
    let config = PipelineConfig::default();
    let report = pipeline().run(&corpus.comments).unwrap();

    let (comments, _) = normalize(&corpus.comments, &config.processing);
    let fragments = extract_fragments(&comments, &config.dictionaries, &config.extraction, None).unwrap();
    let features = classify(&fragments);
    let recommendations = recommend(&features, &config.thresholds);

    assert_eq!(comments, report.comments);
    assert_eq!(fragments, report.fragments);
    assert_eq!(features, report.features);
    assert_eq!(kano_table(&features), report.table);
    assert_eq!(recommendations, report.recommendations);
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let corpus = mixed_corpus();
    let first = pipeline().run(&corpus.comments).unwrap();
    let second = pipeline().run(&corpus.comments).unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.fragments, second.fragments);
    assert_eq!(first.features, second.features);
    assert_eq!(first.recommendations, second.recommendations);
}

#[test]
fn test_raising_threshold_drops_weak_fragments() {
    let corpus = mixed_corpus();
    let mut config = PipelineConfig::default();
    config.extraction.confidence_threshold = 0.9;
    let strict = Pipeline::new(config).unwrap().run(&corpus.comments).unwrap();
    let lenient = pipeline().run(&corpus.comments).unwrap();

    assert!(strict.fragments.len() <= lenient.fragments.len());
    assert!(strict.fragments.iter().all(|f| f.confidence >= 0.9));
    // every surviving comment still contributes at least one fragment
    let owners: HashSet<_> = strict.fragments.iter().map(|f| &f.comment_id).collect();
    assert_eq!(owners.len(), strict.comments.len());
}

#[test]
fn test_cancelled_run_is_an_error() {
    let token = CancellationToken::new();
    token.cancel();
    let result = pipeline().run_with(&mixed_corpus().comments, None, &token);
    assert!(matches!(result, Err(PipelineError::Cancelled { .. })));
}

#[tokio::test]
async fn test_parallel_run_matches_sequential() {
    let corpus = mixed_corpus();
    let p = pipeline();
    let sequential = p.run(&corpus.comments).unwrap();

    for workers in [2, 4, 32] {
        let parallel = p
            .run_parallel(&corpus.comments, workers, &CancellationToken::new(), None)
            .await
            .unwrap();
        assert_eq!(parallel.fragments, sequential.fragments, "workers = {}", workers);
        assert_eq!(parallel.features, sequential.features);
    }
}

#[test]
fn test_empty_and_filtered_inputs_are_statuses_not_errors() {
    let empty = pipeline().run(&[]).unwrap();
    assert_eq!(empty.status, RunStatus::EmptyCorpus);

    let filtered = pipeline()
        .run(&[RawComment::new("1", "好"), RawComment::new("2", "ok")])
        .unwrap();
    assert_eq!(filtered.status, RunStatus::AllFiltered);
    assert!(filtered.table.is_empty());
}
