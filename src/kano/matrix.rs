//! Questionnaire answers and the Kano evaluation matrix
//!
//! Each sentiment label stands in for a questionnaire answer pair: the
//! functional question ("how do you feel if the product has this?") and
//! the dysfunctional one ("...if it does not?"). The pair is looked up in
//! the standard 5×5 evaluation matrix to produce one vote.

use super::category::KanoCategory;
use crate::extract::SentimentLabel;
use serde::{Deserialize, Serialize};

/// The five canonical Kano questionnaire answers, in matrix order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KanoAnswer {
    Like,
    MustBe,
    DontCare,
    LiveWith,
    Dislike,
}

impl KanoAnswer {
    pub const ALL: [KanoAnswer; 5] = [
        KanoAnswer::Like,
        KanoAnswer::MustBe,
        KanoAnswer::DontCare,
        KanoAnswer::LiveWith,
        KanoAnswer::Dislike,
    ];

    /// Row/column index into [`KANO_MATRIX`].
    pub fn index(self) -> usize {
        match self {
            Self::Like => 0,
            Self::MustBe => 1,
            Self::DontCare => 2,
            Self::LiveWith => 3,
            Self::Dislike => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Like => "like it",
            Self::MustBe => "must-be",
            Self::DontCare => "don't care",
            Self::LiveWith => "live with it",
            Self::Dislike => "dislike it",
        }
    }
}

impl std::fmt::Display for KanoAnswer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Sentiment label → (functional, dysfunctional) answer.
pub const SENTIMENT_ANSWERS: [(SentimentLabel, KanoAnswer, KanoAnswer); 6] = [
    (SentimentLabel::StrongPraise, KanoAnswer::Like, KanoAnswer::DontCare),
    (SentimentLabel::WeakPraise, KanoAnswer::MustBe, KanoAnswer::DontCare),
    (SentimentLabel::Suggestion, KanoAnswer::Like, KanoAnswer::Dislike),
    (SentimentLabel::Neutral, KanoAnswer::DontCare, KanoAnswer::DontCare),
    (SentimentLabel::WeakComplaint, KanoAnswer::MustBe, KanoAnswer::LiveWith),
    (SentimentLabel::StrongComplaint, KanoAnswer::MustBe, KanoAnswer::Dislike),
];

use KanoCategory::{
    Attractive as A, Indifferent as I, MustBe as M, OneDimensional as O, Questionable as Q,
    Reverse as R,
};

/// Rows: functional answer. Columns: dysfunctional answer.
pub const KANO_MATRIX: [[KanoCategory; 5]; 5] = [
    // like it, must-be, don't care, live with it, dislike it
    [Q, A, A, A, O], // like it
    [R, I, I, I, M], // must-be
    [R, I, I, I, M], // don't care
    [R, I, I, I, M], // live with it
    [R, R, R, R, Q], // dislike it
];

/// Synthetic questionnaire answers for a label. `None` for labels with no
/// mapping.
pub fn answer_pair(label: SentimentLabel) -> Option<(KanoAnswer, KanoAnswer)> {
    SENTIMENT_ANSWERS
        .iter()
        .find(|(l, _, _)| *l == label)
        .map(|&(_, functional, dysfunctional)| (functional, dysfunctional))
}

pub fn evaluate(functional: KanoAnswer, dysfunctional: KanoAnswer) -> KanoCategory {
    KANO_MATRIX[functional.index()][dysfunctional.index()]
}

/// The vote one fragment with this label casts. Unmapped labels vote I.
pub fn vote_for(label: SentimentLabel) -> KanoCategory {
    answer_pair(label).map_or(KanoCategory::Indifferent, |(f, d)| evaluate(f, d))
}
