//! Kano categories

use serde::{Deserialize, Serialize};

/// The six Kano categories. Serialized as their single-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KanoCategory {
    /// Delights when present, not missed when absent
    #[serde(rename = "A")]
    Attractive,
    /// Satisfaction scales with quality
    #[serde(rename = "O")]
    OneDimensional,
    /// Expected; absence causes dissatisfaction
    #[serde(rename = "M")]
    MustBe,
    #[serde(rename = "I")]
    Indifferent,
    /// Users would rather not have it
    #[serde(rename = "R")]
    Reverse,
    /// Contradictory answers
    #[serde(rename = "Q")]
    Questionable,
}

impl KanoCategory {
    /// Canonical column order: A, O, M, I, R, Q.
    pub const ALL: [KanoCategory; 6] = [
        KanoCategory::Attractive,
        KanoCategory::OneDimensional,
        KanoCategory::MustBe,
        KanoCategory::Indifferent,
        KanoCategory::Reverse,
        KanoCategory::Questionable,
    ];

    /// Winner among categories with equal votes: earlier entries win.
    pub const TIE_BREAK_ORDER: [KanoCategory; 6] = [
        KanoCategory::MustBe,
        KanoCategory::OneDimensional,
        KanoCategory::Attractive,
        KanoCategory::Indifferent,
        KanoCategory::Reverse,
        KanoCategory::Questionable,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Attractive => "A",
            Self::OneDimensional => "O",
            Self::MustBe => "M",
            Self::Indifferent => "I",
            Self::Reverse => "R",
            Self::Questionable => "Q",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Attractive => "Attractive",
            Self::OneDimensional => "One-dimensional",
            Self::MustBe => "Must-be",
            Self::Indifferent => "Indifferent",
            Self::Reverse => "Reverse",
            Self::Questionable => "Questionable",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Attractive => "excitement need, a delight beyond expectations",
            Self::OneDimensional => "performance need, the better it is the happier users are",
            Self::MustBe => "basic need, must be present and working",
            Self::Indifferent => "little effect on satisfaction either way",
            Self::Reverse => "a feature users do not want",
            Self::Questionable => "contradictory signal, the feedback is unclear",
        }
    }
}

impl std::fmt::Display for KanoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
