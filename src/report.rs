//! Reporting views over the pipeline output
//!
//! Flat, serializable structures for a presentation layer: the Kano table,
//! the extraction summary, the category distribution, CSV export of the
//! table and a plain-text rendering for terminals.

use crate::extract::{OpinionFragment, Polarity};
use crate::kano::{round_to, ClassifiedFeature, KanoCategory};
use crate::recommend::Recommendation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::io;

/// Features listed in [`ExtractionSummary::top_features`].
pub const TOP_FEATURES: usize = 10;

/// Share of a feature's votes per category, 1 decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPercentages {
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "O")]
    pub o: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "I")]
    pub i: f64,
    #[serde(rename = "R")]
    pub r: f64,
    #[serde(rename = "Q")]
    pub q: f64,
}

impl CategoryPercentages {
    pub fn get(&self, category: KanoCategory) -> f64 {
        match category {
            KanoCategory::Attractive => self.a,
            KanoCategory::OneDimensional => self.o,
            KanoCategory::MustBe => self.m,
            KanoCategory::Indifferent => self.i,
            KanoCategory::Reverse => self.r,
            KanoCategory::Questionable => self.q,
        }
    }

    pub fn sum(&self) -> f64 {
        KanoCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// One row of the exported Kano table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KanoTableRow {
    pub feature: String,
    pub percentages: CategoryPercentages,
    pub final_category: KanoCategory,
    pub better_coefficient: f64,
    pub worse_coefficient: f64,
}

impl KanoTableRow {
    pub fn from_classified(feature: &ClassifiedFeature) -> Self {
        let total = feature.total_votes;
        let pct = |category: KanoCategory| {
            if total == 0 {
                0.0
            } else {
                round_to(f64::from(feature.votes.get(category)) / f64::from(total) * 100.0, 1)
            }
        };

        Self {
            feature: feature.feature.clone(),
            percentages: CategoryPercentages {
                a: pct(KanoCategory::Attractive),
                o: pct(KanoCategory::OneDimensional),
                m: pct(KanoCategory::MustBe),
                i: pct(KanoCategory::Indifferent),
                r: pct(KanoCategory::Reverse),
                q: pct(KanoCategory::Questionable),
            },
            final_category: feature.final_category,
            better_coefficient: feature.better_coefficient,
            worse_coefficient: feature.worse_coefficient,
        }
    }
}

/// Tabular export of the classified features, in classification order.
pub fn kano_table(classified: &[ClassifiedFeature]) -> Vec<KanoTableRow> {
    classified.iter().map(KanoTableRow::from_classified).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCount {
    pub feature: String,
    pub count: usize,
}

/// Fragment polarity shares in percent, 1 decimal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Summary of the extraction stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub total_fragments: usize,
    pub avg_fragments_per_comment: f64,
    /// Most mentioned features, count descending, first-seen on ties
    pub top_features: Vec<FeatureCount>,
    pub sentiment_distribution: SentimentDistribution,
}

impl ExtractionSummary {
    pub fn from_fragments(fragments: &[OpinionFragment], comment_count: usize) -> Self {
        let total = fragments.len();

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<FeatureCount> = Vec::new();
        let (mut positive, mut negative) = (0usize, 0usize);
        for fragment in fragments {
            match index.get(fragment.feature.as_str()) {
                Some(&slot) => counts[slot].count += 1,
                None => {
                    index.insert(&fragment.feature, counts.len());
                    counts.push(FeatureCount {
                        feature: fragment.feature.clone(),
                        count: 1,
                    });
                }
            }
            match fragment.sentiment_label.polarity() {
                Polarity::Positive => positive += 1,
                Polarity::Negative => negative += 1,
                Polarity::Neutral => {}
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(TOP_FEATURES);

        let share = |n: usize| {
            if total == 0 {
                0.0
            } else {
                round_to(n as f64 / total as f64 * 100.0, 1)
            }
        };

        Self {
            total_fragments: total,
            avg_fragments_per_comment: if comment_count == 0 {
                0.0
            } else {
                round_to(total as f64 / comment_count as f64, 2)
            },
            top_features: counts,
            sentiment_distribution: SentimentDistribution {
                positive: share(positive),
                negative: share(negative),
                neutral: share(total - positive - negative),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: KanoCategory,
    pub count: usize,
}

/// Number of features per final category, in A, O, M, I, R, Q order.
pub fn category_distribution(classified: &[ClassifiedFeature]) -> Vec<CategoryCount> {
    KanoCategory::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            count: classified.iter().filter(|f| f.final_category == category).count(),
        })
        .collect()
}

/// Fixed-width text rendering of the table and recommendations.
pub fn render_table(rows: &[KanoTableRow], recommendations: &[Recommendation]) -> String {
    TableView { rows, recommendations }.to_string()
}

/// [`Display`](fmt::Display) adapter behind [`render_table`].
pub struct TableView<'a> {
    pub rows: &'a [KanoTableRow],
    pub recommendations: &'a [Recommendation],
}

impl fmt::Display for TableView<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, recommendations) = (self.rows, self.recommendations);
        let width = rows
            .iter()
            .map(|r| r.feature.chars().count())
            .max()
            .unwrap_or(0)
            .max("feature".len());

        write!(out, "{:<width$}", "feature", width = width)?;
        for category in KanoCategory::ALL {
            write!(out, " {:>6}", format!("{}%", category.code()))?;
        }
        writeln!(out, "  cat  {:>8} {:>8}", "better", "worse")?;

        for row in rows {
            write!(out, "{:<width$}", row.feature, width = width)?;
            for category in KanoCategory::ALL {
                write!(out, " {:>6.1}", row.percentages.get(category))?;
            }
            writeln!(
                out,
                "  {:<3}  {:>8.2} {:>8.2}",
                row.final_category.code(),
                row.better_coefficient,
                row.worse_coefficient
            )?;
        }

        if !recommendations.is_empty() {
            writeln!(out)?;
            for rec in recommendations {
                writeln!(out, "[{}] {}: {}", rec.priority, rec.category, rec.action)?;
                writeln!(out, "    {}", rec.rationale)?;
            }
        }
        Ok(())
    }
}

/// Flat CSV record of a [`KanoTableRow`].
#[derive(Debug, Serialize, Deserialize)]
struct CsvRecord {
    feature: String,
    #[serde(rename = "A%")]
    a: f64,
    #[serde(rename = "O%")]
    o: f64,
    #[serde(rename = "M%")]
    m: f64,
    #[serde(rename = "I%")]
    i: f64,
    #[serde(rename = "R%")]
    r: f64,
    #[serde(rename = "Q%")]
    q: f64,
    final_category: KanoCategory,
    better: f64,
    worse: f64,
}

impl From<&KanoTableRow> for CsvRecord {
    fn from(row: &KanoTableRow) -> Self {
        let p = row.percentages;
        Self {
            feature: row.feature.clone(),
            a: p.a,
            o: p.o,
            m: p.m,
            i: p.i,
            r: p.r,
            q: p.q,
            final_category: row.final_category,
            better: row.better_coefficient,
            worse: row.worse_coefficient,
        }
    }
}

impl From<CsvRecord> for KanoTableRow {
    fn from(record: CsvRecord) -> Self {
        Self {
            feature: record.feature,
            percentages: CategoryPercentages {
                a: record.a,
                o: record.o,
                m: record.m,
                i: record.i,
                r: record.r,
                q: record.q,
            },
            final_category: record.final_category,
            better_coefficient: record.better,
            worse_coefficient: record.worse,
        }
    }
}

/// Write the Kano table as CSV with a header row.
///
/// Columns: `feature`, `A%` through `Q%`, `final_category`, `better`, `worse`.
pub fn write_table_csv<W: io::Write>(rows: &[KanoTableRow], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(CsvRecord::from(row))?;
    }
    out.flush()?;
    Ok(())
}

/// Read a table written by [`write_table_csv`].
pub fn read_table_csv<R: io::Read>(reader: R) -> Result<Vec<KanoTableRow>, csv::Error> {
    let mut input = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    input
        .deserialize::<CsvRecord>()
        .map(|record| record.map(KanoTableRow::from))
        .collect()
}
