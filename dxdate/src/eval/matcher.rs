//! Set-based matching of predicted relationships against gold.
//!
//! # Semantics
//!
//! 1. No gold (or no labeled document) gives a zeroed report.
//! 2. Only documents with at least one gold entry are scored. Predictions
//!    on any other document are ignored entirely.
//! 3. Both sides become sets of `(note_id, diagnosis, date)`. Confidence is
//!    ignored and duplicates collapse.
//! 4. TP = |P ∩ G|, FP = |P − G|, FN = |G − P|. No true negatives.
//!
//! When no prediction survives the filter, FN defaults to the length of the
//! gold *list*, duplicates included ([`FalseNegativeCount::GoldListLength`]).
//! [`FalseNegativeCount::UniqueTriples`] counts unique gold triples instead,
//! which keeps FN consistent with the non-empty case.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use dxdate_core::{GoldStandardEntry, MetricsReport, RelationKey, Relationship};

/// How false negatives are counted when no prediction hits a labeled
/// document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalseNegativeCount {
    /// Every gold entry, duplicates included.
    #[default]
    GoldListLength,
    /// Unique gold triples.
    UniqueTriples,
}

/// Matcher options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchConfig {
    /// False-negative policy for the no-prediction case.
    pub false_negatives: FalseNegativeCount,
}

/// Score predictions against gold with the default policy.
///
/// ```rust
/// use dxdate::score;
/// use dxdate_core::{Confidence, GoldStandardEntry, Relationship};
///
/// let pred = vec![Relationship::new(0, "flu", "2023-01-01", Confidence::CERTAIN).unwrap()];
/// let gold = vec![
///     GoldStandardEntry::new(0, "flu", "2023-01-01"),
///     GoldStandardEntry::new(0, "cold", "2023-01-02"),
/// ];
/// let m = score(&pred, &gold);
/// assert_eq!((m.true_positives, m.false_positives, m.false_negatives), (1, 0, 1));
/// assert_eq!(m.precision, 1.0);
/// assert_eq!(m.recall, 0.5);
/// ```
#[must_use]
pub fn score(predictions: &[Relationship], gold: &[GoldStandardEntry]) -> MetricsReport {
    score_with(predictions, gold, &MatchConfig::default())
}

/// Score predictions against gold.
#[must_use]
pub fn score_with(
    predictions: &[Relationship],
    gold: &[GoldStandardEntry],
    config: &MatchConfig,
) -> MetricsReport {
    let details = match_details(predictions, gold);
    if details.labeled_documents == 0 {
        return MetricsReport::zeroed();
    }

    let fn_ = if details.predicted == 0 {
        match config.false_negatives {
            FalseNegativeCount::GoldListLength => gold.len(),
            FalseNegativeCount::UniqueTriples => details.missed.len(),
        }
    } else {
        details.missed.len()
    };

    MetricsReport::from_counts(details.matched.len(), details.spurious.len(), fn_)
}

/// Triple-level breakdown of a scoring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetails {
    /// Predicted triples found in gold.
    pub matched: Vec<RelationKey>,
    /// Predicted triples not in gold.
    pub spurious: Vec<RelationKey>,
    /// Gold triples not predicted.
    pub missed: Vec<RelationKey>,
    /// Distinct note ids with gold entries.
    pub labeled_documents: usize,
    /// Unique predicted triples on labeled documents.
    pub predicted: usize,
    /// Unique gold triples.
    pub gold: usize,
}

/// Compute the matched / spurious / missed triples (each sorted).
#[must_use]
pub fn match_details(predictions: &[Relationship], gold: &[GoldStandardEntry]) -> MatchDetails {
    let gold_set: BTreeSet<RelationKey> = gold.iter().map(GoldStandardEntry::key).collect();
    let labeled: BTreeSet<usize> = gold.iter().map(|g| g.note_id).collect();
    let pred_set: BTreeSet<RelationKey> = predictions
        .iter()
        .filter(|p| labeled.contains(&p.note_id))
        .map(Relationship::key)
        .collect();

    MatchDetails {
        matched: pred_set.intersection(&gold_set).cloned().collect(),
        spurious: pred_set.difference(&gold_set).cloned().collect(),
        missed: gold_set.difference(&pred_set).cloned().collect(),
        labeled_documents: labeled.len(),
        predicted: pred_set.len(),
        gold: gold_set.len(),
    }
}

impl MatchDetails {
    /// Human-readable summary; `verbose` lists every triple.
    #[must_use]
    pub fn to_string_human(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Labeled notes: {}  Unique predictions: {}  Unique gold: {}\n",
            self.labeled_documents, self.predicted, self.gold
        ));
        out.push_str(&format!(
            "Matched: {}  Spurious: {}  Missed: {}\n",
            self.matched.len(),
            self.spurious.len(),
            self.missed.len()
        ));
        if verbose {
            for (title, keys) in [
                ("Matched", &self.matched),
                ("Spurious", &self.spurious),
                ("Missed", &self.missed),
            ] {
                if keys.is_empty() {
                    continue;
                }
                out.push_str(&format!("\n{title}:\n"));
                for k in keys {
                    out.push_str(&format!("  {k}\n"));
                }
            }
        }
        out
    }
}
