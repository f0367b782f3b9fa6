//! Classifier-backed pair scoring.
//!
//! # Pipeline
//!
//! ```text
//! EntitySet ──► every (diagnosis, resolved date) pair with gap ≤ max_distance
//!                 │
//!                 ▼
//!           PairFeatures { diagnosis, date, distance, context, between }
//!                 │
//!                 ▼
//!           PairClassifier::predict_proba ──► p ≥ threshold ? emit : drop
//! ```
//!
//! The learned model is an external collaborator behind [`PairClassifier`].
//! [`LinearPairClassifier`] is a logistic scorer over hand-picked features
//! whose weights can be loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use dxdate_core::{DateMention, DiagnosisMention, EntitySet, RawRelationship};

use super::{mention_gap, RelationGenerator};
use crate::config::ClassifierConfig;
use crate::{Error, Result};

const DX_OPEN: &str = "<dx>";
const DX_CLOSE: &str = "</dx>";
const DATE_OPEN: &str = "<date>";
const DATE_CLOSE: &str = "</date>";
const ELLIPSIS: &str = " ... ";

/// Everything the classifier sees about one candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairFeatures {
    /// Diagnosis label.
    pub diagnosis: String,
    /// Canonical date.
    pub date: String,
    /// `date.start - diagnosis.start`, in characters. Negative when the date
    /// comes first.
    pub distance: i64,
    /// Window of at most `max_context_len` source characters around both
    /// mentions, with the mentions wrapped in `<dx>` / `<date>` markers.
    pub context: String,
    /// Source text strictly between the two mentions, truncated to
    /// `max_context_len` characters.
    pub between: String,
}

/// The learned pair model: returns P(related) for a candidate pair.
pub trait PairClassifier: Send + Sync {
    /// Probability in [0, 1] that the pair is a true relationship.
    fn predict_proba(&self, features: &PairFeatures) -> Result<f64>;
}

impl<F> PairClassifier for F
where
    F: Fn(&PairFeatures) -> Result<f64> + Send + Sync,
{
    fn predict_proba(&self, features: &PairFeatures) -> Result<f64> {
        self(features)
    }
}

/// Weights for [`LinearPairClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinearWeights {
    /// Intercept.
    pub bias: f64,
    /// Per 100 characters of absolute distance.
    pub distance: f64,
    /// Per sentence boundary between the mentions.
    pub sentence_break: f64,
    /// Added when the date precedes the diagnosis.
    pub date_before: f64,
}

impl Default for LinearWeights {
    fn default() -> Self {
        Self {
            bias: 2.0,
            distance: -0.8,
            sentence_break: -1.5,
            date_before: -0.3,
        }
    }
}

/// Logistic regression over distance, sentence breaks and direction.
#[derive(Debug, Clone, Default)]
pub struct LinearPairClassifier {
    weights: LinearWeights,
}

impl LinearPairClassifier {
    /// Create a classifier with explicit weights.
    #[must_use]
    pub fn new(weights: LinearWeights) -> Self {
        Self { weights }
    }

    /// Load weights from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails if the file is unreadable or not a valid weights object.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::classifier(format!("cannot read {}: {e}", path.display())))?;
        let weights: LinearWeights = serde_json::from_str(&content)
            .map_err(|e| Error::classifier(format!("invalid weights in {}: {e}", path.display())))?;
        Ok(Self::new(weights))
    }

    /// The weights in use.
    #[must_use]
    pub fn weights(&self) -> &LinearWeights {
        &self.weights
    }
}

impl PairClassifier for LinearPairClassifier {
    fn predict_proba(&self, f: &PairFeatures) -> Result<f64> {
        let w = &self.weights;
        let z = w.bias
            + w.distance * (f.distance.unsigned_abs() as f64 / 100.0)
            + w.sentence_break * sentence_breaks(&f.between) as f64
            + if f.distance < 0 { w.date_before } else { 0.0 };
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

/// Count sentence terminators followed by whitespace.
fn sentence_breaks(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    chars
        .windows(2)
        .filter(|w| matches!(w[0], '.' | '!' | '?') && w[1].is_whitespace())
        .count()
        + chars.iter().filter(|c| **c == '\n').count()
}

/// Scores every nearby (diagnosis, date) pair with a [`PairClassifier`].
pub struct ClassifierGenerator<C: PairClassifier> {
    name: String,
    classifier: C,
    config: ClassifierConfig,
}

impl<C: PairClassifier> ClassifierGenerator<C> {
    /// Wrap a classifier.
    #[must_use]
    pub fn new(name: impl Into<String>, classifier: C, config: ClassifierConfig) -> Self {
        Self {
            name: name.into(),
            classifier,
            config,
        }
    }

    /// Build the feature record for one pair.
    #[must_use]
    pub fn features(
        &self,
        text: &str,
        dx: &DiagnosisMention,
        date: &DateMention,
        parsed: &str,
    ) -> PairFeatures {
        let chars: Vec<char> = text.chars().collect();
        let (lo, hi) = if dx.end() <= date.start {
            (dx.end(), date.start)
        } else {
            (date.end().min(dx.start), dx.start)
        };
        let between: String = chars
            .iter()
            .skip(lo)
            .take(hi.saturating_sub(lo).min(self.config.max_context_len))
            .collect();

        PairFeatures {
            diagnosis: dx.label.clone(),
            date: parsed.to_string(),
            distance: date.start as i64 - dx.start as i64,
            context: pair_context(&chars, dx, date, self.config.max_context_len),
            between,
        }
    }
}

impl<C: PairClassifier> RelationGenerator for ClassifierGenerator<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str, entities: &EntitySet) -> Result<Vec<RawRelationship>> {
        let mut out = Vec::new();
        for dx in &entities.diagnoses {
            for date in entities.resolved_dates() {
                let Some(parsed) = date.parsed.as_deref() else {
                    continue;
                };
                if mention_gap(dx, date) > self.config.max_distance {
                    continue;
                }
                let features = self.features(text, dx, date, parsed);
                let p = self.classifier.predict_proba(&features)?;
                log::trace!("{} / {} -> {:.3}", dx.label, parsed, p);
                if p >= self.config.threshold {
                    out.push(RawRelationship::new(dx.label.as_str(), parsed).with_confidence(p));
                }
            }
        }
        Ok(out)
    }
}

/// Context window of at most `max_len` source characters covering both
/// mentions, with markers around each mention.
///
/// When the covering span fits, it is padded evenly on both sides. When it
/// does not, the first and last `max_len / 2` characters of the span are
/// kept and joined with `" ... "`.
#[must_use]
pub fn pair_context(chars: &[char], dx: &DiagnosisMention, date: &DateMention, max_len: usize) -> String {
    let n = chars.len();
    let lo = dx.start.min(date.start).min(n);
    let hi = dx.end().max(date.end()).min(n).max(lo);

    let marks = [
        (dx.start, DX_OPEN),
        (dx.end(), DX_CLOSE),
        (date.start, DATE_OPEN),
        (date.end(), DATE_CLOSE),
    ];

    let segments: Vec<(usize, usize)> = if hi - lo > max_len {
        let half = max_len / 2;
        vec![(lo, lo + half), (hi - half, hi)]
    } else {
        let extra = max_len - (hi - lo);
        let left = lo - lo.min(extra / 2);
        let used = lo - left;
        let right = (hi + (extra - used)).min(n);
        vec![(left, right)]
    };

    let mut out = String::new();
    for (i, &(start, end)) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(ELLIPSIS);
        }
        render_segment(chars, start, end, &marks, &mut out);
    }
    out
}

fn render_segment(chars: &[char], start: usize, end: usize, marks: &[(usize, &str)], out: &mut String) {
    let is_close = |tag: &str| tag.starts_with("</");
    for pos in start..end {
        for (_, tag) in marks.iter().filter(|(p, t)| *p == pos && pos > start && is_close(t)) {
            out.push_str(tag);
        }
        for (_, tag) in marks.iter().filter(|(p, t)| *p == pos && !is_close(t)) {
            out.push_str(tag);
        }
        if let Some(c) = chars.get(pos) {
            out.push(*c);
        }
    }
    if end > start {
        for (_, tag) in marks.iter().filter(|(p, t)| *p == end && is_close(t)) {
            out.push_str(tag);
        }
    }
}
