//! Precision / recall / F1 over relation triples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics for one scoring pass.
///
/// Counts are scoped to documents that have at least one gold label.
/// Every ratio is 0.0 (never NaN) when its denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// TP / (TP + FP).
    pub precision: f64,
    /// TP / (TP + FN).
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Predicted triples present in gold.
    pub true_positives: usize,
    /// Predicted triples absent from gold.
    pub false_positives: usize,
    /// Gold triples not predicted.
    pub false_negatives: usize,
}

impl MetricsReport {
    /// All-zero report.
    #[must_use]
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// Compute ratios from raw counts.
    #[must_use]
    pub fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        Self {
            precision,
            recall,
            f1: f1_score(precision, recall),
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Harmonic mean, 0.0 when both inputs are zero.
#[must_use]
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Precision: {:.3}", self.precision)?;
        writeln!(f, "Recall:    {:.3}", self.recall)?;
        writeln!(f, "F1:        {:.3}", self.f1)?;
        write!(
            f,
            "TP={} FP={} FN={}",
            self.true_positives, self.false_positives, self.false_negatives
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_counts() {
        let m = MetricsReport::from_counts(1, 0, 1);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 0.5);
        assert!((m.f1 - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominators() {
        let m = MetricsReport::from_counts(0, 0, 0);
        assert_eq!(m, MetricsReport::zeroed());
        assert!(!m.f1.is_nan());
    }

    #[test]
    fn test_json_shape() {
        let v = serde_json::to_value(MetricsReport::from_counts(2, 1, 1)).unwrap();
        for key in [
            "precision",
            "recall",
            "f1",
            "true_positives",
            "false_positives",
            "false_negatives",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
    }

    proptest::proptest! {
        #[test]
        fn ratios_stay_in_unit_interval(tp in 0usize..500, fp in 0usize..500, fn_ in 0usize..500) {
            let m = MetricsReport::from_counts(tp, fp, fn_);
            for v in [m.precision, m.recall, m.f1] {
                proptest::prop_assert!((0.0..=1.0).contains(&v));
            }
            proptest::prop_assert!(m.f1 <= m.precision.max(m.recall) + 1e-12);
        }
    }

    #[test]
    fn test_display() {
        let s = MetricsReport::from_counts(2, 0, 0).to_string();
        assert!(s.contains("Precision: 1.000"));
        assert!(s.contains("TP=2 FP=0 FN=0"));
    }
}
