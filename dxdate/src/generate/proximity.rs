//! Nearest-date baseline.

use dxdate_core::{EntitySet, RawRelationship};

use super::{mention_gap, RelationGenerator};
use crate::Result;

/// Pairs each diagnosis with its nearest resolved date, if that date lies
/// within `max_distance` characters.
///
/// Confidence decays linearly with distance: `1 - d / (max_distance + 1)`.
/// Ties go to the date that appears first.
#[derive(Debug, Clone)]
pub struct ProximityGenerator {
    max_distance: usize,
}

impl ProximityGenerator {
    /// Create a generator with the given distance cutoff.
    #[must_use]
    pub fn new(max_distance: usize) -> Self {
        Self { max_distance }
    }

    /// The distance cutoff, in characters.
    #[must_use]
    pub fn max_distance(&self) -> usize {
        self.max_distance
    }
}

impl Default for ProximityGenerator {
    fn default() -> Self {
        Self::new(500)
    }
}

impl RelationGenerator for ProximityGenerator {
    fn name(&self) -> &str {
        "proximity"
    }

    fn extract(&self, _text: &str, entities: &EntitySet) -> Result<Vec<RawRelationship>> {
        let mut out = Vec::new();
        for dx in &entities.diagnoses {
            let nearest = entities
                .resolved_dates()
                .map(|date| (mention_gap(dx, date), date))
                .filter(|(gap, _)| *gap <= self.max_distance)
                .min_by_key(|(gap, _)| *gap);

            if let Some((gap, date)) = nearest {
                let Some(parsed) = date.parsed.as_deref() else {
                    continue;
                };
                let confidence = 1.0 - gap as f64 / (self.max_distance as f64 + 1.0);
                out.push(RawRelationship::new(dx.label.as_str(), parsed).with_confidence(confidence));
            }
        }
        Ok(out)
    }
}
