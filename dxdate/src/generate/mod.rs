//! Relation generators: propose (diagnosis, date) relationships for a
//! document given its pre-extracted entities.
//!
//! Every generator is treated the same way by the pipeline. Output is raw
//! ([`RawRelationship`]) and goes through [`crate::normalize`] before it is
//! scored, so a generator may emit malformed records, non-canonical dates,
//! or no confidence at all.
//!
//! | Generator | Decision |
//! |-----------|----------|
//! | [`ProximityGenerator`] | nearest date per diagnosis, within a distance |
//! | [`ClassifierGenerator`] | every nearby pair, scored by a [`PairClassifier`] |
//! | [`MockGenerator`] | canned output, for tests |

use std::collections::HashMap;

use dxdate_core::{DateMention, DiagnosisMention, EntitySet, RawRelationship};

use crate::{Error, Result};

mod classifier;
mod proximity;

pub use classifier::{
    pair_context, ClassifierGenerator, LinearPairClassifier, LinearWeights, PairClassifier,
    PairFeatures,
};
pub use proximity::ProximityGenerator;

/// Anything that proposes diagnosis-date relationships for one document.
///
/// Implementations need not be deterministic. An `Err` fails only the
/// current document; the batch continues.
pub trait RelationGenerator: Send + Sync {
    /// Identifier used in logs and output file names.
    fn name(&self) -> &str;

    /// Propose relationships for `text`, whose entities are `entities`.
    fn extract(&self, text: &str, entities: &EntitySet) -> Result<Vec<RawRelationship>>;
}

impl<G: RelationGenerator + ?Sized> RelationGenerator for Box<G> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self, text: &str, entities: &EntitySet) -> Result<Vec<RawRelationship>> {
        (**self).extract(text, entities)
    }
}

/// Character gap between a diagnosis and a date mention; 0 when they
/// overlap or touch.
#[must_use]
pub fn mention_gap(dx: &DiagnosisMention, date: &DateMention) -> usize {
    if dx.end() <= date.start {
        date.start - dx.end()
    } else {
        dx.start.saturating_sub(date.end())
    }
}

#[derive(Clone)]
enum MockOutcome {
    Relations(Vec<RawRelationship>),
    Fail(String),
}

/// Generator returning canned output keyed by exact document text.
///
/// Documents with no registered outcome yield no relationships.
///
/// ```rust
/// use dxdate::{MockGenerator, RelationGenerator};
/// use dxdate_core::{EntitySet, RawRelationship};
///
/// let gen = MockGenerator::new("mock")
///     .with_relations("flu[dx] (2023-01-01)[date]", vec![RawRelationship::new("flu", "2023-01-01")])
///     .failing_on("boom", "backend down");
///
/// assert_eq!(gen.extract("flu[dx] (2023-01-01)[date]", &EntitySet::default()).unwrap().len(), 1);
/// assert!(gen.extract("boom", &EntitySet::default()).is_err());
/// assert!(gen.extract("other", &EntitySet::default()).unwrap().is_empty());
/// ```
#[derive(Clone)]
pub struct MockGenerator {
    name: String,
    outcomes: HashMap<String, MockOutcome>,
}

impl MockGenerator {
    /// Create a mock with no canned output.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcomes: HashMap::new(),
        }
    }

    /// Return `relations` for documents whose text is exactly `text`.
    #[must_use]
    pub fn with_relations(mut self, text: impl Into<String>, relations: Vec<RawRelationship>) -> Self {
        self.outcomes
            .insert(text.into(), MockOutcome::Relations(relations));
        self
    }

    /// Fail with `message` for documents whose text is exactly `text`.
    #[must_use]
    pub fn failing_on(mut self, text: impl Into<String>, message: impl Into<String>) -> Self {
        self.outcomes
            .insert(text.into(), MockOutcome::Fail(message.into()));
        self
    }
}

impl RelationGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str, _entities: &EntitySet) -> Result<Vec<RawRelationship>> {
        match self.outcomes.get(text) {
            Some(MockOutcome::Relations(r)) => Ok(r.clone()),
            Some(MockOutcome::Fail(msg)) => Err(Error::generator(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mention_gap() {
        let dx = DiagnosisMention::new("flu", 0); // [0, 3)
        let after = DateMention::resolved("2023-01-01", "2023-01-01", 10);
        let before = DateMention::resolved("2023-01-01", "1/1/23", 20);
        let dx_late = DiagnosisMention::new("flu", 30);
        assert_eq!(mention_gap(&dx, &after), 7);
        assert_eq!(mention_gap(&dx_late, &before), 4);
        assert_eq!(mention_gap(&DiagnosisMention::new("flu", 10), &after), 0);
    }

    #[test]
    fn test_boxed_generator() {
        let gen: Box<dyn RelationGenerator> = Box::new(MockGenerator::new("boxed"));
        assert_eq!(gen.name(), "boxed");
        assert!(gen.extract("x", &EntitySet::default()).unwrap().is_empty());
    }
}
