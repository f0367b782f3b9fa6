//! Prediction normalization and the extraction loop.
//!
//! Raw generator output becomes canonical [`Relationship`]s here. A record
//! missing a field, or whose date or diagnosis does not survive
//! normalization, is skipped and counted. A generator failure on one
//! document is logged and recorded, and the run moves on.

use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};

use dxdate_core::{Confidence, PreparedDocument, RawRelationship, Relationship};

use crate::date::parse_date;
use crate::generate::RelationGenerator;

/// Why a raw record did not become a [`Relationship`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// `diagnosis` or `date` absent.
    MissingField,
    /// Diagnosis empty after trimming, or date not parseable.
    Unparseable,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingField => f.write_str("missing diagnosis or date"),
            SkipReason::Unparseable => f.write_str("empty diagnosis or unparseable date"),
        }
    }
}

/// Normalize one raw record for document `note_id`.
///
/// The date goes through [`parse_date`]; the diagnosis is trimmed and
/// lowercased; a missing confidence becomes 1.0 and any value is clamped
/// into [0, 1].
///
/// # Errors
///
/// Returns the [`SkipReason`] when the record cannot be used.
pub fn normalize_record(note_id: usize, raw: &RawRelationship) -> Result<Relationship, SkipReason> {
    let (Some(raw_diagnosis), Some(raw_date)) = (raw.diagnosis.as_deref(), raw.date.as_deref())
    else {
        return Err(SkipReason::MissingField);
    };

    let diagnosis = raw_diagnosis.trim().to_lowercase();
    let date = parse_date(raw_date).ok_or(SkipReason::Unparseable)?;
    if diagnosis.is_empty() {
        return Err(SkipReason::Unparseable);
    }

    let confidence = raw
        .confidence
        .map(Confidence::saturating)
        .unwrap_or_default();

    Relationship::new(note_id, &diagnosis, &date, confidence).map_err(|_| SkipReason::Unparseable)
}

/// Predictions for one batch of raw records plus the skip count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    /// Records that normalized cleanly.
    pub predictions: Vec<Relationship>,
    /// Records that were dropped.
    pub skipped: usize,
}

impl NormalizedBatch {
    /// Normalize every record of one document.
    #[must_use]
    pub fn from_raw(note_id: usize, raw: &[RawRelationship]) -> Self {
        let mut batch = Self::default();
        for record in raw {
            match normalize_record(note_id, record) {
                Ok(rel) => batch.predictions.push(rel),
                Err(SkipReason::MissingField) => {
                    log::warn!(
                        "Skipping relationship in note {}: missing 'date' or 'diagnosis' ({:?})",
                        note_id,
                        record
                    );
                    batch.skipped += 1;
                }
                Err(reason) => {
                    log::debug!("Skipping relationship in note {}: {} ({:?})", note_id, reason, record);
                    batch.skipped += 1;
                }
            }
        }
        batch
    }
}

/// A document whose generator call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Document index.
    pub note_id: usize,
    /// Error message.
    pub message: String,
}

/// Outcome of running one generator over a prepared dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRun {
    /// Generator name.
    pub generator: String,
    /// Canonical predictions across all documents.
    pub predictions: Vec<Relationship>,
    /// Raw records dropped during normalization.
    pub skipped: usize,
    /// Documents whose generator call failed.
    pub failures: Vec<DocumentFailure>,
    /// Documents visited (including failed ones).
    pub documents_processed: usize,
}

/// Run `generator` over every document, normalizing its output.
///
/// Documents are processed one at a time, in order. `progress`, when
/// given, is advanced once per document.
pub fn run_extraction<G>(
    generator: &G,
    documents: &[PreparedDocument],
    progress: Option<&ProgressBar>,
) -> ExtractionRun
where
    G: RelationGenerator + ?Sized,
{
    log::info!("Generating predictions using {}...", generator.name());

    let mut run = ExtractionRun {
        generator: generator.name().to_string(),
        predictions: Vec::new(),
        skipped: 0,
        failures: Vec::new(),
        documents_processed: 0,
    };

    for doc in documents {
        match generator.extract(&doc.text, &doc.entities) {
            Ok(raw) => {
                let batch = NormalizedBatch::from_raw(doc.note_id, &raw);
                run.predictions.extend(batch.predictions);
                run.skipped += batch.skipped;
            }
            Err(e) => {
                log::warn!(
                    "Extraction error on note {} for {}: {}",
                    doc.note_id,
                    generator.name(),
                    e
                );
                run.failures.push(DocumentFailure {
                    note_id: doc.note_id,
                    message: e.to_string(),
                });
            }
        }
        run.documents_processed += 1;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    log::info!(
        "Generated {} predictions. Skipped {} potentially invalid relationships.",
        run.predictions.len(),
        run.skipped
    );
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::MockGenerator;
    use dxdate_core::EntitySet;

    #[test]
    fn test_normalize_record() {
        let r = normalize_record(2, &RawRelationship::new(" Flu ", "03/02/2023")).unwrap();
        assert_eq!(r.note_id, 2);
        assert_eq!(r.diagnosis, "flu");
        assert_eq!(r.date, "2023-02-03");
        assert_eq!(r.confidence, Confidence::CERTAIN);
    }

    #[test]
    fn test_normalize_record_skips() {
        let missing = RawRelationship {
            diagnosis: Some("flu".into()),
            ..Default::default()
        };
        assert_eq!(normalize_record(0, &missing), Err(SkipReason::MissingField));
        assert_eq!(
            normalize_record(0, &RawRelationship::new("flu", "soon")),
            Err(SkipReason::Unparseable)
        );
        assert_eq!(
            normalize_record(0, &RawRelationship::new("  ", "2023-01-01")),
            Err(SkipReason::Unparseable)
        );
    }

    #[test]
    fn test_confidence_clamped() {
        let r = normalize_record(0, &RawRelationship::new("flu", "2023-01-01").with_confidence(3.0))
            .unwrap();
        assert_eq!(r.confidence.get(), 1.0);
        let r = normalize_record(0, &RawRelationship::new("flu", "2023-01-01").with_confidence(0.4))
            .unwrap();
        assert_eq!(r.confidence.get(), 0.4);
    }

    #[test]
    fn test_run_extraction_isolates_failures() {
        let docs = vec![
            PreparedDocument::new(0, "a", EntitySet::default()),
            PreparedDocument::new(1, "boom", EntitySet::default()),
            PreparedDocument::new(2, "c", EntitySet::default()),
        ];
        let gen = MockGenerator::new("mock")
            .with_relations(
                "a",
                vec![
                    RawRelationship::new("flu", "2023-01-01"),
                    RawRelationship::new("cold", "whenever"),
                ],
            )
            .failing_on("boom", "timeout")
            .with_relations("c", vec![RawRelationship::new("Asthma", "1 Jan 2020")]);

        let pb = ProgressBar::hidden();
        pb.set_length(docs.len() as u64);
        let run = run_extraction(&gen, &docs, Some(&pb));

        assert_eq!(run.generator, "mock");
        assert_eq!(run.documents_processed, 3);
        assert_eq!(run.skipped, 1);
        assert_eq!(
            run.failures,
            vec![DocumentFailure {
                note_id: 1,
                message: "Generator error: timeout".into()
            }]
        );
        let keys: Vec<(usize, &str, &str)> = run
            .predictions
            .iter()
            .map(|r| (r.note_id, r.diagnosis.as_str(), r.date.as_str()))
            .collect();
        assert_eq!(keys, vec![(0, "flu", "2023-01-01"), (2, "asthma", "2020-01-01")]);
        assert_eq!(pb.position(), 3);
    }
}
