//! Diagnosis-date relationships: predicted, raw, and gold.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Confidence, Error, Result};

/// Comparison key used by the matcher: `(note_id, diagnosis, date)`.
///
/// Confidence is never part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationKey {
    /// Document index within the evaluation set.
    pub note_id: usize,
    /// Lowercased diagnosis label.
    pub diagnosis: String,
    /// Canonical `YYYY-MM-DD` date.
    pub date: String,
}

impl std::fmt::Display for RelationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} @ {}", self.note_id, self.diagnosis, self.date)
    }
}

/// A canonical predicted relationship.
///
/// Deserialization goes through [`Relationship::new`], so records with an
/// empty diagnosis, a non-canonical date, or a confidence outside [0, 1]
/// are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RelationshipRecord")]
pub struct Relationship {
    /// Document index within the evaluation set.
    pub note_id: usize,
    /// Lowercased diagnosis label.
    pub diagnosis: String,
    /// Canonical `YYYY-MM-DD` date.
    pub date: String,
    /// Producer confidence, 1.0 when the producer did not report one.
    pub confidence: Confidence,
}

#[derive(Deserialize)]
struct RelationshipRecord {
    note_id: usize,
    diagnosis: String,
    date: String,
    #[serde(default)]
    confidence: Option<f64>,
}

impl TryFrom<RelationshipRecord> for Relationship {
    type Error = Error;

    fn try_from(record: RelationshipRecord) -> Result<Self> {
        let confidence = match record.confidence {
            None => Confidence::CERTAIN,
            Some(c) if (0.0..=1.0).contains(&c) => Confidence::saturating(c),
            Some(c) => {
                return Err(Error::invalid_input(format!(
                    "relationship confidence {c} is outside 0.0..=1.0"
                )))
            }
        };
        Self::new(record.note_id, &record.diagnosis, &record.date, confidence)
    }
}

impl Relationship {
    /// Build a relationship, lowercasing the diagnosis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the diagnosis is empty after
    /// trimming, or the date is not shaped `YYYY-MM-DD`.
    pub fn new(
        note_id: usize,
        diagnosis: &str,
        date: &str,
        confidence: Confidence,
    ) -> Result<Self> {
        let diagnosis = diagnosis.trim().to_lowercase();
        if diagnosis.is_empty() {
            return Err(Error::invalid_input("relationship diagnosis is empty"));
        }
        if !is_canonical_date(date) {
            return Err(Error::invalid_input(format!(
                "relationship date '{date}' is not YYYY-MM-DD"
            )));
        }
        Ok(Self {
            note_id,
            diagnosis,
            date: date.to_string(),
            confidence,
        })
    }

    /// The matcher's comparison key.
    #[must_use]
    pub fn key(&self) -> RelationKey {
        RelationKey {
            note_id: self.note_id,
            diagnosis: self.diagnosis.clone(),
            date: self.date.clone(),
        }
    }
}

/// A human-curated relationship. Same shape as [`Relationship`] without
/// confidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GoldStandardEntry {
    /// Document index within the evaluation set.
    pub note_id: usize,
    /// Lowercased diagnosis label.
    pub diagnosis: String,
    /// Date as given by the annotator (assumed canonical).
    pub date: String,
}

impl GoldStandardEntry {
    /// Create a gold entry. Only the diagnosis is normalized (lowercased).
    #[must_use]
    pub fn new(note_id: usize, diagnosis: &str, date: &str) -> Self {
        Self {
            note_id,
            diagnosis: diagnosis.to_lowercase(),
            date: date.to_string(),
        }
    }

    /// The matcher's comparison key.
    #[must_use]
    pub fn key(&self) -> RelationKey {
        RelationKey {
            note_id: self.note_id,
            diagnosis: self.diagnosis.clone(),
            date: self.date.clone(),
        }
    }
}

/// A relationship as emitted by a relation generator, before normalization.
///
/// Shape: `{"diagnosis": string, "date": string, "confidence"?: float}`.
/// Numbers and booleans in `diagnosis` or `date` are stringified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRelationship {
    /// Diagnosis label as produced.
    #[serde(default, deserialize_with = "lenient_string")]
    pub diagnosis: Option<String>,
    /// Date text as produced.
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    /// Optional producer confidence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl RawRelationship {
    /// A record with both fields present.
    #[must_use]
    pub fn new(diagnosis: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            diagnosis: Some(diagnosis.into()),
            date: Some(date.into()),
            confidence: None,
        }
    }

    /// Attach a confidence.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Whether `s` is shaped `YYYY-MM-DD` (ASCII digits, dash separators).
#[must_use]
pub fn is_canonical_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_new_lowercases() {
        let r = Relationship::new(3, " Asthma ", "2021-06-01", Confidence::CERTAIN).unwrap();
        assert_eq!(r.diagnosis, "asthma");
        assert_eq!(
            r.key(),
            RelationKey {
                note_id: 3,
                diagnosis: "asthma".into(),
                date: "2021-06-01".into()
            }
        );
    }

    #[test]
    fn test_relationship_rejects_invalid() {
        assert!(Relationship::new(0, "  ", "2021-06-01", Confidence::CERTAIN).is_err());
        assert!(Relationship::new(0, "flu", "01/06/2021", Confidence::CERTAIN).is_err());
    }

    #[test]
    fn test_gold_key_matches_relationship_key() {
        let g = GoldStandardEntry::new(1, "FLU", "2023-01-01");
        let r = Relationship::new(1, "flu", "2023-01-01", Confidence::saturating(0.2)).unwrap();
        assert_eq!(g.key(), r.key());
    }

    #[test]
    fn test_raw_relationship_lenient_fields() {
        let raw: RawRelationship =
            serde_json::from_str(r#"{"diagnosis": 42, "date": "2020-01-01"}"#).unwrap();
        assert_eq!(raw.diagnosis.as_deref(), Some("42"));
        assert_eq!(raw.confidence, None);

        let missing: RawRelationship = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert!(missing.diagnosis.is_none());
        assert!(missing.date.is_none());
    }

    #[test]
    fn test_relationship_confidence_defaults() {
        let r: Relationship =
            serde_json::from_str(r#"{"note_id": 0, "diagnosis": "flu", "date": "2023-01-01"}"#)
                .unwrap();
        assert_eq!(r.confidence, Confidence::CERTAIN);
    }

    #[test]
    fn test_relationship_deserialize_validates() {
        let r: Relationship = serde_json::from_str(
            r#"{"note_id": 2, "diagnosis": "COPD", "date": "2022-07-01", "confidence": 0.4}"#,
        )
        .unwrap();
        assert_eq!(r.diagnosis, "copd");
        assert_eq!(r.confidence.get(), 0.4);

        for bad in [
            r#"{"note_id": 0, "diagnosis": "flu", "date": "2023-01-01", "confidence": 1.7}"#,
            r#"{"note_id": 0, "diagnosis": "flu", "date": "01/01/2023"}"#,
            r#"{"note_id": 0, "diagnosis": "  ", "date": "2023-01-01"}"#,
        ] {
            assert!(serde_json::from_str::<Relationship>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_is_canonical_date() {
        assert!(is_canonical_date("2023-02-03"));
        assert!(!is_canonical_date("2023-2-03"));
        assert!(!is_canonical_date("2023/02/03"));
        assert!(!is_canonical_date("abcd-ef-gh"));
    }
}
