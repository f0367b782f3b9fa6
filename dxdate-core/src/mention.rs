//! Located entity mentions: diagnoses and dates inside a clinical note.
//!
//! All offsets are **character** offsets (Unicode scalar values) into the
//! note text, never byte offsets.

use serde::{Deserialize, Serialize};

/// A diagnosis mention: lowercase label plus the character offset of the
/// first character of the label in the note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosisMention {
    /// Lowercased diagnosis label.
    pub label: String,
    /// Character offset of the label.
    pub start: usize,
    /// Length of the label as written in the note, in characters.
    ///
    /// Lowercasing can change the character count (`İ` becomes two chars),
    /// so the source length is kept apart from `label`. Zero means unknown.
    #[serde(default)]
    pub len: usize,
}

impl DiagnosisMention {
    /// Create a mention. The label is lowercased; the span length is taken
    /// from the label as given.
    #[must_use]
    pub fn new(label: &str, start: usize) -> Self {
        Self {
            label: label.to_lowercase(),
            start,
            len: label.chars().count(),
        }
    }

    /// Exclusive end offset, in characters.
    #[must_use]
    pub fn end(&self) -> usize {
        let len = if self.len == 0 {
            self.label.chars().count()
        } else {
            self.len
        };
        self.start + len
    }
}

/// A date mention.
///
/// `parsed` is the canonical `YYYY-MM-DD` form when the raw text could be
/// normalized. Unresolved mentions never take part in relation matching.
///
/// Serialized field names (`parsed`, `original`, `start`) match the
/// pre-annotated date columns of real-data CSV exports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateMention {
    /// Canonical `YYYY-MM-DD` date, if the raw text was understood.
    #[serde(default, deserialize_with = "crate::relationship::empty_as_none")]
    pub parsed: Option<String>,
    /// The substring as it appeared in the note.
    #[serde(rename = "original", default)]
    pub raw: String,
    /// Character offset of the raw text.
    #[serde(default)]
    pub start: usize,
}

impl DateMention {
    /// Create a resolved mention.
    #[must_use]
    pub fn resolved(parsed: impl Into<String>, raw: impl Into<String>, start: usize) -> Self {
        Self {
            parsed: Some(parsed.into()),
            raw: raw.into(),
            start,
        }
    }

    /// Create a mention whose date could not be normalized.
    #[must_use]
    pub fn unresolved(raw: impl Into<String>, start: usize) -> Self {
        Self {
            parsed: None,
            raw: raw.into(),
            start,
        }
    }

    /// Whether this mention carries a canonical date.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.parsed.is_some()
    }

    /// Exclusive end offset, in characters.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.raw.chars().count()
    }
}

/// The entities found in one document, handed from extraction to relation
/// generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    /// Diagnosis mentions in document order.
    pub diagnoses: Vec<DiagnosisMention>,
    /// Date mentions in document order (relative dates, when resolved, are
    /// appended after the explicit ones).
    pub dates: Vec<DateMention>,
}

impl EntitySet {
    /// Create an entity set.
    #[must_use]
    pub fn new(diagnoses: Vec<DiagnosisMention>, dates: Vec<DateMention>) -> Self {
        Self { diagnoses, dates }
    }

    /// True when neither diagnoses nor dates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnoses.is_empty() && self.dates.is_empty()
    }

    /// Date mentions that carry a canonical date.
    pub fn resolved_dates(&self) -> impl Iterator<Item = &DateMention> {
        self.dates.iter().filter(|d| d.is_resolved())
    }

    /// Append additional date mentions.
    pub fn extend_dates(&mut self, dates: impl IntoIterator<Item = DateMention>) {
        self.dates.extend(dates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnosis_label_lowercased() {
        let m = DiagnosisMention::new("Diabetes", 4);
        assert_eq!(m.label, "diabetes");
        assert_eq!(m.end(), 12);
    }

    #[test]
    fn test_diagnosis_end_uses_source_length() {
        // "İ" lowercases to "i̇" (two chars); the span in the note is one char.
        let m = DiagnosisMention::new("İleus", 5);
        assert_eq!(m.label.chars().count(), 6);
        assert_eq!(m.end(), 10);

        let annotated: DiagnosisMention =
            serde_json::from_str(r#"{"label": "flu", "start": 2}"#).unwrap();
        assert_eq!(annotated.end(), 5);
    }

    #[test]
    fn test_date_end_counts_chars() {
        let m = DateMention::resolved("2023-02-03", "3 févr", 10);
        assert_eq!(m.end(), 16);
    }

    #[test]
    fn test_resolved_dates_filter() {
        let set = EntitySet::new(
            vec![],
            vec![
                DateMention::resolved("2023-01-01", "1/1/2023", 0),
                DateMention::unresolved("sometime", 20),
            ],
        );
        assert_eq!(set.resolved_dates().count(), 1);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_date_mention_annotation_shape() {
        let m: DateMention =
            serde_json::from_str(r#"{"parsed": "2019-04-18", "original": "18/04/19", "start": 7}"#)
                .unwrap();
        assert_eq!(m, DateMention::resolved("2019-04-18", "18/04/19", 7));

        let empty: DateMention =
            serde_json::from_str(r#"{"parsed": "", "original": "x"}"#).unwrap();
        assert!(!empty.is_resolved());
        assert_eq!(empty.start, 0);
    }
}
