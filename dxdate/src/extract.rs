//! Entity extraction from annotated clinical text.
//!
//! Notes mark entities inline:
//!
//! ```text
//! "diabetes[dx] diagnosed (2023-01-15)[date]"
//!  └──────┘                └────────┘
//!  diagnosis @0            date @24
//! ```
//!
//! - Diagnosis: a run of word characters followed by `[dx]`, `[diagnosis]`
//!   or `[diagno sis]` (any internal whitespace).
//! - Date: parenthesized content with no `)` followed by `[date]`. The raw
//!   text is trimmed, but the offset is the start of the untrimmed content.
//!
//! Dates that the normalizer cannot parse are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::date::parse_date;
use crate::offset::{truncate_chars, SpanConverter};
use dxdate_core::{DateMention, DiagnosisMention, EntitySet};

static DIAGNOSIS_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\[(?:dx|diagnosis|diagno\s*sis)\]").expect("valid regex"));

static DATE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]+)\)\[date\]").expect("valid regex"));

/// Whether `text` carries anything worth scanning.
///
/// Absent text, whitespace-only text and the literal `nan` (left behind by
/// empty spreadsheet cells) are not meaningful.
#[must_use]
pub fn is_meaningful_text(text: Option<&str>) -> bool {
    match text {
        None => false,
        Some(t) => !t.trim().is_empty() && !t.eq_ignore_ascii_case("nan"),
    }
}

/// Extract diagnosis and date mentions with character offsets.
///
/// ```rust
/// use dxdate::extract_entities;
///
/// let set = extract_entities("diabetes[dx] diagnosed (2023-01-15)[date]");
/// assert_eq!(set.diagnoses[0].label, "diabetes");
/// assert_eq!(set.dates[0].start, 24);
/// assert!(extract_entities(None).is_empty());
/// ```
pub fn extract_entities<'a>(text: impl Into<Option<&'a str>>) -> EntitySet {
    let text = text.into();
    if !is_meaningful_text(text) {
        return EntitySet::default();
    }
    let text = text.unwrap_or_default();
    let conv = SpanConverter::new(text);

    let diagnoses: Vec<DiagnosisMention> = DIAGNOSIS_TAG
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| DiagnosisMention::new(m.as_str(), conv.byte_to_char(m.start())))
        .collect();

    let dates: Vec<DateMention> = DATE_TAG
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| {
            let raw = m.as_str().trim();
            let start = conv.byte_to_char(m.start());
            match parse_date(raw) {
                Some(parsed) => Some(DateMention::resolved(parsed, raw, start)),
                None => {
                    log::debug!("dropping unparseable date '{}' at {}", raw, start);
                    None
                }
            }
        })
        .collect();

    if diagnoses.is_empty() {
        log::warn!(
            "No diagnoses found in text; sample (first 100 chars): {}",
            truncate_chars(text, 100)
        );
    }
    if dates.is_empty() {
        log::warn!(
            "No dates found in text; sample (first 100 chars): {}",
            truncate_chars(text, 100)
        );
    }

    EntitySet::new(diagnoses, dates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extraction() {
        let set = extract_entities("diabetes[dx] diagnosed (2023-01-15)[date]");
        assert_eq!(set.diagnoses, vec![DiagnosisMention::new("diabetes", 0)]);
        assert_eq!(
            set.dates,
            vec![DateMention::resolved("2023-01-15", "2023-01-15", 24)]
        );
    }

    #[test]
    fn test_diagnosis_span_follows_source_text() {
        let set = extract_entities("İleus[dx] (2023-01-15)[date]");
        let dx = &set.diagnoses[0];
        assert_eq!(dx.label, "i\u{307}leus");
        assert_eq!((dx.start, dx.end()), (0, 5));
        assert_eq!(set.dates[0].start, 11);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(extract_entities("").is_empty());
        assert!(extract_entities(None).is_empty());
        assert!(extract_entities("   \n\t").is_empty());
        assert!(extract_entities("nan").is_empty());
        assert!(extract_entities("NaN").is_empty());
    }

    #[test]
    fn test_tag_variants() {
        let set = extract_entities("Asthma[diagnosis] and copd[diagno sis] and flu[diagnosis]");
        let labels: Vec<&str> = set.diagnoses.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["asthma", "copd", "flu"]);
        assert_eq!(set.diagnoses[1].start, 22);
        assert!(set.dates.is_empty());
    }

    #[test]
    fn test_diagnosis_with_underscores() {
        let set = extract_entities("type_2_diabetes[dx]");
        assert_eq!(set.diagnoses[0].label, "type_2_diabetes");
    }

    #[test]
    fn test_date_trimmed_offset_untrimmed() {
        let set = extract_entities("flu[dx] (  3rd Feb'23 )[date]");
        let d = &set.dates[0];
        assert_eq!(d.raw, "3rd Feb'23");
        assert_eq!(d.parsed.as_deref(), Some("2023-02-03"));
        // offset of the first char after "("
        assert_eq!(d.start, 9);
    }

    #[test]
    fn test_unparseable_date_dropped() {
        let set = extract_entities("flu[dx] (last spring)[date] (01/02/2020)[date]");
        assert_eq!(set.dates.len(), 1);
        assert_eq!(set.dates[0].parsed.as_deref(), Some("2020-02-01"));
    }

    #[test]
    fn test_offsets_are_char_based() {
        let text = "fièvre[dx] (2023-01-15)[date]";
        let set = extract_entities(text);
        assert_eq!(set.diagnoses[0].label, "fièvre");
        assert_eq!(set.diagnoses[0].start, 0);
        // "fièvre[dx] (" is 12 chars but 13 bytes
        assert_eq!(set.dates[0].start, 12);
    }

    #[test]
    fn test_untagged_text_yields_nothing() {
        let set = extract_entities("Patient seen for review, no concerns.");
        assert!(set.is_empty());
    }
}
