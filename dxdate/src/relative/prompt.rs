//! Prompt contract for relative-date resolution.
//!
//! Request: reference timestamp (`YYYY-MM-DD HH:MM:SS`) plus note text.
//! Response: a JSON array of `{"phrase", "start_index", "calculated_date"}`
//! somewhere in the completion. The span from the first `[` to the last `]`
//! is parsed; prose around it is ignored.

use chrono::NaiveDateTime;
use serde_json::Value;

use dxdate_core::DateMention;

use crate::date::parse_date;
use crate::{Error, Result};

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str =
    "You are a medical AI assistant specialized in extracting temporal expressions from clinical notes.";

/// Build the user message for one note.
#[must_use]
pub fn user_prompt(text: &str, reference: &NaiveDateTime) -> String {
    let timestamp = reference.format("%Y-%m-%d %H:%M:%S");
    format!(
        r#"Given the document creation date: {timestamp}

Analyze the following clinical text and identify phrases that describe dates relative to the document creation date:
"{text}"

Relative date references look like:
- "last year"
- "six months ago"
- "yesterday"
- "next week"
- "in 3 days"
- "two years ago"
- "last month"

For each phrase found:
1. Copy the exact phrase text (e.g. "last year", "yesterday")
2. Give the start character index of the phrase in the text above
3. Compute the absolute date in YYYY-MM-DD format

Example:
Text: "Patient was diagnosed with condition X last year."
- Phrase: "last year"
- Start index: (position in text)
- Calculated date: (one year before document date)

Example:
Text: "Follow-up scheduled in two weeks."
- Phrase: "in two weeks"
- Start index: (position in text)
- Calculated date: (two weeks after document date)

Return a JSON array where each object has these keys:
"phrase": the exact relative date phrase,
"start_index": integer position in text,
"calculated_date": YYYY-MM-DD format

If no relative dates are found, return an empty JSON array []."#
    )
}

/// Parse a model completion into date mentions.
///
/// Items with an empty phrase, or a calculated date that does not
/// normalize, are dropped. `start_index` defaults to 0.
///
/// # Errors
///
/// Returns [`Error::Parse`] when no JSON array is present, the array does
/// not parse, or an item is not an object.
pub fn parse_response(content: &str) -> Result<Vec<DateMention>> {
    let content = content.trim();
    let (Some(start), Some(end)) = (content.find('['), content.rfind(']')) else {
        return Err(Error::parse("no JSON array in response"));
    };
    if end < start {
        return Err(Error::parse("no JSON array in response"));
    }

    let items: Vec<Value> = serde_json::from_str(&content[start..=end])
        .map_err(|e| Error::parse(format!("invalid JSON array in response: {e}")))?;

    let mut mentions = Vec::new();
    for item in items {
        let Value::Object(obj) = item else {
            return Err(Error::parse(format!("response item is not an object: {item}")));
        };
        let phrase = obj.get("phrase").and_then(Value::as_str).unwrap_or("");
        let calculated = obj
            .get("calculated_date")
            .and_then(Value::as_str)
            .unwrap_or("");
        if phrase.is_empty() || calculated.is_empty() {
            continue;
        }
        let Some(parsed) = parse_date(calculated) else {
            log::debug!("dropping relative date '{}' with unparseable date '{}'", phrase, calculated);
            continue;
        };
        let start = obj
            .get("start_index")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        mentions.push(DateMention::resolved(parsed, phrase, start));
    }
    Ok(mentions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_prompt_contains_timestamp_and_text() {
        let reference = NaiveDate::from_ymd_opt(2025, 5, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let p = user_prompt("seen last week", &reference);
        assert!(p.contains("2025-05-14 09:30:00"));
        assert!(p.contains("\"seen last week\""));
    }

    #[test]
    fn test_parse_response_with_prose() {
        let content = r#"Sure! Here you go:
[
  {"phrase": "last year", "start_index": 12, "calculated_date": "2024-05-14"},
  {"phrase": "", "start_index": 3, "calculated_date": "2024-01-01"},
  {"phrase": "recently", "calculated_date": ""},
  {"phrase": "yesterday", "calculated_date": "2025-05-13"}
]
Let me know if you need anything else."#;
        let got = parse_response(content).unwrap();
        assert_eq!(
            got,
            vec![
                DateMention::resolved("2024-05-14", "last year", 12),
                DateMention::resolved("2025-05-13", "yesterday", 0),
            ]
        );
    }

    #[test]
    fn test_parse_response_canonicalizes_dates() {
        let got = parse_response(r#"[{"phrase": "in two weeks", "start_index": 5, "calculated_date": "28/05/2025"}]"#)
            .unwrap();
        assert_eq!(got[0].parsed.as_deref(), Some("2025-05-28"));

        let dropped = parse_response(r#"[{"phrase": "soon", "calculated_date": "TBD"}]"#).unwrap();
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_parse_response_failures() {
        assert!(parse_response("I could not find any dates.").is_err());
        assert!(parse_response("] backwards [").is_err());
        assert!(parse_response("[not json]").is_err());
        assert!(parse_response(r#"["last year"]"#).is_err());
        assert!(parse_response("[]").unwrap().is_empty());
    }
}
