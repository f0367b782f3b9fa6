//! Gold-standard parsing.
//!
//! Two shapes are accepted:
//!
//! ```text
//! grouped by date      [{"date": "2023-01-01", "diagnoses": [{"diagnosis": "flu"}, ...]}, ...]
//! flat relationships   {"relationships": [{"diagnosis": "flu", "date": "2023-01-01"}, ...]}
//! ```
//!
//! Synthetic notes carry the grouped shape under `ground_truth`. Dates are
//! taken as given; only diagnoses are lowercased.

use serde_json::Value;

use dxdate_core::GoldStandardEntry;

use crate::{Error, Result};

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Gold entries from a synthetic record's `ground_truth`.
///
/// Sections missing `date` or `diagnoses`, and diagnoses missing
/// `diagnosis`, are logged and skipped.
#[must_use]
pub fn gold_from_ground_truth(note_id: usize, record: &Value) -> Vec<GoldStandardEntry> {
    let Some(sections) = record.get("ground_truth").and_then(Value::as_array) else {
        log::warn!("Missing or invalid 'ground_truth' in note {}", note_id);
        return Vec::new();
    };

    let mut out = Vec::new();
    for section in sections {
        let date = section.get("date").and_then(scalar_string);
        let diagnoses = section.get("diagnoses").and_then(Value::as_array);
        let (Some(date), Some(diagnoses)) = (date, diagnoses) else {
            log::warn!(
                "Missing 'date' or 'diagnoses' (or 'diagnoses' not a list) in note {}, section date {}",
                note_id,
                section.get("date").map_or("N/A".to_string(), |d| d.to_string())
            );
            continue;
        };
        for diag in diagnoses {
            match diag.get("diagnosis").and_then(scalar_string) {
                Some(label) => out.push(GoldStandardEntry::new(note_id, &label, &date)),
                None => log::warn!(
                    "Missing 'diagnosis' key in note {}, section date {}",
                    note_id,
                    date
                ),
            }
        }
    }
    out
}

/// Gold entries from a CSV gold cell (JSON text).
///
/// # Errors
///
/// Returns [`Error::Parse`] if the cell is not JSON or matches neither
/// accepted shape.
pub fn parse_gold_cell(note_id: usize, cell: &str) -> Result<Vec<GoldStandardEntry>> {
    let value: Value = serde_json::from_str(cell)
        .map_err(|e| Error::parse(format!("gold standard is not JSON: {e}")))?;

    let mut out = Vec::new();
    match &value {
        Value::Array(groups) => {
            for group in groups {
                let Some(date) = group.get("date").and_then(scalar_string).filter(|d| !d.is_empty())
                else {
                    continue;
                };
                let diagnoses = group
                    .get("diagnoses")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                for diag in diagnoses {
                    if let Some(label) = diag.get("diagnosis").and_then(scalar_string) {
                        out.push(GoldStandardEntry::new(note_id, &label, &date));
                    }
                }
            }
        }
        Value::Object(obj) => {
            let Some(rels) = obj.get("relationships").and_then(Value::as_array) else {
                return Err(Error::parse("unrecognized gold standard format"));
            };
            for rel in rels {
                let diagnosis = rel.get("diagnosis").and_then(scalar_string);
                let date = rel.get("date").and_then(scalar_string);
                if let (Some(diagnosis), Some(date)) = (diagnosis, date) {
                    out.push(GoldStandardEntry::new(note_id, &diagnosis, &date));
                }
            }
        }
        _ => return Err(Error::parse("unrecognized gold standard format")),
    }
    Ok(out)
}
