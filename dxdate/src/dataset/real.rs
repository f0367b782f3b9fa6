//! Real-data CSV exports.
//!
//! Columns are looked up by configured name. Only the text column is
//! required; gold and annotation columns are used when present.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use dxdate_core::{DateMention, DiagnosisMention, EntitySet, GoldStandardEntry, PreparedDocument};

use super::gold::parse_gold_cell;
use super::PreparedDataset;
use crate::config::Config;
use crate::date::parse_timestamp;
use crate::pyliteral::transform_python_to_json;
use crate::relative::{resolve_relative_dates, ChatBackend};
use crate::{Error, Result};

#[derive(Deserialize)]
struct DiagnosisAnnotation {
    #[serde(default)]
    label: String,
    #[serde(default)]
    start: usize,
}

/// Column lookup over a CSV header.
struct Columns {
    index: HashMap<String, usize>,
    names: Vec<String>,
}

impl Columns {
    fn new(headers: &csv::StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(str::to_string).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { index, names }
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.get(name).ok_or_else(|| Error::MissingColumn {
            column: name.to_string(),
            available: self.names.clone(),
        })
    }
}

fn cell<'r>(record: &'r csv::StringRecord, column: Option<usize>) -> Option<&'r str> {
    column
        .and_then(|i| record.get(i))
        .filter(|s| !s.trim().is_empty())
}

/// Parse a row's annotation cells into an entity set.
///
/// Both cells use the Python-literal dialect: diagnoses as
/// `[{'label', 'start'}]`, dates as `[{'parsed', 'original', 'start'}]`.
///
/// # Errors
///
/// Fails if either cell does not match its shape.
pub fn parse_annotations(diagnoses_cell: &str, dates_cell: &str) -> Result<EntitySet> {
    let diagnoses: Vec<DiagnosisAnnotation> =
        serde_json::from_str(&transform_python_to_json(diagnoses_cell))?;
    let dates: Vec<DateMention> = serde_json::from_str(&transform_python_to_json(dates_cell))?;
    Ok(EntitySet::new(
        diagnoses
            .into_iter()
            .map(|d| DiagnosisMention::new(&d.label, d.start))
            .collect(),
        dates,
    ))
}

/// Load a real-data CSV export.
///
/// Row `i` (after the `num_samples` limit) becomes document `i`. When
/// relative dates are enabled, the timestamp column exists, and `backend`
/// is given, each row's resolved relative dates are appended to its date
/// mentions.
///
/// # Errors
///
/// Fails if the file is missing or unreadable, or the text column is absent.
pub fn load_real_data(
    path: &Path,
    config: &Config,
    backend: Option<&dyn ChatBackend>,
) -> Result<PreparedDataset> {
    if !path.exists() {
        return Err(Error::DatasetNotFound(path.to_path_buf()));
    }
    log::info!("Loading real dataset from {}...", path.display());

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let columns = Columns::new(reader.headers()?);
    let cols = &config.columns;

    let text_col = columns.require(&cols.text)?;
    let gold_col = columns.get(&cols.gold);
    let dx_col = columns.get(&cols.diagnoses);
    let dates_col = columns.get(&cols.dates);
    let ts_col = columns.get(&cols.timestamp);

    let mut records = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    log::info!("Found {} records in CSV.", records.len());
    if let Some(n) = config
        .evaluation
        .num_samples
        .filter(|n| *n > 0 && *n < records.len())
    {
        records.truncate(n);
        log::info!("Limiting to {} samples.", n);
    }

    let relative = if config.relative_dates.enabled {
        match (ts_col, backend) {
            (Some(_), Some(b)) => {
                log::info!(
                    "Relative date extraction enabled using timestamp column '{}' via {}",
                    cols.timestamp,
                    b.name()
                );
                Some(b)
            }
            (None, _) => {
                log::warn!(
                    "Relative date extraction enabled but timestamp column '{}' not found in CSV",
                    cols.timestamp
                );
                None
            }
            (Some(_), None) => {
                log::warn!("Relative date extraction enabled but no backend is available");
                None
            }
        }
    } else {
        None
    };

    let mut gold: Vec<GoldStandardEntry> = Vec::new();
    if gold_col.is_none() {
        log::info!("No gold standard column '{}'; metrics will be zero.", cols.gold);
    }
    if dx_col.is_none() || dates_col.is_none() {
        log::info!("Annotation columns absent; entities will be empty.");
    }

    let mut documents = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if let Some(g) = cell(record, gold_col) {
            match parse_gold_cell(i, g) {
                Ok(entries) => gold.extend(entries),
                Err(e) => log::warn!("Could not parse gold standard for row {}: {}", i, e),
            }
        }

        let text = record.get(text_col).unwrap_or_default().to_string();

        let mut entities = match (cell(record, dx_col), cell(record, dates_col)) {
            (Some(dx), Some(dates)) => parse_annotations(dx, dates).unwrap_or_else(|e| {
                log::warn!("Could not parse annotations for row {}: {}", i, e);
                EntitySet::default()
            }),
            _ => EntitySet::default(),
        };

        let timestamp = cell(record, ts_col);
        if let (Some(backend), Some(raw_ts)) = (relative, timestamp) {
            match parse_timestamp(raw_ts) {
                Some(reference) => {
                    let found =
                        resolve_relative_dates(&text, &reference, &config.relative_dates, backend);
                    log::debug!("Row {} resolved {} relative dates", i, found.len());
                    entities.extend_dates(found);
                }
                None => log::warn!("Could not parse timestamp '{}' for row {}", raw_ts, i),
            }
        }

        let mut document = PreparedDocument::new(i, text, entities);
        if let Some(raw_ts) = timestamp {
            document = document.with_timestamp(raw_ts);
        }
        documents.push(document);
    }
    log::info!("Prepared gold standard with {} relationships.", gold.len());

    Ok(PreparedDataset { documents, gold })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_annotations() {
        let set = parse_annotations(
            "[{'label': 'Asthma', 'start': 10}]",
            "[{'parsed': datetime.date(2019, 4, 18), 'original': '18/04/19', 'start': 30}, {'parsed': '', 'original': 'later', 'start': 50}]",
        )
        .unwrap();
        assert_eq!(set.diagnoses, vec![DiagnosisMention::new("asthma", 10)]);
        assert_eq!(set.dates[0], DateMention::resolved("2019-04-18", "18/04/19", 30));
        assert!(!set.dates[1].is_resolved());
        assert_eq!(set.resolved_dates().count(), 1);
    }

    #[test]
    fn test_malformed_annotations_become_empty_lists() {
        // Python-literal failures become "[]", so the result is empty rather than an error.
        let set = parse_annotations("[{'label': ", "[]").unwrap();
        assert!(set.is_empty());
        assert!(parse_annotations("[1, 2]", "[]").is_err());
    }
}
