//! Synthetic JSON dataset.

use std::path::Path;

use serde_json::Value;

use dxdate_core::{GoldStandardEntry, PreparedDocument};

use super::gold::gold_from_ground_truth;
use super::PreparedDataset;
use crate::extract::extract_entities;
use crate::{Error, Result};

/// Index where the evaluation split starts: the last 20% is held out.
#[must_use]
pub fn evaluation_split(len: usize) -> usize {
    len * 4 / 5
}

/// Load the held-out split of a synthetic dataset.
///
/// The file is a JSON array of `{"clinical_note", "ground_truth"}`
/// records. The last 20% is kept, then limited to the first `num_samples`
/// when given. Entities are extracted from each note's inline tags.
///
/// # Errors
///
/// Fails if the file is missing, unreadable, or not a JSON array.
pub fn load_synthetic_data(path: &Path, num_samples: Option<usize>) -> Result<PreparedDataset> {
    if !path.exists() {
        return Err(Error::DatasetNotFound(path.to_path_buf()));
    }
    log::info!("Loading synthetic dataset from {}...", path.display());
    let content = std::fs::read_to_string(path)?;
    let full: Vec<Value> = serde_json::from_str(&content)?;

    let split = evaluation_split(full.len());
    let mut held_out = &full[split..];
    log::info!(
        "Using last {}/{} samples (20%) for evaluation.",
        held_out.len(),
        full.len()
    );
    if let Some(n) = num_samples.filter(|n| *n > 0 && *n < held_out.len()) {
        held_out = &held_out[..n];
        log::info!("Limiting to {} evaluation samples.", n);
    }

    let gold: Vec<GoldStandardEntry> = held_out
        .iter()
        .enumerate()
        .flat_map(|(i, record)| gold_from_ground_truth(i, record))
        .collect();
    log::info!("Prepared gold standard with {} relationships.", gold.len());

    let documents = held_out
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let text = record
                .get("clinical_note")
                .and_then(Value::as_str)
                .unwrap_or_default();
            PreparedDocument::new(i, text, extract_entities(text))
        })
        .collect();

    Ok(PreparedDataset { documents, gold })
}
