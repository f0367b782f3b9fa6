//! Score command - compare saved predictions with gold

use clap::Parser;
use serde_json::Value;

use dxdate::eval::{match_details, score_with, FalseNegativeCount, MatchConfig};
use dxdate::normalize::normalize_record;
use dxdate_core::{GoldStandardEntry, RawRelationship, Relationship};

use super::super::output::{format_metrics, to_json_line, write_output};
use super::super::parser::OutputFormat;
use super::super::utils::{format_error, read_input_file};

/// Score a predictions file against a gold file
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Predictions: JSON array of {note_id, diagnosis, date, confidence?}
    #[arg(short, long, value_name = "PATH")]
    pub predictions: String,

    /// Gold: JSON array of {note_id, diagnosis, date}
    #[arg(short, long, value_name = "PATH")]
    pub gold: String,

    /// Count unique gold triples as false negatives when nothing is predicted
    #[arg(long)]
    pub unique_fn: bool,

    /// List matched, spurious and missed triples
    #[arg(long)]
    pub details: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

fn read_array(path: &str) -> Result<Vec<Value>, String> {
    let content = read_input_file(path)?;
    serde_json::from_str(&content).map_err(|e| format_error("parse JSON array", &format!("{}: {}", path, e)))
}

fn note_id(record: &Value, path: &str, index: usize) -> Result<usize, String> {
    record
        .get("note_id")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("{}: record {} has no integer 'note_id'", path, index))
}

/// Predictions that survive normalization, plus the skipped count.
fn load_predictions(path: &str) -> Result<(Vec<Relationship>, usize), String> {
    let mut predictions = Vec::new();
    let mut skipped = 0;
    for (i, record) in read_array(path)?.iter().enumerate() {
        let note = note_id(record, path, i)?;
        let raw: RawRelationship = serde_json::from_value(record.clone())
            .map_err(|e| format!("{}: record {}: {}", path, i, e))?;
        match normalize_record(note, &raw) {
            Ok(rel) => predictions.push(rel),
            Err(reason) => {
                log::warn!("Skipping prediction {} in {}: {}", i, path, reason);
                skipped += 1;
            }
        }
    }
    Ok((predictions, skipped))
}

fn load_gold(path: &str) -> Result<Vec<GoldStandardEntry>, String> {
    read_array(path)?
        .iter()
        .enumerate()
        .map(|(i, record)| -> Result<GoldStandardEntry, String> {
            let note = note_id(record, path, i)?;
            let field = |key: &str| {
                record
                    .get(key)
                    .and_then(Value::as_str)
                    .ok_or_else(|| format!("{}: record {} has no string '{}'", path, i, key))
            };
            Ok(GoldStandardEntry::new(note, field("diagnosis")?, field("date")?))
        })
        .collect()
}

pub fn run(args: ScoreArgs) -> Result<(), String> {
    let (predictions, skipped) = load_predictions(&args.predictions)?;
    let gold = load_gold(&args.gold)?;
    log::info!(
        "Scoring {} predictions ({} skipped) against {} gold entries",
        predictions.len(),
        skipped,
        gold.len()
    );

    let config = MatchConfig {
        false_negatives: if args.unique_fn {
            FalseNegativeCount::UniqueTriples
        } else {
            FalseNegativeCount::GoldListLength
        },
    };
    let metrics = score_with(&predictions, &gold, &config);

    let out = match args.format {
        OutputFormat::Json => to_json_line(&metrics)?,
        OutputFormat::Human => {
            let mut out = format_metrics("score", &metrics);
            if args.details {
                out.push('\n');
                out.push_str(&match_details(&predictions, &gold).to_string_human(true));
            }
            out
        }
    };
    write_output(&out, args.output.as_deref())
}
