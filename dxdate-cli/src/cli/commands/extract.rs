//! Extract command - entities and proposed relationships for one note

use clap::Parser;
use serde_json::json;

use dxdate::extract::extract_entities;
use dxdate::normalize::NormalizedBatch;

use super::super::output::{color, to_json_line, write_output};
use super::super::parser::{GeneratorKind, OutputFormat};
use super::super::utils::{get_input_text, load_config};
use super::build_generator;

/// Show entities and proposed relationships for one note
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Note text (with [dx] / [date] tags)
    #[arg(short, long)]
    pub text: Option<String>,

    /// Read the note from a file
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<String>,

    /// Relation generator
    #[arg(short, long, value_enum, default_value_t = GeneratorKind::Proximity)]
    pub generator: GeneratorKind,

    /// Classifier weights (JSON)
    #[arg(long, value_name = "PATH")]
    pub weights: Option<String>,

    /// Config file for classifier settings
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Note text as positional arguments
    #[arg(trailing_var_arg = true)]
    pub positional: Vec<String>,
}

pub fn run(args: ExtractArgs) -> Result<(), String> {
    let text = get_input_text(&args.text, args.file.as_deref(), &args.positional)?;
    let config = load_config(args.config.as_deref())?;
    let generator = build_generator(args.generator, args.weights.as_deref(), &config.classifier)?;

    let entities = extract_entities(text.as_str());
    let raw = generator
        .extract(&text, &entities)
        .map_err(|e| e.to_string())?;
    let batch = NormalizedBatch::from_raw(0, &raw);

    let out = match args.format {
        OutputFormat::Json => to_json_line(&json!({
            "diagnoses": entities.diagnoses,
            "dates": entities.dates,
            "relationships": batch.predictions.iter().map(|r| json!({
                "diagnosis": r.diagnosis,
                "date": r.date,
                "confidence": r.confidence,
            })).collect::<Vec<_>>(),
            "skipped": batch.skipped,
        }))?,
        OutputFormat::Human => {
            let mut out = String::new();
            out.push_str(&format!("{} ({}):\n", color("1;34", "diagnoses"), entities.diagnoses.len()));
            for d in &entities.diagnoses {
                out.push_str(&format!("  {:<24} @{}\n", d.label, d.start));
            }
            out.push_str(&format!("{} ({}):\n", color("1;35", "dates"), entities.dates.len()));
            for d in &entities.dates {
                out.push_str(&format!(
                    "  {:<24} {} @{}\n",
                    d.raw,
                    d.parsed.as_deref().unwrap_or("-"),
                    d.start
                ));
            }
            out.push_str(&format!(
                "{} via {} ({}):\n",
                color("1;32", "relationships"),
                generator.name(),
                batch.predictions.len()
            ));
            for r in &batch.predictions {
                out.push_str(&format!(
                    "  {:<24} {}  {:.3}\n",
                    r.diagnosis,
                    r.date,
                    r.confidence.get()
                ));
            }
            out
        }
    };
    write_output(&out, None)
}
