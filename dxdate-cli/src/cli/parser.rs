//! CLI argument parsing and structure definitions

use clap::{Parser, Subcommand, ValueEnum};

use super::commands;

/// Diagnosis-date relation extraction and evaluation
#[derive(Parser)]
#[command(name = "dxdate")]
#[command(
    author,
    version,
    about = "Diagnosis-date relation extraction and evaluation for clinical notes",
    long_about = r#"
dxdate - pair diagnoses with the dates they occurred in clinical text

PIPELINE:
  note → entities ([dx] / [date] tags or CSV annotations)
       → relation generator (proximity, classifier)
       → normalized predictions → scored against gold (P / R / F1)

EXAMPLES:
  dxdate eval --config dxdate.toml --generator classifier
  dxdate extract "asthma[dx] flared (14/03/2021)[date]"
  dxdate parse-date "3rd Feb'23"
  dxdate score --predictions preds.json --gold gold.json
  dxdate config init
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Warnings and errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a relation generator over a dataset and score it
    #[command(visible_alias = "e")]
    Eval(commands::EvalArgs),

    /// Show entities and proposed relationships for one note
    #[command(visible_alias = "x")]
    Extract(commands::ExtractArgs),

    /// Normalize date strings to YYYY-MM-DD
    #[command(visible_alias = "d")]
    ParseDate(commands::ParseDateArgs),

    /// Score a predictions file against a gold file
    Score(commands::ScoreArgs),

    /// Resolve relative dates in a note through the configured chat backend
    Relative(commands::RelativeArgs),

    /// Show or create configuration
    Config(commands::ConfigArgs),
}

/// Relation generator to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GeneratorKind {
    /// Nearest resolved date per diagnosis
    #[default]
    Proximity,
    /// Pair classifier over nearby pairs
    Classifier,
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable
    #[default]
    Human,
    /// JSON
    Json,
}
