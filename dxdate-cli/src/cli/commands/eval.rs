//! Eval command - run a generator over the configured dataset and score it

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;

use dxdate::config::DataSource;
use dxdate::eval::{evaluate, FalseNegativeCount, MatchConfig};
use dxdate::load_dataset;
use dxdate::relative::optional_backend;

use super::super::output::{color, format_metrics, log_info, to_json_line, write_output};
use super::super::parser::{GeneratorKind, OutputFormat};
use super::super::utils::load_config;
use super::build_generator;

/// Run a relation generator over a dataset and score it
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Config file (default: ./dxdate.toml, then the user config dir)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Relation generator
    #[arg(short, long, value_enum, default_value_t = GeneratorKind::Proximity)]
    pub generator: GeneratorKind,

    /// Classifier weights (JSON)
    #[arg(long, value_name = "PATH")]
    pub weights: Option<String>,

    /// Dataset to evaluate on (overrides config)
    #[arg(short, long, value_name = "SOURCE")]
    pub data_source: Option<DataSource>,

    /// Evaluate only the first N documents (overrides config)
    #[arg(short, long, value_name = "N")]
    pub num_samples: Option<usize>,

    /// Directory for the metrics file (overrides config)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Resolve relative dates through the configured chat backend
    #[arg(long)]
    pub relative_dates: bool,

    /// Count unique gold triples as false negatives when nothing is predicted
    #[arg(long)]
    pub unique_fn: bool,

    /// List matched, spurious and missed triples
    #[arg(long)]
    pub details: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

fn progress_bar(len: usize, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("Progress bar template should be valid")
            .progress_chars("#>-"),
    );
    pb
}

pub fn run(args: EvalArgs, quiet: bool) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(source) = args.data_source {
        config.data_source = source;
    }
    if let Some(n) = args.num_samples {
        config.evaluation.num_samples = Some(n);
    }
    if let Some(dir) = args.output_dir {
        config.evaluation.output_dir = dir;
    }
    if args.relative_dates {
        config.relative_dates.enabled = true;
    }
    config.validate().map_err(|e| e.to_string())?;

    let generator = build_generator(args.generator, args.weights.as_deref(), &config.classifier)?;

    let backend = if config.relative_dates.enabled && config.data_source.is_csv() {
        optional_backend(&config.relative_dates)
    } else {
        None
    };

    log_info(
        &format!(
            "Evaluating {} on {} ({})",
            generator.name(),
            config.data_source,
            config.dataset_path().display()
        ),
        quiet,
    );
    let start = Instant::now();
    let dataset = load_dataset(&config, backend.as_deref()).map_err(|e| e.to_string())?;

    let match_config = MatchConfig {
        false_negatives: if args.unique_fn {
            FalseNegativeCount::UniqueTriples
        } else {
            FalseNegativeCount::GoldListLength
        },
    };

    let pb = progress_bar(dataset.len(), quiet);
    pb.set_message(generator.name().to_string());
    let outcome = evaluate(
        generator.as_ref(),
        &dataset,
        &config.evaluation.output_dir,
        &match_config,
        Some(&pb),
    )
    .map_err(|e| e.to_string())?;
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Json => write_output(&to_json_line(&outcome.summary)?, None)?,
        OutputFormat::Human => {
            let mut out = format_metrics(&outcome.summary.generator, &outcome.summary.metrics);
            out.push_str(&format!(
                "  documents: {} ({} labeled), skipped records: {}, failed documents: {}\n",
                outcome.summary.documents_processed,
                outcome.summary.labeled_documents,
                outcome.summary.skipped,
                outcome.summary.failed_documents,
            ));
            if args.details {
                out.push('\n');
                out.push_str(&outcome.details.to_string_human(true));
            }
            write_output(&out, None)?;
        }
    }

    log_info(
        &format!(
            "{} Metrics saved to {} ({:.1}s)",
            color("32", "✓"),
            outcome.metrics_path.display(),
            start.elapsed().as_secs_f64()
        ),
        quiet,
    );
    Ok(())
}
