//! Evaluation harness: extract, score, report, persist.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use dxdate_core::MetricsReport;

use super::matcher::{match_details, score_with, MatchConfig, MatchDetails};
use crate::dataset::PreparedDataset;
use crate::generate::RelationGenerator;
use crate::normalize::{run_extraction, ExtractionRun};
use crate::Result;

static UNSAFE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w.-]+").expect("valid regex"));

/// File-system-safe, lowercased version of a generator name.
///
/// ```rust
/// use dxdate::eval::safe_name;
///
/// assert_eq!(safe_name("Linear Classifier (v2)"), "linear_classifier_v2_");
/// ```
#[must_use]
pub fn safe_name(name: &str) -> String {
    UNSAFE_NAME_CHARS.replace_all(name, "_").to_lowercase()
}

/// Contents of `<safe_name>_metrics.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsFile {
    /// Generator name.
    pub generator: String,
    /// Scores.
    #[serde(flatten)]
    pub metrics: MetricsReport,
    /// Documents visited.
    pub documents_processed: usize,
    /// Documents with gold labels.
    pub labeled_documents: usize,
    /// Raw records dropped during normalization.
    pub skipped: usize,
    /// Documents whose generator call failed.
    pub failed_documents: usize,
}

/// Result of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    /// What was written to disk.
    pub summary: MetricsFile,
    /// Extraction output, including per-document failures.
    pub run: ExtractionRun,
    /// Triple-level breakdown.
    pub details: MatchDetails,
    /// Where the metrics file was written.
    pub metrics_path: PathBuf,
}

/// Run `generator` over `dataset`, score against its gold standard, log
/// the report and write `<safe_name>_metrics.json` into `output_dir`.
///
/// # Errors
///
/// Only writing the metrics file can fail; per-document generator errors
/// are recorded in the outcome.
pub fn evaluate<G>(
    generator: &G,
    dataset: &PreparedDataset,
    output_dir: &Path,
    config: &MatchConfig,
    progress: Option<&ProgressBar>,
) -> Result<EvaluationOutcome>
where
    G: RelationGenerator + ?Sized,
{
    let run = run_extraction(generator, &dataset.documents, progress);
    let details = match_details(&run.predictions, &dataset.gold);

    let metrics = if dataset.gold.is_empty() {
        log::warn!(
            "No gold standard data for {} (processed {} notes); metrics are zero",
            run.generator,
            run.documents_processed
        );
        MetricsReport::zeroed()
    } else {
        log::info!(
            "Evaluating {} on {} labeled notes (of {} processed)",
            run.generator,
            details.labeled_documents,
            run.documents_processed
        );
        score_with(&run.predictions, &dataset.gold, config)
    };
    log::info!("Results for {}:\n{}", run.generator, metrics);

    let summary = MetricsFile {
        generator: run.generator.clone(),
        metrics,
        documents_processed: run.documents_processed,
        labeled_documents: details.labeled_documents,
        skipped: run.skipped,
        failed_documents: run.failures.len(),
    };
    let metrics_path = write_metrics(&summary, output_dir)?;
    log::info!("Metrics saved to {}", metrics_path.display());

    Ok(EvaluationOutcome {
        summary,
        run,
        details,
        metrics_path,
    })
}

/// Write `summary` as pretty JSON to `<output_dir>/<safe_name>_metrics.json`,
/// creating the directory if needed.
///
/// # Errors
///
/// Fails on I/O or serialization errors.
pub fn write_metrics(summary: &MetricsFile, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(format!("{}_metrics.json", safe_name(&summary.generator)));
    std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
    Ok(path)
}
