//! Run configuration.
//!
//! Loaded once from TOML; every field has a default so an empty file (or no
//! file at all) is a valid configuration. Unknown keys are rejected.
//!
//! ```toml
//! data_source = "notes"
//!
//! [evaluation]
//! num_samples = 50
//!
//! [relative_dates]
//! enabled = true
//! backend = "llama"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which dataset an evaluation run reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Synthetic JSON notes with inline entity tags.
    #[default]
    Synthetic,
    /// Imaging reports CSV export.
    Imaging,
    /// Clinical notes CSV export.
    Notes,
    /// Clinic letters CSV export.
    Letters,
    /// Small sample CSV.
    Sample,
}

impl DataSource {
    /// All data sources, in declaration order.
    pub const ALL: [DataSource; 5] = [
        DataSource::Synthetic,
        DataSource::Imaging,
        DataSource::Notes,
        DataSource::Letters,
        DataSource::Sample,
    ];

    /// Lowercase name as written in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Synthetic => "synthetic",
            DataSource::Imaging => "imaging",
            DataSource::Notes => "notes",
            DataSource::Letters => "letters",
            DataSource::Sample => "sample",
        }
    }

    /// Whether this source is a CSV export (as opposed to synthetic JSON).
    #[must_use]
    pub fn is_csv(self) -> bool {
        !matches!(self, DataSource::Synthetic)
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DataSource::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::config(format!(
                    "unknown data source '{s}' (expected one of: synthetic, imaging, notes, letters, sample)"
                ))
            })
    }
}

/// Dataset file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Synthetic JSON dataset.
    pub synthetic: PathBuf,
    /// Imaging reports CSV.
    pub imaging: PathBuf,
    /// Clinical notes CSV.
    pub notes: PathBuf,
    /// Letters CSV.
    pub letters: PathBuf,
    /// Sample CSV.
    pub sample: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            synthetic: PathBuf::from("data/synthetic_data.json"),
            imaging: PathBuf::from("data/epic_imaging_reports.csv"),
            notes: PathBuf::from("data/epic_notes.csv"),
            letters: PathBuf::from("data/epic_letters.csv"),
            sample: PathBuf::from("data/sample.csv"),
        }
    }
}

/// CSV column names for real-data exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    /// Free text (required).
    pub text: String,
    /// Gold relationships as a JSON string.
    pub gold: String,
    /// Diagnosis annotations (`[{label, start}]`).
    pub diagnoses: String,
    /// Date annotations (`[{parsed, original, start}]`).
    pub dates: String,
    /// Document reference timestamp.
    pub timestamp: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            text: "text".to_string(),
            gold: "gold_standard".to_string(),
            diagnoses: "extracted_disorders".to_string(),
            dates: "formatted_dates".to_string(),
            timestamp: "document_timestamp".to_string(),
        }
    }
}

/// Evaluation run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluationConfig {
    /// Cap on evaluated documents; all when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_samples: Option<usize>,
    /// Directory for metrics files.
    pub output_dir: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            num_samples: None,
            output_dir: PathBuf::from("outputs"),
        }
    }
}

/// Which chat backend resolves relative dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeBackend {
    /// OpenAI chat completions.
    #[default]
    Openai,
    /// Local OpenAI-compatible server hosting a Llama instruct model.
    Llama,
}

/// Relative-date resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelativeDatesConfig {
    /// Whether to resolve relative dates at all.
    pub enabled: bool,
    /// Backend to call.
    pub backend: RelativeBackend,
    /// Characters of note text sent to the model.
    pub context_window: usize,
    /// OpenAI model name.
    pub openai_model: String,
    /// Base URL of the local Llama server (OpenAI-compatible).
    pub llama_endpoint: String,
    /// Model name reported to the local server.
    pub llama_model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for RelativeDatesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: RelativeBackend::Openai,
            context_window: 1000,
            openai_model: "gpt-3.5-turbo".to_string(),
            llama_endpoint: "http://localhost:8080/v1".to_string(),
            llama_model: "Llama-3.2-3B-Instruct".to_string(),
            max_tokens: 1000,
            timeout_secs: 60,
        }
    }
}

/// Pair-classifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Pairs farther apart than this (in characters) are never considered.
    pub max_distance: usize,
    /// Upper bound on the context window fed to the classifier.
    pub max_context_len: usize,
    /// Minimum probability for a pair to be emitted.
    pub threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_distance: 500,
            max_context_len: 512,
            threshold: 0.5,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset to evaluate on.
    pub data_source: DataSource,
    /// Dataset file locations.
    pub paths: PathsConfig,
    /// CSV column names.
    pub columns: ColumnsConfig,
    /// Evaluation settings.
    pub evaluation: EvaluationConfig,
    /// Relative-date resolution.
    pub relative_dates: RelativeDatesConfig,
    /// Pair classifier.
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load from a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML, contains
    /// unknown keys, or holds inconsistent values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML, unknown keys, or inconsistent values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Fails only if a value cannot be represented in TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.classifier.threshold) {
            return Err(Error::config(format!(
                "classifier.threshold must be in [0, 1], got {}",
                self.classifier.threshold
            )));
        }
        if self.classifier.max_context_len == 0 {
            return Err(Error::config("classifier.max_context_len must be positive"));
        }
        if self.relative_dates.context_window == 0 {
            return Err(Error::config("relative_dates.context_window must be positive"));
        }
        if self.columns.text.trim().is_empty() {
            return Err(Error::config("columns.text must not be empty"));
        }
        Ok(())
    }

    /// Dataset path for the configured data source.
    #[must_use]
    pub fn dataset_path(&self) -> &Path {
        match self.data_source {
            DataSource::Synthetic => &self.paths.synthetic,
            DataSource::Imaging => &self.paths.imaging,
            DataSource::Notes => &self.paths.notes,
            DataSource::Letters => &self.paths.letters,
            DataSource::Sample => &self.paths.sample,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_defaults() {
        let c = Config::default();
        assert_eq!(c.data_source, DataSource::Synthetic);
        assert_eq!(c.dataset_path(), Path::new("data/synthetic_data.json"));
        assert_eq!(c.columns.text, "text");
        assert_eq!(c.columns.dates, "formatted_dates");
        assert_eq!(c.evaluation.num_samples, None);
        assert!(!c.relative_dates.enabled);
        assert_eq!(c.relative_dates.context_window, 1000);
        assert_eq!(c.relative_dates.openai_model, "gpt-3.5-turbo");
        assert_eq!(c.classifier.max_distance, 500);
        assert_eq!(c.classifier.max_context_len, 512);
        assert_eq!(c.classifier.threshold, 0.5);
    }

    #[test]
    fn test_partial_override() {
        let c = Config::from_toml_str(
            r#"
            data_source = "letters"

            [evaluation]
            num_samples = 25

            [relative_dates]
            enabled = true
            backend = "llama"
            "#,
        )
        .unwrap();
        assert_eq!(c.dataset_path(), Path::new("data/epic_letters.csv"));
        assert_eq!(c.evaluation.num_samples, Some(25));
        assert_eq!(c.evaluation.output_dir, PathBuf::from("outputs"));
        assert_eq!(c.relative_dates.backend, RelativeBackend::Llama);
        assert_eq!(c.relative_dates.max_tokens, 1000);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml_str("datasource = \"notes\"").is_err());
        assert!(Config::from_toml_str("[classifier]\nthreshhold = 0.4").is_err());
        assert!(Config::from_toml_str("data_source = \"radiology\"").is_err());
    }

    #[test]
    fn test_validation() {
        let err = Config::from_toml_str("[classifier]\nthreshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("classifier.threshold"));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut c = Config::default();
        c.data_source = DataSource::Notes;
        c.evaluation.num_samples = Some(10);
        let text = c.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dxdate.toml");
        std::fs::write(&path, "data_source = \"sample\"\n").unwrap();
        let c = Config::load(&path).unwrap();
        assert_eq!(c.data_source, DataSource::Sample);

        assert!(Config::load(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_data_source_from_str() {
        assert_eq!("Imaging".parse::<DataSource>().unwrap(), DataSource::Imaging);
        assert!("radiology".parse::<DataSource>().is_err());
    }
}
