//! Dataset loading: documents, pre-extracted entities, gold standard.

mod gold;
mod real;
mod synthetic;

use dxdate_core::{GoldStandardEntry, PreparedDocument};

use crate::config::Config;
use crate::relative::ChatBackend;
use crate::Result;

pub use gold::{gold_from_ground_truth, parse_gold_cell};
pub use real::{load_real_data, parse_annotations};
pub use synthetic::{evaluation_split, load_synthetic_data};

/// Documents ready for relation generation plus their gold standard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedDataset {
    /// Documents in evaluation order; `note_id` is the index.
    pub documents: Vec<PreparedDocument>,
    /// Gold relationships over those documents.
    pub gold: Vec<GoldStandardEntry>,
}

impl PreparedDataset {
    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether there are no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Load the dataset selected by `config.data_source`.
///
/// `backend` is only consulted for CSV sources with relative dates enabled.
///
/// # Errors
///
/// Fails before any processing if the dataset file is missing or the text
/// column is absent.
pub fn load_dataset(config: &Config, backend: Option<&dyn ChatBackend>) -> Result<PreparedDataset> {
    let path = config.dataset_path();
    if config.data_source.is_csv() {
        load_real_data(path, config, backend)
    } else {
        load_synthetic_data(path, config.evaluation.num_samples)
    }
}
