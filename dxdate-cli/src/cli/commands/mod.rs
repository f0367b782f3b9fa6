//! Command implementations for the dxdate CLI
//!
//! Each command has its own module.

pub mod config;
pub mod eval;
pub mod extract;
pub mod parse_date;
pub mod relative;
pub mod score;

pub use config::ConfigArgs;
pub use eval::EvalArgs;
pub use extract::ExtractArgs;
pub use parse_date::ParseDateArgs;
pub use relative::RelativeArgs;
pub use score::ScoreArgs;

use dxdate::config::ClassifierConfig;
use dxdate::generate::{ClassifierGenerator, LinearPairClassifier, ProximityGenerator};
use dxdate::RelationGenerator;

use super::parser::GeneratorKind;

/// Build the selected generator. `weights` is a JSON weights file for the
/// classifier; it is ignored by the proximity baseline.
pub fn build_generator(
    kind: GeneratorKind,
    weights: Option<&str>,
    classifier: &ClassifierConfig,
) -> Result<Box<dyn RelationGenerator>, String> {
    match kind {
        GeneratorKind::Proximity => {
            if weights.is_some() {
                log::warn!("--weights is ignored by the proximity generator");
            }
            Ok(Box::new(ProximityGenerator::new(classifier.max_distance)))
        }
        GeneratorKind::Classifier => {
            let model = match weights {
                Some(path) => LinearPairClassifier::from_json_file(path).map_err(|e| e.to_string())?,
                None => LinearPairClassifier::default(),
            };
            Ok(Box::new(ClassifierGenerator::new(
                "classifier",
                model,
                classifier.clone(),
            )))
        }
    }
}
