//! # dxdate
//!
//! Diagnosis-date relation extraction and evaluation for clinical text.
//!
//! - **Entities**: inline `[dx]`/`[date]` tags, or pre-extracted CSV annotations
//! - **Dates**: strict formats normalized to `YYYY-MM-DD`, plus optional
//!   relative-date resolution through a chat model
//! - **Generators**: a proximity baseline and a pair classifier behind one trait
//! - **Evaluation**: exact-match precision/recall/F1 against a gold standard
//!
//! Core types (mentions, relationships, metrics) live in `dxdate-core` and
//! are re-exported here.
//!
//! ```rust
//! use dxdate::prelude::*;
//!
//! let text = "asthma[dx] flared (14/03/2021)[date]";
//! let entities = extract_entities(text);
//! let raw = ProximityGenerator::default().extract(text, &entities).unwrap();
//! assert_eq!(raw[0].date.as_deref(), Some("2021-03-14"));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod dataset;
pub mod date;
mod error;
pub mod eval;
pub mod extract;
pub mod generate;
pub mod normalize;
pub mod offset;
pub mod pyliteral;
pub mod relative;

pub use error::{Error, Result};

pub use dxdate_core::{
    f1_score, is_canonical_date, Confidence, DateMention, DiagnosisMention,
    EntitySet, GoldStandardEntry, MetricsReport, PreparedDocument, RawRelationship, RelationKey,
    Relationship,
};

pub use config::{Config, DataSource};
pub use dataset::{load_dataset, PreparedDataset};
pub use date::{parse_date, parse_timestamp};
pub use eval::{evaluate, score, MatchConfig};
pub use extract::extract_entities;
pub use generate::{ClassifierGenerator, MockGenerator, ProximityGenerator, RelationGenerator};
pub use normalize::{run_extraction, ExtractionRun};
pub use pyliteral::transform_python_to_json;

/// Commonly used items.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dataset::{load_dataset, PreparedDataset};
    pub use crate::date::parse_date;
    pub use crate::eval::{evaluate, score, MatchConfig};
    pub use crate::extract::extract_entities;
    pub use crate::generate::{ProximityGenerator, RelationGenerator};
    pub use crate::normalize::run_extraction;
    pub use crate::{Error, Result};
    pub use dxdate_core::{EntitySet, GoldStandardEntry, MetricsReport, Relationship};
}
