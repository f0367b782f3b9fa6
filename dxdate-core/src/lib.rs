//! # dxdate-core
//!
//! Data model shared by the `dxdate` library and CLI.
//!
//! - [`DiagnosisMention`] / [`DateMention`]: located entities (char offsets)
//! - [`EntitySet`]: what extraction hands to relation generation
//! - [`RawRelationship`]: generator output before normalization
//! - [`Relationship`] / [`GoldStandardEntry`]: canonical triples for matching
//! - [`MetricsReport`]: precision, recall, F1 plus raw counts
//!
//! No I/O lives here.

#![warn(missing_docs)]

mod confidence;
mod document;
mod error;
mod metrics;
mod mention;
mod relationship;

pub use confidence::Confidence;
pub use document::PreparedDocument;
pub use error::{Error, Result};
pub use mention::{DateMention, DiagnosisMention, EntitySet};
pub use metrics::{f1_score, MetricsReport};
pub use relationship::{
    is_canonical_date, GoldStandardEntry, RawRelationship, RelationKey, Relationship,
};
