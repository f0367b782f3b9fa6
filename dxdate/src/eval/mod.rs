//! Scoring and the end-to-end evaluation harness.

mod harness;
pub mod matcher;

pub use harness::{evaluate, safe_name, write_metrics, EvaluationOutcome, MetricsFile};
pub use matcher::{
    match_details, score, score_with, FalseNegativeCount, MatchConfig, MatchDetails,
};
