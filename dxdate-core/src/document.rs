//! Documents as loaded for an evaluation run.

use serde::{Deserialize, Serialize};

use crate::EntitySet;

/// A clinical note paired with its pre-extracted entities, ready for
/// relation generation.
///
/// `note_id` is the note's position within the evaluation set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedDocument {
    /// Position within the evaluation set.
    pub note_id: usize,
    /// Free text.
    pub text: String,
    /// Diagnoses and dates found in (or annotated for) the text.
    pub entities: EntitySet,
    /// Reference timestamp used to resolve relative dates, as read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl PreparedDocument {
    /// Create a prepared document.
    #[must_use]
    pub fn new(note_id: usize, text: impl Into<String>, entities: EntitySet) -> Self {
        Self {
            note_id,
            text: text.into(),
            entities,
            timestamp: None,
        }
    }

    /// Attach a reference timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}
