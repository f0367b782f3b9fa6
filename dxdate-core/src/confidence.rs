//! Witness type for relationship confidence values bounded to [0.0, 1.0].
//!
//! Relation generators report confidence in different ways: the proximity
//! baseline derives it from character distance, a learned classifier returns
//! a sigmoid probability, and an LLM may return nothing at all. None of that
//! matters for matching (confidence is never part of the comparison key), but
//! every [`crate::Relationship`] still carries one, so the range is enforced
//! once at construction.
//!
//! ```text
//! source record            Confidence
//! ─────────────            ──────────
//! "confidence": 0.83   →   0.83
//! "confidence": 1.7    →   1.0   (saturating)
//! (missing)            →   1.0   (CERTAIN, the default)
//! ```

use serde::Serialize;
use std::fmt;

/// A confidence score guaranteed to be in the range [0.0, 1.0].
///
/// Built with [`Confidence::saturating`], which clamps to [0, 1] and maps
/// NaN to 0.0.
///
/// ```rust
/// use dxdate_core::Confidence;
///
/// assert_eq!(Confidence::saturating(0.5).get(), 0.5);
/// assert_eq!(Confidence::saturating(1.5).get(), 1.0);
/// assert_eq!(Confidence::default().get(), 1.0);
/// ```
#[derive(Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Confidence assigned when a producer does not report one.
    pub const CERTAIN: Self = Self(1.0);

    /// Create a confidence score, clamping to [0.0, 1.0].
    ///
    /// NaN is treated as 0.0.
    #[must_use]
    #[inline]
    pub fn saturating(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Get the inner value (guaranteed to be in [0.0, 1.0]).
    #[must_use]
    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::CERTAIN
    }
}

impl fmt::Debug for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Confidence({:.4})", self.0)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
