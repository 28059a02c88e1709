// Detection Module
// Heuristic AI-likelihood scoring organized into swappable strategies:
// - likelihood: baseline score from vocabulary, sentence uniformity and readability band
// - rigorous: cross-check score over a wider set of stylometry signals
// - sensitivity: maps a score onto pass/review/flag verdicts

pub mod likelihood;
pub mod rigorous;
pub mod sensitivity;

use crate::models::{Metrics, StyleSignals};

pub use likelihood::UniformityScorer;
pub use rigorous::RigorousScorer;
pub use sensitivity::{decision_thresholds, verdict, DetectionSensitivity};

/// A scoring strategy turning document statistics into a value in [0, 1].
///
/// Implementations must be deterministic and must return 0.0 for a document
/// without words.
pub trait AiScorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn score(&self, metrics: &Metrics, signals: &StyleSignals) -> f64;
}

// ============================================================================
// Soft threshold helpers shared by the scorers
// ============================================================================

/// Sigmoid falling from 1 to 0 around center; k controls steepness
#[inline]
pub(crate) fn sigmoid(x: f64, center: f64, k: f64) -> f64 {
    1.0 / (1.0 + ((x - center) / k).exp())
}

/// 1 - sigmoid (for "greater than" thresholds)
#[inline]
pub(crate) fn sigmoid_inv(x: f64, center: f64, k: f64) -> f64 {
    1.0 - sigmoid(x, center, k)
}

#[inline]
pub(crate) fn from_logit(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

/// Close to 1 inside [30, 60] (plain, mid-difficulty prose), falling off outside.
pub(crate) fn reading_band(flesch: f64) -> f64 {
    sigmoid_inv(flesch, 30.0, 5.0) * sigmoid(flesch, 60.0, 5.0)
}

/// How much the sentence-length statistics can be trusted: 0 for a single
/// sentence, 1 from six sentences on.
pub(crate) fn sentence_support(metrics: &Metrics) -> f64 {
    (metrics.sentence_count.min(6) as f64 - 1.0).max(0.0) / 5.0
}

/// Clamp into [0, 1]; non-finite values collapse to 0.
pub(crate) fn bounded(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
