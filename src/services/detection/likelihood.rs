// Baseline AI-likelihood scorer
// Logit-space accumulation of three soft-threshold signals

use super::{bounded, from_logit, reading_band, sentence_support, sigmoid, sigmoid_inv, AiScorer};
use crate::models::{Metrics, StyleSignals};

const BIAS: f64 = -1.2;
const DIVERSITY_WEIGHT: f64 = 1.3;
const UNIFORMITY_WEIGHT: f64 = 1.8;
const BAND_WEIGHT: f64 = 0.9;

/// Scores uniform sentence lengths, unusually varied vocabulary and prose that
/// sits in the mid readability band as more machine-like.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformityScorer;

impl AiScorer for UniformityScorer {
    fn name(&self) -> &'static str {
        "uniformity-v1"
    }

    fn score(&self, metrics: &Metrics, signals: &StyleSignals) -> f64 {
        if metrics.word_count == 0 {
            return 0.0;
        }

        let mut logit = BIAS;

        logit += DIVERSITY_WEIGHT * sigmoid_inv(metrics.unique_ratio, 0.72, 0.06);

        // Lower variation in sentence length pushes the score up.
        let uniformity = sigmoid(signals.sentence_length_cv, 0.35, 0.08);
        logit += UNIFORMITY_WEIGHT * sentence_support(metrics) * uniformity;

        logit += BAND_WEIGHT * reading_band(metrics.flesch_reading_ease);

        bounded(from_logit(logit))
    }
}
