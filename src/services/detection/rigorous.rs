// Rigorous AI-likelihood scorer
// Linear weighted blend over the full stylometry signal set

use super::{bounded, reading_band, sentence_support, AiScorer};
use crate::models::{Metrics, StyleSignals};

const BASE: f64 = 0.05;
// Share of characters that are , . ! ? ; : in typical edited prose
const PROSE_PUNCT_RATIO: f64 = 0.035;

/// Secondary score used to cross-check [`super::UniformityScorer`].
///
/// Each signal is normalized onto [0, 1] before weighting. Punctuation density
/// near that of edited prose raises the score; repeated punctuation ("!!",
/// "...") reads as informal human writing and lowers it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RigorousScorer;

impl AiScorer for RigorousScorer {
    fn name(&self) -> &'static str {
        "rigorous-v1"
    }

    fn score(&self, metrics: &Metrics, signals: &StyleSignals) -> f64 {
        if metrics.word_count == 0 {
            return 0.0;
        }

        let uniformity = (1.0 - signals.sentence_length_cv).clamp(0.0, 1.0) * sentence_support(metrics);
        let mid_diversity = (1.0 - (metrics.unique_ratio - 0.6).abs() / 0.4).clamp(0.0, 1.0);
        let ngram = (signals.ngram_repeat_rate / 0.15).min(1.0);
        let repeats = (signals.repeat_ratio / 0.25).min(1.0);
        let transitions = (signals.transition_word_ratio / 0.03).min(1.0);
        let long_words = ((signals.avg_word_length - 4.0) / 2.0).clamp(0.0, 1.0);
        let punct_band = (1.0 - (signals.punctuation_ratio - PROSE_PUNCT_RATIO).abs() / PROSE_PUNCT_RATIO).clamp(0.0, 1.0);
        let informal_punct = (signals.punctuation_repeat_rate / 0.2).min(1.0);

        let score = BASE
            + 0.18 * uniformity
            + 0.12 * reading_band(metrics.flesch_reading_ease)
            + 0.15 * ngram
            + 0.12 * repeats
            + 0.15 * transitions
            + 0.08 * long_words
            + 0.10 * mid_diversity
            + 0.05 * punct_band
            - 0.10 * informal_punct;

        bounded(score)
    }
}
