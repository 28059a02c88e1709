// CandidateLens Data Models
// Value objects produced by the analysis pipeline and exchanged over HTTP

use serde::{Deserialize, Serialize};

// ============ Text Metrics ============

/// Readability statistics for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub word_count: usize,
    pub unique_word_count: usize,
    pub unique_ratio: f64,
    pub sentence_count: usize,
    pub avg_sentence_length: f64,
    pub syllable_count: usize,
    pub flesch_reading_ease: f64,
}

impl Metrics {
    /// Average syllables per word, 0.0 for an empty document.
    pub fn syllables_per_word(&self) -> f64 {
        if self.word_count == 0 {
            return 0.0;
        }
        self.syllable_count as f64 / self.word_count as f64
    }
}

// ============ Stylometry Signals ============

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StyleSignals {
    /// Coefficient of variation of words per sentence
    pub sentence_length_cv: f64,
    pub repeat_ratio: f64,
    pub ngram_repeat_rate: f64,
    pub punctuation_ratio: f64,
    pub punctuation_repeat_rate: f64,
    pub transition_word_ratio: f64,
    pub avg_word_length: f64,
}

// ============ Analysis Result ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub metrics: Metrics,
    pub signals: StyleSignals,
    pub ai_likelihood: f64,
    pub ai_rigorous_score: f64,
    pub verdict: String,
    /// Empty when no autopilot applies to the submission.
    pub autopilot_result: String,
}

// ============ HTTP Payloads ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text: String,
    #[serde(default)]
    pub filename: Option<String>,
}
