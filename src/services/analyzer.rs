// Analysis Pipeline
// Document -> metrics -> scores -> autopilot -> AnalysisResult

use crate::models::{AnalysisResult, Metrics};
use crate::services::autopilot::AutopilotRegistry;
use crate::services::detection::{verdict, AiScorer, DetectionSensitivity, RigorousScorer, UniformityScorer};
use crate::services::metrics::compute_metrics;
use crate::services::text_processor::{compute_stylometry, normalize_punctuation, Document, SubmissionKind};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// Stateless analysis pipeline; safe to share across threads.
pub struct Analyzer {
    likelihood: Box<dyn AiScorer>,
    rigorous: Box<dyn AiScorer>,
    autopilots: AutopilotRegistry,
    sensitivity: DetectionSensitivity,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(
            Box::new(UniformityScorer),
            Box::new(RigorousScorer),
            AutopilotRegistry::default(),
            DetectionSensitivity::Medium,
        )
    }
}

impl Analyzer {
    pub fn new(
        likelihood: Box<dyn AiScorer>,
        rigorous: Box<dyn AiScorer>,
        autopilots: AutopilotRegistry,
        sensitivity: DetectionSensitivity,
    ) -> Self {
        Self {
            likelihood,
            rigorous,
            autopilots,
            sensitivity,
        }
    }

    /// Analyze text; `file_hint` (a file name) only selects the autopilot.
    pub fn analyze(&self, text: &str, file_hint: Option<&str>) -> Result<AnalysisResult, AnalysisError> {
        let normalized = normalize_punctuation(text);
        let metrics = compute_metrics(&normalized);
        let signals = compute_stylometry(&normalized);
        check_metrics(&metrics)?;

        let ai_likelihood = check_score(self.likelihood.name(), self.likelihood.score(&metrics, &signals))?;
        let ai_rigorous_score = check_score(self.rigorous.name(), self.rigorous.score(&metrics, &signals))?;

        let kind = file_hint
            .map(SubmissionKind::from_filename)
            .unwrap_or(SubmissionKind::Unknown);
        let autopilot_result = self.autopilots.run(&kind, text);

        debug!(
            word_count = metrics.word_count,
            sentence_count = metrics.sentence_count,
            ai_likelihood,
            ai_rigorous_score,
            kind = kind.as_str(),
            "analysis.scored"
        );

        Ok(AnalysisResult {
            metrics,
            signals,
            ai_likelihood,
            ai_rigorous_score,
            verdict: verdict(ai_likelihood, self.sensitivity).to_string(),
            autopilot_result,
        })
    }

    pub fn analyze_document(&self, document: &Document) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(document.text(), document.filename())
    }
}

/// Analyze text with the default scorers and autopilots.
pub fn analyze(text: &str) -> Result<AnalysisResult, AnalysisError> {
    Analyzer::default().analyze(text, None)
}

fn check_metrics(m: &Metrics) -> Result<(), AnalysisError> {
    if m.unique_word_count > m.word_count {
        return Err(AnalysisError::Internal(format!(
            "unique_word_count {} exceeds word_count {}",
            m.unique_word_count, m.word_count
        )));
    }
    if m.word_count > 0 && m.sentence_count == 0 {
        return Err(AnalysisError::Internal("words present but no sentences".to_string()));
    }
    if !(0.0..=1.0).contains(&m.unique_ratio) {
        return Err(AnalysisError::Internal(format!("unique_ratio {} out of range", m.unique_ratio)));
    }
    if !m.avg_sentence_length.is_finite() || m.avg_sentence_length < 0.0 || !m.flesch_reading_ease.is_finite() {
        return Err(AnalysisError::Internal("non-finite sentence statistics".to_string()));
    }
    Ok(())
}

fn check_score(scorer: &str, score: f64) -> Result<f64, AnalysisError> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(AnalysisError::Internal(format!("scorer {} returned {}", scorer, score)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StyleSignals;
    use proptest::prelude::*;

    struct BrokenScorer;

    impl AiScorer for BrokenScorer {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn score(&self, _metrics: &Metrics, _signals: &StyleSignals) -> f64 {
            1.5
        }
    }

    #[test]
    fn test_empty_input_yields_defaults() {
        let result = analyze("").unwrap();
        assert_eq!(result.metrics, Metrics::default());
        assert_eq!(result.ai_likelihood, 0.0);
        assert_eq!(result.ai_rigorous_score, 0.0);
        assert_eq!(result.verdict, "pass");
        assert_eq!(result.autopilot_result, "");
    }

    #[test]
    fn test_cat_scenario() {
        let result = analyze("The cat sat. The cat ran.").unwrap();
        assert_eq!(result.metrics.word_count, 6);
        assert_eq!(result.metrics.unique_word_count, 4);
        assert_eq!(result.metrics.sentence_count, 2);
        assert_eq!(result.metrics.avg_sentence_length, 3.0);
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let text = "Moreover, the proposal is clear. It covers the scope! Does it scale?? Yes, it does.";
        let a = analyze(text).unwrap();
        let b = analyze(text).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ai_likelihood.to_bits(), b.ai_likelihood.to_bits());
        assert_eq!(a.ai_rigorous_score.to_bits(), b.ai_rigorous_score.to_bits());
    }

    #[test]
    fn test_scores_bounded_on_varied_inputs() {
        let inputs = vec![
            "a".to_string(),
            "!!!???...".to_string(),
            "word ".repeat(500),
            "Short. Tiny. Small. Brief. Quick. Fast. Rapid.".to_string(),
            String::from_utf8_lossy(&[0xC3, 0x28, 0xA0, 0xA1, b'o', b'k']).to_string(),
        ];
        for text in &inputs {
            let result = analyze(text).unwrap();
            assert!((0.0..=1.0).contains(&result.ai_likelihood), "{text}");
            assert!((0.0..=1.0).contains(&result.ai_rigorous_score), "{text}");
            assert!(result.metrics.unique_word_count <= result.metrics.word_count);
        }
    }

    #[test]
    fn test_autopilot_uses_file_hint() {
        let analyzer = Analyzer::default();
        let py = analyzer.analyze("def f():\n    pass\n", Some("solution.py")).unwrap();
        assert!(!py.autopilot_result.is_empty());
        let txt = analyzer.analyze("def f():\n    pass\n", Some("essay.txt")).unwrap();
        assert!(txt.autopilot_result.is_empty());
    }

    #[test]
    fn test_out_of_range_score_is_internal_error() {
        let analyzer = Analyzer::new(
            Box::new(BrokenScorer),
            Box::new(RigorousScorer),
            AutopilotRegistry::disabled(),
            DetectionSensitivity::Medium,
        );
        let err = analyzer.analyze("Some words here.", None).unwrap_err();
        assert!(matches!(err, AnalysisError::Internal(_)));
    }

    #[test]
    fn test_analyze_document() {
        let doc = Document::from_bytes(Some("main.py"), b"print('hi')".to_vec());
        let result = Analyzer::default().analyze_document(&doc).unwrap();
        assert_eq!(result.metrics.word_count, 2);
        assert!(result.autopilot_result.contains("3/5"));
    }

    proptest! {
        #[test]
        fn prop_analyze_is_deterministic_and_bounded(text in "\\PC{0,400}") {
            let a = analyze(&text).unwrap();
            let b = analyze(&text).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert!((0.0..=1.0).contains(&a.ai_likelihood));
            prop_assert!((0.0..=1.0).contains(&a.ai_rigorous_score));
        }
    }
}
