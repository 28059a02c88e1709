// Text Metrics Engine
// Word, sentence and syllable statistics plus Flesch reading ease

use crate::models::Metrics;
use crate::services::text_processor::{split_sentences, tokenize_words};
use std::collections::HashSet;

const FLESCH_BASE: f64 = 206.835;
const FLESCH_SENTENCE_WEIGHT: f64 = 1.015;
const FLESCH_SYLLABLE_WEIGHT: f64 = 84.6;

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Estimate syllables in one word by counting vowel groups.
///
/// A trailing silent "e" is dropped for words longer than two characters, and
/// every non-empty word has at least one syllable. Returns 0 only for an
/// empty word.
pub fn count_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    if lower.is_empty() {
        return 0;
    }

    let mut groups = 0usize;
    let mut prev_vowel = false;
    for ch in lower.chars() {
        let vowel = is_vowel(ch);
        if vowel && !prev_vowel {
            groups += 1;
        }
        prev_vowel = vowel;
    }

    if lower.chars().count() > 2 && lower.ends_with('e') && groups > 1 {
        groups -= 1;
    }

    groups.max(1)
}

/// Flesch reading ease; 0.0 when there are no words.
pub fn flesch_reading_ease(word_count: usize, sentence_count: usize, syllable_count: usize) -> f64 {
    if word_count == 0 || sentence_count == 0 {
        return 0.0;
    }
    let words = word_count as f64;
    let avg_sentence_length = words / sentence_count as f64;
    FLESCH_BASE
        - FLESCH_SENTENCE_WEIGHT * avg_sentence_length
        - FLESCH_SYLLABLE_WEIGHT * (syllable_count as f64 / words)
}

/// Compute readability metrics for text. Empty or word-less input yields
/// zero-valued metrics.
pub fn compute_metrics(text: &str) -> Metrics {
    let words = tokenize_words(text);
    let word_count = words.len();
    if word_count == 0 {
        return Metrics::default();
    }

    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let unique_word_count = unique.len();

    let sentence_count = split_sentences(text).len().max(1);
    let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();

    Metrics {
        word_count,
        unique_word_count,
        unique_ratio: unique_word_count as f64 / word_count as f64,
        sentence_count,
        avg_sentence_length: word_count as f64 / sentence_count as f64,
        syllable_count,
        flesch_reading_ease: flesch_reading_ease(word_count, sentence_count, syllable_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cat_scenario() {
        let m = compute_metrics("The cat sat. The cat ran.");
        assert_eq!(m.word_count, 6);
        assert_eq!(m.unique_word_count, 4);
        assert_eq!(m.sentence_count, 2);
        assert_eq!(m.avg_sentence_length, 3.0);
        assert_eq!(m.syllable_count, 6);
        let expected = 206.835 - 1.015 * 3.0 - 84.6;
        assert!((m.flesch_reading_ease - expected).abs() < 1e-9);
    }

    #[test]
    fn test_dot_inside_number_ends_sentence() {
        let m = compute_metrics("Pi is 3.14 roughly.");
        assert_eq!(m.sentence_count, 2);
        assert_eq!(m.word_count, 5);
    }

    #[test]
    fn test_empty_text_is_all_zero() {
        let m = compute_metrics("");
        assert_eq!(m, Metrics::default());
        assert_eq!(m.flesch_reading_ease, 0.0);
    }

    #[test]
    fn test_words_without_terminator_form_one_sentence() {
        let m = compute_metrics("no punctuation here");
        assert_eq!(m.sentence_count, 1);
        assert_eq!(m.avg_sentence_length, 3.0);
    }

    #[test]
    fn test_unique_words_case_insensitive() {
        let m = compute_metrics("Apple apple APPLE pie");
        assert_eq!(m.word_count, 4);
        assert_eq!(m.unique_word_count, 2);
        assert!((m.unique_ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_count_syllables() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("cake"), 1);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("reading"), 2);
        assert_eq!(count_syllables("rhythm"), 1);
        assert_eq!(count_syllables("2024"), 1);
        assert_eq!(count_syllables("Beautiful"), 3);
        assert_eq!(count_syllables(""), 0);
    }

    #[test]
    fn test_every_word_has_a_syllable() {
        for word in tokenize_words("xyz bcd 42 naïve über Straße q") {
            assert!(count_syllables(word) >= 1, "word {word}");
        }
    }

    #[test]
    fn test_binary_like_text_does_not_panic() {
        let text = String::from_utf8_lossy(&[0xFF, 0x00, b'a', b'b', 0x80, b'.']).to_string();
        let m = compute_metrics(&text);
        assert!(m.unique_word_count <= m.word_count);
        assert!(m.unique_ratio >= 0.0 && m.unique_ratio <= 1.0);
    }

    #[test]
    fn test_flesch_guarded_for_zero_words() {
        assert_eq!(flesch_reading_ease(0, 0, 0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_metrics_invariants_hold(text in "\\PC{0,300}") {
            let m = compute_metrics(&text);
            prop_assert!(m.unique_word_count <= m.word_count);
            prop_assert!((0.0..=1.0).contains(&m.unique_ratio));
            prop_assert!(m.avg_sentence_length.is_finite() && m.flesch_reading_ease.is_finite());
            if m.word_count > 0 {
                prop_assert!(m.sentence_count >= 1);
                prop_assert!(m.syllable_count >= m.word_count);
            } else {
                prop_assert_eq!(m, Metrics::default());
            }
        }

        #[test]
        fn prop_every_token_has_a_syllable(text in "[a-zA-Z0-9' .!?]{0,200}") {
            for word in tokenize_words(&text) {
                prop_assert!(count_syllables(word) >= 1, "word {}", word);
            }
        }
    }
}
