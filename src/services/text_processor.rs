// Text Processing Service
// Document decoding, tokenization, sentence splitting and stylometry signals

use crate::models::StyleSignals;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

// ============ Document ============

/// Submission type inferred from the uploaded file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionKind {
    Python,
    Text,
    Other(String),
    Unknown,
}

impl SubmissionKind {
    pub fn from_filename(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("py") => Self::Python,
            Some("txt") | Some("md") => Self::Text,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Python => "python",
            Self::Text => "text",
            Self::Other(ext) => ext.as_str(),
            Self::Unknown => "unknown",
        }
    }
}

/// Raw bytes of one submission plus their best-effort UTF-8 decoding.
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Vec<u8>,
    text: String,
    filename: Option<String>,
}

impl Document {
    pub fn from_bytes(filename: Option<&str>, bytes: Vec<u8>) -> Self {
        let decoded = String::from_utf8_lossy(&bytes);
        let text = decoded.strip_prefix('\u{feff}').unwrap_or(&decoded).to_string();
        Self {
            bytes,
            text,
            filename: filename.map(|s| s.to_string()),
        }
    }

    pub fn from_text(filename: Option<&str>, text: &str) -> Self {
        Self::from_bytes(filename, text.as_bytes().to_vec())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn kind(&self) -> SubmissionKind {
        self.filename
            .as_deref()
            .map(SubmissionKind::from_filename)
            .unwrap_or(SubmissionKind::Unknown)
    }
}

// ============ Normalization ============

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{3000}\u{00A0}]").expect("space regex"))
}

/// Normalize smart quotes, dashes, exotic spaces and line endings
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let s = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{2014}', "-");

    let s = space_re().replace_all(&s, " ");

    s.replace("\r\n", "\n").replace('\r', "\n")
}

// ============ Tokenization ============

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}]+(?:['\u{2019}][\p{L}\p{N}]+)*").expect("word regex")
    })
}

/// Words are maximal alphanumeric runs; an apostrophe is kept only between two
/// alphanumeric characters ("don't" is one word, "'quoted'" is "quoted").
pub fn tokenize_words(text: &str) -> Vec<&str> {
    word_re().find_iter(text).map(|m| m.as_str()).collect()
}

fn is_sentence_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

/// Split on every `.`, `!` and `?`. Runs of terminators form a single
/// boundary and fragments without any word are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![];
    }

    let mut fragments = Vec::new();
    let mut start = 0usize;

    for (pos, ch) in text.char_indices() {
        if !is_sentence_terminal(ch) {
            continue;
        }
        fragments.push(&text[start..pos]);
        start = pos + ch.len_utf8();
    }
    fragments.push(&text[start..]);

    fragments
        .into_iter()
        .map(|f| f.trim())
        .filter(|f| word_re().is_match(f))
        .collect()
}

// ============ Stylometry ============

const TRANSITION_WORDS: &[&str] = &[
    "additionally",
    "consequently",
    "furthermore",
    "hence",
    "however",
    "importantly",
    "moreover",
    "notably",
    "overall",
    "particularly",
    "significantly",
    "subsequently",
    "therefore",
    "thus",
    "ultimately",
];

fn transition_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| TRANSITION_WORDS.iter().copied().collect())
}

/// Compute stylometry signals for text
pub fn compute_stylometry(text: &str) -> StyleSignals {
    let words = tokenize_words(text);
    if words.is_empty() {
        return StyleSignals::default();
    }

    let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let tokens: Vec<&str> = lowered.iter().map(|s| s.as_str()).collect();
    let total_words = tokens.len() as f64;

    let sentence_lengths: Vec<f64> = split_sentences(text)
        .iter()
        .map(|s| tokenize_words(s).len() as f64)
        .collect();

    // Repeat ratio: fraction of vocab items that occur >= 3 times
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for t in &tokens {
        *freq.entry(*t).or_insert(0) += 1;
    }
    let repeat_ratio = freq.values().filter(|&&v| v >= 3).count() as f64 / freq.len().max(1) as f64;

    let char_len = text.chars().count().max(1) as f64;
    let punct_count = text
        .chars()
        .filter(|c| matches!(c, ',' | '.' | '!' | '?' | ';' | ':'))
        .count();

    let transitions = tokens
        .iter()
        .filter(|t| transition_words().contains(**t))
        .count();

    let word_chars: usize = words.iter().map(|w| w.chars().count()).sum();

    StyleSignals {
        sentence_length_cv: coefficient_of_variation(&sentence_lengths),
        repeat_ratio,
        ngram_repeat_rate: ngram_repeat_rate(&tokens, 3),
        punctuation_ratio: punct_count as f64 / char_len,
        punctuation_repeat_rate: punctuation_repeat_rate(text),
        transition_word_ratio: transitions as f64 / total_words,
        avg_word_length: word_chars as f64 / total_words,
    }
}

fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / mean
}

fn ngram_repeat_rate(tokens: &[&str], n: usize) -> f64 {
    if n == 0 || tokens.len() < n + 1 {
        return 0.0;
    }
    let mut counts: HashMap<&[&str], usize> = HashMap::new();
    let mut total = 0usize;
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
        total += 1;
    }
    let repeats = counts.values().filter(|&&c| c >= 2).map(|&c| c - 1).sum::<usize>();
    repeats as f64 / total.max(1) as f64
}

/// Share of ASCII punctuation marks that sit next to an identical mark ("!!", "...").
fn punctuation_repeat_rate(text: &str) -> f64 {
    let chars: Vec<char> = text.chars().collect();
    let mut total = 0usize;
    let mut repeated = 0usize;

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_ascii_punctuation() {
            continue;
        }
        total += 1;
        let prev_same = i > 0 && chars[i - 1] == ch;
        let next_same = i + 1 < chars.len() && chars[i + 1] == ch;
        if prev_same || next_same {
            repeated += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    repeated as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d} it\u{2019}s\r\nfine";
        let output = normalize_punctuation(input);
        assert_eq!(output, "Hello\"World\" it's\nfine");
    }

    #[test]
    fn test_tokenize_keeps_inner_apostrophe() {
        assert_eq!(tokenize_words("don't stop"), vec!["don't", "stop"]);
        assert_eq!(tokenize_words("'quoted' words"), vec!["quoted", "words"]);
        assert_eq!(tokenize_words("x=1, y=22"), vec!["x", "1", "y", "22"]);
    }

    #[test]
    fn test_split_sentences_merges_terminator_runs() {
        let sentences = split_sentences("Hello!!! World?? Yes.");
        assert_eq!(sentences, vec!["Hello", "World", "Yes"]);
    }

    #[test]
    fn test_split_sentences_breaks_on_every_dot() {
        let sentences = split_sentences("Pi is 3.14 roughly. ... !");
        assert_eq!(sentences, vec!["Pi is 3", "14 roughly"]);
        assert_eq!(tokenize_words("3.14"), vec!["3", "14"]);
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("?!.").is_empty());
    }

    #[test]
    fn test_document_decodes_lossy_and_strips_bom() {
        let doc = Document::from_bytes(Some("a.txt"), vec![0xEF, 0xBB, 0xBF, b'h', b'i', 0xFF]);
        assert_eq!(doc.text(), "hi\u{fffd}");
        assert_eq!(doc.bytes().len(), 6);
        assert_eq!(doc.kind(), SubmissionKind::Text);
    }

    #[test]
    fn test_submission_kind_from_filename() {
        assert_eq!(SubmissionKind::from_filename("solution.PY"), SubmissionKind::Python);
        assert_eq!(SubmissionKind::from_filename("notes.md"), SubmissionKind::Text);
        assert_eq!(
            SubmissionKind::from_filename("report.pdf"),
            SubmissionKind::Other("pdf".to_string())
        );
        assert_eq!(SubmissionKind::from_filename("Makefile"), SubmissionKind::Unknown);
    }

    #[test]
    fn test_stylometry_empty() {
        assert_eq!(compute_stylometry(""), StyleSignals::default());
        assert_eq!(compute_stylometry("... !!!"), StyleSignals::default());
    }

    #[test]
    fn test_stylometry_uniform_sentences_have_zero_cv() {
        let signals = compute_stylometry("One two three. Four five six. Seven eight nine.");
        assert_eq!(signals.sentence_length_cv, 0.0);
        assert_eq!(signals.repeat_ratio, 0.0);
    }

    #[test]
    fn test_stylometry_punctuation_and_transitions() {
        let signals = compute_stylometry("Moreover, it works!! However it fails.");
        assert!(signals.punctuation_repeat_rate > 0.0);
        assert!((signals.transition_word_ratio - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_ngram_repeat_rate() {
        let tokens = vec!["a", "b", "c", "a", "b", "c"];
        // windows: abc bca cab abc -> one repeat out of four
        assert!((ngram_repeat_rate(&tokens, 3) - 0.25).abs() < 1e-9);
    }
}
