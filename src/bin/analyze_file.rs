use candidate_lens_lib::models::AnalysisResult;
use candidate_lens_lib::services::autopilot::AutopilotRegistry;
use candidate_lens_lib::services::detection::{DetectionSensitivity, RigorousScorer, UniformityScorer};
use candidate_lens_lib::services::{Analyzer, Document};
use serde::Serialize;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin analyze_file -- <path> [--no-autopilot] [--sensitivity <low|medium|high>] [--out <json_path>]"
        );
        return Ok(());
    }

    let path = args[1].clone();
    let no_autopilot = has_flag(&args, "--no-autopilot");
    let sensitivity = parse_arg_value(&args, "--sensitivity")
        .map(|s| DetectionSensitivity::from_str(&s))
        .unwrap_or_default();
    let out_path = parse_arg_value(&args, "--out");

    let bytes = std::fs::read(&path).map_err(|e| format!("read file failed: {}", e))?;
    let file_name = std::path::Path::new(&path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string());

    let document = Document::from_bytes(file_name.as_deref(), bytes);
    let autopilots = if no_autopilot {
        AutopilotRegistry::disabled()
    } else {
        AutopilotRegistry::default()
    };
    let analyzer = Analyzer::new(Box::new(UniformityScorer), Box::new(RigorousScorer), autopilots, sensitivity);
    let result = analyzer.analyze_document(&document).map_err(|e| e.to_string())?;
    let m = &result.metrics;

    println!("File: {}", path);
    println!("Type: {}", document.kind().as_str());
    println!("Decoded: {} chars ({} bytes)", document.text().chars().count(), document.bytes().len());
    println!("Preview: {}", preview(document.text(), 80));
    println!();
    println!("Words:                {} ({} unique, ratio {:.2})", m.word_count, m.unique_word_count, m.unique_ratio);
    println!("Sentences:            {} (avg {:.2} words)", m.sentence_count, m.avg_sentence_length);
    println!("Syllables:            {} ({:.2} per word)", m.syllable_count, m.syllables_per_word());
    println!("Flesch reading ease:  {:.2}", m.flesch_reading_ease);
    println!("AI likelihood:        {:.2} ({})", result.ai_likelihood, result.verdict);
    println!("AI rigorous score:    {:.2}", result.ai_rigorous_score);
    if !result.autopilot_result.is_empty() {
        println!();
        println!("{}", result.autopilot_result);
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output<'a> {
            file: String,
            kind: String,
            decoded_chars: usize,
            decoded_bytes: usize,
            result: &'a AnalysisResult,
        }

        let out = Output {
            file: path.clone(),
            kind: document.kind().as_str().to_string(),
            decoded_chars: document.text().chars().count(),
            decoded_bytes: document.bytes().len(),
            result: &result,
        };

        let json = serde_json::to_string_pretty(&out).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, json).map_err(|e| format!("write out failed: {}", e))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
