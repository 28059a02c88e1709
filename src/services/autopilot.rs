// Autopilot Service
// Simulated automated grading behind a pluggable capability interface

use crate::services::text_processor::SubmissionKind;
use regex::Regex;
use std::sync::OnceLock;

/// An automated grader for one family of submissions.
pub trait Autopilot: Send + Sync {
    fn name(&self) -> &'static str;
    fn supports(&self, kind: &SubmissionKind) -> bool;
    fn run(&self, content: &str) -> String;
}

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("def regex"))
}

/// Canned grading report for Python submissions. Nothing is executed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonAutopilotStub;

impl Autopilot for PythonAutopilotStub {
    fn name(&self) -> &'static str {
        "python-stub"
    }

    fn supports(&self, kind: &SubmissionKind) -> bool {
        *kind == SubmissionKind::Python
    }

    fn run(&self, content: &str) -> String {
        let functions: Vec<&str> = def_re()
            .captures_iter(content)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        let test_functions = functions.iter().filter(|f| f.starts_with("test_")).count();

        format!(
            "Autopilot grading (simulated)\n\
             Functions found: {}\n\
             Test functions found: {}\n\
             Result: 3/5 tests passed\n\
             Note: no code was executed; this report is a placeholder.",
            functions.len(),
            test_functions
        )
    }
}

/// Ordered set of autopilots; the first one supporting a submission wins.
pub struct AutopilotRegistry {
    autopilots: Vec<Box<dyn Autopilot>>,
}

impl Default for AutopilotRegistry {
    fn default() -> Self {
        Self::new(vec![Box::new(PythonAutopilotStub)])
    }
}

impl AutopilotRegistry {
    pub fn new(autopilots: Vec<Box<dyn Autopilot>>) -> Self {
        Self { autopilots }
    }

    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// Run the matching autopilot, or return an empty string when none applies.
    pub fn run(&self, kind: &SubmissionKind, content: &str) -> String {
        match self.autopilots.iter().find(|a| a.supports(kind)) {
            Some(autopilot) => {
                tracing::debug!(autopilot = autopilot.name(), kind = kind.as_str(), "autopilot.run");
                autopilot.run(content)
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION: &str = "def add(a, b):\n    return a + b\n\ndef test_add():\n    assert add(1, 2) == 3\n";

    #[test]
    fn test_python_submission_gets_report() {
        let report = AutopilotRegistry::default().run(&SubmissionKind::Python, SOLUTION);
        assert!(report.contains("3/5 tests passed"));
        assert!(report.contains("Functions found: 2"));
        assert!(report.contains("Test functions found: 1"));
    }

    #[test]
    fn test_other_kinds_are_not_applicable() {
        let registry = AutopilotRegistry::default();
        assert_eq!(registry.run(&SubmissionKind::Text, SOLUTION), "");
        assert_eq!(registry.run(&SubmissionKind::Unknown, SOLUTION), "");
        assert_eq!(registry.run(&SubmissionKind::Other("rs".to_string()), SOLUTION), "");
    }

    #[test]
    fn test_disabled_registry() {
        assert_eq!(AutopilotRegistry::disabled().run(&SubmissionKind::Python, SOLUTION), "");
    }

    #[test]
    fn test_report_is_deterministic_for_empty_content() {
        let stub = PythonAutopilotStub;
        assert_eq!(stub.run(""), stub.run(""));
        assert!(stub.run("").contains("Functions found: 0"));
    }
}
