// Sensitivity utilities
// Sensitivity moves the verdict thresholds, never the raw scores.

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DetectionSensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl DetectionSensitivity {
    pub fn from_str(val: &str) -> Self {
        match val.trim().to_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }
}

/// (review, flag) cut-offs for a sensitivity level
pub fn decision_thresholds(sensitivity: DetectionSensitivity) -> (f64, f64) {
    match sensitivity {
        DetectionSensitivity::Low => (0.72, 0.88),
        DetectionSensitivity::Medium => (0.65, 0.85),
        DetectionSensitivity::High => (0.55, 0.75),
    }
}

pub fn verdict(prob: f64, sensitivity: DetectionSensitivity) -> &'static str {
    let (review, flag) = decision_thresholds(sensitivity);
    if prob < review {
        "pass"
    } else if prob < flag {
        "review"
    } else {
        "flag"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_order() {
        let low = decision_thresholds(DetectionSensitivity::Low);
        let mid = decision_thresholds(DetectionSensitivity::Medium);
        let high = decision_thresholds(DetectionSensitivity::High);
        assert!(low.0 > mid.0);
        assert!(mid.0 > high.0);
    }

    #[test]
    fn test_from_str_defaults_to_medium() {
        assert_eq!(DetectionSensitivity::from_str(" HIGH "), DetectionSensitivity::High);
        assert_eq!(DetectionSensitivity::from_str("bogus"), DetectionSensitivity::Medium);
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(verdict(0.0, DetectionSensitivity::Medium), "pass");
        assert_eq!(verdict(0.7, DetectionSensitivity::Medium), "review");
        assert_eq!(verdict(0.7, DetectionSensitivity::Low), "pass");
        assert_eq!(verdict(0.8, DetectionSensitivity::High), "flag");
    }
}
