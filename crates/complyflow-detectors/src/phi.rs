//! Protected health information keyword scan

use aho_corasick::AhoCorasick;
use complyflow_core::Result;

/// Fixed indicator vocabulary for protected health information
const PHI_INDICATORS: [&str; 8] = [
    "medical_record",
    "patient_id",
    "diagnosis",
    "treatment",
    "prescription",
    "doctor",
    "hospital",
    "insurance",
];

/// Fast PHI keyword scanner using the Aho-Corasick algorithm
pub struct PhiDetector {
    patterns: AhoCorasick,
}

impl PhiDetector {
    /// Create a new PHI detector
    pub fn new() -> Result<Self> {
        let patterns = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(PHI_INDICATORS)
            .map_err(|e| {
                complyflow_core::Error::detector(format!("failed to build keyword matcher: {}", e))
            })?;

        Ok(Self { patterns })
    }

    /// True if any PHI indicator appears in the text
    pub fn detect(&self, text: &str) -> bool {
        self.patterns.is_match(text)
    }

    /// The distinct indicators present in the text
    pub fn matched_indicators(&self, text: &str) -> Vec<&'static str> {
        let mut seen = [false; PHI_INDICATORS.len()];
        for mat in self.patterns.find_iter(text) {
            seen[mat.pattern().as_usize()] = true;
        }

        PHI_INDICATORS
            .iter()
            .zip(seen)
            .filter_map(|(indicator, hit)| hit.then_some(*indicator))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_indicators_case_insensitively() {
        let detector = PhiDetector::new().unwrap();

        assert!(detector.detect("Diagnosis pending review"));
        assert!(detector.detect("see PATIENT_ID 42"));
        assert!(!detector.detect("routine shipping manifest"));
    }

    #[test]
    fn test_matched_indicators_are_distinct() {
        let detector = PhiDetector::new().unwrap();

        let hits = detector.matched_indicators("doctor notes: doctor updated prescription");
        assert_eq!(hits, vec!["prescription", "doctor"]);
    }
}
