//! PII detection and scrubbing

use complyflow_core::Result;
use regex::Regex;

/// Kinds of personally identifiable information the detector recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PiiKind {
    Email,
    Phone,
    Ssn,
    CreditCard,
}

impl PiiKind {
    /// Stable tag used in policy conditions and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiKind::Email => "email",
            PiiKind::Phone => "phone",
            PiiKind::Ssn => "ssn",
            PiiKind::CreditCard => "credit_card",
        }
    }

    /// Placeholder substituted for matches of this kind
    pub fn placeholder(&self) -> &'static str {
        match self {
            PiiKind::Email => "[EMAIL]",
            PiiKind::Phone => "[PHONE]",
            PiiKind::Ssn => "[SSN]",
            PiiKind::CreditCard => "[CARD]",
        }
    }
}

/// PII detector using regex patterns
pub struct PiiDetector {
    email_regex: Regex,
    phone_regex: Regex,
    ssn_regex: Regex,
    credit_card_regex: Regex,
}

impl PiiDetector {
    /// Create a new PII detector
    pub fn new() -> Result<Self> {
        Ok(Self {
            email_regex: compile(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b")?,
            phone_regex: compile(r"\b\d{3}-\d{3}-\d{4}\b|\(\d{3}\)\s*\d{3}-\d{4}")?,
            ssn_regex: compile(r"\b\d{3}-\d{2}-\d{4}\b")?,
            credit_card_regex: compile(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b")?,
        })
    }

    /// Detect which PII kinds appear in the text
    pub fn detect(&self, text: &str) -> Vec<PiiKind> {
        let mut kinds = Vec::new();

        if self.email_regex.is_match(text) {
            kinds.push(PiiKind::Email);
        }
        if self.phone_regex.is_match(text) {
            kinds.push(PiiKind::Phone);
        }
        if self.ssn_regex.is_match(text) {
            kinds.push(PiiKind::Ssn);
        }
        if self.credit_card_regex.is_match(text) {
            kinds.push(PiiKind::CreditCard);
        }

        kinds
    }

    /// Replace every PII match with its placeholder token.
    ///
    /// Scrubbing is idempotent: placeholders contain no digits or address
    /// characters, so a second pass leaves the text unchanged.
    pub fn scrub(&self, text: &str) -> (String, Vec<PiiKind>) {
        let mut touched = Vec::new();
        let mut out = text.to_string();

        for (regex, kind) in [
            (&self.email_regex, PiiKind::Email),
            (&self.phone_regex, PiiKind::Phone),
            (&self.ssn_regex, PiiKind::Ssn),
            (&self.credit_card_regex, PiiKind::CreditCard),
        ] {
            if regex.is_match(&out) {
                out = regex.replace_all(&out, kind.placeholder()).into_owned();
                touched.push(kind);
            }
        }

        (out, touched)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| complyflow_core::Error::detector(format!("failed to compile pattern: {}", e)))
}
