//! Error types for ComplyFlow

/// Result type alias using ComplyFlow's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ComplyFlow operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown policy identifier
    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    /// Malformed policy template
    #[error("template parse error: {0}")]
    Template(String),

    /// Failure while evaluating or executing a single rule
    #[error("rule evaluation error: {0}")]
    RuleEvaluation(String),

    /// Failure while appending to the audit log
    #[error("audit write error: {0}")]
    AuditWrite(String),

    /// Detector construction or execution errors
    #[error("detector error: {0}")]
    Detector(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new policy-not-found error
    pub fn policy_not_found(policy_id: impl Into<String>) -> Self {
        Self::PolicyNotFound(policy_id.into())
    }

    /// Create a new template parse error
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Create a new rule evaluation error
    pub fn rule_evaluation(msg: impl Into<String>) -> Self {
        Self::RuleEvaluation(msg.into())
    }

    /// Create a new audit write error
    pub fn audit_write(msg: impl Into<String>) -> Self {
        Self::AuditWrite(msg.into())
    }

    /// Create a new detector error
    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
