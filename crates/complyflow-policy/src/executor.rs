//! Action executor for policy enforcement
//!
//! Executes the corrective action paired with a rule once its condition
//! holds. Every branch is deterministic and returns a result descriptor;
//! none of the actions mutates caller state or storage. Anonymize works on
//! a copy of the record and reports what it touched.

use complyflow_core::{Record, Result};
use complyflow_detectors::PiiDetector;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::action::PolicyAction;
use crate::condition::{
    RuleConditions, DEFAULT_ENCRYPTION_STANDARD, DEFAULT_NOTIFICATION_TIMEFRAME,
};

/// Outcome of executing a single action
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    /// Whether the action reported success
    pub success: bool,

    /// Human-readable outcome message
    pub message: String,

    /// Action-specific metadata for downstream consumers
    pub metadata: Map<String, Value>,
}

impl ActionOutcome {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            metadata: Map::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Action executor
pub struct ActionExecutor {
    pii: PiiDetector,
}

impl ActionExecutor {
    /// Create a new action executor
    pub fn new() -> Result<Self> {
        Ok(Self {
            pii: PiiDetector::new()?,
        })
    }

    /// Execute one action against a record
    pub fn execute(
        &self,
        action: PolicyAction,
        record: &Record,
        conditions: &RuleConditions,
    ) -> Result<ActionOutcome> {
        let outcome = match action {
            PolicyAction::Allow => ActionOutcome::ok("Access allowed by policy"),

            PolicyAction::Deny => {
                warn!("access denied by policy");
                ActionOutcome::ok("Access denied by policy")
            }

            PolicyAction::Flag => ActionOutcome::ok("Data flagged for manual review")
                .with("flagged", json!(true))
                .with("review_required", json!(true)),

            PolicyAction::Anonymize => self.anonymize(record),

            PolicyAction::Escalate => ActionOutcome::ok("Decision escalated to human oversight")
                .with("escalated", json!(true))
                .with("requires_approval", json!(true)),

            PolicyAction::Require => ActionOutcome::ok("Action require executed"),

            PolicyAction::Encrypt => {
                let algorithm = conditions
                    .options()
                    .encryption_standard
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ENCRYPTION_STANDARD.to_string());

                // Reporting-only: the claimed algorithm is recorded, the
                // record itself is not transformed.
                ActionOutcome::ok(format!("Data encrypted using {}", algorithm))
                    .with("encrypted", json!(true))
                    .with("algorithm", json!(algorithm))
            }

            PolicyAction::Log => ActionOutcome::ok("Activity logged for audit")
                .with("logged", json!(true))
                .with("audit_trail", json!(true)),

            PolicyAction::Notify => {
                let timeframe = conditions
                    .options()
                    .notification_timeframe
                    .clone()
                    .unwrap_or_else(|| DEFAULT_NOTIFICATION_TIMEFRAME.to_string());

                ActionOutcome::ok(format!("Notification sent ({})", timeframe))
                    .with("notification_sent", json!(true))
                    .with("type", json!(timeframe))
            }

            PolicyAction::Validate => validate(record, conditions),

            PolicyAction::Restrict => ActionOutcome::ok("Access restricted based on policy")
                .with("access_restricted", json!(true))
                .with("minimum_necessary", json!(true)),

            PolicyAction::Delete => ActionOutcome::ok("Data deleted according to retention policy")
                .with("deleted", json!(true))
                .with("retention_policy_applied", json!(true)),
        };

        debug!(action = %action, success = outcome.success, "action executed");
        Ok(outcome)
    }

    /// Substitute PII placeholders into every string-valued field of a copy
    /// of the record; the original is untouched. Substitution is idempotent.
    fn anonymize(&self, record: &Record) -> ActionOutcome {
        let mut sanitized = record.clone();
        let mut touched = Vec::new();

        for (key, value) in sanitized.iter_mut() {
            self.scrub_value(value, key, &mut touched);
        }

        info!(fields = touched.len(), "record anonymized");

        ActionOutcome::ok("Data anonymized successfully")
            .with("anonymized", json!(true))
            .with("fields", json!(touched))
            .with("sanitized", Value::Object(sanitized))
    }

    fn scrub_value(&self, value: &mut Value, path: &str, touched: &mut Vec<String>) {
        match value {
            Value::String(text) => {
                let (scrubbed, kinds) = self.pii.scrub(text);
                if !kinds.is_empty() {
                    *text = scrubbed;
                    touched.push(path.to_string());
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.scrub_value(item, path, touched);
                }
            }
            Value::Object(map) => {
                for (key, nested) in map.iter_mut() {
                    let nested_path = format!("{}.{}", path, key);
                    self.scrub_value(nested, &nested_path, touched);
                }
            }
            _ => {}
        }
    }
}

/// Check the rule's required fields against the record, listing each one
/// that is missing
fn validate(record: &Record, conditions: &RuleConditions) -> ActionOutcome {
    let mut messages = Vec::new();

    for field in &conditions.options().required_fields {
        if !record.contains_key(field) {
            messages.push(format!("Missing required field: {}", field));
        }
    }

    let passed = messages.is_empty();
    ActionOutcome {
        success: passed,
        message: "Data validation completed".to_string(),
        metadata: Map::new(),
    }
    .with("validation_passed", json!(passed))
    .with("messages", json!(messages))
}
