//! Audit event records
//!
//! An audit event is the persisted projection of a single rule's enforcement
//! outcome. Events are immutable once appended; the log's insertion order is
//! the timestamp order, since each event is stamped at enforcement time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single persisted enforcement outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: String,

    /// RFC3339 timestamp stamped at enforcement time
    pub timestamp: String,

    /// Policy this outcome belongs to
    pub policy_id: String,

    /// Rule within the policy
    pub rule_id: String,

    /// Action tag as recorded (flattened from the action enum)
    pub action_taken: String,

    /// Whether the action reported success
    pub success: bool,

    /// Human-readable outcome message
    pub message: String,

    /// Free-form outcome metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl AuditEvent {
    /// Create a new audit event with a generated ID
    pub fn new(
        policy_id: impl Into<String>,
        rule_id: impl Into<String>,
        action_taken: impl Into<String>,
        success: bool,
        message: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_event_id(),
            timestamp: timestamp.into(),
            policy_id: policy_id.into(),
            rule_id: rule_id.into(),
            action_taken: action_taken.into(),
            success,
            message: message.into(),
            metadata: Map::new(),
        }
    }

    /// Attach outcome metadata
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Generate a unique event ID using UUID v4
fn generate_event_id() -> String {
    format!("evt_{}", uuid::Uuid::new_v4())
}
