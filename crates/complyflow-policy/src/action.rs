//! Policy action and enforcement mode definitions

use serde::{Deserialize, Serialize};

/// Corrective action taken when a rule's condition holds.
///
/// The tag set is closed: templates carrying an unrecognized action fail to
/// parse rather than falling through to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Deny,
    Flag,
    Anonymize,
    Escalate,
    Require,
    Encrypt,
    Log,
    Notify,
    Validate,
    Restrict,
    Delete,
}

impl PolicyAction {
    /// Stable string tag, as persisted in audit events
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Allow => "allow",
            PolicyAction::Deny => "deny",
            PolicyAction::Flag => "flag",
            PolicyAction::Anonymize => "anonymize",
            PolicyAction::Escalate => "escalate",
            PolicyAction::Require => "require",
            PolicyAction::Encrypt => "encrypt",
            PolicyAction::Log => "log",
            PolicyAction::Notify => "notify",
            PolicyAction::Validate => "validate",
            PolicyAction::Restrict => "restrict",
            PolicyAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a rule is enforced relative to the guarded operation.
///
/// Informational in this engine (evaluation order is always policy order);
/// the tag round-trips through storage and API responses unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementMode {
    RealTime,
    PreProcessing,
    PostProcessing,
    Scheduled,
    PreDecision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags_round_trip() {
        for tag in [
            "allow", "deny", "flag", "anonymize", "escalate", "require", "encrypt", "log",
            "notify", "validate", "restrict", "delete",
        ] {
            let action: PolicyAction = serde_json::from_value(serde_json::json!(tag)).unwrap();
            assert_eq!(action.as_str(), tag);
            assert_eq!(serde_json::to_value(action).unwrap(), serde_json::json!(tag));
        }
    }

    #[test]
    fn test_unknown_action_tag_fails() {
        let result: Result<PolicyAction, _> = serde_json::from_value(serde_json::json!("quarantine"));
        assert!(result.is_err());
    }

    #[test]
    fn test_enforcement_mode_round_trip() {
        for tag in [
            "real_time",
            "pre_processing",
            "post_processing",
            "scheduled",
            "pre_decision",
        ] {
            let mode: EnforcementMode = serde_json::from_value(serde_json::json!(tag)).unwrap();
            assert_eq!(serde_json::to_value(mode).unwrap(), serde_json::json!(tag));
        }

        let result: Result<EnforcementMode, _> = serde_json::from_value(serde_json::json!("batch"));
        assert!(result.is_err());
    }
}
