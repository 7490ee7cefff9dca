//! Policy and rule definitions

use complyflow_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::action::{EnforcementMode, PolicyAction};
use crate::condition::RuleConditions;

/// A complete policy: a named, versioned, ordered set of rules plus
/// compliance metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Globally unique identifier, engine- or template-assigned
    pub policy_id: String,

    /// Policy name
    pub name: String,

    /// Version of the policy
    pub version: String,

    /// Description of what this policy enforces
    pub description: String,

    /// Rules in evaluation order (order is significant)
    pub rules: Vec<PolicyRule>,

    /// Regulatory frameworks this policy supports
    pub compliance_frameworks: Vec<String>,

    /// Whether every enforcement outcome is appended to the audit log
    pub audit_required: bool,

    /// Author recorded in the template
    pub created_by: String,

    /// RFC3339 creation timestamp recorded in the template
    pub created_date: String,
}

/// A single rule within a policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Rule identifier, unique within its policy
    pub rule_id: String,

    /// Free-text rule category
    #[serde(rename = "type")]
    pub rule_type: String,

    /// Action taken when the condition holds
    pub action: PolicyAction,

    /// Condition predicate configuration, decoded at parse time
    pub conditions: RuleConditions,

    /// When this rule applies relative to the guarded operation
    pub enforcement: EnforcementMode,
}

impl Policy {
    /// Parse a policy template from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::template(format!("invalid template: {}", e)))
    }

    /// Parse a policy template from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::template(format!("invalid template: {}", e)))
    }

    /// Parse a policy template from an in-memory JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::template(format!("invalid template: {}", e)))
    }

    /// Load a policy template from a file; the extension selects the format
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionKind;

    const TEMPLATE: &str = r#"{
        "policy_id": "data_privacy_001",
        "name": "Data Privacy Policy",
        "version": "1.0",
        "description": "GDPR/CCPA data handling",
        "rules": [
            {
                "rule_id": "pii_detection",
                "type": "privacy",
                "action": "anonymize",
                "conditions": {"data_types": ["email", "phone"]},
                "enforcement": "real_time"
            }
        ],
        "compliance_frameworks": ["GDPR", "CCPA"],
        "audit_required": true,
        "created_by": "compliance-team",
        "created_date": "2026-01-10T09:00:00+00:00"
    }"#;

    #[test]
    fn test_json_template_parses() {
        let policy = Policy::from_json(TEMPLATE).unwrap();

        assert_eq!(policy.policy_id, "data_privacy_001");
        assert_eq!(policy.rules.len(), 1);
        assert_eq!(policy.rules[0].action, PolicyAction::Anonymize);
        assert!(matches!(
            policy.rules[0].conditions.kind(),
            ConditionKind::Pii(_)
        ));
    }

    #[test]
    fn test_yaml_template_parses() {
        let yaml = r#"
policy_id: financial_compliance_001
name: AML Monitoring
version: "2.1"
description: Anti-money-laundering thresholds
rules:
  - rule_id: anti_money_laundering
    type: financial
    action: flag
    conditions:
      threshold_amounts:
        wire: 10000
    enforcement: pre_decision
compliance_frameworks: [SOX, BSA]
audit_required: true
created_by: risk-team
created_date: "2026-01-10T09:00:00+00:00"
"#;

        let policy = Policy::from_yaml(yaml).unwrap();
        assert_eq!(policy.rules[0].rule_id, "anti_money_laundering");
        assert_eq!(policy.rules[0].action, PolicyAction::Flag);
    }

    #[test]
    fn test_unknown_action_tag_fails_parsing() {
        let bad = TEMPLATE.replace("\"anonymize\"", "\"obliterate\"");
        let err = Policy::from_json(&bad).unwrap_err();
        assert!(err.to_string().contains("template"));
    }

    #[test]
    fn test_unknown_enforcement_tag_fails_parsing() {
        let bad = TEMPLATE.replace("\"real_time\"", "\"sometime\"");
        assert!(Policy::from_json(&bad).is_err());
    }

    #[test]
    fn test_template_round_trips_conditions() {
        let policy = Policy::from_json(TEMPLATE).unwrap();
        let json = serde_json::to_value(&policy).unwrap();

        assert_eq!(
            json["rules"][0]["conditions"],
            serde_json::json!({"data_types": ["email", "phone"]})
        );
        assert_eq!(json["rules"][0]["enforcement"], "real_time");
    }
}
