//! Policy enforcement engine
//!
//! Owns the policy store and the audit log handle. `enforce` walks a
//! policy's rules in order, evaluating each condition and executing the
//! paired action, and produces exactly one result per rule: a condition
//! miss yields an explicit allow, a per-rule failure yields a failed deny,
//! and only an unknown policy aborts the call.

use chrono::Utc;
use complyflow_core::{Error, Record, Result};
use complyflow_telemetry::{dashboard, AuditEvent, AuditLog, DashboardReport};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info, warn};

use crate::action::PolicyAction;
use crate::evaluate::ConditionEvaluator;
use crate::executor::ActionExecutor;
use crate::rule::{Policy, PolicyRule};

/// Message recorded when a rule's conditions do not hold
const DEFAULT_ALLOW_MESSAGE: &str = "Rule conditions not met, allowing by default";

/// Outcome of enforcing one rule against one record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementResult {
    /// Policy the rule belongs to
    pub policy_id: String,

    /// Rule that produced this outcome
    pub rule_id: String,

    /// Action recorded for this outcome
    pub action_taken: PolicyAction,

    /// Whether the action reported success
    pub success: bool,

    /// Human-readable outcome message
    pub message: String,

    /// RFC3339 timestamp stamped at enforcement time
    pub timestamp: String,

    /// Action-specific metadata
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Per-policy enforcement totals derived from the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStatus {
    pub policy_id: String,
    pub policy_name: String,
    pub total_enforcements: usize,
    pub successful_enforcements: usize,
    pub failed_enforcements: usize,
    pub last_enforcement: Option<String>,
    pub compliance_frameworks: Vec<String>,
}

/// Policy enforcement engine
pub struct PolicyEngine {
    policies: RwLock<HashMap<String, Policy>>,
    evaluator: ConditionEvaluator,
    executor: ActionExecutor,
    audit: AuditLog,
}

impl PolicyEngine {
    /// Create an engine persisting its audit trail at `audit_path`
    pub fn new(audit_path: impl AsRef<Path>) -> Result<Self> {
        Self::with_audit_log(AuditLog::new(audit_path.as_ref().to_path_buf()))
    }

    /// Create an engine around an existing audit log handle
    pub fn with_audit_log(audit: AuditLog) -> Result<Self> {
        Ok(Self {
            policies: RwLock::new(HashMap::new()),
            evaluator: ConditionEvaluator::new()?,
            executor: ActionExecutor::new()?,
            audit,
        })
    }

    /// Register a parsed policy, keyed by its `policy_id`
    pub fn register_policy(&self, policy: Policy) {
        info!(policy_id = %policy.policy_id, name = %policy.name, "registered policy");
        self.policies.write().insert(policy.policy_id.clone(), policy);
    }

    /// Load one policy template from a file (fail-fast on parse errors)
    pub fn load_template_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let policy = Policy::from_file(&path)?;
        let policy_id = policy.policy_id.clone();
        self.register_policy(policy);
        Ok(policy_id)
    }

    /// Load every `.json`/`.yaml`/`.yml` template in a directory.
    ///
    /// A malformed file is logged and skipped so one bad template cannot
    /// block the rest of the pack; returns how many policies loaded.
    pub fn load_template_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let mut loaded = 0;

        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !matches!(ext, Some("json") | Some("yaml") | Some("yml")) {
                continue;
            }

            match self.load_template_file(&path) {
                Ok(_) => loaded += 1,
                Err(e) => {
                    error!(path = %path.display(), "error loading policy template: {}", e);
                }
            }
        }

        Ok(loaded)
    }

    /// Create and register a policy from a template, assigning a fresh
    /// identifier derived from the template name and creation timestamp.
    pub fn create_policy_from_template(
        &self,
        template_name: &str,
        mut template: Value,
    ) -> Result<String> {
        let now = Utc::now();
        let base = format!("{}_{}", template_name, now.format("%Y%m%d_%H%M%S"));

        let mut policies = self.policies.write();

        // Second-resolution timestamps can collide within a process; the
        // identifier must stay unique.
        let mut policy_id = base.clone();
        let mut suffix = 2;
        while policies.contains_key(&policy_id) {
            policy_id = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        let fields = template
            .as_object_mut()
            .ok_or_else(|| Error::template("template must be an object"))?;
        fields.insert("policy_id".to_string(), json!(policy_id));
        fields.insert("created_date".to_string(), json!(now.to_rfc3339()));

        let policy = Policy::from_value(template)?;
        policies.insert(policy_id.clone(), policy);

        info!(policy_id = %policy_id, "created policy from template");
        Ok(policy_id)
    }

    /// Enforce a policy against a record, producing one result per rule in
    /// policy order. Errors with `PolicyNotFound` before producing any
    /// result if the policy is unknown.
    pub fn enforce(
        &self,
        policy_id: &str,
        record: &Record,
        context: Option<&Record>,
    ) -> Result<Vec<EnforcementResult>> {
        let policy = self
            .policies
            .read()
            .get(policy_id)
            .cloned()
            .ok_or_else(|| Error::policy_not_found(policy_id))?;

        let mut results = Vec::with_capacity(policy.rules.len());

        for rule in &policy.rules {
            let mut result = match self.enforce_rule(rule, record, context) {
                Ok(result) => result,
                Err(e) => {
                    warn!(rule_id = %rule.rule_id, "error enforcing rule: {}", e);
                    EnforcementResult {
                        policy_id: String::new(),
                        rule_id: rule.rule_id.clone(),
                        action_taken: PolicyAction::Deny,
                        success: false,
                        message: format!("Rule enforcement failed: {}", e),
                        timestamp: Utc::now().to_rfc3339(),
                        metadata: Map::new(),
                    }
                }
            };
            result.policy_id = policy_id.to_string();

            if policy.audit_required {
                self.append_audit(&mut result);
            }

            results.push(result);
        }

        Ok(results)
    }

    /// Per-policy totals derived from the audit log
    pub fn get_policy_status(&self, policy_id: &str) -> Result<PolicyStatus> {
        let (name, frameworks) = {
            let policies = self.policies.read();
            let policy = policies
                .get(policy_id)
                .ok_or_else(|| Error::policy_not_found(policy_id))?;
            (policy.name.clone(), policy.compliance_frameworks.clone())
        };

        let events = self.audit.events_for_policy(policy_id)?;
        let successful = events.iter().filter(|e| e.success).count();

        Ok(PolicyStatus {
            policy_id: policy_id.to_string(),
            policy_name: name,
            total_enforcements: events.len(),
            successful_enforcements: successful,
            failed_enforcements: events.len() - successful,
            last_enforcement: events.last().map(|e| e.timestamp.clone()),
            compliance_frameworks: frameworks,
        })
    }

    /// Compliance dashboard derived from the full audit trail
    pub fn compliance_dashboard(&self) -> Result<DashboardReport> {
        let events = self.audit.read_all()?;
        Ok(dashboard::summarize(&events, self.policy_count()))
    }

    /// Number of registered policies
    pub fn policy_count(&self) -> usize {
        self.policies.read().len()
    }

    /// Identifiers of every registered policy
    pub fn policy_ids(&self) -> Vec<String> {
        self.policies.read().keys().cloned().collect()
    }

    /// A snapshot of one registered policy
    pub fn policy(&self, policy_id: &str) -> Option<Policy> {
        self.policies.read().get(policy_id).cloned()
    }

    /// The audit log backing this engine
    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    fn enforce_rule(
        &self,
        rule: &PolicyRule,
        record: &Record,
        context: Option<&Record>,
    ) -> Result<EnforcementResult> {
        let timestamp = Utc::now().to_rfc3339();

        if self.evaluator.evaluate(&rule.conditions, record, context)? {
            let outcome = self.executor.execute(rule.action, record, &rule.conditions)?;

            Ok(EnforcementResult {
                policy_id: String::new(),
                rule_id: rule.rule_id.clone(),
                action_taken: rule.action,
                success: outcome.success,
                message: outcome.message,
                timestamp,
                metadata: outcome.metadata,
            })
        } else {
            Ok(EnforcementResult {
                policy_id: String::new(),
                rule_id: rule.rule_id.clone(),
                action_taken: PolicyAction::Allow,
                success: true,
                message: DEFAULT_ALLOW_MESSAGE.to_string(),
                timestamp,
                metadata: Map::new(),
            })
        }
    }

    /// Append one result to the audit log. A persistence failure never
    /// discards the computed result; it is logged and recorded in the
    /// result's metadata instead.
    fn append_audit(&self, result: &mut EnforcementResult) {
        let event = AuditEvent::new(
            result.policy_id.clone(),
            result.rule_id.clone(),
            result.action_taken.as_str(),
            result.success,
            result.message.clone(),
            result.timestamp.clone(),
        )
        .with_metadata(result.metadata.clone());

        if let Err(e) = self.audit.append(&event) {
            error!(policy_id = %result.policy_id, rule_id = %result.rule_id, "failed to append audit event: {}", e);
            result
                .metadata
                .insert("audit_error".to_string(), json!(e.to_string()));
        }
    }
}
