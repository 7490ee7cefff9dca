//! Compliance dashboard aggregation
//!
//! Purely derived from the audit event sequence; never mutates the log or
//! the policy store, so it is safe to recompute on demand from any number
//! of concurrent readers.

use crate::audit::AuditEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of trailing events surfaced in the recent-events window
const RECENT_WINDOW: usize = 10;

/// Aggregate compliance view over the full audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Headline totals
    pub summary: DashboardSummary,

    /// Per-policy enforcement breakdown
    pub policy_statistics: HashMap<String, PolicyBreakdown>,

    /// Count of outcomes per action tag
    pub action_statistics: HashMap<String, u64>,

    /// Most recent events, oldest first
    pub recent_events: Vec<AuditEvent>,
}

/// Headline dashboard totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_policies: usize,
    pub total_enforcements: usize,
    pub successful_enforcements: usize,
    pub failed_enforcements: usize,

    /// Percentage of audited outcomes marked successful, in [0, 100];
    /// zero when nothing has been enforced yet
    pub compliance_rate: f64,

    /// Banding of the compliance rate for at-a-glance reporting
    pub compliance_status: ComplianceStatus,
}

/// Per-policy totals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyBreakdown {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
}

/// Compliance rate bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl ComplianceStatus {
    /// Band a compliance rate percentage
    pub fn from_rate(rate: f64) -> Self {
        if rate >= 95.0 {
            ComplianceStatus::Excellent
        } else if rate >= 85.0 {
            ComplianceStatus::Good
        } else if rate >= 70.0 {
            ComplianceStatus::Warning
        } else {
            ComplianceStatus::Critical
        }
    }
}

/// Build the dashboard report from the ordered audit event sequence.
///
/// `total_policies` is the current size of the policy store; everything else
/// derives from the events alone.
pub fn summarize(events: &[AuditEvent], total_policies: usize) -> DashboardReport {
    let total = events.len();
    let successful = events.iter().filter(|e| e.success).count();
    let failed = total - successful;

    let compliance_rate = if total > 0 {
        successful as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let mut policy_statistics: HashMap<String, PolicyBreakdown> = HashMap::new();
    let mut action_statistics: HashMap<String, u64> = HashMap::new();

    for event in events {
        let entry = policy_statistics.entry(event.policy_id.clone()).or_default();
        entry.total += 1;
        if event.success {
            entry.success += 1;
        } else {
            entry.failed += 1;
        }

        *action_statistics.entry(event.action_taken.clone()).or_insert(0) += 1;
    }

    let recent_events = events
        .iter()
        .skip(total.saturating_sub(RECENT_WINDOW))
        .cloned()
        .collect();

    DashboardReport {
        summary: DashboardSummary {
            total_policies,
            total_enforcements: total,
            successful_enforcements: successful,
            failed_enforcements: failed,
            compliance_rate,
            compliance_status: ComplianceStatus::from_rate(compliance_rate),
        },
        policy_statistics,
        action_statistics,
        recent_events,
    }
}
