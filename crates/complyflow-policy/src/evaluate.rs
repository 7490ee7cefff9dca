//! Condition evaluation
//!
//! Maps (decoded rule conditions, input record, optional caller context) to
//! a boolean: does the rule's action fire? Evaluation is pure; nothing here
//! blocks or mutates. Per-rule failures are converted to failed results by
//! the engine, never surfaced raw to the caller of `enforce`.

use complyflow_core::{as_number, as_numeric_sequence, flatten_to_text, Record, Result};
use complyflow_detectors::{bias, PhiDetector, PiiDetector};

use crate::condition::{
    BiasCondition, ConditionKind, ConsentCondition, PiiCondition, RuleConditions,
    ThresholdCondition,
};

/// Record field consulted by the consent predicate
const CONSENT_FIELD: &str = "consent_timestamp";

/// Evaluates rule conditions against input records
pub struct ConditionEvaluator {
    pii: PiiDetector,
    phi: PhiDetector,
}

impl ConditionEvaluator {
    /// Create a new evaluator with compiled detectors
    pub fn new() -> Result<Self> {
        Ok(Self {
            pii: PiiDetector::new()?,
            phi: PhiDetector::new()?,
        })
    }

    /// True if the rule's action should fire for this record.
    ///
    /// The caller context is accepted at the boundary but no predicate
    /// currently consults it.
    pub fn evaluate(
        &self,
        conditions: &RuleConditions,
        record: &Record,
        _context: Option<&Record>,
    ) -> Result<bool> {
        match conditions.kind() {
            ConditionKind::Pii(cond) => Ok(self.check_pii(cond, record)),
            ConditionKind::Phi => Ok(self.phi.detect(&flatten_to_text(record))),
            ConditionKind::Bias(cond) => Ok(check_bias(cond, record)),
            ConditionKind::Consent(cond) => Ok(check_consent(cond, record)),
            ConditionKind::FinancialThreshold(cond) => Ok(check_thresholds(cond, record)),
            ConditionKind::CatchAll => Ok(true),
        }
    }

    /// Intersection of detected PII kinds with the kinds the rule watches
    fn check_pii(&self, cond: &PiiCondition, record: &Record) -> bool {
        let text = flatten_to_text(record);
        self.pii
            .detect(&text)
            .iter()
            .any(|kind| cond.data_types.iter().any(|t| t == kind.as_str()))
    }
}

fn check_bias(cond: &BiasCondition, record: &Record) -> bool {
    cond.protected_attributes.iter().any(|attr| {
        record
            .get(attr)
            .and_then(as_numeric_sequence)
            .is_some_and(|values| bias::exceeds_threshold(&values, cond.threshold))
    })
}

/// Fires when consent is required and the record carries no consent
/// timestamp. A present consent is accepted unconditionally; the declared
/// expiry window is not checked (known gap, preserved deliberately).
fn check_consent(cond: &ConsentCondition, record: &Record) -> bool {
    if !cond.required {
        return false;
    }

    record.get(CONSENT_FIELD).map_or(true, |v| v.is_null())
}

fn check_thresholds(cond: &ThresholdCondition, record: &Record) -> bool {
    let meets = |value: f64| {
        cond.cash.is_some_and(|cash| value >= cash) || cond.wire.is_some_and(|wire| value >= wire)
    };

    if let Some(cash) = cond.cash {
        if record
            .get("cash_amount")
            .and_then(as_number)
            .is_some_and(|v| v >= cash)
        {
            return true;
        }
    }

    if let Some(wire) = cond.wire {
        if record
            .get("wire_amount")
            .and_then(as_number)
            .is_some_and(|v| v >= wire)
        {
            return true;
        }
    }

    record.iter().any(|(key, value)| {
        key.to_lowercase().contains("amount") && as_number(value).is_some_and(meets)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().unwrap().clone()
    }

    fn conditions(value: serde_json::Value) -> RuleConditions {
        RuleConditions::from_raw(value.as_object().unwrap().clone()).unwrap()
    }

    fn evaluator() -> ConditionEvaluator {
        ConditionEvaluator::new().unwrap()
    }

    #[test]
    fn test_pii_intersection() {
        let eval = evaluator();
        let cond = conditions(json!({"data_types": ["email", "phone"]}));

        let hit = record(json!({"customer_email": "sarah.johnson@retailcorp.com"}));
        assert!(eval.evaluate(&cond, &hit, None).unwrap());

        // SSN is detected but not watched by this rule
        let miss = record(json!({"tax_id": "123-45-6789"}));
        assert!(!eval.evaluate(&cond, &miss, None).unwrap());
    }

    #[test]
    fn test_phi_keyword_scan() {
        let eval = evaluator();
        let cond = conditions(json!({"data_types": ["medical_record"]}));

        let hit = record(json!({"note": "updated the Diagnosis after review"}));
        assert!(eval.evaluate(&cond, &hit, None).unwrap());

        let miss = record(json!({"note": "warehouse inventory count"}));
        assert!(!eval.evaluate(&cond, &miss, None).unwrap());
    }

    #[test]
    fn test_bias_variance_over_threshold() {
        let eval = evaluator();
        let cond = conditions(json!({"protected_attributes": ["age"], "bias_threshold": 0.5}));

        let spread = record(json!({"age": [20.0, 60.0, 40.0]}));
        assert!(eval.evaluate(&cond, &spread, None).unwrap());

        let uniform = record(json!({"age": [30.0, 30.0, 30.0]}));
        assert!(!eval.evaluate(&cond, &uniform, None).unwrap());

        // Scalars and short sequences carry no distribution signal
        let scalar = record(json!({"age": 42}));
        assert!(!eval.evaluate(&cond, &scalar, None).unwrap());
    }

    #[test]
    fn test_consent_fires_when_missing() {
        let eval = evaluator();
        let cond = conditions(json!({"consent_required": true}));

        let missing = record(json!({"purchase": "item1"}));
        assert!(eval.evaluate(&cond, &missing, None).unwrap());

        let nulled = record(json!({"consent_timestamp": null}));
        assert!(eval.evaluate(&cond, &nulled, None).unwrap());

        let present = record(json!({"consent_timestamp": "2024-01-15T10:00:00Z"}));
        assert!(!eval.evaluate(&cond, &present, None).unwrap());
    }

    #[test]
    fn test_consent_not_required_never_fires() {
        let eval = evaluator();
        let cond = conditions(json!({"consent_required": false}));

        let missing = record(json!({"purchase": "item1"}));
        assert!(!eval.evaluate(&cond, &missing, None).unwrap());
    }

    #[test]
    fn test_financial_thresholds() {
        let eval = evaluator();
        let cond = conditions(json!({"threshold_amounts": {"wire": 10000, "cash": 5000}}));

        assert!(eval
            .evaluate(&cond, &record(json!({"wire_amount": 15000.0})), None)
            .unwrap());
        assert!(!eval
            .evaluate(&cond, &record(json!({"wire_amount": 500.0})), None)
            .unwrap());

        // Any field naming an amount is checked against either threshold
        assert!(eval
            .evaluate(&cond, &record(json!({"Transfer_Amount": 7000})), None)
            .unwrap());
        assert!(!eval
            .evaluate(&cond, &record(json!({"notes": "no amounts here"})), None)
            .unwrap());
    }

    #[test]
    fn test_catch_all_always_fires() {
        let eval = evaluator();
        let cond = conditions(json!({}));

        assert!(eval.evaluate(&cond, &record(json!({})), None).unwrap());
    }
}
