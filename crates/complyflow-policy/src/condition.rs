//! Rule condition decoding
//!
//! A rule's `conditions` mapping is decoded exactly once, at template-parse
//! time, into a discriminated predicate union plus the executor-facing
//! options. Malformed conditions therefore fail the template load instead
//! of surfacing during enforcement. The raw mapping is retained verbatim so
//! policies round-trip through storage and API responses unchanged.

use complyflow_core::{as_number, Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Default variance threshold for the bias predicate
const DEFAULT_BIAS_THRESHOLD: f64 = 0.1;

/// Default claimed encryption algorithm for the `encrypt` action
pub const DEFAULT_ENCRYPTION_STANDARD: &str = "AES_256";

/// Default timeframe reported by the `notify` action
pub const DEFAULT_NOTIFICATION_TIMEFRAME: &str = "immediate";

/// Decoded conditions of a single rule
#[derive(Debug, Clone, Default)]
pub struct RuleConditions {
    raw: Map<String, Value>,
    kind: ConditionKind,
    options: ActionOptions,
}

/// Predicate union. Dispatch is by presence of a recognized key in the raw
/// mapping, first match wins, in this order: `data_types`,
/// `protected_attributes`, `consent_required`, `threshold_amounts`. A rule
/// with none of the recognized keys is a catch-all whose action always
/// fires.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConditionKind {
    /// PII pattern scan over the flattened record
    Pii(PiiCondition),

    /// Protected-health-information keyword scan (a `data_types` list
    /// naming `medical_record` selects this instead of the PII scan)
    Phi,

    /// Variance heuristic over protected-attribute distributions
    Bias(BiasCondition),

    /// Consent validation; fires when consent is missing
    Consent(ConsentCondition),

    /// Financial transaction thresholds
    FinancialThreshold(ThresholdCondition),

    /// No recognized predicate key; the action always fires
    #[default]
    CatchAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PiiCondition {
    /// PII kinds this rule watches for (intersection with detected kinds)
    pub data_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiasCondition {
    pub protected_attributes: Vec<String>,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsentCondition {
    pub required: bool,

    /// Accepted and retained for round-trip, but never evaluated: consent
    /// presence is currently accepted unconditionally, with no expiry
    /// check. Known gap, kept deliberately.
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCondition {
    pub cash: Option<f64>,
    pub wire: Option<f64>,
}

/// Options consumed by the action executor rather than the evaluator
#[derive(Debug, Clone, Default)]
pub struct ActionOptions {
    pub encryption_standard: Option<String>,
    pub required_fields: Vec<String>,
    pub notification_timeframe: Option<String>,
}

impl RuleConditions {
    /// Decode a raw conditions mapping
    pub fn from_raw(raw: Map<String, Value>) -> Result<Self> {
        let kind = decode_kind(&raw)?;
        let options = decode_options(&raw)?;

        Ok(Self { raw, kind, options })
    }

    /// The decoded predicate
    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    /// Executor-facing options
    pub fn options(&self) -> &ActionOptions {
        &self.options
    }

    /// The raw mapping as loaded from the template
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl Serialize for RuleConditions {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RuleConditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Map::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(serde::de::Error::custom)
    }
}

fn decode_kind(raw: &Map<String, Value>) -> Result<ConditionKind> {
    if let Some(value) = raw.get("data_types") {
        let data_types = string_list(value, "data_types")?;
        if data_types.iter().any(|t| t == "medical_record") {
            return Ok(ConditionKind::Phi);
        }
        return Ok(ConditionKind::Pii(PiiCondition { data_types }));
    }

    if let Some(value) = raw.get("protected_attributes") {
        let protected_attributes = string_list(value, "protected_attributes")?;
        let threshold = match raw.get("bias_threshold") {
            Some(v) => as_number(v).ok_or_else(|| {
                Error::template(format!("bias_threshold must be numeric, got {}", v))
            })?,
            None => DEFAULT_BIAS_THRESHOLD,
        };
        return Ok(ConditionKind::Bias(BiasCondition {
            protected_attributes,
            threshold,
        }));
    }

    if let Some(value) = raw.get("consent_required") {
        let required = value.as_bool().ok_or_else(|| {
            Error::template(format!("consent_required must be a boolean, got {}", value))
        })?;
        let expiry = match raw.get("consent_expiry") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => {
                return Err(Error::template(format!(
                    "consent_expiry must be a string, got {}",
                    v
                )))
            }
            None => None,
        };
        return Ok(ConditionKind::Consent(ConsentCondition { required, expiry }));
    }

    if let Some(value) = raw.get("threshold_amounts") {
        let thresholds = value.as_object().ok_or_else(|| {
            Error::template(format!("threshold_amounts must be an object, got {}", value))
        })?;
        return Ok(ConditionKind::FinancialThreshold(ThresholdCondition {
            cash: threshold_entry(thresholds, "cash")?,
            wire: threshold_entry(thresholds, "wire")?,
        }));
    }

    Ok(ConditionKind::CatchAll)
}

fn decode_options(raw: &Map<String, Value>) -> Result<ActionOptions> {
    let encryption_standard = optional_string(raw, "encryption_standard")?;
    let notification_timeframe = optional_string(raw, "notification_timeframe")?;
    let required_fields = match raw.get("required_fields") {
        Some(value) => string_list(value, "required_fields")?,
        None => Vec::new(),
    };

    Ok(ActionOptions {
        encryption_standard,
        required_fields,
        notification_timeframe,
    })
}

fn string_list(value: &Value, field: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::template(format!("{} must be an array of strings", field)))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| Error::template(format!("{} must be an array of strings", field)))
        })
        .collect()
}

fn optional_string(raw: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match raw.get(field) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v) => Err(Error::template(format!("{} must be a string, got {}", field, v))),
        None => Ok(None),
    }
}

fn threshold_entry(thresholds: &Map<String, Value>, key: &str) -> Result<Option<f64>> {
    match thresholds.get(key) {
        Some(v) => as_number(v)
            .map(Some)
            .ok_or_else(|| Error::template(format!("threshold {} must be numeric, got {}", key, v))),
        None => Ok(None),
    }
}
