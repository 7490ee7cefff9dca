//! Input records and flattening helpers
//!
//! Policy enforcement operates on arbitrary structured records supplied by
//! the caller. Detection predicates work over a flattened text rendition of
//! the record, so the walk order must be deterministic.

use serde_json::{Map, Value};

/// An arbitrary structured input record, keyed by field name.
pub type Record = Map<String, Value>;

/// Flatten a record to text for pattern-based detection.
///
/// Walks the record depth-first, emitting keys and scalar leaf values
/// separated by whitespace. Nested objects and arrays are descended into;
/// nulls contribute nothing.
pub fn flatten_to_text(record: &Record) -> String {
    let mut out = String::new();
    for (key, value) in record {
        push_flat(&mut out, key, value);
    }
    out
}

fn push_flat(out: &mut String, key: &str, value: &Value) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(key);
    out.push_str(": ");
    push_value(out, value);
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(s),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                push_value(out, item);
            }
        }
        Value::Object(map) => {
            for (key, nested) in map {
                push_flat(out, key, nested);
            }
        }
    }
}

/// Coerce a JSON value to a float, accepting integers and floats only.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Extract a numeric sequence from a JSON value, if every element is numeric.
pub fn as_numeric_sequence(value: &Value) -> Option<Vec<f64>> {
    let items = value.as_array()?;
    items.iter().map(as_number).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_flatten_includes_keys_and_values() {
        let rec = record(json!({
            "customer_email": "a@b.com",
            "amount": 120.5,
            "active": true,
        }));

        let text = flatten_to_text(&rec);
        assert!(text.contains("customer_email"));
        assert!(text.contains("a@b.com"));
        assert!(text.contains("120.5"));
        assert!(text.contains("true"));
    }

    #[test]
    fn test_flatten_descends_nested_structures() {
        let rec = record(json!({
            "patient": {"patient_id": "p-17", "contacts": ["555-123-4567"]},
        }));

        let text = flatten_to_text(&rec);
        assert!(text.contains("patient_id"));
        assert!(text.contains("p-17"));
        assert!(text.contains("555-123-4567"));
    }

    #[test]
    fn test_numeric_sequence() {
        assert_eq!(
            as_numeric_sequence(&json!([1, 2.5, 3])),
            Some(vec![1.0, 2.5, 3.0])
        );
        assert_eq!(as_numeric_sequence(&json!([1, "two"])), None);
        assert_eq!(as_numeric_sequence(&json!("scalar")), None);
    }
}
