//! Document validation against schema groups.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::error::Violation;
use crate::types::{json_type_name, AttributeConstraint, AttributeKind, Group, SchemaNode};

/// Result of matching one document against one schema group.
pub type ValidationOutcome = Result<(), Violation>;

/// Validate a document against a schema group.
///
/// Checks every declared attribute in name order and stops at the first
/// violation. A document that is not an object has every attribute absent.
///
/// # Errors
///
/// Returns the first [`Violation`] encountered.
pub fn validate(schema: &Group, input: &Value) -> ValidationOutcome {
    validate_at(schema, input, "")
}

/// Validate a document nested at `path` (dotted, empty for the root).
///
/// Reported paths are prefixed with `path`.
pub fn validate_at(schema: &Group, input: &Value, path: &str) -> ValidationOutcome {
    let fields = input.as_object();

    for (name, node) in schema {
        let attr_path = join_path(path, name);

        let Some(value) = fields.and_then(|map| map.get(name)) else {
            if node.is_required() {
                tracing::trace!(path = %attr_path, "required attribute absent");
                return Err(Violation::MissingAttribute { path: attr_path });
            }
            continue;
        };

        match node {
            SchemaNode::Group(children) => {
                if !value.is_object() {
                    return Err(Violation::InvalidType {
                        path: attr_path,
                        expected: "object",
                        actual: json_type_name(value),
                    });
                }
                validate_at(children, value, &attr_path)?;
            }
            SchemaNode::Leaf(constraint) => check_leaf(constraint, value, attr_path)?,
        }
    }

    Ok(())
}

/// Type and range check of a present leaf value.
fn check_leaf(constraint: &AttributeConstraint, value: &Value, path: String) -> ValidationOutcome {
    if !constraint.kind.matches(value) {
        return Err(Violation::InvalidType {
            path,
            expected: constraint.kind.as_str(),
            actual: json_type_name(value),
        });
    }

    let in_range = match value {
        Value::String(s) => {
            let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
            len >= constraint.min && len <= constraint.max
        }
        Value::Number(n) => number_in_range(n, constraint.min, constraint.max),
        _ => true,
    };

    if in_range {
        Ok(())
    } else {
        Err(Violation::InvalidRange {
            path,
            kind: constraint.kind,
            min: constraint.min,
            max: constraint.max,
        })
    }
}

/// Inclusive range check that compares integers and floats exactly.
///
/// `i64::MIN` and `i64::MAX` leave that side of the range open, so numbers
/// outside the `i64` range pass when no bound was declared.
fn number_in_range(n: &Number, min: i64, max: i64) -> bool {
    let (floor, ceil) = if let Some(i) = n.as_i64() {
        (i128::from(i), i128::from(i))
    } else if let Some(u) = n.as_u64() {
        (i128::from(u), i128::from(u))
    } else {
        match n.as_f64() {
            // Saturating casts; any float beyond i128 is beyond every bound.
            Some(f) => (f.floor() as i128, f.ceil() as i128),
            None => return false,
        }
    };

    // Bounds are integers: x >= min iff floor(x) >= min, x <= max iff ceil(x) <= max.
    let above_min = min == i64::MIN || floor >= i128::from(min);
    let below_max = max == i64::MAX || ceil <= i128::from(max);
    above_min && below_max
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Build the document for a flat string map such as query or path parameters.
///
/// Values declared as numbers or booleans are converted when they parse
/// cleanly; anything else stays a string so the type check reports it.
pub fn coerce_params(schema: &Group, params: &BTreeMap<String, String>) -> Value {
    let mut map = Map::with_capacity(params.len());

    for (name, raw) in params {
        let value = match schema.get(name) {
            Some(SchemaNode::Leaf(constraint)) => coerce_value(constraint.kind, raw),
            _ => Value::String(raw.clone()),
        };
        map.insert(name.clone(), value);
    }

    Value::Object(map)
}

fn coerce_value(kind: AttributeKind, raw: &str) -> Value {
    match kind {
        AttributeKind::Number => {
            if let Ok(i) = raw.parse::<i64>() {
                return Value::Number(i.into());
            }
            raw.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()))
        }
        AttributeKind::Boolean => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        AttributeKind::String => Value::String(raw.to_string()),
    }
}
