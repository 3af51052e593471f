//! Endpoint spec loading from files and strings.
//!
//! A spec file holds up to three schema groups, keyed `body`, `query` and
//! `path`. Inside a group, an object whose `type` member is a string is a leaf
//! constraint; any other object is a nested group.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::types::{
    json_type_name, AttributeConstraint, AttributeKind, EventSpec, Group, ParamGroup, SchemaNode,
};

/// Members allowed on a leaf constraint object.
pub const LEAF_KEYS: &[&str] = &["type", "required", "min", "max"];

/// Top-level keys of a spec file.
pub const SPEC_KEYS: &[&str] = &["body", "query", "path"];

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `SchemaError::FileNotFound` if the file doesn't exist,
/// or `SchemaError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, SchemaError> {
    if !path.exists() {
        return Err(SchemaError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| SchemaError::InvalidJson { source })
}

/// Load an endpoint spec from a file path.
pub fn load_spec(path: &Path) -> Result<EventSpec, SchemaError> {
    let value = load_json(path)?;
    let spec = parse_spec(&value)?;
    tracing::debug!(path = %path.display(), "loaded endpoint spec");
    Ok(spec)
}

/// Load an endpoint spec from a JSON string.
///
/// # Errors
///
/// Returns `SchemaError::InvalidJson` if the string isn't valid JSON, or a
/// schema error if the document isn't a valid spec.
pub fn load_spec_str(content: &str) -> Result<EventSpec, SchemaError> {
    let value: Value =
        serde_json::from_str(content).map_err(|source| SchemaError::InvalidJson { source })?;
    parse_spec(&value)
}

/// Build an endpoint spec from a parsed JSON document.
///
/// Missing groups are empty. Unknown top-level keys are ignored here and
/// reported by the linter.
pub fn parse_spec(value: &Value) -> Result<EventSpec, SchemaError> {
    let Value::Object(map) = value else {
        return Err(SchemaError::InvalidSchema {
            path: "/".to_string(),
            message: format!("expected object, got {}", json_type_name(value)),
        });
    };

    let mut spec = EventSpec::new();
    for param in [
        ParamGroup::RequestBody,
        ParamGroup::QueryParameters,
        ParamGroup::PathParameters,
    ] {
        let key = param.spec_key();
        let Some(group_value) = map.get(key) else {
            continue;
        };
        let group = parse_group(group_value, key)?;
        match param {
            ParamGroup::RequestBody => spec.body = group,
            ParamGroup::QueryParameters => spec.query = group,
            ParamGroup::PathParameters => spec.path = group,
        }
    }

    Ok(spec)
}

/// Parse a schema group. `path` is the dotted location used in errors.
pub fn parse_group(value: &Value, path: &str) -> Result<Group, SchemaError> {
    let Value::Object(map) = value else {
        return Err(SchemaError::InvalidSchema {
            path: path.to_string(),
            message: format!("expected object, got {}", json_type_name(value)),
        });
    };

    let mut group = Group::new();
    for (name, child) in map {
        let child_path = format!("{}.{}", path, name);
        group.insert(name.clone(), parse_node(child, &child_path)?);
    }
    Ok(group)
}

fn parse_node(value: &Value, path: &str) -> Result<SchemaNode, SchemaError> {
    match value {
        Value::Object(map) if is_leaf(map) => parse_leaf(map, path).map(SchemaNode::Leaf),
        Value::Object(_) => parse_group(value, path).map(SchemaNode::Group),
        other => Err(SchemaError::InvalidSchema {
            path: path.to_string(),
            message: format!(
                "expected constraint or group object, got {}",
                json_type_name(other)
            ),
        }),
    }
}

/// An object is a leaf when its `type` member is a string.
pub fn is_leaf(map: &Map<String, Value>) -> bool {
    matches!(map.get("type"), Some(Value::String(_)))
}

fn parse_leaf(map: &Map<String, Value>, path: &str) -> Result<AttributeConstraint, SchemaError> {
    if let Some(unknown) = map.keys().find(|k| !LEAF_KEYS.contains(&k.as_str())) {
        return Err(SchemaError::InvalidSchema {
            path: path.to_string(),
            message: format!("unknown constraint member \"{}\"", unknown),
        });
    }

    let kind_name = map.get("type").and_then(Value::as_str).unwrap_or_default();
    let kind: AttributeKind = kind_name
        .parse()
        .map_err(|_| SchemaError::InvalidSchemaDefinition {
            path: path.to_string(),
            kind: kind_name.to_string(),
        })?;

    let required = match map.get("required") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(SchemaError::InvalidSchema {
                path: format!("{}.required", path),
                message: format!("expected boolean, got {}", json_type_name(other)),
            })
        }
    };

    let min = parse_bound(map, "min", path)?.unwrap_or(i64::MIN);
    let max = parse_bound(map, "max", path)?.unwrap_or(i64::MAX);

    let constraint = AttributeConstraint::new(kind, required, min, max);
    if constraint.has_inverted_bounds() {
        tracing::warn!(path, min, max, "min is greater than max; no value can match");
    }
    Ok(constraint)
}

fn parse_bound(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<i64>, SchemaError> {
    match map.get(key) {
        None => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| SchemaError::InvalidSchema {
            path: format!("{}.{}", path, key),
            message: format!("expected integer, got {}", value),
        }),
    }
}
