//! Core types: attribute constraints, schema trees and parameter groups.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Kind of a leaf attribute.
///
/// `Number` accepts any integer or floating-point representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Number,
    Boolean,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Number => "number",
            AttributeKind::Boolean => "boolean",
        }
    }

    /// What the bounds of this kind measure, for error messages.
    pub fn measure(&self) -> &'static str {
        match self {
            AttributeKind::String => "length",
            AttributeKind::Number | AttributeKind::Boolean => "value",
        }
    }

    /// Whether `value` has this kind.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (AttributeKind::String, Value::String(_))
                | (AttributeKind::Number, Value::Number(_))
                | (AttributeKind::Boolean, Value::Bool(_))
        )
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(AttributeKind::String),
            "number" => Ok(AttributeKind::Number),
            "boolean" => Ok(AttributeKind::Boolean),
            other => Err(SchemaError::InvalidSchemaDefinition {
                path: String::new(),
                kind: other.to_string(),
            }),
        }
    }
}

/// Leaf rule: kind, requiredness and inclusive bounds.
///
/// Bounds constrain character length for strings and the value for numbers.
/// They are ignored for booleans. For numbers, `i64::MIN` and `i64::MAX` leave
/// that side of the range open; the loader uses them for omitted bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeConstraint {
    pub kind: AttributeKind,
    pub required: bool,
    pub min: i64,
    pub max: i64,
}

impl AttributeConstraint {
    pub fn new(kind: AttributeKind, required: bool, min: i64, max: i64) -> Self {
        Self {
            kind,
            required,
            min,
            max,
        }
    }

    /// Build a constraint from a kind name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidSchemaDefinition` if `kind` is not one of
    /// `string`, `number` or `boolean`.
    pub fn parse(kind: &str, required: bool, min: i64, max: i64) -> Result<Self, SchemaError> {
        Ok(Self::new(kind.parse()?, required, min, max))
    }

    /// Optional string whose character length lies in `[min, max]`.
    pub fn string(min: i64, max: i64) -> Self {
        Self::new(AttributeKind::String, false, min, max)
    }

    /// Optional number whose value lies in `[min, max]`.
    pub fn number(min: i64, max: i64) -> Self {
        Self::new(AttributeKind::Number, false, min, max)
    }

    /// Optional boolean.
    pub fn boolean() -> Self {
        Self::new(AttributeKind::Boolean, false, 0, 0)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// True when the bounds can never be satisfied.
    pub fn has_inverted_bounds(&self) -> bool {
        self.kind != AttributeKind::Boolean && self.min > self.max
    }
}

/// Named children of a schema group, iterated in name order.
pub type Group = BTreeMap<String, SchemaNode>;

/// A node of a schema tree.
///
/// Trees are built once and only read afterwards, so they can be shared
/// freely between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Leaf(AttributeConstraint),
    Group(Group),
}

impl SchemaNode {
    pub fn leaf(constraint: AttributeConstraint) -> Self {
        SchemaNode::Leaf(constraint)
    }

    /// Build a group node from `(name, child)` pairs.
    pub fn group<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, SchemaNode)>,
    {
        SchemaNode::Group(
            children
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }

    /// Groups are implicitly mandatory; leaves follow their `required` flag.
    pub fn is_required(&self) -> bool {
        match self {
            SchemaNode::Leaf(constraint) => constraint.required,
            SchemaNode::Group(_) => true,
        }
    }

    /// Type name expected for this node, for error messages.
    pub fn expected_type(&self) -> &'static str {
        match self {
            SchemaNode::Leaf(constraint) => constraint.kind.as_str(),
            SchemaNode::Group(_) => "object",
        }
    }
}

impl From<AttributeConstraint> for SchemaNode {
    fn from(constraint: AttributeConstraint) -> Self {
        SchemaNode::Leaf(constraint)
    }
}

/// Build a [`Group`] from `(name, node)` pairs.
pub fn group<K, N, I>(children: I) -> Group
where
    K: Into<String>,
    N: Into<SchemaNode>,
    I: IntoIterator<Item = (K, N)>,
{
    children
        .into_iter()
        .map(|(name, node)| (name.into(), node.into()))
        .collect()
}

/// The parameter group a document was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamGroup {
    #[serde(rename = "body")]
    RequestBody,
    #[serde(rename = "query")]
    QueryParameters,
    #[serde(rename = "path")]
    PathParameters,
}

impl ParamGroup {
    /// Human-readable label used in client-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            ParamGroup::RequestBody => "Request Body",
            ParamGroup::QueryParameters => "Query Parameter",
            ParamGroup::PathParameters => "Path Parameter",
        }
    }

    /// Key of this group in spec files.
    pub fn spec_key(&self) -> &'static str {
        match self {
            ParamGroup::RequestBody => "body",
            ParamGroup::QueryParameters => "query",
            ParamGroup::PathParameters => "path",
        }
    }
}

/// Schemas for the three parameter groups of one endpoint.
///
/// An empty group accepts any document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSpec {
    pub body: Group,
    pub query: Group,
    pub path: Group,
}

impl EventSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, body: Group) -> Self {
        self.body = body;
        self
    }

    pub fn query(mut self, query: Group) -> Self {
        self.query = query;
        self
    }

    pub fn path(mut self, path: Group) -> Self {
        self.path = path;
        self
    }

    pub fn group(&self, param: ParamGroup) -> &Group {
        match param {
            ParamGroup::RequestBody => &self.body,
            ParamGroup::QueryParameters => &self.query,
            ParamGroup::PathParameters => &self.path,
        }
    }
}
