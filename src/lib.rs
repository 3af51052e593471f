//! Request Schema
//!
//! Declarative validation of service requests before a handler runs.
//!
//! An endpoint declares a schema for each parameter group (request body, query
//! parameters, path parameters). Every incoming document is matched against
//! its schema; the first violation is turned into a `400` response, and any
//! other failure while handling the request into a generic `500`.
//!
//! # Example
//!
//! ```
//! use request_schema::{group, validate, AttributeConstraint, SchemaNode, Violation};
//! use serde_json::json;
//!
//! let schema = group([(
//!     "username",
//!     SchemaNode::group([
//!         ("firstName", SchemaNode::leaf(AttributeConstraint::string(4, 15).required())),
//!         ("lastName", SchemaNode::leaf(AttributeConstraint::string(4, 255).required())),
//!     ]),
//! )]);
//!
//! let result = validate(&schema, &json!({ "username": { "firstName": "juan" } }));
//! assert_eq!(
//!     result,
//!     Err(Violation::MissingAttribute { path: "username.lastName".into() })
//! );
//! ```
//!
//! # Matching Rules
//!
//! | Schema node | Absent | Present |
//! |-------------|--------|---------|
//! | group | always missing | must be an object, checked recursively |
//! | required leaf | missing | type check, then inclusive range check |
//! | optional leaf | skipped | type check, then inclusive range check |
//!
//! Strings are bounded by character length, numbers by value. Booleans are
//! only type checked.

mod boundary;
mod endpoint;
mod error;
mod linter;
mod loader;
mod types;
mod validator;

pub use boundary::{
    error_headers, handle, raise, Response, ERROR_CONTENT_TYPE, INTERNAL_SERVER_ERROR_BODY,
};
pub use endpoint::{parse_event, Endpoint, ServiceEvent, ServiceRequest};
pub use error::{Failure, HttpException, SchemaError, StatusCode, Violation};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{load_json, load_spec, load_spec_str, parse_group, parse_spec};
pub use types::{
    group, json_type_name, AttributeConstraint, AttributeKind, EventSpec, Group, ParamGroup,
    SchemaNode,
};
pub use validator::{coerce_params, validate, validate_at, ValidationOutcome};
