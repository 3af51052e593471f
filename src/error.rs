//! Error types for schema construction, request validation and the request boundary.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::AttributeKind;

/// Errors while building or loading a schema.
///
/// These are configuration errors: they surface at startup, never per request.
#[derive(Debug, Error)]
pub enum SchemaError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // Schema errors (exit code 2)
    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },

    #[error("invalid attribute type \"{kind}\" at {path}: attribute type can only be one of string, number, boolean")]
    InvalidSchemaDefinition { path: String, kind: String },

    #[error("invalid status code {code}: expected one of 400, 409, 500")]
    InvalidStatusCode { code: u16 },
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchemaError::FileNotFound { .. } | SchemaError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// The first violation found while matching a document against a schema.
///
/// `path` is the dotted chain of attribute names from the schema root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("missing attribute '{path}'")]
    MissingAttribute { path: String },

    #[error("invalid type of attribute '{path}'. expected {expected}, got {actual}")]
    InvalidType {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(
        "invalid {measure} of attribute '{path}'. min {measure}: {min}, max {measure}: {max}",
        measure = .kind.measure()
    )]
    InvalidRange {
        path: String,
        kind: AttributeKind,
        min: i64,
        max: i64,
    },
}

impl Violation {
    /// Fixed, client-facing label for this kind of violation.
    pub fn label(&self) -> &'static str {
        match self {
            Violation::MissingAttribute { .. } => "MISSING ATTRIBUTE ERROR",
            Violation::InvalidType { .. } => "INVALID ATTRIBUTE TYPE",
            Violation::InvalidRange { .. } => "INVALID ATTRIBUTE LENGTH",
        }
    }

    /// Dotted path of the offending attribute.
    pub fn path(&self) -> &str {
        match self {
            Violation::MissingAttribute { path }
            | Violation::InvalidType { path, .. }
            | Violation::InvalidRange { path, .. } => path,
        }
    }
}

/// Status codes a service may raise across the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    BadRequest,
    Conflict,
    InternalServerError,
}

impl StatusCode {
    pub fn as_u16(self) -> u16 {
        match self {
            StatusCode::BadRequest => 400,
            StatusCode::Conflict => 409,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Conflict => "Conflict",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = SchemaError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            400 => Ok(StatusCode::BadRequest),
            409 => Ok(StatusCode::Conflict),
            500 => Ok(StatusCode::InternalServerError),
            _ => Err(SchemaError::InvalidStatusCode { code }),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}

/// A classified, client-safe failure: status code plus the message sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HttpException {
    pub status: StatusCode,
    pub message: String,
}

impl HttpException {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build an exception from a raw status code.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidStatusCode` for codes outside 400, 409 and 500.
    pub fn from_code(code: u16, message: impl Into<String>) -> Result<Self, SchemaError> {
        Ok(Self::new(StatusCode::try_from(code)?, message))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::Conflict, message)
    }
}

/// Anything that ends a request early.
///
/// Recovered exactly once, by [`crate::handle`].
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Http(#[from] HttpException),

    #[error("internal failure: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("panic: {0}")]
    Panic(String),
}

impl Failure {
    /// Wrap an unexpected error; its detail is logged but never returned to the client.
    pub fn internal(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Failure::Internal(err.into())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Internal(Box::new(err))
    }
}
