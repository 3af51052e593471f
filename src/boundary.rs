//! The request boundary: classify failures into transport-facing responses.
//!
//! Validation violations become `400` exceptions via [`raise`]. Every other
//! failure becomes a generic `500` in [`handle`], with the detail kept in the
//! logs only.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{Failure, HttpException, StatusCode, Violation};
use crate::types::ParamGroup;

/// Body sent for every unexpected failure.
pub const INTERNAL_SERVER_ERROR_BODY: &str = "Internal Server Error";

/// Error bodies are plain messages, whatever the success content type is.
pub const ERROR_CONTENT_TYPE: &str = "text/plain";

/// The endpoint headers with `Content-Type` replaced for an error body.
pub fn error_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut headers = headers.clone();
    headers.insert("Content-Type".to_string(), ERROR_CONTENT_TYPE.to_string());
    headers
}

/// Transport-neutral response handed back to the event adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status_code: u16,
    pub body: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl Response {
    pub fn new(status_code: u16, body: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            headers,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Turn a violation found in `group` into a `400 Bad Request` exception.
pub fn raise(group: ParamGroup, violation: &Violation) -> HttpException {
    HttpException::bad_request(format!(
        "Error in {}, {}. {}",
        group.label(),
        violation.label(),
        violation
    ))
}

/// Build the response for a failure, if there was one.
///
/// Meant to run unconditionally at the single exit of a request; `None` in
/// means `None` out. Error responses always carry `Content-Type: text/plain`.
pub fn handle(failure: Option<&Failure>, headers: &BTreeMap<String, String>) -> Option<Response> {
    let failure = failure?;
    let headers = error_headers(headers);

    let response = match failure {
        Failure::Http(exc) => {
            if exc.status == StatusCode::InternalServerError {
                tracing::error!(detail = %exc.message, "request failed");
            } else {
                tracing::warn!(status = exc.status.as_u16(), detail = %exc.message, "request rejected");
            }
            Response::new(exc.status.as_u16(), exc.message.clone(), headers)
        }
        Failure::Internal(_) | Failure::Panic(_) => {
            tracing::error!(error = %failure, "internal server error");
            Response::new(
                StatusCode::InternalServerError.as_u16(),
                INTERNAL_SERVER_ERROR_BODY,
                headers,
            )
        }
    };

    Some(response)
}
