//! Request pipeline: validate every parameter group, run the service, classify the exit.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::boundary::{error_headers, handle, raise, Response, INTERNAL_SERVER_ERROR_BODY};
use crate::error::Failure;
use crate::types::{EventSpec, ParamGroup};
use crate::validator::{coerce_params, validate};

/// A decoded request as delivered by the event adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceRequest {
    pub body: Value,
    pub query: BTreeMap<String, String>,
    pub path: BTreeMap<String, String>,
}

impl ServiceRequest {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    /// Decode a raw JSON body.
    ///
    /// A body that does not decode becomes `null`, so every body attribute
    /// counts as absent.
    pub fn from_json_body(body: &str) -> Self {
        let body = serde_json::from_str(body).unwrap_or_else(|err| {
            if !body.is_empty() {
                tracing::debug!(error = %err, "request body is not valid JSON");
            }
            Value::Null
        });
        Self::new(body)
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path.insert(name.into(), value.into());
        self
    }
}

/// A request whose parameter groups all passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEvent {
    pub body: Value,
    pub query: Value,
    pub path: Value,
}

/// Validate the three parameter groups in order: body, query, path.
///
/// # Errors
///
/// Returns a `400` [`Failure::Http`] for the first group that fails.
pub fn parse_event(spec: &EventSpec, request: &ServiceRequest) -> Result<ServiceEvent, Failure> {
    let query = coerce_params(&spec.query, &request.query);
    let path = coerce_params(&spec.path, &request.path);

    for (group, document) in [
        (ParamGroup::RequestBody, &request.body),
        (ParamGroup::QueryParameters, &query),
        (ParamGroup::PathParameters, &path),
    ] {
        tracing::debug!(group = group.label(), "validating parameters");
        if let Err(violation) = validate(spec.group(group), document) {
            tracing::debug!(group = group.label(), path = violation.path(), "validation failed");
            return Err(raise(group, &violation).into());
        }
    }

    Ok(ServiceEvent {
        body: request.body.clone(),
        query,
        path,
    })
}

/// A service function guarded by an [`EventSpec`].
///
/// `Endpoint` is `Send + Sync` whenever the service is, so one instance can
/// serve concurrent requests.
pub struct Endpoint<F> {
    spec: EventSpec,
    service: F,
    headers: BTreeMap<String, String>,
}

impl<F> Endpoint<F>
where
    F: Fn(&ServiceEvent) -> Result<String, Failure>,
{
    pub fn new(spec: EventSpec, service: F) -> Self {
        Self {
            spec,
            service,
            headers: BTreeMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )]),
        }
    }

    /// Merge extra headers into every response. Later values win.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn spec(&self) -> &EventSpec {
        &self.spec
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Run one request through validation and the service.
    ///
    /// Every exit, including a panic in the service, goes through
    /// [`handle`] exactly once.
    pub fn call(&self, request: &ServiceRequest) -> Response {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(request)))
            .unwrap_or_else(|payload| Err(Failure::Panic(panic_message(&*payload))));

        match outcome {
            Ok(body) => {
                tracing::info!("request handled");
                Response::new(200, body, self.headers.clone())
            }
            Err(failure) => handle(Some(&failure), &self.headers).unwrap_or_else(|| {
                Response::new(500, INTERNAL_SERVER_ERROR_BODY, error_headers(&self.headers))
            }),
        }
    }

    fn run(&self, request: &ServiceRequest) -> Result<String, Failure> {
        let event = parse_event(&self.spec, request)?;
        tracing::debug!("executing service function");
        (self.service)(&event)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
