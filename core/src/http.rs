//! Transport-neutral request and response types shared by every backend.
//!
//! # Design
//! A backend receives a fully composed [`BackendRequest`] and hands back an
//! [`Envelope`]: the status code plus the JSON object body. The status is
//! always resolved before the body is touched, server errors short-circuit
//! without parsing, and the shared [`filter_response`] turns well-known
//! client errors into [`HttpException`]s. Anything that is not a JSON object
//! is normalized to an empty object rather than failing the call.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Headers, HttpException};
use crate::status;

/// JSON object carried as a response body.
pub type JsonObject = Map<String, Value>;

/// Normalized result of one backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status_code: u16,
    pub response: JsonObject,
}

impl Envelope {
    pub fn new(status_code: u16, response: JsonObject) -> Self {
        Self {
            status_code,
            response,
        }
    }

    pub fn empty(status_code: u16) -> Self {
        Self::new(status_code, JsonObject::new())
    }
}

/// Credentials handed to a backend.
///
/// `Credentials` is the `{username, password}` mapping every backend
/// understands; the other variants are passed to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Auth {
    #[default]
    None,
    Credentials(Headers),
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer(String),
    /// A raw `Authorization` header value.
    Header(String),
}

impl Auth {
    /// Collapse the mapping form into `Basic`; other variants are returned as is.
    pub fn normalized(&self) -> Auth {
        match self {
            Auth::Credentials(map) => Auth::Basic {
                username: map.get("username").cloned().unwrap_or_default(),
                password: Some(map.get("password").cloned().unwrap_or_default()),
            },
            other => other.clone(),
        }
    }

    /// `Authorization` header value for transports without a native helper.
    pub fn header_value(&self) -> Option<String> {
        match self.normalized() {
            Auth::None | Auth::Credentials(_) => None,
            Auth::Basic { username, password } => {
                let pair = format!("{username}:{}", password.unwrap_or_default());
                Some(format!("Basic {}", BASE64.encode(pair)))
            }
            Auth::Bearer(token) => Some(format!("Bearer {token}")),
            Auth::Header(value) => Some(value),
        }
    }
}

/// One request as seen by a backend.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub url: String,
    pub body: Option<Value>,
    pub headers: Headers,
    pub auth: Auth,
    pub timeout: Duration,
}

impl BackendRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            body: None,
            headers: Headers::new(),
            auth: Auth::None,
            timeout,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Serialized JSON body, if any.
    pub(crate) fn body_bytes(&self) -> Option<Vec<u8>> {
        // Serializing a `Value` cannot fail.
        self.body
            .as_ref()
            .map(|body| serde_json::to_vec(body).unwrap_or_default())
    }
}

/// Build an envelope from a raw status and body.
///
/// Server errors are raised before the body is read. An empty body skips the
/// response filter; otherwise the parsed object goes through it.
pub fn normalize(status_code: u16, body: &[u8]) -> Result<Envelope, HttpException> {
    if status::is_server_error(status_code) {
        return Err(HttpException::new(status_code));
    }
    if body.is_empty() {
        return Ok(Envelope::empty(status_code));
    }
    let response = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::debug!(status_code, "response body is not a JSON object");
            JsonObject::new()
        }
    };
    let envelope = Envelope::new(status_code, response);
    filter_response(&envelope)?;
    Ok(envelope)
}

/// Map well-known error statuses in `envelope` onto exceptions.
///
/// For 400, 401, 403, 404 and 409 the trace code is the body's positive
/// `code`. A body without one yields trace code `0`, which tells a
/// body-carried error apart from a status raised with no body at all
/// (those keep [`DEFAULT_TRACE_CODE`](crate::error::DEFAULT_TRACE_CODE)).
pub fn filter_response(envelope: &Envelope) -> Result<(), HttpException> {
    let status_code = envelope.status_code;
    match status_code {
        status::BAD_REQUEST
        | status::UNAUTHORIZED
        | status::FORBIDDEN
        | status::NOT_FOUND
        | status::CONFLICT => {
            let trace_code = envelope
                .response
                .get("code")
                .and_then(Value::as_u64)
                .and_then(|code| u32::try_from(code).ok())
                .unwrap_or(0);
            Err(HttpException::new(status_code).with_trace_code(trace_code))
        }
        status::METHOD_NOT_ALLOWED => Err(HttpException::new(status_code)),
        status::UNPROCESSABLE_ENTITY => Err(HttpException::new(status_code)
            .with_detail(Value::Object(envelope.response.clone()))),
        _ => Ok(()),
    }
}

/// Exception for a call that ran past its timeout.
pub fn timeout_error(detail: impl Into<String>) -> HttpException {
    HttpException::new(status::REQUEST_TIMEOUT).with_detail(detail.into())
}

/// Exception for any other transport-level fault.
pub fn transport_error(detail: impl Into<String>) -> HttpException {
    HttpException::new(status::SERVICE_UNAVAILABLE).with_detail(detail.into())
}
