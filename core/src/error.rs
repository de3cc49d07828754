//! Error types for the resource client.
//!
//! # Design
//! `HttpException` is the one value every failed call surfaces: a status
//! code, an application trace code, a detail payload and optional headers.
//! Backends produce it for transport faults and filtered responses; the
//! client produces it for unexpected statuses. `ClientError` wraps it
//! together with the construction and (de)serialization failures so client
//! operations can use `?` throughout. Deserialization errors keep the
//! original `serde_json::Error` as their source.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::status;

/// Header map carried by requests and exceptions.
pub type Headers = BTreeMap<String, String>;

/// Trace code used when a caller does not supply one.
pub const DEFAULT_TRACE_CODE: u32 = 199;

/// Uniform error raised whenever a call does not complete as a success.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpException {
    status_code: u16,
    trace_code: u32,
    detail: Value,
    headers: Option<Headers>,
}

impl HttpException {
    /// Exception for `status_code` with the default trace code and the
    /// status reason phrase as detail.
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            trace_code: DEFAULT_TRACE_CODE,
            detail: Value::String(status::reason_phrase(status_code).to_string()),
            headers: None,
        }
    }

    pub fn with_trace_code(mut self, trace_code: u32) -> Self {
        self.trace_code = trace_code;
        self
    }

    /// Replace the detail. `Value::Null` keeps the reason phrase.
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        let detail = detail.into();
        if !detail.is_null() {
            self.detail = detail;
        }
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn trace_code(&self) -> u32 {
        self.trace_code
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    pub fn headers(&self) -> Option<&Headers> {
        self.headers.as_ref()
    }

    /// Write the diagnostic form using `name` as the class name.
    #[doc(hidden)]
    pub fn fmt_named(&self, f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
        write!(
            f,
            "{name}(status_code={},trace_code={},detail={})",
            self.status_code, self.trace_code, self.detail
        )
    }
}

impl Default for HttpException {
    fn default() -> Self {
        Self::new(status::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for HttpException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_named(f, "HttpException")
    }
}

impl std::error::Error for HttpException {}

/// Declare a distinct exception type with pre-bound defaults.
///
/// The generated type is its own error (so it can be matched or downcast on
/// its own), derefs to [`HttpException`], and converts into both
/// [`HttpException`] and [`ClientError`]. `from_error` adapts any lower
/// level failure, keeping its message as the detail.
///
/// ```
/// resource_client::http_exception! {
///     /// The remote store is read-only right now.
///     pub struct StoreLocked {
///         status: 423,
///         trace: 301,
///         detail: "store is locked",
///     }
/// }
///
/// let err = StoreLocked::new();
/// assert_eq!(err.status_code(), 423);
/// assert_eq!(err.trace_code(), 301);
/// ```
#[macro_export]
macro_rules! http_exception {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            status: $status:expr,
            $(trace: $trace:expr,)?
            $(detail: $detail:expr,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name($crate::HttpException);

        impl $name {
            pub fn new() -> Self {
                #[allow(unused_mut)]
                let mut exception = $crate::HttpException::new($status);
                $(exception = exception.with_trace_code($trace);)?
                $(exception = exception.with_detail($detail);)?
                Self(exception)
            }

            pub fn with_detail(detail: impl Into<$crate::__private::Value>) -> Self {
                Self(Self::new().0.with_detail(detail))
            }

            pub fn from_error<E: ::std::error::Error + ?Sized>(err: &E) -> Self {
                Self::with_detail(err.to_string())
            }

            pub fn into_inner(self) -> $crate::HttpException {
                self.0
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $crate::HttpException;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                self.0.fmt_named(f, stringify!($name))
            }
        }

        impl ::std::error::Error for $name {}

        impl ::std::convert::From<$name> for $crate::HttpException {
            fn from(err: $name) -> Self {
                err.0
            }
        }

        impl ::std::convert::From<$name> for $crate::ClientError {
            fn from(err: $name) -> Self {
                $crate::ClientError::Http(err.0)
            }
        }
    };
}

/// Fatal setup errors: raised synchronously while building a client or a
/// request URL, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("resource_endpoint can not be empty")]
    MissingEndpoint,

    #[error("http_backend can not be empty")]
    MissingBackend,

    #[error("Cannot resolve http_backend type {0}")]
    UnresolvedBackend(String),

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("{0} needs a router, either given directly or through the app context")]
    MissingRouter(&'static str),

    #[error("invalid resource descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("A api name can not be blank or nothing.")]
    BlankApiName,

    #[error("no value for url placeholder {{{0}}}")]
    MissingPlaceholder(String),

    #[error("unterminated placeholder in url template {0:?}")]
    UnterminatedPlaceholder(String),
}

/// Errors returned by `ResourceClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The call completed with a non-success status or a transport fault.
    #[error(transparent)]
    Http(#[from] HttpException),

    #[error(transparent)]
    Build(#[from] BuildError),

    /// The response body did not match the selected result model.
    #[error("response body does not match {model}: {source}")]
    Deserialize {
        model: &'static str,
        source: serde_json::Error,
    },

    #[error("request body could not be serialized: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ClientError {
    /// The exception behind this error, if it is one.
    pub fn as_http(&self) -> Option<&HttpException> {
        match self {
            ClientError::Http(exception) => Some(exception),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.as_http().map(HttpException::status_code)
    }

    pub fn trace_code(&self) -> Option<u32> {
        self.as_http().map(HttpException::trace_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::http_exception! {
        struct Gone {
            status: 410,
            trace: 120,
            detail: "resource was removed",
        }
    }

    crate::http_exception! {
        struct Teapot {
            status: 418,
        }
    }

    #[test]
    fn defaults_follow_the_status() {
        let err = HttpException::new(404);
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.trace_code(), DEFAULT_TRACE_CODE);
        assert_eq!(err.detail(), "Not Found");
        assert!(err.headers().is_none());
    }

    #[test]
    fn default_is_internal_server_error() {
        let err = HttpException::default();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.detail(), "Internal Server Error");
    }

    #[test]
    fn display_names_every_field() {
        let err = HttpException::new(200).with_trace_code(111);
        assert_eq!(
            err.to_string(),
            r#"HttpException(status_code=200,trace_code=111,detail="OK")"#
        );

        let err = HttpException::new(200)
            .with_trace_code(111)
            .with_detail("something detail");
        assert_eq!(err.detail(), "something detail");
    }

    #[test]
    fn null_detail_keeps_reason_phrase() {
        let err = HttpException::new(401).with_detail(Value::Null);
        assert_eq!(err.detail(), "Unauthorized");
    }

    #[test]
    fn unknown_status_has_empty_detail() {
        let err = HttpException::new(800);
        assert_eq!(err.detail(), "");
    }

    #[test]
    fn declared_exception_binds_defaults() {
        let err = Gone::new();
        assert_eq!(err.status_code(), 410);
        assert_eq!(err.trace_code(), 120);
        assert_eq!(err.detail(), "resource was removed");
        assert_eq!(
            err.to_string(),
            r#"Gone(status_code=410,trace_code=120,detail="resource was removed")"#
        );

        let plain = Teapot::default();
        assert_eq!(plain.trace_code(), DEFAULT_TRACE_CODE);
        assert_eq!(plain.detail(), "I'm a teapot");
    }

    #[test]
    fn declared_exception_adapts_lower_level_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Gone::from_error(&io);
        assert_eq!(err.detail(), "disk on fire");
        assert_eq!(err.status_code(), 410);

        let client: ClientError = err.into();
        assert_eq!(client.status_code(), Some(410));
        assert_eq!(client.trace_code(), Some(120));
    }

    #[test]
    fn build_error_messages() {
        assert_eq!(
            BuildError::UnresolvedBackend("SomeHttpClientBackend".into()).to_string(),
            "Cannot resolve http_backend type SomeHttpClientBackend"
        );
        assert_eq!(
            BuildError::MissingEndpoint.to_string(),
            "resource_endpoint can not be empty"
        );
        assert_eq!(
            BuildError::MissingPlaceholder("id".into()).to_string(),
            "no value for url placeholder {id}"
        );
    }
}
