//! Pluggable transport backends.
//!
//! # Design
//! Every backend implements [`HttpBackend::execute`] for one HTTP method and
//! inherits the per-verb operations from it. Backends are owned by exactly
//! one client and keep a non-owning [`ClientRef`] back to it, plus the
//! configuration the client pushed in when it was assembled. The transport
//! handle (agent, client or router) is created lazily on first use and then
//! reused by every call, so concurrent reads share it without locking.

mod reqwest_backend;
mod resolver;
mod router_backend;
mod ureq_backend;

use std::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

use crate::app::AppContext;
use crate::client::ClientInner;
use crate::error::{BuildError, HttpException};
use crate::http::{BackendRequest, Envelope, JsonObject};
use crate::status;

pub use reqwest_backend::ReqwestBackend;
pub use resolver::{resolve, BackendKind, BackendRef};
pub use router_backend::RouterBackend;
pub use ureq_backend::UreqBackend;

/// Transport contract shared by all backends.
#[async_trait]
pub trait HttpBackend: Send + Sync + fmt::Debug {
    /// Type name used in logs and by the resolver.
    fn name(&self) -> &'static str;

    /// Record the owning client and, when given, replace the configuration.
    fn attach(&mut self, owner: ClientRef, config: Option<&BackendConfig>);

    fn owner(&self) -> Option<&ClientRef>;

    fn config(&self) -> &BackendConfig;

    /// Called once the owning client is fully assembled. Backends that
    /// discover resources through their owner do it here.
    fn prepare(&self) -> Result<(), BuildError> {
        Ok(())
    }

    /// Perform one request. Implementations resolve the status before the
    /// body, raise server errors without parsing, and never read a body for
    /// `HEAD`.
    async fn execute(
        &self,
        method: Method,
        request: BackendRequest,
    ) -> Result<Envelope, HttpException>;

    async fn get(&self, request: BackendRequest) -> Result<Envelope, HttpException> {
        self.execute(Method::GET, request).await
    }

    async fn put(&self, request: BackendRequest) -> Result<Envelope, HttpException> {
        self.execute(Method::PUT, request).await
    }

    async fn post(&self, request: BackendRequest) -> Result<Envelope, HttpException> {
        self.execute(Method::POST, request).await
    }

    async fn delete(&self, request: BackendRequest) -> Result<Envelope, HttpException> {
        self.execute(Method::DELETE, request).await
    }

    async fn head(&self, mut request: BackendRequest) -> Result<Envelope, HttpException> {
        request.body = None;
        self.execute(Method::HEAD, request).await
    }

    /// Fire-and-forget beacon. No backend supports it yet.
    async fn send(&self, _request: BackendRequest) -> Result<Envelope, HttpException> {
        Err(HttpException::new(status::NOT_IMPLEMENTED)
            .with_detail(format!("send is not supported by {}", self.name())))
    }
}

/// Free-form configuration pushed from a client into its backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendConfig(JsonObject);

impl BackendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// `User-Agent` sent by network backends.
    pub fn user_agent(&self) -> Option<&str> {
        self.get("user_agent").and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<JsonObject> for BackendConfig {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for BackendConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Non-owning reference from a backend (or app) to its client.
#[derive(Debug, Clone)]
pub struct ClientRef {
    inner: Weak<ClientInner>,
}

impl ClientRef {
    pub(crate) fn new(inner: Weak<ClientInner>) -> Self {
        Self { inner }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// App context of the owning client, if it has one and is still alive.
    pub fn app(&self) -> Option<Arc<AppContext>> {
        self.inner.upgrade()?.app().cloned()
    }

    pub fn resource_endpoint(&self) -> Option<String> {
        self.inner
            .upgrade()
            .map(|inner| inner.identity().resource_endpoint().to_string())
    }

    pub fn backend_name(&self) -> Option<&'static str> {
        self.inner.upgrade().map(|inner| inner.backend().name())
    }

    /// Whether this reference points at `inner`.
    pub(crate) fn points_to(&self, inner: &Arc<ClientInner>) -> bool {
        std::ptr::eq(self.inner.as_ptr(), Arc::as_ptr(inner))
    }
}

/// Owner and configuration slot embedded in every backend.
#[derive(Debug, Clone, Default)]
pub(crate) struct Attachment {
    owner: Option<ClientRef>,
    config: BackendConfig,
}

impl Attachment {
    pub(crate) fn with_config(config: BackendConfig) -> Self {
        Self {
            owner: None,
            config,
        }
    }

    pub(crate) fn attach(&mut self, owner: ClientRef, config: Option<&BackendConfig>) {
        self.owner = Some(owner);
        if let Some(config) = config {
            self.config = config.clone();
        }
    }

    pub(crate) fn owner(&self) -> Option<&ClientRef> {
        self.owner.as_ref()
    }

    pub(crate) fn config(&self) -> &BackendConfig {
        &self.config
    }
}

/// Header pairs for transports without native auth helpers: the request
/// headers, the configured user agent, and the `Authorization` header.
pub(crate) fn wire_headers(request: &BackendRequest, config: &BackendConfig) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    if let Some(agent) = config.user_agent() {
        headers.push((http::header::USER_AGENT.to_string(), agent.to_string()));
    }
    if let Some(value) = request.auth.header_value() {
        headers.push((http::header::AUTHORIZATION.to_string(), value));
    }
    headers
}
