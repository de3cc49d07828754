//! In-process backend that drives an [`axum::Router`] without a network.

use std::sync::OnceLock;

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::Method;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tracing::{debug, warn};

use super::{wire_headers, Attachment, BackendConfig, ClientRef, HttpBackend};
use crate::error::{BuildError, HttpException};
use crate::http::{self as wire, BackendRequest, Envelope};
use crate::status;

/// An [`HttpBackend`] that hands every request straight to a router.
///
/// The router is either given up front with [`RouterBackend::with_router`] or
/// looked up once from the owning client's [`AppContext`](crate::AppContext)
/// when the client is built.
#[derive(Debug, Default)]
pub struct RouterBackend {
    router: OnceLock<Router>,
    attachment: Attachment,
}

impl RouterBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_router(router: Router) -> Self {
        let backend = Self::default();
        let _ = backend.router.set(router);
        backend
    }

    fn discover(&self) -> Option<&Router> {
        if let Some(router) = self.router.get() {
            return Some(router);
        }
        let router = self.owner()?.app()?.router()?.clone();
        Some(self.router.get_or_init(|| router))
    }
}

#[async_trait]
impl HttpBackend for RouterBackend {
    fn name(&self) -> &'static str {
        "RouterBackend"
    }

    fn attach(&mut self, owner: ClientRef, config: Option<&BackendConfig>) {
        self.attachment.attach(owner, config);
    }

    fn owner(&self) -> Option<&ClientRef> {
        self.attachment.owner()
    }

    fn config(&self) -> &BackendConfig {
        self.attachment.config()
    }

    fn prepare(&self) -> Result<(), BuildError> {
        self.discover()
            .map(|_| ())
            .ok_or(BuildError::MissingRouter(self.name()))
    }

    async fn execute(
        &self,
        method: Method,
        request: BackendRequest,
    ) -> Result<Envelope, HttpException> {
        debug!(backend = self.name(), %method, url = %request.url, "dispatching");
        let router = self
            .discover()
            .cloned()
            .ok_or_else(|| wire::transport_error(BuildError::MissingRouter(self.name()).to_string()))?;

        let mut builder = http::Request::builder()
            .method(method.clone())
            .uri(request.url.as_str());
        for (name, value) in wire_headers(&request, self.config()) {
            builder = builder.header(name, value);
        }
        let body = match request.body_bytes() {
            Some(bytes) if method != Method::HEAD => Body::from(bytes),
            _ => Body::empty(),
        };
        let http_request = builder
            .body(body)
            .map_err(|err| wire::transport_error(err.to_string()))?;

        let handle = tokio::spawn(router.oneshot(http_request));
        let abort = handle.abort_handle();
        let response = match tokio::time::timeout(request.timeout, handle).await {
            Err(_) => {
                abort.abort();
                return Err(wire::timeout_error(format!(
                    "no response within {:?}",
                    request.timeout
                )));
            }
            Ok(Err(err)) => {
                warn!(backend = "RouterBackend", error = %err, "router task failed");
                return Err(wire::transport_error(err.to_string()));
            }
            Ok(Ok(Ok(response))) => response,
            Ok(Ok(Err(never))) => match never {},
        };

        let status_code = response.status().as_u16();
        if status::is_server_error(status_code) {
            return Err(HttpException::new(status_code));
        }
        if method == Method::HEAD {
            return Ok(Envelope::empty(status_code));
        }
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|err| wire::transport_error(err.to_string()))?
            .to_bytes();
        wire::normalize(status_code, &bytes)
    }
}
