//! Ureq-based backend (blocking).
//!
//! `ureq` is synchronous, so every call runs on tokio's blocking pool and the
//! async caller only awaits the join handle. Status codes are handled here,
//! not by ureq, so 4xx/5xx responses come back as data.

use std::fmt;
use std::io;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use tracing::{debug, warn};

use super::{wire_headers, Attachment, BackendConfig, ClientRef, HttpBackend};
use crate::error::HttpException;
use crate::http::{self as wire, BackendRequest, Envelope};
use crate::status;

/// An [`HttpBackend`] backed by a blocking [`ureq::Agent`].
#[derive(Default)]
pub struct UreqBackend {
    agent: OnceLock<ureq::Agent>,
    attachment: Attachment,
}

impl UreqBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BackendConfig) -> Self {
        Self {
            agent: OnceLock::new(),
            attachment: Attachment::with_config(config),
        }
    }

    fn agent(&self) -> ureq::Agent {
        self.agent
            .get_or_init(|| {
                ureq::Agent::config_builder()
                    .http_status_as_error(false)
                    .build()
                    .new_agent()
            })
            .clone()
    }
}

impl fmt::Debug for UreqBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqBackend")
            .field("agent_ready", &self.agent.get().is_some())
            .field("attachment", &self.attachment)
            .finish()
    }
}

#[async_trait]
impl HttpBackend for UreqBackend {
    fn name(&self) -> &'static str {
        "UreqBackend"
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

    async fn execute(
        &self,
        method: Method,
        request: BackendRequest,
    ) -> Result<Envelope, HttpException> {
        debug!(backend = self.name(), %method, url = %request.url, "dispatching");
        let agent = self.agent();
        let headers = wire_headers(&request, self.config());
        let handle =
            tokio::task::spawn_blocking(move || call_blocking(&agent, &method, &request, &headers));
        match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(backend = "UreqBackend", error = %err, "blocking call did not complete");
                Err(wire::transport_error(err.to_string()))
            }
        }
    }
}

fn call_blocking(
    agent: &ureq::Agent,
    method: &Method,
    request: &BackendRequest,
    headers: &[(String, String)],
) -> Result<Envelope, HttpException> {
    let url = request.url.as_str();
    let timeout = request.timeout;
    let body = request.body_bytes().unwrap_or_default();

    let result = match method.as_str() {
        "GET" => configure(agent.get(url), headers, timeout).call(),
        "HEAD" => configure(agent.head(url), headers, timeout).call(),
        "DELETE" => configure(agent.delete(url), headers, timeout).call(),
        "POST" => configure(agent.post(url), headers, timeout).send(&body[..]),
        "PUT" => configure(agent.put(url), headers, timeout).send(&body[..]),
        other => {
            return Err(HttpException::new(status::METHOD_NOT_ALLOWED)
                .with_detail(format!("{other} is not supported by UreqBackend")))
        }
    };

    let mut response = result.map_err(map_ureq_error)?;
    let status_code = response.status().as_u16();
    if status::is_server_error(status_code) {
        return Err(HttpException::new(status_code));
    }
    if method == Method::HEAD {
        return Ok(Envelope::empty(status_code));
    }
    let bytes = response.body_mut().read_to_vec().map_err(map_ureq_error)?;
    wire::normalize(status_code, &bytes)
}

fn configure<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
    timeout: Duration,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.config().timeout_global(Some(timeout)).build()
}

/// Map a ureq error onto the timeout or transport exception.
fn map_ureq_error(err: ureq::Error) -> HttpException {
    match err {
        ureq::Error::Timeout(_) => wire::timeout_error(err.to_string()),
        ureq::Error::Io(ref io) if io.kind() == io::ErrorKind::TimedOut => {
            wire::timeout_error(err.to_string())
        }
        other => {
            warn!(backend = "UreqBackend", error = %other, "transport fault");
            wire::transport_error(other.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_is_created_once() {
        let backend = UreqBackend::new();
        assert!(backend.agent.get().is_none());
        let _ = backend.agent();
        assert!(backend.agent.get().is_some());
        assert!(format!("{backend:?}").contains("agent_ready: true"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) on localhost is not listening in test environments.
        let request = BackendRequest::new("http://127.0.0.1:9/nothing", Duration::from_secs(2));
        let err = UreqBackend::new().get(request).await.unwrap_err();
        assert!(
            err.status_code() == status::SERVICE_UNAVAILABLE
                || err.status_code() == status::REQUEST_TIMEOUT,
            "{err}"
        );
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let request = BackendRequest::new(format!("http://{addr}/"), Duration::from_millis(300));
        let err = UreqBackend::new().get(request).await.unwrap_err();
        assert_eq!(err.status_code(), status::REQUEST_TIMEOUT, "{err}");
    }

    #[test]
    fn configured_backend_keeps_its_config() {
        let config = BackendConfig::new().with("user_agent", "resource-client/1.0");
        let backend = UreqBackend::with_config(config.clone());
        assert_eq!(backend.config(), &config);
        assert_eq!(backend.config().user_agent(), Some("resource-client/1.0"));
        assert!(backend.owner().is_none());
    }

    #[tokio::test]
    async fn send_is_not_supported() {
        let request = BackendRequest::new("http://127.0.0.1:9/", Duration::from_secs(1));
        let err = UreqBackend::new().send(request).await.unwrap_err();
        assert_eq!(err.status_code(), status::NOT_IMPLEMENTED);
    }
}
