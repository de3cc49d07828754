//! Reqwest-based backend (native async).

use std::sync::OnceLock;

use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::Method;
use tracing::{debug, warn};

use super::{Attachment, BackendConfig, ClientRef, HttpBackend};
use crate::error::HttpException;
use crate::http::{self as wire, Auth, BackendRequest, Envelope};
use crate::status;

/// An [`HttpBackend`] backed by [`reqwest`].
#[derive(Debug, Default)]
pub struct ReqwestBackend {
    client: OnceLock<reqwest::Client>,
    attachment: Attachment,
}

impl ReqwestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BackendConfig) -> Self {
        Self {
            client: OnceLock::new(),
            attachment: Attachment::with_config(config),
        }
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn from_client(client: reqwest::Client) -> Self {
        let backend = Self::default();
        let _ = backend.client.set(client);
        backend
    }

    fn client(&self) -> &reqwest::Client {
        self.client.get_or_init(|| {
            let mut builder = reqwest::Client::builder();
            if let Some(agent) = self.attachment.config().user_agent() {
                builder = builder.user_agent(agent.to_string());
            }
            builder.build().unwrap_or_default()
        })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    fn name(&self) -> &'static str {
        "ReqwestBackend"
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
        let mut builder = self
            .client()
            .request(method.clone(), request.url.as_str())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.auth.normalized() {
            Auth::Basic { username, password } => builder.basic_auth(username, password),
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::Header(value) => builder.header(AUTHORIZATION, value),
            Auth::None | Auth::Credentials(_) => builder,
        };
        if method != Method::HEAD {
            if let Some(body) = request.body_bytes() {
                builder = builder.body(body);
            }
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status_code = response.status().as_u16();
        if status::is_server_error(status_code) {
            return Err(HttpException::new(status_code));
        }
        if method == Method::HEAD {
            return Ok(Envelope::empty(status_code));
        }
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        wire::normalize(status_code, &bytes)
    }
}

/// Map a reqwest error onto the timeout or transport exception.
fn map_reqwest_error(err: reqwest::Error) -> HttpException {
    if err.is_timeout() {
        wire::timeout_error(err.to_string())
    } else {
        warn!(backend = "ReqwestBackend", error = %err, "transport fault");
        wire::transport_error(err.to_string())
    }
}
