//! Async REST resource client with pluggable transport backends.
//!
//! # Overview
//! A [`ResourceClient`] is bound to one model type whose [`ApiResource`]
//! descriptor names a remote path. It composes URLs, headers and auth,
//! sends create/normal_post/retrieve/update/delete calls through an [`HttpBackend`],
//! and turns the response into a typed model or an [`HttpException`].
//!
//! # Design
//! - Backends are interchangeable: `ureq` on the blocking pool, native
//!   async `reqwest`, or an in-process `axum::Router` for tests. They are
//!   picked by instance or by name through [`backends::resolve`].
//! - Every backend returns the same [`Envelope`]; status handling is shared.
//! - Failures surface once to the caller; there is no retry.
//!
//! ```no_run
//! use resource_client::{api_client_builder, api_resource};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Resource {
//!     id: Option<String>,
//!     name: String,
//! }
//!
//! api_resource!(Resource, prefix = "/mock", name = "/resources/{id}");
//!
//! # async fn run() -> Result<(), resource_client::ClientError> {
//! let client = api_client_builder::<Resource>()
//!     .backend("aiohttp")
//!     .resource_endpoint("http://localhost:8000")
//!     .client_id("client_id")
//!     .client_secret("client_secret")
//!     .build()?;
//! let found = client.retrieve().opt_id([("id", "1")]).send().await?;
//! println!("{:?}", found.into_resource());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod backends;
pub mod client;
pub mod error;
pub mod http;
pub mod resource;
pub mod settings;
pub mod status;
pub mod types;

pub use app::AppContext;
pub use backends::{
    BackendConfig, BackendKind, BackendRef, ClientRef, HttpBackend, ReqwestBackend, RouterBackend,
    UreqBackend,
};
pub use client::{
    api_client_builder, ClientBuilder, ModelResult, Operation, Overrides, Params, ResourceClient,
    DEFAULT_TIMEOUT,
};
pub use error::{BuildError, ClientError, Headers, HttpException, DEFAULT_TRACE_CODE};
pub use crate::http::{Auth, BackendRequest, Envelope};
pub use resource::{ApiResource, Model, ResourceDescriptor};
pub use settings::ClientSettings;
pub use types::{MessageModel, PagedModel};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
