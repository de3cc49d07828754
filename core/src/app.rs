//! Application context a client can be bound to.

use std::sync::{Arc, OnceLock};

use axum::Router;

use crate::backends::ClientRef;
use crate::client::ClientInner;

/// External application state shared with clients.
///
/// Holds the router used by in-process backends and remembers the first
/// client bound to it. That slot is set once; later clients leave it alone.
#[derive(Debug, Default)]
pub struct AppContext {
    router: Option<Router>,
    client: OnceLock<ClientRef>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_router(router: Router) -> Self {
        Self {
            router: Some(router),
            client: OnceLock::new(),
        }
    }

    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    /// The first client attached to this context, if any.
    pub fn attached_client(&self) -> Option<&ClientRef> {
        self.client.get()
    }

    /// Returns `true` if this call filled the slot.
    pub(crate) fn attach_client(&self, inner: &Arc<ClientInner>) -> bool {
        self.client.set(ClientRef::new(Arc::downgrade(inner))).is_ok()
    }
}

impl From<Router> for AppContext {
    fn from(router: Router) -> Self {
        Self::with_router(router)
    }
}
