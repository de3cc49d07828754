//! Turn a backend identifier into a backend instance.
//!
//! Identifiers are matched case-insensitively against a static alias table.
//! A dotted or `::` path resolves by its last segment, so
//! `"backends::UreqBackend"` and `"ureq"` name the same thing.

use std::fmt;
use std::str::FromStr;

use super::{HttpBackend, ReqwestBackend, RouterBackend, UreqBackend};
use crate::error::BuildError;

/// The backends known to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Ureq,
    Reqwest,
    /// Reserved identifier; resolving it fails with `NotImplemented`.
    Httpx,
    Router,
}

const ALIASES: &[(&str, BackendKind)] = &[
    ("requests", BackendKind::Ureq),
    ("requestsclientbackend", BackendKind::Ureq),
    ("ureq", BackendKind::Ureq),
    ("ureqbackend", BackendKind::Ureq),
    ("aiohttp", BackendKind::Reqwest),
    ("aiohttpclientbackend", BackendKind::Reqwest),
    ("reqwest", BackendKind::Reqwest),
    ("reqwestbackend", BackendKind::Reqwest),
    ("httpx", BackendKind::Httpx),
    ("httpxclientbackend", BackendKind::Httpx),
    ("fastapi_test_client", BackendKind::Router),
    ("fastapitestclientbackend", BackendKind::Router),
    ("router", BackendKind::Router),
    ("routerbackend", BackendKind::Router),
];

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Ureq => "ureq",
            BackendKind::Reqwest => "reqwest",
            BackendKind::Httpx => "httpx",
            BackendKind::Router => "router",
        }
    }

    /// Construct a fresh, unattached backend of this kind.
    pub fn instantiate(self) -> Result<Box<dyn HttpBackend>, BuildError> {
        match self {
            BackendKind::Ureq => Ok(Box::new(UreqBackend::new())),
            BackendKind::Reqwest => Ok(Box::new(ReqwestBackend::new())),
            BackendKind::Router => Ok(Box::new(RouterBackend::new())),
            BackendKind::Httpx => Err(BuildError::NotImplemented("HttpxClientBackend".into())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BuildError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let last = name
            .rsplit(|c| c == '.' || c == ':')
            .next()
            .unwrap_or(name)
            .trim()
            .to_ascii_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == last)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| BuildError::UnresolvedBackend(name.to_string()))
    }
}

/// A backend given either as a ready instance or by name.
#[derive(Debug)]
pub enum BackendRef {
    Instance(Box<dyn HttpBackend>),
    Named(String),
}

impl BackendRef {
    pub fn instance(backend: impl HttpBackend + 'static) -> Self {
        BackendRef::Instance(Box::new(backend))
    }
}

impl From<&str> for BackendRef {
    fn from(name: &str) -> Self {
        BackendRef::Named(name.to_string())
    }
}

impl From<String> for BackendRef {
    fn from(name: String) -> Self {
        BackendRef::Named(name)
    }
}

impl From<BackendKind> for BackendRef {
    fn from(kind: BackendKind) -> Self {
        BackendRef::Named(kind.as_str().to_string())
    }
}

impl From<Box<dyn HttpBackend>> for BackendRef {
    fn from(backend: Box<dyn HttpBackend>) -> Self {
        BackendRef::Instance(backend)
    }
}

/// Resolve `reference` to a backend. Instances are used as given.
pub fn resolve(reference: BackendRef) -> Result<Box<dyn HttpBackend>, BuildError> {
    match reference {
        BackendRef::Instance(backend) => Ok(backend),
        BackendRef::Named(name) if name.trim().is_empty() => Err(BuildError::MissingBackend),
        BackendRef::Named(name) => name.parse::<BackendKind>()?.instantiate(),
    }
}
