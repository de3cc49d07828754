//! Result models shared by every resource.
//!
//! # Design
//! `MessageModel` is the fallback shape for calls that do not name a model:
//! the `{code, message, detail}` envelope the collaborator answers with.
//! `PagedModel` is the paging header callers can pass as a paging model.
//! Positive-integer fields use `NonZeroU32` so serde rejects zero.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generic `{code, message, detail}` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageModel {
    pub code: NonZeroU32,
    pub message: String,
    pub detail: Value,
}

/// Paging metadata returned by collection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedModel {
    pub status: String,
    pub page: NonZeroU32,
    pub has_next: bool,
    pub total_pages: NonZeroU32,
    pub count: NonZeroU32,
}
