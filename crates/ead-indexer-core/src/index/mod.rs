//! Search backend abstraction.
//!
//! The [`IndexBackend`] trait is the narrow capability set the transaction
//! driver needs. The HTTP implementation lives in the binary crate; the
//! [`memory::RecordingBackend`] double records every request and can inject
//! failures.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::AddPayload;

/// Failure of one backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Network failures and 5xx responses. Worth retrying.
    #[error("retryable backend failure: {0}")]
    Retryable(String),
    /// Rejected request (4xx and other non-success statuses).
    #[error("backend rejected request{}: {message}", status_suffix(.status))]
    Permanent { status: Option<u16>, message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl BackendError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Retryable(_))
    }
}

/// Kinds of backend requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Delete,
    Add,
    Commit,
    Rollback,
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RequestKind::Delete => "delete",
            RequestKind::Add => "add",
            RequestKind::Commit => "commit",
            RequestKind::Rollback => "rollback",
        })
    }
}

/// Search backend operations.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`delete_by_id_prefix`](IndexBackend::delete_by_id_prefix) | Remove the collection and all its components |
/// | [`add`](IndexBackend::add) | Add one document |
/// | [`commit`](IndexBackend::commit) | Make pending changes visible |
/// | [`rollback`](IndexBackend::rollback) | Discard pending changes |
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Remove every document whose id equals `ead_id` or starts with it.
    ///
    /// Deleting an id with no documents succeeds.
    async fn delete_by_id_prefix(&self, ead_id: &str) -> Result<(), BackendError>;

    async fn add(&self, payload: &AddPayload) -> Result<(), BackendError>;

    async fn commit(&self) -> Result<(), BackendError>;

    async fn rollback(&self) -> Result<(), BackendError>;
}
