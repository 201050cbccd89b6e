//! In-memory [`IndexBackend`] for tests.
//!
//! Keeps a committed document set and a list of pending changes, the way a
//! Solr core does between commits. Every request is recorded in order, and a
//! failure can be injected for the n-th request of a given kind.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::document::AddPayload;

use super::{BackendError, IndexBackend, RequestKind};

/// A request as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Delete(String),
    Add(String),
    Commit,
    Rollback,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Delete(_) => RequestKind::Delete,
            Request::Add(_) => RequestKind::Add,
            Request::Commit => RequestKind::Commit,
            Request::Rollback => RequestKind::Rollback,
        }
    }
}

enum Pending {
    Delete(String),
    Add(AddPayload),
}

#[derive(Default)]
struct State {
    requests: Vec<Request>,
    committed: BTreeMap<String, String>,
    pending: Vec<Pending>,
    failures: HashMap<(RequestKind, usize), BackendError>,
    counts: HashMap<RequestKind, usize>,
}

impl State {
    /// Record a request and return the injected failure for it, if any.
    fn record(&mut self, request: Request) -> Result<(), BackendError> {
        let kind = request.kind();
        self.requests.push(request);
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        match self.failures.remove(&(kind, *count)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Recording backend double.
#[derive(Default)]
pub struct RecordingBackend {
    state: Mutex<State>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a committed document directly, without recording a request.
    pub fn seed(&self, id: &str, body: &str) {
        self.state().committed.insert(id.to_string(), body.to_string());
    }

    /// Fail the `ordinal`-th request (1-based) of `kind` with `error`.
    pub fn fail(&self, kind: RequestKind, ordinal: usize, error: BackendError) {
        self.state().failures.insert((kind, ordinal), error);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<Request> {
        self.state().requests.clone()
    }

    /// Forget the recorded requests. Stored documents are kept.
    pub fn clear_requests(&self) {
        let mut state = self.state();
        state.requests.clear();
        state.counts.clear();
    }

    /// Committed documents by id.
    pub fn committed(&self) -> BTreeMap<String, String> {
        self.state().committed.clone()
    }

    pub fn committed_ids(&self) -> Vec<String> {
        self.state().committed.keys().cloned().collect()
    }

    /// Number of changes waiting for a commit.
    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }
}

#[async_trait]
impl IndexBackend for RecordingBackend {
    async fn delete_by_id_prefix(&self, ead_id: &str) -> Result<(), BackendError> {
        let mut state = self.state();
        state.record(Request::Delete(ead_id.to_string()))?;
        state.pending.push(Pending::Delete(ead_id.to_string()));
        Ok(())
    }

    async fn add(&self, payload: &AddPayload) -> Result<(), BackendError> {
        let mut state = self.state();
        state.record(Request::Add(payload.id.clone()))?;
        state.pending.push(Pending::Add(payload.clone()));
        Ok(())
    }

    async fn commit(&self) -> Result<(), BackendError> {
        let mut state = self.state();
        state.record(Request::Commit)?;
        let pending = std::mem::take(&mut state.pending);
        for change in pending {
            match change {
                Pending::Delete(prefix) => state.committed.retain(|id, _| !id.starts_with(&prefix)),
                Pending::Add(payload) => {
                    state.committed.insert(payload.id, payload.body);
                }
            }
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<(), BackendError> {
        let mut state = self.state();
        state.record(Request::Rollback)?;
        state.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: &str) -> AddPayload {
        AddPayload {
            id: id.to_string(),
            body: format!("<add>{}</add>", id),
        }
    }

    #[tokio::test]
    async fn test_changes_visible_only_after_commit() {
        let backend = RecordingBackend::new();
        backend.seed("mos_2021old", "stale");
        backend.seed("other", "keep");

        backend.delete_by_id_prefix("mos_2021").await.unwrap();
        backend.add(&payload("mos_2021")).await.unwrap();
        assert_eq!(backend.committed_ids(), vec!["mos_2021old", "other"]);
        assert_eq!(backend.pending_len(), 2);

        backend.commit().await.unwrap();
        assert_eq!(backend.committed_ids(), vec!["mos_2021", "other"]);
        assert_eq!(
            backend.requests(),
            vec![
                Request::Delete("mos_2021".into()),
                Request::Add("mos_2021".into()),
                Request::Commit
            ]
        );
    }

    #[tokio::test]
    async fn test_rollback_discards_pending() {
        let backend = RecordingBackend::new();
        backend.seed("a", "1");
        backend.delete_by_id_prefix("a").await.unwrap();
        backend.rollback().await.unwrap();
        backend.commit().await.unwrap();
        assert_eq!(backend.committed_ids(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_injected_failure_hits_the_nth_request() {
        let backend = RecordingBackend::new();
        backend.fail(RequestKind::Add, 2, BackendError::Retryable("reset".into()));
        assert!(backend.add(&payload("x1")).await.is_ok());
        assert_eq!(
            backend.add(&payload("x2")).await,
            Err(BackendError::Retryable("reset".into()))
        );
        assert!(backend.add(&payload("x3")).await.is_ok());
        assert_eq!(backend.pending_len(), 2);
        assert_eq!(backend.requests().len(), 3);
    }
}
