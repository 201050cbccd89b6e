//! Per-collection index transaction.
//!
//! A finding aid is replaced in the index as one unit:
//!
//! ```text
//! Idle → Deleting → Adding → Committing → Done
//!            └──────────┴──────────┴──→ Rollback → Done(failure)
//! ```
//!
//! The delete removes the collection document and every component (ids
//! sharing the EADID prefix). Adds are sent in payload order, collection
//! first. Nothing becomes visible until the single commit succeeds; any
//! failure issues one rollback so the index keeps its previous state.
//!
//! Only the delete is retried. Adds and the commit run once: the delete is
//! the only request that is safe to repeat without re-sending the batch.

use ead_indexer_core::document::AddPayload;
use ead_indexer_core::index::{BackendError, IndexBackend};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::SolrConfig;

/// Backoff for retryable delete failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SolrConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_ms),
            max_delay: Duration::from_millis(config.retry_max_ms),
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based): `base · 2^(attempt−1)`,
    /// capped at `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Where a transaction failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Delete,
    Add { id: String },
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Delete => f.write_str("delete"),
            Stage::Add { id } => write!(f, "add of {}", id),
            Stage::Commit => f.write_str("commit"),
        }
    }
}

/// Result of the rollback issued after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackOutcome {
    RolledBack,
    /// The index may now be inconsistent.
    Failed(BackendError),
}

impl fmt::Display for RollbackOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollbackOutcome::RolledBack => f.write_str("rolled back"),
            RollbackOutcome::Failed(e) => {
                write!(f, "ROLLBACK FAILED, index may be inconsistent: {}", e)
            }
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("transaction for {ead_id} failed at {stage}: {cause} ({rollback})")]
pub struct TransactionError {
    pub ead_id: String,
    pub stage: Stage,
    pub cause: BackendError,
    pub rollback: RollbackOutcome,
}

impl TransactionError {
    /// The rollback failed too, so the index state is unknown.
    pub fn is_fatal(&self) -> bool {
        matches!(self.rollback, RollbackOutcome::Failed(_))
    }
}

/// Counts of a successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReport {
    pub ead_id: String,
    /// Delete requests sent, retries included.
    pub delete_attempts: u32,
    pub adds: usize,
}

impl TransactionReport {
    /// Every request sent: deletes, adds, and the commit.
    pub fn requests(&self) -> usize {
        self.delete_attempts as usize + self.adds + 1
    }
}

/// Replace everything indexed under `ead_id` with `payloads`.
pub async fn run_transaction(
    backend: &dyn IndexBackend,
    ead_id: &str,
    payloads: &[AddPayload],
    policy: &RetryPolicy,
) -> Result<TransactionReport, TransactionError> {
    let delete_attempts = match delete_with_retry(backend, ead_id, policy).await {
        Ok(attempts) => attempts,
        Err(cause) => return Err(abort(backend, ead_id, Stage::Delete, cause).await),
    };

    for payload in payloads {
        if let Err(cause) = backend.add(payload).await {
            let stage = Stage::Add {
                id: payload.id.clone(),
            };
            return Err(abort(backend, ead_id, stage, cause).await);
        }
    }

    if let Err(cause) = backend.commit().await {
        return Err(abort(backend, ead_id, Stage::Commit, cause).await);
    }

    let report = TransactionReport {
        ead_id: ead_id.to_string(),
        delete_attempts,
        adds: payloads.len(),
    };
    info!(
        ead_id = %ead_id,
        adds = report.adds,
        requests = report.requests(),
        "transaction committed"
    );
    Ok(report)
}

/// Remove a collection and its components: a transaction with no adds.
pub async fn delete_collection(
    backend: &dyn IndexBackend,
    ead_id: &str,
    policy: &RetryPolicy,
) -> Result<TransactionReport, TransactionError> {
    run_transaction(backend, ead_id, &[], policy).await
}

/// Returns the number of delete requests sent.
async fn delete_with_retry(
    backend: &dyn IndexBackend,
    ead_id: &str,
    policy: &RetryPolicy,
) -> Result<u32, BackendError> {
    let mut last_err = None;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            warn!(
                ead_id = %ead_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "retrying delete"
            );
            tokio::time::sleep(delay).await;
        }

        match backend.delete_by_id_prefix(ead_id).await {
            Ok(()) => return Ok(attempt + 1),
            // Network failure or 5xx: try again
            Err(e) if e.is_retryable() => {
                last_err = Some(e);
                continue;
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_err
        .unwrap_or_else(|| BackendError::Retryable("delete failed after retries".to_string())))
}

async fn abort(
    backend: &dyn IndexBackend,
    ead_id: &str,
    stage: Stage,
    cause: BackendError,
) -> TransactionError {
    warn!(ead_id = %ead_id, stage = %stage, error = %cause, "rolling back");
    let rollback = match backend.rollback().await {
        Ok(()) => RollbackOutcome::RolledBack,
        Err(e) => {
            error!(ead_id = %ead_id, error = %e, "rollback failed");
            RollbackOutcome::Failed(e)
        }
    };
    TransactionError {
        ead_id: ead_id.to_string(),
        stage,
        cause,
        rollback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ead_indexer_core::index::memory::{RecordingBackend, Request};
    use ead_indexer_core::index::RequestKind;

    fn payload(id: &str) -> AddPayload {
        AddPayload {
            id: id.to_string(),
            body: format!("<add><doc><field name=\"id\">{}</field></doc></add>", id),
        }
    }

    fn fast_retries(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(3000),
        };
        assert_eq!(policy.delay(1), Duration::from_millis(500));
        assert_eq!(policy.delay(2), Duration::from_millis(1000));
        assert_eq!(policy.delay(3), Duration::from_millis(2000));
        assert_eq!(policy.delay(4), Duration::from_millis(3000));
        assert_eq!(policy.delay(64), Duration::from_millis(3000));
    }

    #[tokio::test]
    async fn test_request_order() {
        let backend = RecordingBackend::new();
        let payloads = [payload("a"), payload("ab"), payload("ac")];
        let report = run_transaction(&backend, "a", &payloads, &RetryPolicy::none())
            .await
            .unwrap();

        assert_eq!(report.adds, 3);
        assert_eq!(report.requests(), 5);
        assert_eq!(
            backend.requests(),
            vec![
                Request::Delete("a".into()),
                Request::Add("a".into()),
                Request::Add("ab".into()),
                Request::Add("ac".into()),
                Request::Commit,
            ]
        );
        assert_eq!(backend.committed_ids(), vec!["a", "ab", "ac"]);
    }

    #[tokio::test]
    async fn test_add_failure_stops_and_rolls_back() {
        let backend = RecordingBackend::new();
        backend.seed("a", "old");
        backend.fail(
            RequestKind::Add,
            2,
            BackendError::Permanent {
                status: Some(400),
                message: "bad field".into(),
            },
        );

        let err = run_transaction(
            &backend,
            "a",
            &[payload("a"), payload("ab"), payload("ac")],
            &RetryPolicy::none(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.stage, Stage::Add { id: "ab".into() });
        assert_eq!(err.rollback, RollbackOutcome::RolledBack);
        assert!(!err.is_fatal());
        assert_eq!(
            backend.requests(),
            vec![
                Request::Delete("a".into()),
                Request::Add("a".into()),
                Request::Add("ab".into()),
                Request::Rollback,
            ]
        );
        assert_eq!(backend.committed().get("a").map(String::as_str), Some("old"));
    }

    #[tokio::test]
    async fn test_failed_rollback_is_fatal() {
        let backend = RecordingBackend::new();
        backend.fail(RequestKind::Commit, 1, BackendError::Retryable("reset".into()));
        backend.fail(RequestKind::Rollback, 1, BackendError::Retryable("reset".into()));

        let err = run_transaction(&backend, "a", &[payload("a")], &RetryPolicy::none())
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Commit);
        assert!(err.is_fatal());
        assert!(err.to_string().contains("ROLLBACK FAILED"));
    }

    #[tokio::test]
    async fn test_retryable_delete_is_retried() {
        let backend = RecordingBackend::new();
        backend.fail(RequestKind::Delete, 1, BackendError::Retryable("503".into()));
        backend.fail(RequestKind::Delete, 2, BackendError::Retryable("503".into()));

        let report = run_transaction(&backend, "a", &[payload("a")], &fast_retries(3))
            .await
            .unwrap();
        assert_eq!(report.delete_attempts, 3);
        assert_eq!(backend.requests().len(), 5);
        assert_eq!(backend.committed_ids(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let backend = RecordingBackend::new();
        for n in 1..=3 {
            backend.fail(RequestKind::Delete, n, BackendError::Retryable("timeout".into()));
        }

        let err = run_transaction(&backend, "a", &[payload("a")], &fast_retries(2))
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Delete);
        assert_eq!(err.cause, BackendError::Retryable("timeout".into()));
        assert_eq!(
            backend.requests(),
            vec![
                Request::Delete("a".into()),
                Request::Delete("a".into()),
                Request::Delete("a".into()),
                Request::Rollback,
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_collection_of_absent_id_succeeds() {
        let backend = RecordingBackend::new();
        backend.seed("other", "x");
        let report = delete_collection(&backend, "missing", &RetryPolicy::none())
            .await
            .unwrap();
        assert_eq!(report.adds, 0);
        assert_eq!(
            backend.requests(),
            vec![Request::Delete("missing".into()), Request::Commit]
        );
        assert_eq!(backend.committed_ids(), vec!["other"]);
    }
}
