use ead_indexer::pipeline::{index_file, index_xml, prepare_file, IndexError};
use ead_indexer::report::ErrorKind;
use ead_indexer::transaction::{RetryPolicy, RollbackOutcome, Stage};
use ead_indexer_core::index::memory::{RecordingBackend, Request};
use ead_indexer_core::index::{BackendError, RequestKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/mo/mos_2021.xml")
}

fn expected_requests() -> Vec<Request> {
    vec![
        Request::Delete("mos_2021".into()),
        Request::Add("mos_2021".into()),
        Request::Add("mos_2021additional-daos".into()),
        Request::Add("mos_2021dao1".into()),
        Request::Add("mos_2021non-existent".into()),
        Request::Commit,
    ]
}

#[tokio::test]
async fn test_single_file_add_request_sequence() {
    let backend = RecordingBackend::new();
    let indexed = index_file(&backend, &fixture(), &RetryPolicy::none())
        .await
        .unwrap();

    assert_eq!(indexed.transaction.ead_id, "mos_2021");
    assert_eq!(indexed.transaction.adds, 4);
    // K components: 1 delete + (1 + K) adds + 1 commit
    assert_eq!(indexed.transaction.requests(), 3 + 3);
    assert!(indexed.warnings.is_empty());
    assert_eq!(backend.requests(), expected_requests());
    assert_eq!(
        backend.committed_ids(),
        vec![
            "mos_2021",
            "mos_2021additional-daos",
            "mos_2021dao1",
            "mos_2021non-existent"
        ]
    );
}

#[tokio::test]
async fn test_payloads_carry_repository_and_fields() {
    let prepared = prepare_file(&fixture()).unwrap();
    assert_eq!(prepared.repository_code, "mo");
    assert_eq!(prepared.component_count(), 3);

    let collection = &prepared.payloads[0].body;
    assert!(collection.starts_with(r#"<add><doc><field name="id">mos_2021</field>"#));
    assert!(collection.contains(r#"<field name="repository_ssi">mo</field>"#));
    assert!(collection.contains(r#"<field name="ead_ssi">mos_2021</field>"#));
    assert!(collection.contains("Digital preservation -- New York (State) -- New York."));
    assert!(collection.ends_with("</doc></add>"));

    let ids: Vec<&str> = prepared.payloads.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["mos_2021", "mos_2021additional-daos", "mos_2021dao1", "mos_2021non-existent"]
    );
    let component = &prepared.payloads[1].body;
    assert!(component.starts_with(r#"<add><doc><field name="id">mos_2021additional-daos</field>"#));
    assert!(component.contains(r#"<field name="repository_ssi">mo</field>"#));
}

#[tokio::test]
async fn test_reindexing_is_idempotent() {
    let first = prepare_file(&fixture()).unwrap();
    let second = prepare_file(&fixture()).unwrap();
    assert_eq!(first.payloads, second.payloads);

    let backend = RecordingBackend::new();
    index_file(&backend, &fixture(), &RetryPolicy::none())
        .await
        .unwrap();
    let after_first = backend.committed();

    index_file(&backend, &fixture(), &RetryPolicy::none())
        .await
        .unwrap();
    assert_eq!(backend.committed(), after_first);

    let fresh = RecordingBackend::new();
    index_file(&fresh, &fixture(), &RetryPolicy::none())
        .await
        .unwrap();
    assert_eq!(fresh.committed(), after_first);
}

#[tokio::test]
async fn test_stale_components_are_replaced() {
    let backend = RecordingBackend::new();
    backend.seed("mos_2021", "old collection");
    backend.seed("mos_2021removed-component", "old component");
    backend.seed("other_2020", "unrelated");

    index_file(&backend, &fixture(), &RetryPolicy::none())
        .await
        .unwrap();

    let ids = backend.committed_ids();
    assert!(!ids.contains(&"mos_2021removed-component".to_string()));
    assert!(ids.contains(&"other_2020".to_string()));
    assert_ne!(
        backend.committed().get("mos_2021").map(String::as_str),
        Some("old collection")
    );
}

#[tokio::test]
async fn test_permanent_delete_failure_leaves_index_unchanged() {
    let backend = RecordingBackend::new();
    backend.seed("mos_2021", "old collection");
    backend.fail(
        RequestKind::Delete,
        1,
        BackendError::Permanent {
            status: Some(403),
            message: "forbidden".into(),
        },
    );
    let before = backend.committed();

    let err = index_file(&backend, &fixture(), &RetryPolicy::none())
        .await
        .unwrap_err();

    let IndexError::Transaction(tx) = &err else {
        panic!("expected transaction error, got {:?}", err);
    };
    assert_eq!(tx.stage, Stage::Delete);
    assert_eq!(tx.rollback, RollbackOutcome::RolledBack);
    assert_eq!(err.kind(), ErrorKind::Transaction);

    let requests = backend.requests();
    assert!(!requests
        .iter()
        .any(|r| matches!(r, Request::Add(_) | Request::Commit)));
    assert_eq!(backend.committed(), before);
}

#[tokio::test]
async fn test_commit_failure_rolls_back() {
    let backend = RecordingBackend::new();
    backend.seed("mos_2021", "old collection");
    backend.fail(RequestKind::Commit, 1, BackendError::Retryable("HTTP 503".into()));

    let err = index_file(&backend, &fixture(), &RetryPolicy::none())
        .await
        .unwrap_err();
    let IndexError::Transaction(tx) = err else {
        panic!("expected transaction error");
    };
    assert_eq!(tx.stage, Stage::Commit);

    let requests = backend.requests();
    assert_eq!(requests.last(), Some(&Request::Rollback));
    assert_eq!(requests.iter().filter(|r| **r == Request::Commit).count(), 1);
    assert_eq!(backend.pending_len(), 0);
    assert_eq!(backend.committed_ids(), vec!["mos_2021"]);
}

#[tokio::test]
async fn test_retryable_delete_then_success() {
    let backend = RecordingBackend::new();
    backend.fail(RequestKind::Delete, 1, BackendError::Retryable("connection reset".into()));
    let policy = RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    };

    let indexed = index_file(&backend, &fixture(), &policy).await.unwrap();
    assert_eq!(indexed.transaction.delete_attempts, 2);

    let mut expected = expected_requests();
    expected.insert(0, Request::Delete("mos_2021".into()));
    assert_eq!(backend.requests(), expected);
}

#[tokio::test]
async fn test_malformed_file_sends_nothing() {
    let backend = RecordingBackend::new();
    let err = index_xml(&backend, "<ead><eadid>x</eadid>", "mo", &RetryPolicy::none())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Extraction);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_language_warning_does_not_fail_indexing() {
    let xml = std::fs::read_to_string(fixture())
        .unwrap()
        .replace(r#"langcode="eng""#, r#"langcode="xxx""#);
    let backend = RecordingBackend::new();
    let indexed = index_xml(&backend, &xml, "mo", &RetryPolicy::none())
        .await
        .unwrap();
    assert_eq!(indexed.warnings.len(), 1);
    assert_eq!(backend.requests().len(), 6);
}
