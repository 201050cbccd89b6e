//! Solr HTTP backend.
//!
//! Every request is a `POST` of an XML update message to
//! `{origin}{core_path}/update?wt=json&indent=true`.
//!
//! | Outcome                      | Classification                |
//! |------------------------------|-------------------------------|
//! | HTTP 2xx                     | success                       |
//! | HTTP 5xx, timeout, reset     | [`BackendError::Retryable`]   |
//! | any other status             | [`BackendError::Permanent`]   |
//!
//! Retrying is the transaction driver's job; the client sends each request
//! exactly once.

use anyhow::{Context, Result};
use async_trait::async_trait;
use ead_indexer_core::document::{delete_message, AddPayload, COMMIT_MESSAGE, ROLLBACK_MESSAGE};
use ead_indexer_core::index::{BackendError, IndexBackend, RequestKind};
use std::time::Duration;

use crate::config::SolrConfig;

pub struct SolrClient {
    client: reqwest::Client,
    update_url: String,
}

impl SolrClient {
    pub fn new(origin: &str, config: &SolrConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .with_context(|| "Failed to build HTTP client")?;

        Ok(Self {
            client,
            update_url: update_url(origin, &config.core_path),
        })
    }

    pub fn update_url(&self) -> &str {
        &self.update_url
    }

    async fn post(&self, kind: RequestKind, body: String) -> Result<(), BackendError> {
        tracing::debug!(request = %kind, bytes = body.len(), "POST {}", self.update_url);

        let resp = self
            .client
            .post(&self.update_url)
            .header("Content-Type", "text/xml")
            .body(body)
            .send()
            .await;

        let response = match resp {
            Ok(response) => response,
            Err(e) => {
                return Err(BackendError::Retryable(format!("{} request failed: {}", kind, e)));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body_text = response.text().await.unwrap_or_default();
        let message = format!("{} request: {}", kind, error_message(&body_text));

        if status.is_server_error() {
            return Err(BackendError::Retryable(format!("HTTP {} {}", status.as_u16(), message)));
        }

        Err(BackendError::Permanent {
            status: Some(status.as_u16()),
            message,
        })
    }
}

/// Join origin and core path into the update endpoint.
pub fn update_url(origin: &str, core_path: &str) -> String {
    format!(
        "{}{}/update?wt=json&indent=true",
        origin.trim_end_matches('/'),
        core_path.trim_end_matches('/')
    )
}

/// Pull `error.msg` out of a Solr JSON error response, or fall back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("msg"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl IndexBackend for SolrClient {
    async fn delete_by_id_prefix(&self, ead_id: &str) -> Result<(), BackendError> {
        self.post(RequestKind::Delete, delete_message(ead_id)).await
    }

    async fn add(&self, payload: &AddPayload) -> Result<(), BackendError> {
        self.post(RequestKind::Add, payload.body.clone()).await
    }

    async fn commit(&self) -> Result<(), BackendError> {
        self.post(RequestKind::Commit, COMMIT_MESSAGE.to_string()).await
    }

    async fn rollback(&self) -> Result<(), BackendError> {
        self.post(RequestKind::Rollback, ROLLBACK_MESSAGE.to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_url() {
        assert_eq!(
            update_url("http://localhost:8983", "/solr/findingaids"),
            "http://localhost:8983/solr/findingaids/update?wt=json&indent=true"
        );
        assert_eq!(
            update_url("http://solr:8983/", "/solr/fa/"),
            "http://solr:8983/solr/fa/update?wt=json&indent=true"
        );
    }

    #[test]
    fn test_error_message_prefers_solr_msg() {
        let body = r#"{"responseHeader":{"status":400},"error":{"msg":"undefined field foo","code":400}}"#;
        assert_eq!(error_message(body), "undefined field foo");
        assert_eq!(error_message("  Bad Request\n"), "Bad Request");
    }
}
