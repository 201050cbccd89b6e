//! Single-file pipeline.
//!
//! ```text
//! <repo>/<partner>/<eadid>.xml
//!   → parse → collection + components → add payloads → transaction
//! ```
//!
//! Extraction happens entirely before the first request, so a malformed file
//! never touches the index.

use ead_indexer_core::collection::extract_collection;
use ead_indexer_core::component::extract_components;
use ead_indexer_core::document::{payloads, AddPayload};
use ead_indexer_core::error::{ExtractError, LanguageError, XmlError};
use ead_indexer_core::index::IndexBackend;
use ead_indexer_core::xml::dom::Document;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::report::ErrorKind;
use crate::transaction::{run_transaction, RetryPolicy, TransactionError, TransactionReport};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not inside a partner directory", .0.display())]
    NoRepositoryCode(PathBuf),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl IndexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexError::Read { .. } => ErrorKind::Read,
            IndexError::NoRepositoryCode(_) | IndexError::Extract(_) => ErrorKind::Extraction,
            IndexError::Transaction(_) => ErrorKind::Transaction,
        }
    }
}

impl From<XmlError> for IndexError {
    fn from(e: XmlError) -> Self {
        IndexError::Extract(ExtractError::Xml(e))
    }
}

/// Everything needed to index one finding aid.
#[derive(Debug, Clone)]
pub struct PreparedFile {
    pub ead_id: String,
    pub repository_code: String,
    pub payloads: Vec<AddPayload>,
    /// Non-fatal derivation errors of the collection document.
    pub warnings: Vec<LanguageError>,
}

impl PreparedFile {
    pub fn component_count(&self) -> usize {
        self.payloads.len().saturating_sub(1)
    }
}

/// A successfully indexed file.
#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub transaction: TransactionReport,
    pub warnings: Vec<LanguageError>,
}

/// The partner directory an EAD file lives in.
pub fn repository_code(path: &Path) -> Result<String, IndexError> {
    path.parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| IndexError::NoRepositoryCode(path.to_path_buf()))
}

/// Extract payloads from EAD text.
pub fn prepare(xml: &str, repository_code: &str) -> Result<PreparedFile, IndexError> {
    let doc = Document::parse(xml)?;
    let collection = extract_collection(repository_code, &doc)?;
    let components = extract_components(repository_code, &collection.ead_id, &doc)?;

    for warning in &collection.errors {
        warn!(ead_id = %collection.ead_id, "{}", warning);
    }
    debug!(
        ead_id = %collection.ead_id,
        components = components.len(),
        "prepared finding aid"
    );

    Ok(PreparedFile {
        payloads: payloads(&collection, &components),
        ead_id: collection.ead_id,
        repository_code: collection.repository_code,
        warnings: collection.errors,
    })
}

/// Read and extract one EAD file without sending anything.
pub fn prepare_file(path: &Path) -> Result<PreparedFile, IndexError> {
    let repository_code = repository_code(path)?;
    let xml = std::fs::read_to_string(path).map_err(|source| IndexError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    prepare(&xml, &repository_code)
}

/// Replace the index content of one finding aid given as text.
pub async fn index_xml(
    backend: &dyn IndexBackend,
    xml: &str,
    repository_code: &str,
    policy: &RetryPolicy,
) -> Result<IndexedFile, IndexError> {
    let prepared = prepare(xml, repository_code)?;
    submit(backend, prepared, policy).await
}

/// Replace the index content of one EAD file.
pub async fn index_file(
    backend: &dyn IndexBackend,
    path: &Path,
    policy: &RetryPolicy,
) -> Result<IndexedFile, IndexError> {
    let prepared = prepare_file(path)?;
    submit(backend, prepared, policy).await
}

async fn submit(
    backend: &dyn IndexBackend,
    prepared: PreparedFile,
    policy: &RetryPolicy,
) -> Result<IndexedFile, IndexError> {
    let transaction =
        run_transaction(backend, &prepared.ead_id, &prepared.payloads, policy).await?;
    Ok(IndexedFile {
        transaction,
        warnings: prepared.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_code_is_parent_directory() {
        assert_eq!(
            repository_code(Path::new("/data/ead/mo/mos_2021.xml")).unwrap(),
            "mo"
        );
        assert_eq!(repository_code(Path::new("mo/mos_2021.xml")).unwrap(), "mo");
    }

    #[test]
    fn test_repository_code_requires_partner_directory() {
        for path in ["mos_2021.xml", "/mos_2021.xml"] {
            let err = repository_code(Path::new(path)).unwrap_err();
            assert!(matches!(err, IndexError::NoRepositoryCode(_)), "{}", path);
            assert_eq!(err.kind(), ErrorKind::Extraction);
        }
    }

    #[test]
    fn test_malformed_xml_is_an_extraction_error() {
        let err = prepare("<ead><eadheader>", "mo").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Extraction);
    }

    #[test]
    fn test_missing_ead_id() {
        let err = prepare("<ead><archdesc level=\"collection\"/></ead>", "mo").unwrap_err();
        assert!(matches!(
            err,
            IndexError::Extract(ExtractError::MissingEadId)
        ));
    }
}
