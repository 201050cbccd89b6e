//! Git change-set driver.
//!
//! Turns the diff between a commit and its first parent into index
//! transactions, one per touched EAD file, in diff order. A Delete whose
//! EADID is re-added elsewhere in the same commit (a file moved between
//! partner directories) is skipped: the Add's own delete stage replaces the
//! old documents, and a later delete would drop the new ones.
//!
//! | from   | to     | Operation                  |
//! |--------|--------|----------------------------|
//! | absent | path   | `Add`                      |
//! | path   | absent | `Delete`                   |
//! | path   | path   | `Add` (update = re-index)  |
//! | a      | b      | `Unknown`                  |
//! | absent | absent | `Unknown`                  |
//!
//! The diff runs without rename detection, so a moved file arrives as a
//! `Delete` of the old path and an `Add` of the new one. An initial commit
//! has no parent; every file of its tree is an `Add`.
//! Paths not matching the EAD globs are skipped, except `Unknown` patches,
//! which are always reported.
//!
//! Git is run as a subprocess (`git -C <repo> ...`). Per-file failures are
//! collected and processing continues; only repository-level problems abort
//! the run.

use ead_indexer_core::index::IndexBackend;
use globset::GlobSet;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

use crate::pipeline::{self, IndexError};
use crate::report::{ErrorKind, ErrorReport};
use crate::transaction::{delete_collection, RetryPolicy, TransactionError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add,
    Delete,
    /// The patch cannot be mapped to a single file operation.
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetEntry {
    pub path: String,
    pub operation: Operation,
}

impl ChangeSetEntry {
    /// Classify one file patch. The entry path is the new path when there is
    /// one, else the old path.
    pub fn from_patch(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            path: to.or(from).unwrap_or_default().to_string(),
            operation: classify(from, to),
        }
    }
}

/// Map a `from → to` file pair to an operation.
pub fn classify(from: Option<&str>, to: Option<&str>) -> Operation {
    match (from, to) {
        (None, Some(_)) => Operation::Add,
        (Some(_), None) => Operation::Delete,
        (Some(from), Some(to)) if from == to => Operation::Add,
        (Some(from), Some(to)) => Operation::Unknown(format!("{} renamed to {}", from, to)),
        (None, None) => Operation::Unknown("patch without old or new path".to_string()),
    }
}

#[derive(Debug, Error)]
pub enum ChangeSetError {
    #[error("cannot open repository {}: {message}", .path.display())]
    Repository { path: PathBuf, message: String },
    #[error("commit '{rev}' not found: {message}")]
    MissingCommit { rev: String, message: String },
    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },
    #[error("cannot classify change to {path}: {reason}")]
    Unclassified { path: String, reason: String },
    #[error("cannot read {path} at {commit}: {message}")]
    Blob {
        path: String,
        commit: String,
        message: String,
    },
    #[error("{path}: {source}")]
    Index { path: String, source: IndexError },
    #[error("{path}: {source}")]
    Delete {
        path: String,
        source: TransactionError,
    },
}

impl ChangeSetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChangeSetError::Index { source, .. } => source.kind(),
            ChangeSetError::Delete { .. } => ErrorKind::Transaction,
            ChangeSetError::Blob { .. } => ErrorKind::Read,
            _ => ErrorKind::ChangeSet,
        }
    }
}

/// What one commit did to the index.
#[derive(Debug, Default)]
pub struct ChangeSetReport {
    pub commit: String,
    pub entries: Vec<ChangeSetEntry>,
    pub indexed: usize,
    pub deleted: usize,
    pub skipped: usize,
    /// Per-file failures, in diff order.
    pub errors: Vec<ChangeSetError>,
}

impl ChangeSetReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Copy the per-file failures into a CLI report.
    pub fn record_failures(&self, report: &mut ErrorReport) {
        for error in &self.errors {
            let file = match error {
                ChangeSetError::Unclassified { path, .. }
                | ChangeSetError::Blob { path, .. }
                | ChangeSetError::Index { path, .. }
                | ChangeSetError::Delete { path, .. } => path.clone(),
                _ => self.commit.clone(),
            };
            report.push(file, error.kind(), error);
        }
    }
}

/// Run git in `repo` and return its stdout.
fn git(repo: &Path, args: &[&str]) -> Result<Vec<u8>, ChangeSetError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| ChangeSetError::Git {
            command: args.join(" "),
            message: format!("failed to execute git ({}). Is git installed?", e),
        })?;

    if !output.status.success() {
        return Err(ChangeSetError::Git {
            command: args.join(" "),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

fn open_repository(repo: &Path) -> Result<(), ChangeSetError> {
    git(repo, &["rev-parse", "--git-dir"])
        .map(|_| ())
        .map_err(|e| ChangeSetError::Repository {
            path: repo.to_path_buf(),
            message: match e {
                ChangeSetError::Git { message, .. } => message,
                other => other.to_string(),
            },
        })
}

/// Full object name of `rev`, which must name a commit.
fn resolve_commit(repo: &Path, rev: &str) -> Result<String, ChangeSetError> {
    let object = format!("{}^{{commit}}", rev);
    let stdout = git(repo, &["rev-parse", "--verify", "--quiet", &object]).map_err(|e| {
        ChangeSetError::MissingCommit {
            rev: rev.to_string(),
            message: match e {
                ChangeSetError::Git { message, .. } if !message.is_empty() => message,
                _ => "no such commit".to_string(),
            },
        }
    })?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

fn first_parent(repo: &Path, commit: &str) -> Result<Option<String>, ChangeSetError> {
    let stdout = git(repo, &["rev-list", "--parents", "-n", "1", commit])?;
    let line = String::from_utf8_lossy(&stdout);
    Ok(line.split_whitespace().nth(1).map(str::to_string))
}

/// Split NUL-terminated git output into fields.
fn nul_fields(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|&b| b == 0)
        .filter(|field| !field.is_empty())
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// Parse `git diff-tree -r -z --raw` output into `(from, to)` pairs.
///
/// Each record is `:<modes> <shas> <status>` followed by one path, or two
/// paths for renames and copies.
fn parse_raw_diff(stdout: &[u8]) -> Vec<(Option<String>, Option<String>)> {
    let mut fields = nul_fields(stdout).into_iter();
    let mut patches = Vec::new();

    while let Some(header) = fields.next() {
        let Some(status) = header.split_whitespace().last() else {
            continue;
        };
        let status = status.chars().next().unwrap_or('X');
        let patch = match status {
            'A' => (None, fields.next()),
            'D' => (fields.next(), None),
            'R' | 'C' => {
                let from = fields.next();
                (from, fields.next())
            }
            'M' | 'T' => {
                let path = fields.next();
                (path.clone(), path)
            }
            _ => {
                debug!(header = %header, "unrecognized diff status");
                let _ = fields.next();
                (None, None)
            }
        };
        patches.push(patch);
    }

    patches
}

/// Classify every file touched by `commit` relative to its first parent.
pub fn changed_files(repo: &Path, commit: &str) -> Result<Vec<ChangeSetEntry>, ChangeSetError> {
    open_repository(repo)?;
    let target = resolve_commit(repo, commit)?;
    entries_for(repo, &target)
}

fn entries_for(repo: &Path, target: &str) -> Result<Vec<ChangeSetEntry>, ChangeSetError> {
    match first_parent(repo, target)? {
        Some(parent) => {
            let stdout = git(repo, &["diff-tree", "-r", "-z", "--raw", "--no-renames", &parent, target])?;
            Ok(parse_raw_diff(&stdout)
                .into_iter()
                .map(|(from, to)| ChangeSetEntry::from_patch(from.as_deref(), to.as_deref()))
                .collect())
        }
        None => {
            debug!(commit = %target, "initial commit, indexing whole tree");
            let stdout = git(repo, &["ls-tree", "-r", "-z", "--name-only", target])?;
            Ok(nul_fields(&stdout)
                .into_iter()
                .map(|path| ChangeSetEntry {
                    path,
                    operation: Operation::Add,
                })
                .collect())
        }
    }
}

fn read_blob(repo: &Path, commit: &str, path: &str) -> Result<String, ChangeSetError> {
    let object = format!("{}:{}", commit, path);
    let blob_error = |message: String| ChangeSetError::Blob {
        path: path.to_string(),
        commit: commit.to_string(),
        message,
    };
    let stdout = git(repo, &["show", &object]).map_err(|e| blob_error(e.to_string()))?;
    String::from_utf8(stdout).map_err(|e| blob_error(format!("not UTF-8: {}", e)))
}

/// The EADID a file name stands for.
fn ead_id_from_path(path: &str) -> Option<String> {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// Apply one commit to the index.
///
/// Returns `Err` only when the repository or commit cannot be read at all;
/// file-level failures end up in [`ChangeSetReport::errors`].
pub async fn index_commit(
    backend: &dyn IndexBackend,
    repo: &Path,
    commit: &str,
    ead_files: &GlobSet,
    policy: &RetryPolicy,
) -> Result<ChangeSetReport, ChangeSetError> {
    open_repository(repo)?;
    let target = resolve_commit(repo, commit)?;
    let entries = entries_for(repo, &target)?;
    info!(commit = %target, files = entries.len(), "processing change set");

    let mut report = ChangeSetReport {
        commit: target.clone(),
        ..Default::default()
    };

    let readded: HashSet<String> = entries
        .iter()
        .filter(|entry| entry.operation == Operation::Add && ead_files.is_match(&entry.path))
        .filter_map(|entry| ead_id_from_path(&entry.path))
        .collect();

    for entry in &entries {
        let unknown = matches!(entry.operation, Operation::Unknown(_));
        if !unknown && !ead_files.is_match(&entry.path) {
            debug!(path = %entry.path, "not an EAD file, skipping");
            report.skipped += 1;
            continue;
        }

        match &entry.operation {
            Operation::Add => {
                let indexed = match read_blob(repo, &target, &entry.path) {
                    Ok(xml) => add_file(backend, &entry.path, &xml, policy).await,
                    Err(e) => Err(e),
                };
                match indexed {
                    Ok(()) => report.indexed += 1,
                    Err(e) => report.errors.push(e),
                }
            }
            Operation::Delete
                if ead_id_from_path(&entry.path).is_some_and(|id| readded.contains(&id)) =>
            {
                debug!(path = %entry.path, "collection re-added in the same commit, delete superseded");
                report.skipped += 1;
            }
            Operation::Delete => match delete_file(backend, &entry.path, policy).await {
                Ok(()) => report.deleted += 1,
                Err(e) => report.errors.push(e),
            },
            Operation::Unknown(reason) => {
                report.errors.push(ChangeSetError::Unclassified {
                    path: entry.path.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }

    report.entries = entries;
    info!(
        commit = %target,
        indexed = report.indexed,
        deleted = report.deleted,
        skipped = report.skipped,
        errors = report.errors.len(),
        "change set done"
    );
    Ok(report)
}

async fn add_file(
    backend: &dyn IndexBackend,
    path: &str,
    xml: &str,
    policy: &RetryPolicy,
) -> Result<(), ChangeSetError> {
    let index_error = |source: IndexError| ChangeSetError::Index {
        path: path.to_string(),
        source,
    };
    let repository_code = pipeline::repository_code(Path::new(path)).map_err(index_error)?;
    pipeline::index_xml(backend, xml, &repository_code, policy)
        .await
        .map_err(index_error)?;
    Ok(())
}

async fn delete_file(
    backend: &dyn IndexBackend,
    path: &str,
    policy: &RetryPolicy,
) -> Result<(), ChangeSetError> {
    let ead_id = ead_id_from_path(path).ok_or_else(|| ChangeSetError::Unclassified {
        path: path.to_string(),
        reason: "file name has no stem".to_string(),
    })?;
    delete_collection(backend, &ead_id, policy)
        .await
        .map_err(|source| ChangeSetError::Delete {
            path: path.to_string(),
            source,
        })?;
    Ok(())
}
