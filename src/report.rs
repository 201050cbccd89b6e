//! Failure summary for the command line.
//!
//! File-level failures are collected as they happen and rendered once at the
//! end: the failing files, then the first error of each kind.

use std::collections::BTreeMap;
use std::fmt;

/// Failure categories, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    Read,
    Extraction,
    Transaction,
    ChangeSet,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Read => "read",
            ErrorKind::Extraction => "extraction",
            ErrorKind::Transaction => "transaction",
            ErrorKind::ChangeSet => "change set",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub file: String,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ErrorReport {
    failures: Vec<Failure>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: impl Into<String>, kind: ErrorKind, message: impl fmt::Display) {
        self.failures.push(Failure {
            file: file.into(),
            kind,
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Failing files, first occurrence order, without repeats.
    pub fn files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for failure in &self.failures {
            if !files.contains(&failure.file.as_str()) {
                files.push(&failure.file);
            }
        }
        files
    }

    /// First failure of each kind.
    pub fn first_by_kind(&self) -> BTreeMap<ErrorKind, &Failure> {
        let mut first = BTreeMap::new();
        for failure in &self.failures {
            first.entry(failure.kind).or_insert(failure);
        }
        first
    }

    /// Human-readable summary for stderr.
    pub fn render(&self) -> String {
        let files = self.files();
        let mut out = format!("{} failure(s) in {} file(s):\n", self.len(), files.len());
        for file in files {
            out.push_str(&format!("  {}\n", file));
        }
        out.push_str("First error of each kind:\n");
        for (kind, failure) in self.first_by_kind() {
            out.push_str(&format!("  [{}] {}: {}\n", kind, failure.file, failure.message));
        }
        out
    }
}
