//! Error taxonomy for extraction and normalization.
//!
//! Backend (transport) errors live next to the backend trait in
//! [`crate::index`].

use thiserror::Error;

/// Rejected language codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("language code is empty")]
    Empty,
    #[error("language code '{0}' contains invalid characters")]
    InvalidCharacters(String),
    #[error("language code '{0}' contains whitespace")]
    InternalWhitespace(String),
    #[error("language code '{0}' must be 2 or 3 letters long")]
    InvalidLength(String),
    #[error("language code '{0}' not found")]
    NotFound(String),
}

/// XML parsing and tree manipulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("document has no root element")]
    NoRoot,
    #[error("node handle is absent")]
    NodeAbsent,
}

/// XPath compilation and evaluation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    #[error("invalid XPath '{expr}': {message}")]
    Syntax { expr: String, message: String },
    #[error("unknown XPath function '{0}'")]
    UnknownFunction(String),
    #[error("XPath function '{name}' expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },
    #[error("XPath function '{0}' expects a node-set argument")]
    NotANodeSet(String),
}

/// Inline-markup normalization errors.
///
/// `Malformed` carries the untouched input so callers can fall back to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HtmlError {
    #[error("malformed inline markup: {message}")]
    Malformed { original: String, message: String },
}

impl HtmlError {
    /// The input that failed to convert.
    pub fn original(&self) -> &str {
        match self {
            HtmlError::Malformed { original, .. } => original,
        }
    }
}

/// Container graph errors. Fatal for the enclosing component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("container #{position} has no type attribute")]
    MissingType { position: usize },
    #[error("containers '{first}' and '{second}' share parent '{parent}'")]
    SiblingContainers {
        parent: String,
        first: String,
        second: String,
    },
    #[error("container '{id}' names unknown parent '{parent}'")]
    UnknownParent { id: String, parent: String },
}

/// Errors that abort extraction of an EAD file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    XPath(#[from] XPathError),
    #[error("no <eadid> element found")]
    MissingEadId,
    #[error("found {0} <eadid> elements, expected exactly one")]
    MultipleEadIds(usize),
    #[error("<eadid> element is empty")]
    EmptyEadId,
    #[error("component #{position} has no id attribute")]
    MissingComponentId { position: usize },
    #[error("component '{id}': {source}")]
    Container {
        id: String,
        #[source]
        source: ContainerError,
    },
}
