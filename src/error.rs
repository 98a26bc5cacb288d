use crate::language::Language;
use crate::ts::TreeSitterError;
use std::path::PathBuf;
use thiserror::Error;

/// Construction-time failure: the initial source does not parse, so no
/// adapter exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {language} source: {reason}")]
pub struct ParseError {
    pub language: Language,
    pub reason: String,
}

impl ParseError {
    pub fn new(language: Language, reason: impl Into<String>) -> Self {
        Self {
            language,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_tree_sitter(language: Language, error: TreeSitterError) -> Self {
        Self::new(language, error.to_string())
    }
}

/// Why an edit was refused.
///
/// Never surfaces through [`crate::LanguageAdapter`]: adapters log it and
/// report `false`/`None` with their state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditFailure {
    #[error("element not found: {name}")]
    NotFound { name: String },

    #[error("anchor is not a top-level statement: {name}")]
    AnchorNotFound { name: String },

    #[error("element '{name}' has no statement body")]
    NoBody { name: String },

    #[error("no body statement of '{name}' matches {target}")]
    TargetOutOfRange { name: String, target: String },

    #[error("partial replace needs a statement index or a start line")]
    MissingTarget,

    #[error("replacement does not parse: {reason}")]
    MalformedPatch { reason: String },

    #[error("replacement contains no usable statements")]
    EmptyPatch,

    #[error("edited source no longer parses: {reason}")]
    Reparse { reason: String },
}

impl EditFailure {
    pub(crate) fn not_found(name: &str) -> Self {
        EditFailure::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn malformed(error: impl ToString) -> Self {
        EditFailure::MalformedPatch {
            reason: error.to_string(),
        }
    }

    pub(crate) fn reparse(error: impl ToString) -> Self {
        EditFailure::Reparse {
            reason: error.to_string(),
        }
    }
}

/// Errors from opening a file through the [`crate::Editor`] facade.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Collapse an edit outcome into the boolean the adapter contract returns,
/// logging the refusal reason.
pub(crate) fn report(operation: &'static str, outcome: Result<(), EditFailure>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(failure) => {
            tracing::debug!(operation, %failure, "edit rejected");
            false
        }
    }
}
