//! Error taxonomy for the replacement engine.
//!
//! Only two things may cross the engine boundary as errors: a source file that
//! cannot be parsed, and an invariant violation while patching. Everything else
//! (key vetoes, merge failures, missing setup targets) degrades locally.
//!
//! Hosts never show a raw [`TransformError`] to users. They convert it into an
//! [`ErrorReport`], which carries a category, a severity and a suggestion.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransformError {
    #[error("failed to parse `{file}`: {message}")]
    Parse { file: String, message: String },

    #[error("overlapping changes at offsets {first} and {second}")]
    OverlappingChanges { first: usize, second: usize },

    #[error("invalid marker pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to access `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type TransformResult<T> = Result<T, TransformError>;

/// Coarse classification used when reporting failures to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Parsing,
    Transformation,
    File,
    Plugin,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Parsing => write!(f, "parsing"),
            ErrorCategory::Transformation => write!(f, "transformation"),
            ErrorCategory::File => write!(f, "file"),
            ErrorCategory::Plugin => write!(f, "plugin"),
        }
    }
}

/// Severity level of a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Host-facing record for a failure, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub category: ErrorCategory,
    pub severity: Severity,
    /// File the failure belongs to, if any.
    pub file: Option<String>,
    pub message: String,
    /// Human-readable hint on how to fix the problem.
    pub suggestion: String,
}

impl From<&TransformError> for ErrorReport {
    fn from(error: &TransformError) -> Self {
        match error {
            TransformError::Parse { file, .. } => ErrorReport {
                category: ErrorCategory::Parsing,
                severity: Severity::Error,
                file: Some(file.clone()),
                message: error.to_string(),
                suggestion: "fix the syntax error or add the file to `ignores`; it was left unchanged"
                    .to_string(),
            },
            TransformError::OverlappingChanges { .. } => ErrorReport {
                category: ErrorCategory::Transformation,
                severity: Severity::Error,
                file: None,
                message: error.to_string(),
                suggestion: "this is a bug in transmark; please report it with the source file"
                    .to_string(),
            },
            TransformError::InvalidPattern { .. } => ErrorReport {
                category: ErrorCategory::Config,
                severity: Severity::Error,
                file: None,
                message: error.to_string(),
                suggestion: "`pattern` must be a valid regular expression with one capture group"
                    .to_string(),
            },
            TransformError::Io { path, .. } => ErrorReport {
                category: ErrorCategory::File,
                severity: Severity::Error,
                file: Some(path.display().to_string()),
                message: error.to_string(),
                suggestion: "check that the file exists and is readable".to_string(),
            },
        }
    }
}

impl ErrorReport {
    /// Attach the file a report belongs to when the error itself does not know it.
    pub fn in_file(mut self, file: &str) -> Self {
        if self.file.is_none() {
            self.file = Some(file.to_string());
        }
        self
    }
}
