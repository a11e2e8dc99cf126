//! Error types shared by the script pipeline and the configuration engine.

use std::path::PathBuf;

/// Fatal failures of one script transformation batch.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The source did not parse as JavaScript. No partial output is produced.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Two edits disagreed about the text they operate on. Always a builder bug.
    #[error("transformation invariant violated: {0}")]
    InvariantViolation(String),
}

/// Why a single call site was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnsupportedCallShape {
    #[error("call has no arguments")]
    NoArguments,
    #[error("call uses a spread argument")]
    SpreadArgument,
    #[error("sole argument is not a factory function")]
    SoleArgumentNotFactory,
}

/// Failures and warnings of the configuration layer.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid JSON in `{source_name}`: {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration `{0}` is not a JSON object")]
    NotAnObject(String),

    /// A fragment section could not be read; it is treated as empty.
    #[error("malformed configuration fragment `{source_name}` in `{section}`: {reason}")]
    MalformedFragment {
        source_name: String,
        section: String,
        reason: String,
    },

    #[error("global options are locked and can not be modified")]
    OptionsLocked,
}

impl ConfigError {
    pub(crate) fn malformed(
        source_name: &str,
        section: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedFragment {
            source_name: source_name.to_string(),
            section: section.into(),
            reason: reason.into(),
        }
    }

    /// True for conditions that skip a section rather than abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedFragment { .. })
    }
}
