use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::EncodeError;

/// Errors surfaced by the history core.
///
/// Parse-time violations always carry the source file name and 1-based line
/// so a run aborts with an actionable location.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{file}: line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },
    #[error("conflicting filename '{0}' added twice to the history database")]
    ConflictingFilename(String),
    #[error("output path '{}' already exists", .path.display())]
    OutputExists { path: PathBuf },
    #[error("{file}: {source}")]
    Encode {
        file: String,
        #[source]
        source: EncodeError,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    /// True when the failure indicates malformed input history rather than
    /// an environment problem, letting callers exit with a distinct status
    /// for each family.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::ConflictingFilename(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Per-file context threaded through the parsers so diagnostics can name
/// their source without any process-wide state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParseCtx<'a> {
    pub file: &'a str,
}

impl ParseCtx<'_> {
    pub fn error(&self, line: usize, message: impl Into<String>) -> CoreError {
        CoreError::Parse {
            file: self.file.to_string(),
            line,
            message: message.into(),
        }
    }
}
