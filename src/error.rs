//! Error types
//!
//! Two layers of errors exist:
//! - [`ParseError`]: raised while parsing a single file. It knows the line
//!   but not the file it came from.
//! - [`Error`]: returned by a [`Session`](crate::Session). It pairs a
//!   [`ParseError`] with the display name of the file being parsed.
//!
//! Scope stack misuse ([`ScopeError`]) is fatal: the session that hit it
//! should not be trusted to parse further files.

use std::io;
use thiserror::Error;

/// Violations of the bounded scope stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("maximum scope depth of {0} exceeded")]
    Overflow(usize),
    #[error("attempted to leave the global scope")]
    Underflow,
}

/// Error raised while parsing one file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{message} (line {line})")]
    Syntax { message: String, line: usize },
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>, line: usize) -> Self {
        ParseError::Syntax {
            message: message.into(),
            line,
        }
    }

    /// Attach the display name of the file that failed.
    pub fn in_file(self, file: &str) -> Error {
        match self {
            ParseError::Syntax { message, line } => Error::Parse {
                file: file.to_string(),
                line,
                message,
            },
            ParseError::Scope(source) => Error::Fatal {
                file: file.to_string(),
                source,
            },
            ParseError::Io(err) => Error::Io(err),
        }
    }
}

/// Error returned by the public parsing API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },
    #[error("fatal error in {file}: {source}")]
    Fatal {
        file: String,
        #[source]
        source: ScopeError,
    },
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the parser state is no longer trustworthy after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Fatal { .. })
    }

    /// The line of the failing construct, for syntax errors.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
