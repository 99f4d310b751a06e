use crate::Position;
use std::fmt::{Display, Formatter};

/// Internal backtracking signal used by the production layer. A production returning
/// `Unparsed` simply didn't start at the cursor; the caller restores its mark and tries
/// the next alternative or falls through to error recovery. It never escapes the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unparsed;

/// A diagnostic describing a grammar mismatch or an unterminated construct, carried by
/// the `SyntaxError` construct that recovery produces and handed to
/// [`ParserDelegate::warn`](crate::ParserDelegate::warn).
#[derive(Debug, Clone)]
pub struct SyntaxDiagnostic {
    pub offset: usize,
    pub message: String,
}

impl SyntaxDiagnostic {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }

    pub fn at(&self, source: &str) -> Position {
        Position::locate(source, self.offset)
    }
}

impl Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

/// Errors surfaced directly to API callers (as opposed to diagnostics routed through
/// `warn`/`note`, which never abort parsing). These cover genuine API misuse, not
/// malformed WebIDL — malformed WebIDL always becomes a `SyntaxError` construct instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// A `find`/`find_all` path was empty or contained an empty segment.
    EmptyPath,
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::EmptyPath => write!(f, "search path must have at least one segment"),
        }
    }
}

impl std::error::Error for ParserError {}
