use std::fmt;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, Severity};
use crate::span::SourceRange;

/// A lexer error with location information.
///
/// The lexer collects errors instead of aborting, so a single run reports
/// every problem in the file and still produces a usable token stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub range: SourceRange,
}

impl LexError {
    pub fn new(kind: LexErrorKind, range: SourceRange) -> Self {
        Self { kind, range }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(Severity::Error, self.kind.to_string(), self.range)
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// A character no token can start with.
    InvalidCharacter(char),
    /// A string literal was not closed before the end of the line or file.
    UnterminatedString,
    /// A character literal was not closed.
    UnterminatedChar,
    /// A block comment was not closed before end of input.
    UnterminatedBlockComment,
    /// An unrecognized escape sequence inside a string or char literal.
    InvalidEscape(char),
    /// A number literal that could not be scanned (e.g. `0x` with no digits).
    MalformedNumber(String),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter(c) => write!(f, "invalid character: {c:?}"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedChar => write!(f, "unterminated character literal"),
            Self::UnterminatedBlockComment => write!(f, "unterminated block comment"),
            Self::InvalidEscape(c) => write!(f, "invalid escape sequence: \\{c}"),
            Self::MalformedNumber(s) => write!(f, "malformed number literal: {s}"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}
