use std::fmt;

use quill_common::diagnostics::{Diagnostic, Severity};
use quill_common::span::SourceRange;

/// A parse error with severity and location.
///
/// `Warning` keeps compiling, `Error` leaves a `Missing` placeholder in
/// the tree, `Fatal` made the parser give up on the surrounding construct
/// and resynchronize. The parser never raises; all errors come back in
/// the result vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub severity: Severity,
    pub message: String,
    pub range: SourceRange,
}

impl ParseError {
    pub fn error(message: impl Into<String>, range: SourceRange) -> Self {
        Self { severity: Severity::Error, message: message.into(), range }
    }

    pub fn warning(message: impl Into<String>, range: SourceRange) -> Self {
        Self { severity: Severity::Warning, message: message.into(), range }
    }

    pub fn fatal(message: impl Into<String>, range: SourceRange) -> Self {
        Self { severity: Severity::Fatal, message: message.into(), range }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(self.severity, self.message, self.range)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

impl std::error::Error for ParseError {}
