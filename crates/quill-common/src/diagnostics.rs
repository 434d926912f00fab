use std::fmt;

use serde::Serialize;

use crate::span::SourceRange;

/// How severe a diagnostic is.
///
/// Warnings never stop compilation. Errors leave `Missing` placeholders in
/// the syntax tree and suppress code generation. Fatal errors abandon the
/// current file; the driver continues with the remaining files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// A located diagnostic message. The common currency every stage reports
/// in; stage-specific error enums convert into this for the driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: SourceRange,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, range: SourceRange) -> Self {
        Self { severity, message: message.into(), range }
    }

    pub fn error(message: impl Into<String>, range: SourceRange) -> Self {
        Self::new(Severity::Error, message, range)
    }

    pub fn warning(message: impl Into<String>, range: SourceRange) -> Self {
        Self::new(Severity::Warning, message, range)
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }

    /// Render in the canonical `file:line:col: level: message` form.
    pub fn format(&self, file: &str) -> String {
        format!(
            "{}:{}:{}: {}: {}",
            file, self.range.start.line, self.range.start.column, self.severity, self.message
        )
    }
}
