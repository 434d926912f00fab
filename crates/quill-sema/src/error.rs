//! Semantic errors: symbol errors, type errors, and conversion errors.
//!
//! Every error carries a source range (merge conflicts synthesize one at
//! the file start) and a context string where a bare mismatch would be
//! unhelpful. All errors are data; nothing in the analysis unwinds.

use std::fmt;

use quill_common::diagnostics::{Diagnostic, Severity};
use quill_common::span::{SourceLocation, SourceRange};

#[derive(Debug, Clone, PartialEq)]
pub enum SemaError {
    // ── Symbol errors ──────────────────────────────────────────────────
    DuplicateSymbol { name: String, range: SourceRange },
    DuplicateSignature { name: String, range: SourceRange },
    ConstructorOutsideType { range: SourceRange },
    ConflictingAccessibility { name: String, range: SourceRange },
    MergeConflict { message: String },
    UnknownIdentifier { name: String, range: SourceRange },
    UnknownType { name: String, range: SourceRange },
    UnknownFunction { name: String, range: SourceRange },
    NoSuchMember { type_name: String, member: String, range: SourceRange },
    MemberNotAccessible { member: String, range: SourceRange },
    ThisOutsideType { range: SourceRange },
    UnknownNamespace { path: String, range: SourceRange },
    OverrideWithoutBase { name: String, range: SourceRange },

    // ── Type errors ────────────────────────────────────────────────────
    TypeMismatch { expected: String, found: String, context: String, range: SourceRange },
    ArityMismatch { expected: usize, found: usize, range: SourceRange },
    GenericArityMismatch { name: String, expected: usize, found: usize, range: SourceRange },
    NotLvalue { range: SourceRange },
    AmbiguousOverload { name: String, range: SourceRange },
    NoMatchingOverload { name: String, range: SourceRange },
    NotCallable { found: String, range: SourceRange },
    NotIndexable { found: String, range: SourceRange },
    RequiresNumeric { operator: String, found: String, range: SourceRange },
    RequiresIntegral { operator: String, found: String, range: SourceRange },
    InfiniteType { range: SourceRange },
    UnresolvedType { range: SourceRange },
    CannotInferEnumMember { member: String, range: SourceRange },
    RecursiveValueType { name: String, range: SourceRange },

    // ── Cast errors ────────────────────────────────────────────────────
    NotConvertible { from: String, to: String, range: SourceRange },
    NarrowingNeedsCast { from: String, to: String, range: SourceRange },
}

impl SemaError {
    pub fn range(&self) -> SourceRange {
        match self {
            SemaError::MergeConflict { .. } => {
                SourceRange::empty_at(SourceLocation::start_of_file())
            }
            SemaError::DuplicateSymbol { range, .. }
            | SemaError::DuplicateSignature { range, .. }
            | SemaError::ConstructorOutsideType { range }
            | SemaError::ConflictingAccessibility { range, .. }
            | SemaError::UnknownIdentifier { range, .. }
            | SemaError::UnknownType { range, .. }
            | SemaError::UnknownFunction { range, .. }
            | SemaError::NoSuchMember { range, .. }
            | SemaError::MemberNotAccessible { range, .. }
            | SemaError::ThisOutsideType { range }
            | SemaError::UnknownNamespace { range, .. }
            | SemaError::OverrideWithoutBase { range, .. }
            | SemaError::TypeMismatch { range, .. }
            | SemaError::ArityMismatch { range, .. }
            | SemaError::GenericArityMismatch { range, .. }
            | SemaError::NotLvalue { range }
            | SemaError::AmbiguousOverload { range, .. }
            | SemaError::NoMatchingOverload { range, .. }
            | SemaError::NotCallable { range, .. }
            | SemaError::NotIndexable { range, .. }
            | SemaError::RequiresNumeric { range, .. }
            | SemaError::RequiresIntegral { range, .. }
            | SemaError::InfiniteType { range }
            | SemaError::UnresolvedType { range }
            | SemaError::CannotInferEnumMember { range, .. }
            | SemaError::RecursiveValueType { range, .. }
            | SemaError::NotConvertible { range, .. }
            | SemaError::NarrowingNeedsCast { range, .. } => *range,
        }
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        Diagnostic::new(Severity::Error, self.to_string(), self.range())
    }
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemaError::DuplicateSymbol { name, .. } => {
                write!(f, "duplicate symbol '{name}' in this scope")
            }
            SemaError::DuplicateSignature { name, .. } => {
                write!(f, "function '{name}' is already defined with this signature")
            }
            SemaError::ConstructorOutsideType { .. } => {
                write!(f, "constructor declared outside of a type")
            }
            SemaError::ConflictingAccessibility { name, .. } => {
                write!(f, "'{name}' has more than one accessibility modifier")
            }
            SemaError::MergeConflict { message } => write!(f, "{message}"),
            SemaError::UnknownIdentifier { name, .. } => write!(f, "unknown identifier '{name}'"),
            SemaError::UnknownType { name, .. } => write!(f, "unknown type '{name}'"),
            SemaError::UnknownFunction { name, .. } => write!(f, "unknown function '{name}'"),
            SemaError::NoSuchMember { type_name, member, .. } => {
                write!(f, "type '{type_name}' has no member '{member}'")
            }
            SemaError::MemberNotAccessible { member, .. } => {
                write!(f, "member '{member}' is not accessible from here")
            }
            SemaError::ThisOutsideType { .. } => {
                write!(f, "'this' used outside of a type member")
            }
            SemaError::UnknownNamespace { path, .. } => {
                write!(f, "unknown namespace '{path}'")
            }
            SemaError::OverrideWithoutBase { name, .. } => {
                write!(f, "'{name}' is marked override but no base method matches its signature")
            }
            SemaError::TypeMismatch { expected, found, context, .. } => {
                write!(f, "type mismatch: expected {expected}, found {found} ({context})")
            }
            SemaError::ArityMismatch { expected, found, .. } => {
                write!(f, "wrong number of arguments: expected {expected}, found {found}")
            }
            SemaError::GenericArityMismatch { name, expected, found, .. } => {
                write!(f, "'{name}' expects {expected} type argument(s), found {found}")
            }
            SemaError::NotLvalue { .. } => {
                write!(f, "assignment target is not an lvalue")
            }
            SemaError::AmbiguousOverload { name, .. } => {
                write!(f, "ambiguous call to overloaded function '{name}'")
            }
            SemaError::NoMatchingOverload { name, .. } => {
                write!(f, "no overload of '{name}' matches these arguments")
            }
            SemaError::NotCallable { found, .. } => {
                write!(f, "expression of type {found} is not callable")
            }
            SemaError::NotIndexable { found, .. } => {
                write!(f, "expression of type {found} cannot be indexed")
            }
            SemaError::RequiresNumeric { operator, found, .. } => {
                write!(f, "operator '{operator}' requires a numeric operand, found {found}")
            }
            SemaError::RequiresIntegral { operator, found, .. } => {
                write!(f, "operator '{operator}' requires an integral operand, found {found}")
            }
            SemaError::InfiniteType { .. } => {
                write!(f, "cannot construct infinite type")
            }
            SemaError::UnresolvedType { .. } => {
                write!(f, "type could not be inferred; add an annotation")
            }
            SemaError::CannotInferEnumMember { member, .. } => {
                write!(f, "cannot infer the enum type of '.{member}' from context")
            }
            SemaError::RecursiveValueType { name, .. } => {
                write!(f, "value type '{name}' contains itself by value")
            }
            SemaError::NotConvertible { from, to, .. } => {
                write!(f, "cannot convert {from} to {to}")
            }
            SemaError::NarrowingNeedsCast { from, to, .. } => {
                write!(f, "converting {from} to {to} loses precision; use an explicit cast")
            }
        }
    }
}

impl std::error::Error for SemaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_conflict_formats_verbatim() {
        let err = SemaError::MergeConflict {
            message: "Symbol conflict: 'foo' already exists in namespace ''".into(),
        };
        assert_eq!(err.to_string(), "Symbol conflict: 'foo' already exists in namespace ''");
    }

    #[test]
    fn type_mismatch_includes_context() {
        let err = SemaError::TypeMismatch {
            expected: "i32".into(),
            found: "f64".into(),
            context: "return value".into(),
            range: SourceRange::empty_at(SourceLocation::start_of_file()),
        };
        assert_eq!(err.to_string(), "type mismatch: expected i32, found f64 (return value)");
    }

    #[test]
    fn diagnostics_are_errors() {
        let err = SemaError::NotLvalue {
            range: SourceRange::empty_at(SourceLocation::start_of_file()),
        };
        assert!(err.into_diagnostic().is_error());
    }
}
