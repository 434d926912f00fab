//! The boundary between semantic analysis and code generation.
//!
//! A back-end consumes the merged symbol table and each file's syntax
//! tree, and produces an IR module for JIT or AOT execution. The front
//! end only defines the contract; no back-end ships in this crate.

use quill_common::span::SourceRange;
use quill_parser::arena::{Ast, CompilationUnit};

use crate::table::SymbolTable;
use crate::ty::TypeSystem;
use crate::TypeMap;

/// An error surfaced by a back-end, aggregated by the driver alongside
/// front-end diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendError {
    pub range: SourceRange,
    pub message: String,
}

/// A code generator.
///
/// The driver calls `declare_all_types` and `declare_all_functions` once
/// over the merged table, then `generate_definitions` once per file, and
/// finally `release_module` to take ownership of the finished module.
pub trait Backend {
    type Module;

    fn declare_all_types(
        &mut self,
        table: &SymbolTable,
        types: &TypeSystem,
    ) -> Result<(), BackendError>;

    fn declare_all_functions(
        &mut self,
        table: &SymbolTable,
        types: &TypeSystem,
    ) -> Result<(), BackendError>;

    fn generate_definitions(
        &mut self,
        ast: &Ast,
        unit: &CompilationUnit,
        table: &SymbolTable,
        types: &TypeSystem,
        type_map: &TypeMap,
    ) -> Result<(), BackendError>;

    fn release_module(self) -> Self::Module;
}
