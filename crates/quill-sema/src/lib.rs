// Quill semantic analysis -- symbol tables, name resolution, and type
// inference over parsed compilation units.
//
// Two passes per the front-end pipeline: `SymbolBuilder` populates a
// file-local symbol table per unit, the driver merges those tables into
// one, and `TypeResolver` unifies types across the merged program. The
// whole phase is a pure function from syntax trees to (symbols, type
// annotations, diagnostics); nothing here performs I/O.

pub mod backend;
pub mod builder;
pub mod conv;
pub mod error;
pub mod resolve;
pub mod symbol;
pub mod table;
pub mod ty;
pub mod unify;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use quill_parser::arena::{Ast, CompilationUnit, ExprId};

pub use builder::SymbolBuilder;
pub use error::SemaError;
pub use resolve::TypeResolver;
pub use symbol::{Symbol, SymbolData, SymbolId, SymbolKind};
pub use table::SymbolTable;
pub use ty::{PrimitiveKind, Type, TypeId, TypeSystem};

/// Identifies one compilation unit among the files being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// One parsed file handed to semantic analysis.
pub struct SourceUnit<'a> {
    pub file: FileId,
    pub ast: &'a Ast,
    pub unit: &'a CompilationUnit,
}

/// Expression annotations produced by type resolution, keyed by
/// `(file, expression)`.
#[derive(Debug, Default)]
pub struct TypeMap {
    pub expr_types: FxHashMap<(FileId, ExprId), TypeId>,
    pub lvalues: FxHashSet<(FileId, ExprId)>,
    pub expr_symbols: FxHashMap<(FileId, ExprId), SymbolId>,
}

impl TypeMap {
    pub fn type_of(&self, file: FileId, expr: ExprId) -> Option<TypeId> {
        self.expr_types.get(&(file, expr)).copied()
    }

    pub fn is_lvalue(&self, file: FileId, expr: ExprId) -> bool {
        self.lvalues.contains(&(file, expr))
    }

    pub fn symbol_of(&self, file: FileId, expr: ExprId) -> Option<SymbolId> {
        self.expr_symbols.get(&(file, expr)).copied()
    }
}

/// The result of checking a program.
pub struct Analysis {
    pub table: SymbolTable,
    pub types: TypeSystem,
    pub type_map: TypeMap,
    pub errors: Vec<SemaError>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Check a set of parsed files: build per-file symbol tables, merge them
/// sequentially into a global table, then resolve types over the merged
/// program.
pub fn check(units: &[SourceUnit]) -> Analysis {
    let mut types = TypeSystem::new();
    let mut global = SymbolTable::new();
    let mut errors = Vec::new();

    for unit in units {
        debug!(file = unit.file.0, "building symbols");
        let (table, build_errors) = SymbolBuilder::build(unit.file, unit.ast, unit.unit);
        errors.extend(build_errors);
        for message in global.merge(table) {
            errors.push(SemaError::MergeConflict { message });
        }
    }

    let (type_map, resolve_errors) = TypeResolver::resolve(&mut global, &mut types, units);
    errors.extend(resolve_errors);

    Analysis { table: global, types, type_map, errors }
}
