//! Type resolution (pass 2).
//!
//! Runs over the merged symbol table after all files are built and
//! merged. Declaration signatures are resolved first (type definitions,
//! base classes, function signatures, fields, properties, enum payloads,
//! aliases, `using` imports); bodies are then visited once, generating
//! unification constraints; deferred constraints (member access on a
//! still-unknown type, `.Case` shorthand) are retried in a bounded
//! fixed-point loop; finalization applies literal defaults, reports
//! anything still unresolved, writes final types back to symbols, and
//! computes field layout and vtable slots.
//!
//! Expression annotations land in side tables keyed by `(file, expr)`:
//! resolved type, lvalue-ness, and resolved symbol.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use quill_common::modifiers::ModifierFlags;
use quill_common::span::SourceRange;
use quill_parser::arena::{Ast, ExprId, StmtId};
use quill_parser::ast::{AccessorBody, AccessorKind, BinaryOp, Expr, LambdaBody, Stmt, UnaryOp};

use crate::builder::type_text;
use crate::conv::{check_conversion, resolve_overload, ConversionKind, OverloadOutcome};
use crate::error::SemaError;
use crate::symbol::{SymbolData, SymbolId};
use crate::table::SymbolTable;
use crate::ty::{TyVar, Type, TypeId, TypeSystem};
use crate::unify::{InferCtx, UnifyError};
use crate::{FileId, SourceUnit, TypeMap};

/// Maximum number of deferred-constraint retry rounds.
const MAX_PASSES: usize = 10;

/// A member access whose object type was not yet known when visited.
struct PendingMember {
    file: FileId,
    expr: ExprId,
    object_ty: TypeId,
    member: String,
    result: TypeId,
    range: SourceRange,
}

/// A `.Case` shorthand awaiting its enum type from context.
struct PendingImplicit {
    file: FileId,
    expr: ExprId,
    expected: TypeId,
    member: String,
    range: SourceRange,
}

pub struct TypeResolver<'a> {
    table: &'a mut SymbolTable,
    ts: &'a mut TypeSystem,
    units: &'a [SourceUnit<'a>],
    infer: InferCtx,
    errors: Vec<SemaError>,

    expr_types: FxHashMap<(FileId, ExprId), TypeId>,
    lvalues: FxHashSet<(FileId, ExprId)>,
    expr_symbols: FxHashMap<(FileId, ExprId), SymbolId>,

    file: FileId,
    scope: SymbolId,
    fn_return_stack: Vec<TypeId>,

    pending_members: Vec<PendingMember>,
    pending_implicit: Vec<PendingImplicit>,
    reported_vars: FxHashSet<TyVar>,
}

impl<'a> TypeResolver<'a> {
    pub fn resolve(
        table: &'a mut SymbolTable,
        ts: &'a mut TypeSystem,
        units: &'a [SourceUnit<'a>],
    ) -> (TypeMap, Vec<SemaError>) {
        let root = table.root();
        let mut resolver = TypeResolver {
            table,
            ts,
            units,
            infer: InferCtx::new(),
            errors: Vec::new(),
            expr_types: FxHashMap::default(),
            lvalues: FxHashSet::default(),
            expr_symbols: FxHashMap::default(),
            file: FileId(0),
            scope: root,
            fn_return_stack: Vec::new(),
            pending_members: Vec::new(),
            pending_implicit: Vec::new(),
            reported_vars: FxHashSet::default(),
        };
        resolver.run();
        let map = TypeMap {
            expr_types: resolver.expr_types,
            lvalues: resolver.lvalues,
            expr_symbols: resolver.expr_symbols,
        };
        (map, resolver.errors)
    }

    fn run(&mut self) {
        self.resolve_type_definitions();
        self.resolve_using_imports();
        self.resolve_aliases();
        self.resolve_declaration_signatures();

        debug!(files = self.units.len(), "resolving bodies");
        for unit in self.units {
            self.file = unit.file;
            self.scope = self.table.root();
            self.fn_return_stack.clear();
            for &stmt in &unit.unit.statements {
                self.visit_stmt(unit.ast, stmt);
            }
        }

        // Bounded fixed point over deferred constraints.
        let mut last_unbound = usize::MAX;
        for pass in 0..MAX_PASSES {
            self.retry_pending();
            let unbound = self.infer.unbound_count();
            debug!(pass, unbound, "resolution pass complete");
            if unbound == 0 || unbound >= last_unbound {
                break;
            }
            last_unbound = unbound;
        }

        self.finalize();
    }

    // ── Declaration resolution ─────────────────────────────────────────

    /// Give every type symbol its canonical type and every type parameter
    /// a fresh `TypeParam`. Works straight off the symbol table, so order
    /// and file boundaries do not matter.
    fn resolve_type_definitions(&mut self) {
        for id in self.table.iter_ids().collect::<Vec<_>>() {
            let (is_type, param_syms) = match &self.table.symbol(id).data {
                SymbolData::Type(data) => (true, data.type_params.clone()),
                SymbolData::Function(data) => (false, data.type_params.clone()),
                _ => continue,
            };
            let mut param_tys = Vec::new();
            for &param in &param_syms {
                let name = self.table.symbol(param).name.clone();
                let ty = self.ts.type_param(&name);
                self.table.symbol_mut(param).set_value_type(ty);
                param_tys.push(ty);
            }
            if is_type {
                let ty = if param_tys.is_empty() {
                    self.ts.named(id)
                } else {
                    self.ts.generic(id, param_tys)
                };
                self.table.symbol_mut(id).set_value_type(ty);
            }
        }
    }

    /// Resolve recorded `using` paths to namespace symbols.
    fn resolve_using_imports(&mut self) {
        for id in self.table.iter_ids().collect::<Vec<_>>() {
            let SymbolData::Namespace(data) = &self.table.symbol(id).data else { continue };
            let paths = data.using_paths.clone();
            let mut resolved = Vec::new();
            for path in &paths {
                match self.table.resolve_path(id, path) {
                    Some(ns) if matches!(self.table.symbol(ns).data, SymbolData::Namespace(_)) => {
                        resolved.push(ns);
                    }
                    _ => self.errors.push(SemaError::UnknownNamespace {
                        path: path.join("."),
                        range: self.table.symbol(id).range,
                    }),
                }
            }
            if let SymbolData::Namespace(data) = &mut self.table.symbol_mut(id).data {
                data.using_namespaces = resolved;
            }
        }
    }

    /// Resolve `using N = TYPE;` targets.
    fn resolve_aliases(&mut self) {
        for id in self.table.iter_ids().collect::<Vec<_>>() {
            if !matches!(self.table.symbol(id).data, SymbolData::Alias(_)) {
                continue;
            }
            let Some(&(file, stmt)) = self.table.symbol_to_ast.get(&id) else { continue };
            let Some(unit) = self.units.iter().find(|u| u.file == file) else { continue };
            let Stmt::Using { aliased_type: Some(target), .. } = unit.ast.stmt(stmt).clone()
            else {
                continue;
            };
            let saved_scope = self.scope;
            let saved_file = self.file;
            self.scope = self.table.symbol(id).parent.unwrap_or_else(|| self.table.root());
            self.file = file;
            let ty = self.resolve_type_expr(unit.ast, target);
            self.table.symbol_mut(id).set_value_type(ty);
            self.scope = saved_scope;
            self.file = saved_file;
        }
    }

    /// Walk every unit resolving declaration signatures: base classes,
    /// function parameter/return types, field and property types, and
    /// enum payloads. Mirrors the builder's scope discipline.
    fn resolve_declaration_signatures(&mut self) {
        for unit in self.units {
            self.file = unit.file;
            self.scope = self.table.root();
            for &stmt in &unit.unit.statements {
                self.declare_stmt(unit.ast, stmt);
            }
        }
    }

    fn declare_stmt(&mut self, ast: &Ast, id: StmtId) {
        let saved = self.scope;
        if let Some(&scope) = self.table.stmt_scopes.get(&(self.file, id)) {
            self.scope = scope;
        }
        match ast.stmt(id).clone() {
            Stmt::Block { statements } => {
                for &s in &statements {
                    self.declare_stmt(ast, s);
                }
            }
            Stmt::If { then_branch, else_branch, .. } => {
                self.declare_branch(ast, then_branch);
                if let Some(e) = else_branch {
                    self.declare_branch(ast, e);
                }
            }
            Stmt::While { body, .. } => self.declare_branch(ast, body),
            Stmt::For { init, body, .. } => {
                if let Some(init) = init {
                    self.declare_stmt(ast, init);
                }
                self.declare_branch(ast, body);
            }
            Stmt::Missing { partial, .. } => {
                for &s in &partial {
                    self.declare_stmt(ast, s);
                }
            }
            Stmt::NamespaceDecl { file_scoped, body, .. } => {
                let Some(&ns) = self.table.ast_to_symbol.get(&(self.file, id)) else {
                    self.scope = saved;
                    return;
                };
                self.scope = ns;
                for &s in body.unwrap_or_default().iter() {
                    self.declare_stmt(ast, s);
                }
                if file_scoped {
                    // Stay inside for the remainder of the file.
                    return;
                }
            }
            Stmt::TypeDecl { base_types, members, .. } => {
                let Some(&sym) = self.table.ast_to_symbol.get(&(self.file, id)) else {
                    self.scope = saved;
                    return;
                };
                self.scope = sym;
                self.declare_base_types(ast, sym, &base_types);
                for &member in &members {
                    self.declare_stmt(ast, member);
                }
            }
            Stmt::FunctionDecl { params, return_ty, body, .. } => {
                let Some(&sym) = self.table.ast_to_symbol.get(&(self.file, id)) else {
                    self.scope = saved;
                    return;
                };
                self.scope = sym;
                self.declare_function_signature(ast, sym, &params, return_ty, false);
                if let Some(body) = body {
                    self.declare_branch(ast, body);
                }
            }
            Stmt::ConstructorDecl { params, body, .. } => {
                let Some(&sym) = self.table.ast_to_symbol.get(&(self.file, id)) else {
                    self.scope = saved;
                    return;
                };
                self.scope = sym;
                self.declare_function_signature(ast, sym, &params, None, true);
                self.declare_branch(ast, body);
            }
            Stmt::VarDecl { variable, .. } => {
                // Fields and typed locals get their declared type now;
                // untyped locals are inferred during the body visit.
                let symbol = self.table.ast_to_symbol.get(&(self.file, id)).copied();
                if let (Some(sym), Some(ty_expr)) = (symbol, variable.ty) {
                    let ty = self.resolve_type_expr(ast, ty_expr);
                    self.table.symbol_mut(sym).set_value_type(ty);
                }
            }
            Stmt::PropertyDecl { variable, .. } => {
                let Some(&prop) = self.table.ast_to_symbol.get(&(self.file, id)) else {
                    self.scope = saved;
                    return;
                };
                let ty = match variable.ty {
                    Some(t) => self.resolve_type_expr(ast, t),
                    None => self.infer.fresh_var(self.ts),
                };
                self.table.symbol_mut(prop).set_value_type(ty);
                // The getter returns the property type; the setter takes
                // an implicit `value` of it and returns void.
                let void = self.ts.void();
                for &accessor in self.table.symbol(prop).members.clone().iter() {
                    let accessor_sym = self.table.symbol(accessor);
                    let is_get = accessor_sym.name == "get";
                    let params = accessor_sym
                        .as_function()
                        .map(|f| f.parameters.clone())
                        .unwrap_or_default();
                    for &param in &params {
                        self.table.symbol_mut(param).set_value_type(ty);
                    }
                    if let SymbolData::Function(data) = &mut self.table.symbol_mut(accessor).data {
                        data.return_type = Some(if is_get { ty } else { void });
                    }
                }
            }
            Stmt::EnumCaseDecl { payload, .. } => {
                let Some(&case) = self.table.ast_to_symbol.get(&(self.file, id)) else {
                    self.scope = saved;
                    return;
                };
                let mut associated = Vec::new();
                for &param in &payload {
                    if let Stmt::ParamDecl { param: typed, .. } = ast.stmt(param).clone() {
                        let ty = match typed.ty {
                            Some(t) => self.resolve_type_expr(ast, t),
                            None => self.infer.fresh_var(self.ts),
                        };
                        associated.push(ty);
                    }
                }
                if let SymbolData::EnumCase(data) = &mut self.table.symbol_mut(case).data {
                    data.associated_types = associated;
                }
            }
            _ => {}
        }
        self.scope = saved;
    }

    fn declare_branch(&mut self, ast: &Ast, id: StmtId) {
        let saved = self.scope;
        if let Some(&scope) = self.table.stmt_scopes.get(&(self.file, id)) {
            self.scope = scope;
        }
        if let Stmt::Block { statements } = ast.stmt(id).clone() {
            for &s in &statements {
                self.declare_stmt(ast, s);
            }
        } else {
            self.declare_stmt(ast, id);
        }
        self.scope = saved;
    }

    fn declare_base_types(&mut self, ast: &Ast, sym: SymbolId, base_types: &[ExprId]) {
        let mut base_class = None;
        let mut interfaces = Vec::new();
        for (i, &base) in base_types.iter().enumerate() {
            let ty = self.resolve_type_expr(ast, base);
            let def = match self.ts.get(ty) {
                Type::Named(def) => Some(*def),
                Type::Generic { definition, .. } => Some(*definition),
                _ => None,
            };
            match def {
                Some(def) if i == 0 => base_class = Some(def),
                Some(def) => interfaces.push(def),
                None => {
                    if !matches!(ast.expr(base), Expr::Missing { .. }) {
                        let name = type_text(ast, base);
                        self.errors.push(SemaError::UnknownType {
                            name,
                            range: ast.expr_range(base),
                        });
                    }
                }
            }
        }
        if let SymbolData::Type(data) = &mut self.table.symbol_mut(sym).data {
            data.base_class = base_class;
            data.interfaces = interfaces;
        }
    }

    fn declare_function_signature(
        &mut self,
        ast: &Ast,
        sym: SymbolId,
        params: &[StmtId],
        return_ty: Option<ExprId>,
        is_constructor: bool,
    ) {
        for &param in params {
            let Some(&param_sym) = self.table.ast_to_symbol.get(&(self.file, param)) else {
                continue;
            };
            if self.table.symbol(param_sym).value_type().is_some() {
                continue;
            }
            let ty = match ast.stmt(param).clone() {
                Stmt::ParamDecl { param: typed, .. } => match typed.ty {
                    Some(t) => self.resolve_type_expr(ast, t),
                    None => self.infer.fresh_var(self.ts),
                },
                _ => self.infer.fresh_var(self.ts),
            };
            self.table.symbol_mut(param_sym).set_value_type(ty);
        }

        let ret = if is_constructor {
            self.ts.void()
        } else {
            match return_ty {
                Some(expr) => self.resolve_type_expr(ast, expr),
                None => self.ts.void(),
            }
        };
        if let SymbolData::Function(data) = &mut self.table.symbol_mut(sym).data {
            data.return_type = Some(ret);
        }
    }

    // ── Type expression resolution ─────────────────────────────────────

    fn resolve_type_expr(&mut self, ast: &Ast, id: ExprId) -> TypeId {
        let range = ast.expr_range(id);
        match ast.expr(id).clone() {
            Expr::Name { ident } => {
                if let Some(prim) = self.ts.primitive_by_name(&ident) {
                    return prim;
                }
                match self.table.resolve_from(self.scope, &ident) {
                    Some(sym) => self.type_of_type_symbol(sym, &ident, range),
                    None => {
                        self.errors.push(SemaError::UnknownType { name: ident, range });
                        self.error_var()
                    }
                }
            }
            Expr::QualifiedName { .. } => {
                let path = qualified_path(ast, id);
                match path.and_then(|p| self.table.resolve_path(self.scope, &p)) {
                    Some(sym) => {
                        let name = self.table.symbol(sym).name.clone();
                        self.type_of_type_symbol(sym, &name, range)
                    }
                    None => {
                        self.errors.push(SemaError::UnknownType {
                            name: type_text(ast, id),
                            range,
                        });
                        self.error_var()
                    }
                }
            }
            Expr::GenericName { base, type_args } => {
                let def = match ast.expr(base).clone() {
                    Expr::Name { ident } => self.table.resolve_from(self.scope, &ident),
                    Expr::QualifiedName { .. } => {
                        qualified_path(ast, base).and_then(|p| self.table.resolve_path(self.scope, &p))
                    }
                    _ => None,
                };
                let Some(def) = def.filter(|&d| matches!(self.table.symbol(d).data, SymbolData::Type(_)))
                else {
                    self.errors.push(SemaError::UnknownType {
                        name: type_text(ast, base),
                        range,
                    });
                    return self.error_var();
                };
                let expected = self
                    .table
                    .symbol(def)
                    .as_type()
                    .map(|t| t.type_params.len())
                    .unwrap_or(0);
                if expected != type_args.len() {
                    self.errors.push(SemaError::GenericArityMismatch {
                        name: self.table.symbol(def).name.clone(),
                        expected,
                        found: type_args.len(),
                        range,
                    });
                }
                let args: Vec<TypeId> = type_args
                    .iter()
                    .map(|&a| self.resolve_type_expr(ast, a))
                    .collect();
                self.ts.generic(def, args)
            }
            Expr::PointerType { pointee } => {
                let p = self.resolve_type_expr(ast, pointee);
                self.ts.pointer(p)
            }
            Expr::ArrayType { element, size } => {
                let elem = self.resolve_type_expr(ast, element);
                let fixed = match size {
                    Some(s) => match ast.expr(s) {
                        Expr::Literal { text, .. } => text.parse::<i32>().unwrap_or(-1),
                        _ => -1,
                    },
                    None => -1,
                };
                self.ts.array(elem, fixed)
            }
            Expr::FunctionType { params, ret } => {
                let param_tys: Vec<TypeId> =
                    params.iter().map(|&p| self.resolve_type_expr(ast, p)).collect();
                let ret_ty = match ret {
                    Some(r) => self.resolve_type_expr(ast, r),
                    None => self.ts.void(),
                };
                self.ts.function(ret_ty, param_tys)
            }
            // Recovery placeholders resolve silently to a fresh variable.
            Expr::Missing { .. } => self.error_var(),
            _ => {
                self.errors.push(SemaError::UnknownType {
                    name: type_text(ast, id),
                    range,
                });
                self.error_var()
            }
        }
    }

    fn type_of_type_symbol(&mut self, sym: SymbolId, name: &str, range: SourceRange) -> TypeId {
        enum Found {
            Definition(Option<TypeId>),
            Carried(Option<TypeId>),
            NotAType,
        }
        let found = match &self.table.symbol(sym).data {
            SymbolData::Type(data) => Found::Definition(data.ty),
            SymbolData::TypeParameter(data) => Found::Carried(data.ty),
            SymbolData::Alias(data) => Found::Carried(data.ty),
            _ => Found::NotAType,
        };
        match found {
            Found::Definition(Some(ty)) | Found::Carried(Some(ty)) => ty,
            Found::Definition(None) => self.ts.named(sym),
            Found::Carried(None) => self.error_var(),
            Found::NotAType => {
                self.errors.push(SemaError::UnknownType { name: name.to_string(), range });
                self.error_var()
            }
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        // File-scoped namespaces manage the scope cursor themselves: the
        // namespace stays entered for the remainder of the file.
        if matches!(ast.stmt(id), Stmt::NamespaceDecl { file_scoped: true, .. }) {
            self.visit_stmt_inner(ast, id);
            return;
        }
        let saved = self.scope;
        if let Some(&scope) = self.table.stmt_scopes.get(&(self.file, id)) {
            self.scope = scope;
        }
        self.visit_stmt_inner(ast, id);
        self.scope = saved;
    }

    fn visit_stmt_inner(&mut self, ast: &Ast, id: StmtId) {
        match ast.stmt(id).clone() {
            Stmt::Block { statements } => {
                for &s in &statements {
                    self.visit_stmt(ast, s);
                }
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.check_condition(ast, condition, "if condition");
                self.visit_stmt(ast, then_branch);
                if let Some(e) = else_branch {
                    self.visit_stmt(ast, e);
                }
            }
            Stmt::While { condition, body } => {
                self.check_condition(ast, condition, "while condition");
                self.visit_stmt(ast, body);
            }
            Stmt::For { init, condition, updates, body } => {
                if let Some(init) = init {
                    self.visit_stmt(ast, init);
                }
                if let Some(condition) = condition {
                    self.check_condition(ast, condition, "for condition");
                }
                for &update in &updates {
                    self.visit_expr(ast, update);
                }
                self.visit_stmt(ast, body);
            }
            Stmt::Return { value } => {
                let Some(&expected) = self.fn_return_stack.last() else {
                    // `return` outside a function was already reported by
                    // the parser.
                    if let Some(value) = value {
                        self.visit_expr(ast, value);
                    }
                    return;
                };
                let found = match value {
                    Some(value) => self.visit_expr(ast, value),
                    None => self.ts.void(),
                };
                let range = ast.stmt_range(id);
                self.unify_expect(expected, found, range, "return value");
            }
            Stmt::Break | Stmt::Continue => {}
            Stmt::Expr { expr } => {
                self.visit_expr(ast, expr);
            }
            Stmt::Using { .. } => {}
            Stmt::Missing { partial, .. } => {
                // Recovery placeholders: no constraints, no extra errors.
                for &s in &partial {
                    self.visit_stmt(ast, s);
                }
            }
            Stmt::VarDecl { variable, initializer, .. } => {
                let symbol = self.table.ast_to_symbol.get(&(self.file, id)).copied();
                let declared = symbol.and_then(|s| self.table.symbol(s).value_type());
                let declared = match declared {
                    Some(ty) => ty,
                    None => {
                        // `var` with no annotation: the variable's type is
                        // the initializer's, or a fresh variable awaiting
                        // later constraint.
                        let ty = self.infer.fresh_var(self.ts);
                        if let Some(sym) = symbol {
                            self.table.symbol_mut(sym).set_value_type(ty);
                        }
                        ty
                    }
                };
                if let Some(init) = initializer {
                    let found = self.visit_expr(ast, init);
                    let range = ast.expr_range(init);
                    self.unify_expect(declared, found, range, "variable initializer");
                }
            }
            Stmt::PropertyDecl { getter, setter, .. } => {
                let Some(&prop) = self.table.ast_to_symbol.get(&(self.file, id)) else { return };
                let prop_ty = self
                    .table
                    .symbol(prop)
                    .value_type()
                    .unwrap_or_else(|| self.infer.fresh_var(self.ts));
                let void = self.ts.void();
                for accessor in [getter, setter].into_iter().flatten() {
                    let name = match accessor.kind {
                        AccessorKind::Get => "get",
                        AccessorKind::Set => "set",
                    };
                    let Some(&func) = self.table.members_named(prop, name).first() else {
                        continue;
                    };
                    let saved = self.scope;
                    self.scope = func;
                    let ret = if accessor.kind == AccessorKind::Get { prop_ty } else { void };
                    self.fn_return_stack.push(ret);
                    match &accessor.body {
                        AccessorBody::Auto => {}
                        AccessorBody::Expression(expr) => {
                            let found = self.visit_expr(ast, *expr);
                            if accessor.kind == AccessorKind::Get {
                                let range = ast.expr_range(*expr);
                                self.unify_expect(prop_ty, found, range, "getter value");
                            }
                        }
                        AccessorBody::Block(block) => self.visit_stmt(ast, *block),
                    }
                    self.fn_return_stack.pop();
                    self.scope = saved;
                }
            }
            Stmt::ParamDecl { .. } => {}
            Stmt::FunctionDecl { params, body, .. } => {
                let Some(&func) = self.table.ast_to_symbol.get(&(self.file, id)) else { return };
                let saved = self.scope;
                self.scope = func;

                // Parameter defaults unify with the declared types.
                for &param in &params {
                    if let Stmt::ParamDecl { default: Some(default), .. } = ast.stmt(param).clone()
                    {
                        let found = self.visit_expr(ast, default);
                        if let Some(param_ty) = self
                            .table
                            .ast_to_symbol
                            .get(&(self.file, param))
                            .and_then(|&p| self.table.symbol(p).value_type())
                        {
                            let range = ast.expr_range(default);
                            self.unify_expect(param_ty, found, range, "parameter default");
                        }
                    }
                }

                let ret = self
                    .table
                    .symbol(func)
                    .as_function()
                    .and_then(|f| f.return_type)
                    .unwrap_or_else(|| self.ts.void());
                self.fn_return_stack.push(ret);
                if let Some(body) = body {
                    if let Stmt::Block { statements } = ast.stmt(body).clone() {
                        for &s in &statements {
                            self.visit_stmt(ast, s);
                        }
                    } else {
                        self.visit_stmt(ast, body);
                    }
                }
                self.fn_return_stack.pop();
                self.scope = saved;
            }
            Stmt::ConstructorDecl { body, .. } => {
                let Some(&func) = self.table.ast_to_symbol.get(&(self.file, id)) else { return };
                let saved = self.scope;
                self.scope = func;
                let void = self.ts.void();
                self.fn_return_stack.push(void);
                if let Stmt::Block { statements } = ast.stmt(body).clone() {
                    for &s in &statements {
                        self.visit_stmt(ast, s);
                    }
                }
                self.fn_return_stack.pop();
                self.scope = saved;
            }
            Stmt::EnumCaseDecl { .. } | Stmt::TypeParamDecl { .. } => {}
            Stmt::TypeDecl { members, .. } => {
                let Some(&sym) = self.table.ast_to_symbol.get(&(self.file, id)) else { return };
                let saved = self.scope;
                self.scope = sym;
                for &member in &members {
                    self.visit_stmt(ast, member);
                }
                self.scope = saved;
            }
            Stmt::NamespaceDecl { file_scoped, body, .. } => {
                let Some(&ns) = self.table.ast_to_symbol.get(&(self.file, id)) else { return };
                self.scope = ns;
                for &s in body.unwrap_or_default().iter() {
                    self.visit_stmt(ast, s);
                }
                if !file_scoped {
                    self.scope = self.table.symbol(ns).parent.unwrap_or_else(|| self.table.root());
                }
            }
        }
    }

    fn check_condition(&mut self, ast: &Ast, cond: ExprId, context: &str) {
        let found = self.visit_expr(ast, cond);
        let expected = self.ts.bool_type();
        let range = ast.expr_range(cond);
        self.unify_expect(expected, found, range, context);
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn visit_expr(&mut self, ast: &Ast, id: ExprId) -> TypeId {
        let key = (self.file, id);
        if let Some(&cached) = self.expr_types.get(&key) {
            return self.infer.apply(cached, self.ts);
        }
        let ty = self.compute_expr_type(ast, id);
        self.expr_types.insert(key, ty);
        ty
    }

    fn compute_expr_type(&mut self, ast: &Ast, id: ExprId) -> TypeId {
        let key = (self.file, id);
        let range = ast.expr_range(id);
        match ast.expr(id).clone() {
            Expr::Literal { kind, .. } => self.literal_type(kind),
            Expr::ArrayLiteral { elements } => {
                let elem = self.infer.fresh_var(self.ts);
                for &e in &elements {
                    let found = self.visit_expr(ast, e);
                    let r = ast.expr_range(e);
                    self.unify_expect(elem, found, r, "array element");
                }
                self.ts.array(elem, elements.len() as i32)
            }
            Expr::Name { ident } => self.name_type(&ident, key, range),
            Expr::QualifiedName { .. } | Expr::GenericName { .. } => {
                // Type syntax reaching expression position (e.g. inside
                // `typeof`) resolves as a type.
                self.resolve_type_expr(ast, id)
            }
            Expr::This => self.this_type(range),
            Expr::Paren { inner } => {
                let ty = self.visit_expr(ast, inner);
                if self.lvalues.contains(&(self.file, inner)) {
                    self.lvalues.insert(key);
                }
                ty
            }
            Expr::Unary { op, operand, postfix } => {
                self.unary_type(ast, op, operand, postfix, key, range)
            }
            Expr::Binary { left, op, right } => self.binary_type(ast, op, left, right, range),
            Expr::Assign { target, value, .. } => {
                let target_ty = self.visit_expr(ast, target);
                let value_ty = self.visit_expr(ast, value);
                if !self.lvalues.contains(&(self.file, target)) {
                    self.errors.push(SemaError::NotLvalue { range: ast.expr_range(target) });
                }
                self.unify_expect(target_ty, value_ty, range, "assignment");
                if self.lvalues.contains(&(self.file, target)) {
                    self.lvalues.insert(key);
                }
                target_ty
            }
            Expr::Conditional { condition, then_value, else_value } => {
                self.check_condition_expr(ast, condition);
                let then_ty = self.visit_expr(ast, then_value);
                let else_ty = self.visit_expr(ast, else_value);
                self.unify_sym(then_ty, else_ty, range, "conditional branches");
                self.infer.apply(then_ty, self.ts)
            }
            Expr::MemberAccess { object, member, member_range } => {
                self.member_access_type(ast, object, &member, key, member_range)
            }
            Expr::Index { object, index } => self.index_type(ast, object, index, key, range),
            Expr::Call { callee, args } => self.call_type(ast, callee, &args, key, range),
            Expr::New { ty, args } => self.new_type(ast, ty, &args, range),
            Expr::Cast { target_ty, value } => self.cast_type(ast, target_ty, value, range),
            Expr::Lambda { params, body } => self.lambda_type(ast, id, &params, &body),
            Expr::TypeOf { ty } => {
                self.resolve_type_expr(ast, ty);
                // The runtime type handle is an opaque pointer.
                let void = self.ts.void();
                self.ts.pointer(void)
            }
            Expr::SizeOf { ty } => {
                self.resolve_type_expr(ast, ty);
                self.ts.u64_type()
            }
            Expr::Range { start, end, .. } => {
                let start_ty = self.visit_expr(ast, start);
                let end_ty = self.visit_expr(ast, end);
                self.unify_sym(start_ty, end_ty, range, "range bounds");
                let elem = self.infer.apply(start_ty, self.ts);
                self.require_integral(elem, "..", range);
                self.ts.range(elem)
            }
            Expr::ImplicitMember { member } => {
                let expected = self.infer.fresh_var(self.ts);
                self.pending_implicit.push(PendingImplicit {
                    file: self.file,
                    expr: id,
                    expected,
                    member,
                    range,
                });
                expected
            }
            Expr::ArrayType { .. } | Expr::PointerType { .. } | Expr::FunctionType { .. } => {
                self.resolve_type_expr(ast, id)
            }
            // Recovery placeholder: no constraints, no further errors.
            Expr::Missing { .. } => self.error_var(),
        }
    }

    fn literal_type(&mut self, kind: quill_parser::ast::LiteralKind) -> TypeId {
        use quill_parser::ast::LiteralKind::*;
        match kind {
            Int => self.infer.fresh_int_literal(self.ts),
            Long => self.ts.i64_type(),
            Float => self.ts.f32_type(),
            Double => self.infer.fresh_float_literal(self.ts),
            String => self.ts.string_type(),
            Char => self.ts.char_type(),
            Bool => self.ts.bool_type(),
            Null => {
                // A null literal is some pointer; the pointee unifies with
                // the usage context.
                let v = self.infer.fresh_var(self.ts);
                self.ts.pointer(v)
            }
        }
    }

    fn name_type(&mut self, ident: &str, key: (FileId, ExprId), range: SourceRange) -> TypeId {
        let Some(sym) = self.table.resolve_from(self.scope, ident) else {
            self.errors.push(SemaError::UnknownIdentifier { name: ident.to_string(), range });
            return self.error_var();
        };
        self.expr_symbols.insert(key, sym);
        match &self.table.symbol(sym).data {
            SymbolData::Field(_) | SymbolData::Parameter(_) | SymbolData::Local(_) => {
                self.lvalues.insert(key);
                match self.table.symbol(sym).value_type() {
                    Some(ty) => ty,
                    None => {
                        let ty = self.infer.fresh_var(self.ts);
                        self.table.symbol_mut(sym).set_value_type(ty);
                        ty
                    }
                }
            }
            SymbolData::Property(data) => {
                if data.has_setter {
                    self.lvalues.insert(key);
                }
                data.ty.unwrap_or_else(|| self.infer.fresh_var(self.ts))
            }
            SymbolData::Function(_) => self.function_value_type(sym),
            SymbolData::Type(data) => data.ty.unwrap_or_else(|| self.ts.named(sym)),
            SymbolData::EnumCase(_) => self.enum_case_type(sym),
            SymbolData::TypeParameter(data) => {
                data.ty.unwrap_or_else(|| self.infer.fresh_var(self.ts))
            }
            SymbolData::Alias(data) => data.ty.unwrap_or_else(|| self.infer.fresh_var(self.ts)),
            // Namespaces have no value type; member access goes through
            // the recorded symbol instead.
            SymbolData::Namespace(_) | SymbolData::Block => self.ts.void(),
        }
    }

    fn function_value_type(&mut self, sym: SymbolId) -> TypeId {
        let Some(data) = self.table.symbol(sym).as_function() else {
            return self.infer.fresh_var(self.ts);
        };
        let params: Vec<TypeId> = data
            .parameters
            .clone()
            .iter()
            .map(|&p| {
                self.table
                    .symbol(p)
                    .value_type()
                    .unwrap_or_else(|| self.infer.fresh_var(self.ts))
            })
            .collect();
        let ret = data.return_type.unwrap_or_else(|| self.ts.void());
        self.ts.function(ret, params)
    }

    fn enum_case_type(&mut self, case: SymbolId) -> TypeId {
        let parent = self.table.symbol(case).parent;
        parent
            .and_then(|p| self.table.symbol(p).value_type())
            .unwrap_or_else(|| self.infer.fresh_var(self.ts))
    }

    fn this_type(&mut self, range: SourceRange) -> TypeId {
        let enclosing = self
            .table
            .enclosing(self.scope, |s| matches!(s.data, SymbolData::Type(_)));
        match enclosing {
            Some(ty_sym) => self
                .table
                .symbol(ty_sym)
                .value_type()
                .unwrap_or_else(|| self.infer.fresh_var(self.ts)),
            None => {
                self.errors.push(SemaError::ThisOutsideType { range });
                self.error_var()
            }
        }
    }

    fn unary_type(
        &mut self,
        ast: &Ast,
        op: UnaryOp,
        operand: ExprId,
        _postfix: bool,
        key: (FileId, ExprId),
        range: SourceRange,
    ) -> TypeId {
        let operand_ty = self.visit_expr(ast, operand);
        let operand_key = (self.file, operand);
        match op {
            UnaryOp::Plus | UnaryOp::Minus => {
                self.require_numeric(operand_ty, op.symbol(), range);
                operand_ty
            }
            UnaryOp::Not => {
                let b = self.ts.bool_type();
                self.unify_expect(b, operand_ty, range, "logical negation");
                b
            }
            UnaryOp::BitwiseNot => {
                self.require_integral(operand_ty, op.symbol(), range);
                operand_ty
            }
            UnaryOp::Increment | UnaryOp::Decrement => {
                if !self.lvalues.contains(&operand_key) {
                    self.errors.push(SemaError::NotLvalue { range });
                }
                self.require_integral(operand_ty, op.symbol(), range);
                operand_ty
            }
            UnaryOp::AddressOf => self.ts.pointer(operand_ty),
            UnaryOp::Dereference => {
                self.lvalues.insert(key);
                let applied = self.infer.apply(operand_ty, self.ts);
                match self.ts.get(applied).clone() {
                    Type::Pointer(p) => p,
                    Type::Unresolved(_) => {
                        let pointee = self.infer.fresh_var(self.ts);
                        let ptr = self.ts.pointer(pointee);
                        self.unify_sym(applied, ptr, range, "dereference");
                        pointee
                    }
                    _ => {
                        let found = self.table.display_type(self.ts, applied);
                        self.errors.push(SemaError::TypeMismatch {
                            expected: "a pointer".into(),
                            found,
                            context: "dereference".into(),
                            range,
                        });
                        self.error_var()
                    }
                }
            }
        }
    }

    fn binary_type(
        &mut self,
        ast: &Ast,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        range: SourceRange,
    ) -> TypeId {
        let left_ty = self.visit_expr(ast, left);
        let right_ty = self.visit_expr(ast, right);
        use BinaryOp::*;
        match op {
            Add | Subtract | Multiply | Divide | Modulo => {
                self.unify_sym(left_ty, right_ty, range, "binary operands");
                let result = self.infer.apply(left_ty, self.ts);
                self.require_numeric(result, op.symbol(), range);
                result
            }
            Equals | NotEquals | Less | LessEqual | Greater | GreaterEqual => {
                self.unify_sym(left_ty, right_ty, range, "comparison operands");
                self.ts.bool_type()
            }
            LogicalAnd | LogicalOr => {
                let b = self.ts.bool_type();
                self.unify_expect(b, left_ty, ast.expr_range(left), "logical operand");
                self.unify_expect(b, right_ty, ast.expr_range(right), "logical operand");
                b
            }
            BitwiseAnd | BitwiseOr | BitwiseXor | LeftShift | RightShift => {
                self.unify_sym(left_ty, right_ty, range, "bitwise operands");
                let result = self.infer.apply(left_ty, self.ts);
                self.require_integral(result, op.symbol(), range);
                result
            }
            Coalesce => {
                self.unify_sym(left_ty, right_ty, range, "null-coalescing operands");
                self.infer.apply(left_ty, self.ts)
            }
        }
    }

    fn check_condition_expr(&mut self, ast: &Ast, cond: ExprId) {
        let found = self.visit_expr(ast, cond);
        let b = self.ts.bool_type();
        self.unify_expect(b, found, ast.expr_range(cond), "condition");
    }

    fn member_access_type(
        &mut self,
        ast: &Ast,
        object: ExprId,
        member: &str,
        key: (FileId, ExprId),
        range: SourceRange,
    ) -> TypeId {
        let object_ty = self.visit_expr(ast, object);
        let object_key = (self.file, object);

        // Static access through a namespace or type name.
        if let Some(&obj_sym) = self.expr_symbols.get(&object_key) {
            if matches!(
                self.table.symbol(obj_sym).data,
                SymbolData::Namespace(_) | SymbolData::Type(_)
            ) && !self.lvalues.contains(&object_key)
            {
                return self.static_member_type(obj_sym, member, key, range);
            }
        }

        self.instance_member_type(object_ty, member, key, range, true)
    }

    fn static_member_type(
        &mut self,
        container: SymbolId,
        member: &str,
        key: (FileId, ExprId),
        range: SourceRange,
    ) -> TypeId {
        let Some(&sym) = self.table.members_named(container, member).first() else {
            self.errors.push(SemaError::NoSuchMember {
                type_name: self.table.symbol(container).name.clone(),
                member: member.to_string(),
                range,
            });
            return self.error_var();
        };
        self.check_access(sym, container, member, range);
        self.expr_symbols.insert(key, sym);
        match &self.table.symbol(sym).data {
            SymbolData::Field(_) | SymbolData::Parameter(_) | SymbolData::Local(_) => {
                self.lvalues.insert(key);
                self.table
                    .symbol(sym)
                    .value_type()
                    .unwrap_or_else(|| self.infer.fresh_var(self.ts))
            }
            SymbolData::Property(data) => data.ty.unwrap_or_else(|| self.infer.fresh_var(self.ts)),
            SymbolData::Function(_) => self.function_value_type(sym),
            SymbolData::EnumCase(_) => self.enum_case_type(sym),
            SymbolData::Type(data) => data.ty.unwrap_or_else(|| self.ts.named(sym)),
            SymbolData::Namespace(_) => self.ts.void(),
            _ => self.error_var(),
        }
    }

    /// Instance member lookup, walking the base-class chain and
    /// substituting generic arguments. When `defer` is set and the object
    /// type is still a variable, the lookup is queued for a later pass.
    fn instance_member_type(
        &mut self,
        object_ty: TypeId,
        member: &str,
        key: (FileId, ExprId),
        range: SourceRange,
        defer: bool,
    ) -> TypeId {
        let applied = self.infer.apply(object_ty, self.ts);
        // Reference-type instances are pointers to the type; look through.
        let inner = match self.ts.get(applied).clone() {
            Type::Pointer(p) => self.infer.apply(p, self.ts),
            _ => applied,
        };

        let (def, subst) = match self.ts.get(inner).clone() {
            Type::Named(def) => (def, FxHashMap::default()),
            Type::Generic { definition, args } => {
                (definition, self.generic_subst(definition, &args))
            }
            Type::Unresolved(_) if defer => {
                let result = self.infer.fresh_var(self.ts);
                self.pending_members.push(PendingMember {
                    file: key.0,
                    expr: key.1,
                    object_ty: inner,
                    member: member.to_string(),
                    result,
                    range,
                });
                return result;
            }
            _ => {
                let found = self.table.display_type(self.ts, inner);
                self.errors.push(SemaError::NoSuchMember {
                    type_name: found,
                    member: member.to_string(),
                    range,
                });
                return self.error_var();
            }
        };

        let Some(sym) = self.find_member(def, member) else {
            self.errors.push(SemaError::NoSuchMember {
                type_name: self.table.symbol(def).name.clone(),
                member: member.to_string(),
                range,
            });
            return self.error_var();
        };
        self.check_access(sym, def, member, range);
        self.expr_symbols.insert(key, sym);

        let raw = match &self.table.symbol(sym).data {
            SymbolData::Field(data) => {
                self.lvalues.insert(key);
                data.ty.unwrap_or_else(|| self.infer.fresh_var(self.ts))
            }
            SymbolData::Property(data) => {
                if data.has_setter {
                    self.lvalues.insert(key);
                }
                data.ty.unwrap_or_else(|| self.infer.fresh_var(self.ts))
            }
            SymbolData::Function(_) => self.function_value_type(sym),
            _ => self.error_var(),
        };
        self.ts.substitute_params(raw, &subst)
    }

    /// Lookup a member by name on a type symbol, walking base classes.
    fn find_member(&self, def: SymbolId, member: &str) -> Option<SymbolId> {
        let mut current = Some(def);
        while let Some(ty) = current {
            if let Some(&found) = self.table.members_named(ty, member).first() {
                return Some(found);
            }
            current = self.table.symbol(ty).as_type().and_then(|t| t.base_class);
        }
        None
    }

    /// Map a generic definition's type-parameter ids to instance args.
    fn generic_subst(&mut self, def: SymbolId, args: &[TypeId]) -> FxHashMap<u32, TypeId> {
        let mut map = FxHashMap::default();
        let Some(data) = self.table.symbol(def).as_type() else { return map };
        for (&param_sym, &arg) in data.type_params.iter().zip(args) {
            if let Some(param_ty) = self.table.symbol(param_sym).value_type() {
                if let Type::TypeParam { id, .. } = self.ts.get(param_ty) {
                    map.insert(*id, arg);
                }
            }
        }
        map
    }

    /// Enforce accessibility of `member` against the current scope:
    /// private members are visible only inside their declaring container,
    /// protected ones also from derived types.
    fn check_access(&mut self, sym: SymbolId, owner: SymbolId, member: &str, range: SourceRange) {
        use crate::symbol::Accessibility;
        match self.table.symbol(sym).access {
            Accessibility::Public => {}
            Accessibility::Private => {
                if !self.scope_chain_contains(owner) {
                    self.errors.push(SemaError::MemberNotAccessible {
                        member: member.to_string(),
                        range,
                    });
                }
            }
            Accessibility::Protected => {
                let mut ok = self.scope_chain_contains(owner);
                if !ok {
                    if let Some(mut ty) = self
                        .table
                        .enclosing(self.scope, |s| matches!(s.data, SymbolData::Type(_)))
                    {
                        loop {
                            if ty == owner {
                                ok = true;
                                break;
                            }
                            match self.table.symbol(ty).as_type().and_then(|t| t.base_class) {
                                Some(base) => ty = base,
                                None => break,
                            }
                        }
                    }
                }
                if !ok {
                    self.errors.push(SemaError::MemberNotAccessible {
                        member: member.to_string(),
                        range,
                    });
                }
            }
        }
    }

    /// Whether `target` is on the current scope's parent chain.
    fn scope_chain_contains(&self, target: SymbolId) -> bool {
        let mut current = Some(self.scope);
        while let Some(id) = current {
            if id == target {
                return true;
            }
            current = self.table.symbol(id).parent;
        }
        false
    }

    fn index_type(
        &mut self,
        ast: &Ast,
        object: ExprId,
        index: ExprId,
        key: (FileId, ExprId),
        range: SourceRange,
    ) -> TypeId {
        let object_ty = self.visit_expr(ast, object);
        let index_ty = self.visit_expr(ast, index);

        // The index must be integral; unconstrained literals settle on i32.
        let applied_index = self.infer.apply(index_ty, self.ts);
        if self.ts.is_unresolved(applied_index) {
            let i32t = self.ts.i32_type();
            self.unify_expect(i32t, index_ty, ast.expr_range(index), "array index");
        } else {
            self.require_integral(applied_index, "[]", ast.expr_range(index));
        }

        self.lvalues.insert(key);
        let applied = self.infer.apply(object_ty, self.ts);
        match self.ts.get(applied).clone() {
            Type::Array { element, .. } => element,
            Type::Pointer(p) => p,
            Type::Range(e) => e,
            Type::Unresolved(_) => {
                let elem = self.infer.fresh_var(self.ts);
                let arr = self.ts.array(elem, -1);
                self.unify_sym(applied, arr, range, "indexing");
                elem
            }
            _ => {
                let found = self.table.display_type(self.ts, applied);
                self.errors.push(SemaError::NotIndexable { found, range });
                self.error_var()
            }
        }
    }

    // ── Calls ──────────────────────────────────────────────────────────

    fn call_type(
        &mut self,
        ast: &Ast,
        callee: ExprId,
        args: &[ExprId],
        _key: (FileId, ExprId),
        range: SourceRange,
    ) -> TypeId {
        let arg_tys: Vec<TypeId> = args.iter().map(|&a| self.visit_expr(ast, a)).collect();
        let arg_ranges: Vec<SourceRange> = args.iter().map(|&a| ast.expr_range(a)).collect();

        match ast.expr(callee).clone() {
            Expr::Name { ident } => {
                let candidates = self.table.functions_named(self.scope, &ident);
                if candidates.is_empty() {
                    // A variable holding a function value is still callable.
                    if self.table.resolve_from(self.scope, &ident).is_some() {
                        return self.call_through_value(ast, callee, &arg_tys, range);
                    }
                    self.errors.push(SemaError::UnknownFunction { name: ident, range });
                    return self.error_var();
                }
                self.dispatch_call(&candidates, &ident, &arg_tys, &arg_ranges, callee, range, &FxHashMap::default())
            }
            Expr::MemberAccess { object, member, member_range } => {
                self.method_call(ast, callee, object, &member, member_range, &arg_tys, &arg_ranges, range)
            }
            Expr::GenericName { base, type_args } => {
                // Explicit type arguments on a function: resolve the base
                // candidates and substitute before matching.
                let explicit: Vec<TypeId> =
                    type_args.iter().map(|&a| self.resolve_type_expr(ast, a)).collect();
                match ast.expr(base).clone() {
                    Expr::Name { ident } => {
                        let candidates = self.table.functions_named(self.scope, &ident);
                        if candidates.is_empty() {
                            self.errors.push(SemaError::UnknownFunction { name: ident, range });
                            return self.error_var();
                        }
                        let subst = self.explicit_subst(&candidates, &explicit);
                        self.dispatch_call(&candidates, &ident, &arg_tys, &arg_ranges, callee, range, &subst)
                    }
                    _ => self.call_through_value(ast, callee, &arg_tys, range),
                }
            }
            _ => self.call_through_value(ast, callee, &arg_tys, range),
        }
    }

    /// Build an explicit-type-argument substitution for a single
    /// candidate with matching type-parameter count.
    fn explicit_subst(
        &mut self,
        candidates: &[SymbolId],
        explicit: &[TypeId],
    ) -> FxHashMap<u32, TypeId> {
        let mut map = FxHashMap::default();
        for &c in candidates {
            let Some(data) = self.table.symbol(c).as_function() else { continue };
            if data.type_params.len() != explicit.len() {
                continue;
            }
            for (&param_sym, &arg) in data.type_params.clone().iter().zip(explicit) {
                if let Some(param_ty) = self.table.symbol(param_sym).value_type() {
                    if let Type::TypeParam { id, .. } = self.ts.get(param_ty) {
                        map.insert(*id, arg);
                    }
                }
            }
            break;
        }
        map
    }

    #[allow(clippy::too_many_arguments)]
    fn method_call(
        &mut self,
        ast: &Ast,
        callee: ExprId,
        object: ExprId,
        member: &str,
        member_range: SourceRange,
        arg_tys: &[TypeId],
        arg_ranges: &[SourceRange],
        range: SourceRange,
    ) -> TypeId {
        let object_ty = self.visit_expr(ast, object);
        let object_key = (self.file, object);

        // Static call through a namespace or type name.
        if let Some(&obj_sym) = self.expr_symbols.get(&object_key) {
            if matches!(
                self.table.symbol(obj_sym).data,
                SymbolData::Namespace(_) | SymbolData::Type(_)
            ) && !self.lvalues.contains(&object_key)
            {
                let candidates: Vec<SymbolId> = self
                    .table
                    .members_named(obj_sym, member)
                    .iter()
                    .copied()
                    .filter(|&s| matches!(self.table.symbol(s).data, SymbolData::Function(_)))
                    .collect();
                if candidates.is_empty() {
                    self.errors.push(SemaError::NoSuchMember {
                        type_name: self.table.symbol(obj_sym).name.clone(),
                        member: member.to_string(),
                        range: member_range,
                    });
                    return self.error_var();
                }
                return self.dispatch_call(
                    &candidates,
                    member,
                    arg_tys,
                    arg_ranges,
                    callee,
                    range,
                    &FxHashMap::default(),
                );
            }
        }

        // Instance call: find the receiver's type symbol.
        let applied = self.infer.apply(object_ty, self.ts);
        let inner = match self.ts.get(applied).clone() {
            Type::Pointer(p) => self.infer.apply(p, self.ts),
            _ => applied,
        };
        let (def, subst) = match self.ts.get(inner).clone() {
            Type::Named(def) => (def, FxHashMap::default()),
            Type::Generic { definition, args } => {
                (definition, self.generic_subst(definition, &args))
            }
            _ => {
                // The receiver type is not known yet; type the call as the
                // deferred member's type (a variable) without arguments.
                return self.instance_member_type(
                    object_ty,
                    member,
                    (self.file, callee),
                    member_range,
                    true,
                );
            }
        };

        let mut candidates = Vec::new();
        let mut current = Some(def);
        while let Some(ty) = current {
            for &m in self.table.members_named(ty, member) {
                if matches!(self.table.symbol(m).data, SymbolData::Function(_)) {
                    candidates.push(m);
                }
            }
            current = self.table.symbol(ty).as_type().and_then(|t| t.base_class);
        }
        if candidates.is_empty() {
            self.errors.push(SemaError::NoSuchMember {
                type_name: self.table.symbol(def).name.clone(),
                member: member.to_string(),
                range: member_range,
            });
            return self.error_var();
        }
        self.dispatch_call(&candidates, member, arg_tys, arg_ranges, callee, range, &subst)
    }

    /// Pick an overload, unify arguments against its parameters, and
    /// produce the (substituted) return type.
    #[allow(clippy::too_many_arguments)]
    fn dispatch_call(
        &mut self,
        candidates: &[SymbolId],
        name: &str,
        arg_tys: &[TypeId],
        arg_ranges: &[SourceRange],
        callee: ExprId,
        range: SourceRange,
        subst: &FxHashMap<u32, TypeId>,
    ) -> TypeId {
        let chosen = if candidates.len() == 1 {
            let c = candidates[0];
            let arity = self
                .table
                .symbol(c)
                .as_function()
                .map(|f| f.parameters.len())
                .unwrap_or(0);
            if arity != arg_tys.len() {
                self.errors.push(SemaError::ArityMismatch {
                    expected: arity,
                    found: arg_tys.len(),
                    range,
                });
                return self.error_var();
            }
            c
        } else {
            // Rank with literal defaults applied so `f(1)` prefers the
            // i32 overload and `f(1.0)` the f64 one.
            let ranking: Vec<TypeId> =
                arg_tys.iter().map(|&t| self.ranking_type(t)).collect();
            match resolve_overload(candidates, &ranking, self.ts, self.table) {
                OverloadOutcome::Selected(c) => c,
                OverloadOutcome::Ambiguous => {
                    self.errors.push(SemaError::AmbiguousOverload {
                        name: name.to_string(),
                        range,
                    });
                    return self.error_var();
                }
                OverloadOutcome::NoMatch => {
                    self.errors.push(SemaError::NoMatchingOverload {
                        name: name.to_string(),
                        range,
                    });
                    return self.error_var();
                }
            }
        };

        self.expr_symbols.insert((self.file, callee), chosen);

        // Instantiate the signature: receiver/explicit substitution plus
        // fresh variables for the function's own type parameters.
        let mut subst = subst.clone();
        if let Some(data) = self.table.symbol(chosen).as_function() {
            for &param_sym in data.type_params.clone().iter() {
                if let Some(param_ty) = self.table.symbol(param_sym).value_type() {
                    if let Type::TypeParam { id, .. } = self.ts.get(param_ty).clone() {
                        subst.entry(id).or_insert_with(|| self.infer.fresh_var(self.ts));
                    }
                }
            }
        }

        let params = self
            .table
            .symbol(chosen)
            .as_function()
            .map(|f| f.parameters.clone())
            .unwrap_or_default();
        for ((&param, &arg), &arg_range) in params.iter().zip(arg_tys).zip(arg_ranges) {
            let param_ty = self
                .table
                .symbol(param)
                .value_type()
                .unwrap_or_else(|| self.infer.fresh_var(self.ts));
            let param_ty = self.ts.substitute_params(param_ty, &subst);
            self.unify_expect(param_ty, arg, arg_range, "function argument");
        }

        let ret = self
            .table
            .symbol(chosen)
            .as_function()
            .and_then(|f| f.return_type)
            .unwrap_or_else(|| self.ts.void());
        self.ts.substitute_params(ret, &subst)
    }

    /// Call through a function-typed value (locals, parameters, lambdas).
    fn call_through_value(
        &mut self,
        ast: &Ast,
        callee: ExprId,
        arg_tys: &[TypeId],
        range: SourceRange,
    ) -> TypeId {
        let callee_ty = self.visit_expr(ast, callee);
        let applied = self.infer.apply(callee_ty, self.ts);
        match self.ts.get(applied).clone() {
            Type::Function { ret, params } => {
                if params.len() != arg_tys.len() {
                    self.errors.push(SemaError::ArityMismatch {
                        expected: params.len(),
                        found: arg_tys.len(),
                        range,
                    });
                    return ret;
                }
                for (&param, &arg) in params.iter().zip(arg_tys) {
                    self.unify_expect(param, arg, range, "function argument");
                }
                ret
            }
            Type::Unresolved(_) => {
                let ret = self.infer.fresh_var(self.ts);
                let expected = self.ts.function(ret, arg_tys.to_vec());
                self.unify_sym(applied, expected, range, "call target");
                ret
            }
            _ => {
                let found = self.table.display_type(self.ts, applied);
                self.errors.push(SemaError::NotCallable { found, range });
                self.error_var()
            }
        }
    }

    fn new_type(&mut self, ast: &Ast, ty_expr: ExprId, args: &[ExprId], range: SourceRange) -> TypeId {
        let ty = self.resolve_type_expr(ast, ty_expr);
        let arg_tys: Vec<TypeId> = args.iter().map(|&a| self.visit_expr(ast, a)).collect();
        let arg_ranges: Vec<SourceRange> = args.iter().map(|&a| ast.expr_range(a)).collect();

        let (def, subst) = match self.ts.get(ty).clone() {
            Type::Named(def) => (def, FxHashMap::default()),
            Type::Generic { definition, args } => {
                (definition, self.generic_subst(definition, &args))
            }
            _ => {
                if !matches!(ast.expr(ty_expr), Expr::Missing { .. }) {
                    let found = self.table.display_type(self.ts, ty);
                    self.errors.push(SemaError::NotCallable { found, range });
                }
                return self.error_var();
            }
        };

        let constructors: Vec<SymbolId> = self
            .table
            .members_named(def, "New")
            .iter()
            .copied()
            .filter(|&s| matches!(self.table.symbol(s).data, SymbolData::Function(_)))
            .collect();

        if constructors.is_empty() {
            // Types without a declared constructor get an implicit
            // zero-argument one.
            if !arg_tys.is_empty() {
                self.errors.push(SemaError::ArityMismatch {
                    expected: 0,
                    found: arg_tys.len(),
                    range,
                });
            }
        } else {
            let ranking: Vec<TypeId> = arg_tys.iter().map(|&t| self.ranking_type(t)).collect();
            let chosen = if constructors.len() == 1 {
                Some(constructors[0])
            } else {
                match resolve_overload(&constructors, &ranking, self.ts, self.table) {
                    OverloadOutcome::Selected(c) => Some(c),
                    OverloadOutcome::Ambiguous => {
                        self.errors.push(SemaError::AmbiguousOverload {
                            name: "New".into(),
                            range,
                        });
                        None
                    }
                    OverloadOutcome::NoMatch => {
                        self.errors.push(SemaError::NoMatchingOverload {
                            name: "New".into(),
                            range,
                        });
                        None
                    }
                }
            };
            if let Some(ctor) = chosen {
                let params = self
                    .table
                    .symbol(ctor)
                    .as_function()
                    .map(|f| f.parameters.clone())
                    .unwrap_or_default();
                if params.len() != arg_tys.len() {
                    self.errors.push(SemaError::ArityMismatch {
                        expected: params.len(),
                        found: arg_tys.len(),
                        range,
                    });
                } else {
                    for ((&param, &arg), &arg_range) in
                        params.iter().zip(&arg_tys).zip(&arg_ranges)
                    {
                        let param_ty = self
                            .table
                            .symbol(param)
                            .value_type()
                            .unwrap_or_else(|| self.infer.fresh_var(self.ts));
                        let param_ty = self.ts.substitute_params(param_ty, &subst);
                        self.unify_expect(param_ty, arg, arg_range, "constructor argument");
                    }
                }
            }
        }

        // Reference types construct to a pointer; value types directly.
        let is_ref = self
            .table
            .symbol(def)
            .as_type()
            .map(|t| t.is_reference_type())
            .unwrap_or(false);
        if is_ref {
            self.ts.pointer(ty)
        } else {
            ty
        }
    }

    fn cast_type(&mut self, ast: &Ast, target_expr: ExprId, value: ExprId, range: SourceRange) -> TypeId {
        let value_ty = self.visit_expr(ast, value);
        let target = self.resolve_type_expr(ast, target_expr);
        let applied = self.infer.apply(value_ty, self.ts);

        if self.ts.is_unresolved(applied) {
            // Casting an unconstrained literal pins it to the target type.
            self.unify_sym(applied, target, range, "cast");
            return target;
        }
        let conv = check_conversion(applied, target, self.ts, self.table);
        if conv == ConversionKind::NotConvertible {
            self.errors.push(SemaError::NotConvertible {
                from: self.table.display_type(self.ts, applied),
                to: self.table.display_type(self.ts, target),
                range,
            });
        }
        target
    }

    fn lambda_type(
        &mut self,
        ast: &Ast,
        id: ExprId,
        params: &[StmtId],
        body: &LambdaBody,
    ) -> TypeId {
        let saved = self.scope;
        if let Some(&scope) = self.table.expr_scopes.get(&(self.file, id)) {
            self.scope = scope;
        }

        let mut param_tys = Vec::new();
        for &param in params {
            let sym = self.table.ast_to_symbol.get(&(self.file, param)).copied();
            let declared = match ast.stmt(param).clone() {
                Stmt::ParamDecl { param: typed, .. } => typed.ty,
                _ => None,
            };
            let ty = match sym.and_then(|s| self.table.symbol(s).value_type()) {
                Some(ty) => ty,
                None => {
                    let ty = match declared {
                        Some(t) => self.resolve_type_expr(ast, t),
                        None => self.infer.fresh_var(self.ts),
                    };
                    if let Some(sym) = sym {
                        self.table.symbol_mut(sym).set_value_type(ty);
                    }
                    ty
                }
            };
            param_tys.push(ty);
        }

        let ret = self.infer.fresh_var(self.ts);
        self.fn_return_stack.push(ret);
        match body {
            LambdaBody::Expression(expr) => {
                let found = self.visit_expr(ast, *expr);
                let r = ast.expr_range(*expr);
                self.unify_expect(ret, found, r, "lambda body");
            }
            LambdaBody::Block(block) => self.visit_stmt(ast, *block),
        }
        self.fn_return_stack.pop();
        self.scope = saved;

        self.ts.function(ret, param_tys)
    }

    // ── Deferred constraints ───────────────────────────────────────────

    fn retry_pending(&mut self) {
        let members = std::mem::take(&mut self.pending_members);
        for p in members {
            let applied = self.infer.apply(p.object_ty, self.ts);
            if self.ts.is_unresolved(applied) {
                self.pending_members.push(p);
                continue;
            }
            let saved = self.file;
            self.file = p.file;
            let member_ty =
                self.instance_member_type(applied, &p.member, (p.file, p.expr), p.range, false);
            self.unify_sym(p.result, member_ty, p.range, "member access");
            self.file = saved;
        }

        let implicits = std::mem::take(&mut self.pending_implicit);
        for p in implicits {
            let applied = self.infer.apply(p.expected, self.ts);
            let def = match self.ts.get(applied).clone() {
                Type::Named(def) => def,
                Type::Unresolved(_) => {
                    self.pending_implicit.push(p);
                    continue;
                }
                _ => {
                    self.errors.push(SemaError::CannotInferEnumMember {
                        member: p.member.clone(),
                        range: p.range,
                    });
                    continue;
                }
            };
            match self.table.members_named(def, &p.member).first().copied() {
                Some(case)
                    if matches!(self.table.symbol(case).data, SymbolData::EnumCase(_)) =>
                {
                    self.expr_symbols.insert((p.file, p.expr), case);
                }
                _ => {
                    self.errors.push(SemaError::NoSuchMember {
                        type_name: self.table.symbol(def).name.clone(),
                        member: p.member.clone(),
                        range: p.range,
                    });
                }
            }
        }
    }

    // ── Finalization ───────────────────────────────────────────────────

    fn finalize(&mut self) {
        self.infer.apply_literal_defaults(self.ts);
        self.retry_pending();

        // Leftover deferred lookups could never be solved.
        for p in std::mem::take(&mut self.pending_members) {
            self.errors.push(SemaError::UnresolvedType { range: p.range });
        }
        for p in std::mem::take(&mut self.pending_implicit) {
            self.errors.push(SemaError::CannotInferEnumMember {
                member: p.member,
                range: p.range,
            });
        }

        // Substitute every expression annotation to its final type; any
        // remaining variable is an inference failure, reported once per
        // variable at its first owning node.
        let mut keys: Vec<(FileId, ExprId)> = self.expr_types.keys().copied().collect();
        keys.sort();
        for key in keys {
            let ty = self.expr_types[&key];
            let final_ty = self.infer.apply(ty, self.ts);
            self.expr_types.insert(key, final_ty);
            if let Some(var) = self.first_var(final_ty) {
                if !self.infer.suppressed_vars.contains(&var) && self.reported_vars.insert(var) {
                    let range = self
                        .units
                        .iter()
                        .find(|u| u.file == key.0)
                        .map(|u| u.ast.expr_range(key.1))
                        .unwrap_or_else(|| {
                            SourceRange::empty_at(quill_common::span::SourceLocation::start_of_file())
                        });
                    self.errors.push(SemaError::UnresolvedType { range });
                }
            }
        }

        // Write final types back onto symbols; a variable, field, or
        // parameter left with an inference variable is a failure too.
        for id in self.table.iter_ids().collect::<Vec<_>>() {
            if let Some(ty) = self.table.symbol(id).value_type() {
                let final_ty = self.infer.apply(ty, self.ts);
                self.table.symbol_mut(id).set_value_type(final_ty);
                let reportable = matches!(
                    self.table.symbol(id).data,
                    SymbolData::Local(_)
                        | SymbolData::Field(_)
                        | SymbolData::Parameter(_)
                        | SymbolData::Property(_)
                );
                if reportable {
                    if let Some(var) = self.first_var(final_ty) {
                        if !self.infer.suppressed_vars.contains(&var) && self.reported_vars.insert(var) {
                            let range = self.table.symbol(id).range;
                            self.errors.push(SemaError::UnresolvedType { range });
                        }
                    }
                }
            }
            let ret = self.table.symbol(id).as_function().and_then(|f| f.return_type);
            if let Some(ret) = ret {
                let final_ret = self.infer.apply(ret, self.ts);
                if let SymbolData::Function(data) = &mut self.table.symbol_mut(id).data {
                    data.return_type = Some(final_ret);
                }
            }
        }

        self.compute_layouts();
        self.assign_vtable_slots();
    }

    fn first_var(&self, ty: TypeId) -> Option<TyVar> {
        match self.ts.get(ty) {
            Type::Unresolved(v) => Some(*v),
            Type::Pointer(p) => self.first_var(*p),
            Type::Array { element, .. } => self.first_var(*element),
            Type::Range(e) => self.first_var(*e),
            Type::Function { ret, params } => params
                .iter()
                .find_map(|&p| self.first_var(p))
                .or_else(|| self.first_var(*ret)),
            Type::Generic { args, .. } => args.iter().find_map(|&a| self.first_var(a)),
            _ => None,
        }
    }

    // ── Layout and vtables ─────────────────────────────────────────────

    fn compute_layouts(&mut self) {
        let type_ids: Vec<SymbolId> = self
            .table
            .iter_ids()
            .filter(|&id| matches!(self.table.symbol(id).data, SymbolData::Type(_)))
            .collect();
        let mut visiting = FxHashSet::default();
        for id in type_ids {
            self.layout_of_symbol(id, &mut visiting);
        }
    }

    /// Compute and store field offsets plus the overall size/alignment of
    /// a declared type. Cycles through value-type fields are an error.
    fn layout_of_symbol(&mut self, id: SymbolId, visiting: &mut FxHashSet<SymbolId>) -> (u32, u32) {
        if let Some(data) = self.table.symbol(id).as_type() {
            if data.size > 0 || data.alignment > 1 {
                return (data.size, data.alignment);
            }
        }
        if !visiting.insert(id) {
            self.errors.push(SemaError::RecursiveValueType {
                name: self.table.symbol(id).name.clone(),
                range: self.table.symbol(id).range,
            });
            return (0, 1);
        }

        let fields: Vec<SymbolId> = self
            .table
            .symbol(id)
            .members
            .iter()
            .copied()
            .filter(|&m| matches!(self.table.symbol(m).data, SymbolData::Field(_)))
            .collect();

        let mut offset = 0u32;
        let mut alignment = 1u32;
        for field in fields {
            let field_ty = self.table.symbol(field).value_type();
            let (size, align) = match field_ty {
                Some(ty) => self.size_and_align(ty, visiting),
                None => (0, 1),
            };
            let align = align.max(1);
            offset = offset.div_ceil(align) * align;
            if let SymbolData::Field(data) = &mut self.table.symbol_mut(field).data {
                data.offset = offset;
                data.alignment = align;
            }
            offset += size;
            alignment = alignment.max(align);
        }
        let size = offset.div_ceil(alignment) * alignment;

        visiting.remove(&id);
        if let SymbolData::Type(data) = &mut self.table.symbol_mut(id).data {
            data.size = size;
            data.alignment = alignment;
        }
        (size, alignment)
    }

    fn size_and_align(&mut self, ty: TypeId, visiting: &mut FxHashSet<SymbolId>) -> (u32, u32) {
        match self.ts.get(ty).clone() {
            Type::Primitive(kind) => (kind.size(), kind.alignment()),
            Type::Pointer(_) | Type::Function { .. } => (8, 8),
            Type::Array { element, fixed_size } => {
                if fixed_size < 0 {
                    // Unsized arrays are handled by reference.
                    (8, 8)
                } else {
                    let (elem_size, elem_align) = self.size_and_align(element, visiting);
                    (elem_size * fixed_size as u32, elem_align)
                }
            }
            Type::Range(e) => {
                let (elem_size, elem_align) = self.size_and_align(e, visiting);
                (elem_size * 2, elem_align)
            }
            Type::Named(def) | Type::Generic { definition: def, .. } => {
                let is_ref = self
                    .table
                    .symbol(def)
                    .as_type()
                    .map(|t| t.is_reference_type())
                    .unwrap_or(false);
                if is_ref {
                    (8, 8)
                } else {
                    self.layout_of_symbol(def, visiting)
                }
            }
            Type::TypeParam { .. } | Type::Unresolved(_) => (0, 1),
        }
    }

    /// Assign vtable slots: base slots are inherited, `virtual` methods
    /// open new slots, `override` methods reuse the matching base slot.
    fn assign_vtable_slots(&mut self) {
        let type_ids: Vec<SymbolId> = self
            .table
            .iter_ids()
            .filter(|&id| matches!(self.table.symbol(id).data, SymbolData::Type(_)))
            .collect();
        let mut done = FxHashSet::default();
        for id in type_ids {
            self.vtable_for(id, &mut done);
        }
    }

    fn vtable_for(&mut self, id: SymbolId, done: &mut FxHashSet<SymbolId>) {
        if !done.insert(id) {
            return;
        }
        let base = self.table.symbol(id).as_type().and_then(|t| t.base_class);
        let mut vtable = match base {
            Some(base) => {
                self.vtable_for(base, done);
                self.table
                    .symbol(base)
                    .as_type()
                    .map(|t| t.vtable.clone())
                    .unwrap_or_default()
            }
            None => Vec::new(),
        };

        let methods: Vec<SymbolId> = self
            .table
            .symbol(id)
            .members
            .iter()
            .copied()
            .filter(|&m| matches!(self.table.symbol(m).data, SymbolData::Function(_)))
            .collect();

        for method in methods {
            let modifiers = self.table.symbol(method).modifiers;
            if modifiers.contains(ModifierFlags::OVERRIDE) {
                let slot = vtable
                    .iter()
                    .position(|&base_method| self.table.signature_matches(base_method, method));
                match slot {
                    Some(index) => {
                        vtable[index] = method;
                        if let SymbolData::Function(data) =
                            &mut self.table.symbol_mut(method).data
                        {
                            data.vtable_index = Some(index as u32);
                        }
                    }
                    None => {
                        self.errors.push(SemaError::OverrideWithoutBase {
                            name: self.table.symbol(method).name.clone(),
                            range: self.table.symbol(method).range,
                        });
                    }
                }
            } else if modifiers.contains(ModifierFlags::VIRTUAL)
                || modifiers.contains(ModifierFlags::ABSTRACT)
            {
                let index = vtable.len() as u32;
                vtable.push(method);
                if let SymbolData::Function(data) = &mut self.table.symbol_mut(method).data {
                    data.vtable_index = Some(index);
                }
            }
        }

        if let SymbolData::Type(data) = &mut self.table.symbol_mut(id).data {
            data.vtable = vtable;
        }
    }

    // ── Unification wrappers ───────────────────────────────────────────

    /// Directed unification for assignment-like sites: an implicit
    /// widening or reference upcast from `found` to `expected` is
    /// accepted silently; narrowing demands a cast; anything else is a
    /// mismatch.
    fn unify_expect(&mut self, expected: TypeId, found: TypeId, range: SourceRange, context: &str) {
        match self.infer.unify(expected, found, self.ts) {
            Ok(()) => {}
            Err(UnifyError::Mismatch { .. }) => {
                let e = self.ranking_type(expected);
                let f = self.ranking_type(found);
                match check_conversion(f, e, self.ts, self.table) {
                    kind if kind.is_implicit() => {}
                    ConversionKind::ExplicitNumericNarrowing => {
                        self.errors.push(SemaError::NarrowingNeedsCast {
                            from: self.table.display_type(self.ts, f),
                            to: self.table.display_type(self.ts, e),
                            range,
                        });
                    }
                    _ => {
                        self.errors.push(SemaError::TypeMismatch {
                            expected: self.table.display_type(self.ts, e),
                            found: self.table.display_type(self.ts, f),
                            context: context.to_string(),
                            range,
                        });
                    }
                }
            }
            Err(err) => self.push_unify_error(err, expected, found, range, context),
        }
    }

    /// Symmetric unification for operand-like sites.
    fn unify_sym(&mut self, a: TypeId, b: TypeId, range: SourceRange, context: &str) {
        if let Err(err) = self.infer.unify(a, b, self.ts) {
            self.push_unify_error(err, a, b, range, context);
        }
    }

    fn push_unify_error(
        &mut self,
        err: UnifyError,
        a: TypeId,
        b: TypeId,
        range: SourceRange,
        context: &str,
    ) {
        match err {
            UnifyError::Mismatch { .. } => {
                let left = self.infer.apply(a, self.ts);
                let right = self.infer.apply(b, self.ts);
                self.errors.push(SemaError::TypeMismatch {
                    expected: self.table.display_type(self.ts, left),
                    found: self.table.display_type(self.ts, right),
                    context: context.to_string(),
                    range,
                });
            }
            UnifyError::Arity { expected, found } => {
                self.errors.push(SemaError::ArityMismatch { expected, found, range });
            }
            UnifyError::Infinite => {
                self.errors.push(SemaError::InfiniteType { range });
            }
        }
    }

    /// A fresh variable standing in for an expression that already has a
    /// diagnostic; excluded from the final unresolved sweep.
    fn error_var(&mut self) -> TypeId {
        let ty = self.infer.fresh_var(self.ts);
        if let Type::Unresolved(var) = self.ts.get(ty) {
            self.infer.suppressed_vars.insert(*var);
        }
        ty
    }

    fn ranking_type(&mut self, ty: TypeId) -> TypeId {
        let applied = self.infer.apply(ty, self.ts);
        if let Type::Unresolved(var) = self.ts.get(applied).clone() {
            if self.infer.int_literal_vars.contains(&var) {
                return self.ts.i32_type();
            }
            if self.infer.float_literal_vars.contains(&var) {
                return self.ts.f64_type();
            }
        }
        applied
    }

    fn require_numeric(&mut self, ty: TypeId, operator: &str, range: SourceRange) {
        let applied = self.infer.apply(ty, self.ts);
        if self.ts.is_unresolved(applied) || self.ts.contains_unresolved(applied) {
            return;
        }
        if !self.ts.is_numeric(applied) {
            self.errors.push(SemaError::RequiresNumeric {
                operator: operator.to_string(),
                found: self.table.display_type(self.ts, applied),
                range,
            });
        }
    }

    fn require_integral(&mut self, ty: TypeId, operator: &str, range: SourceRange) {
        let applied = self.infer.apply(ty, self.ts);
        if self.ts.is_unresolved(applied) || self.ts.contains_unresolved(applied) {
            return;
        }
        if !self.ts.is_integral(applied) {
            self.errors.push(SemaError::RequiresIntegral {
                operator: operator.to_string(),
                found: self.table.display_type(self.ts, applied),
                range,
            });
        }
    }
}

/// Collect the string path of a name/qualified-name chain.
fn qualified_path(ast: &Ast, id: ExprId) -> Option<Vec<String>> {
    match ast.expr(id) {
        Expr::Name { ident } => Some(vec![ident.clone()]),
        Expr::QualifiedName { left, right } => {
            let mut path = qualified_path(ast, *left)?;
            path.push(right.clone());
            Some(path)
        }
        _ => None,
    }
}
