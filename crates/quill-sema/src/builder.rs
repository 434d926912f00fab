//! Symbol table construction (pass 1).
//!
//! Walks one file's syntax tree in source order, creating a symbol for
//! every declaration and an anonymous scope for every block and
//! control-flow body. Types are NOT resolved here -- per-file tables are
//! merged before resolution, so type-bearing fields stay `None` and
//! parameters carry their declared type text for pre-merge signature
//! comparison.
//!
//! Scope convention shared with the resolver (via `stmt_scopes`):
//! - a plain block statement keys its own `$block` scope;
//! - `if`/`while` branch statements key `$if_then`/`$if_else`/`$while`;
//! - a `for` statement keys one `$for` scope covering init, condition,
//!   updates, and body;
//! - a property accessor's block body keys the accessor's function scope;
//! - a function body block has no key: its statements live directly in
//!   the function scope.

use quill_common::modifiers::ModifierFlags;
use quill_parser::arena::{Ast, CompilationUnit, ExprId, StmtId};
use quill_parser::ast::{
    AccessorBody, AccessorKind, Expr, LambdaBody, PropertyAccessor, Stmt, TypeDeclKind, TypedName,
};

use crate::error::SemaError;
use crate::symbol::{
    AliasData, EnumCaseData, FieldData, FunctionData, LocalData, NamespaceData, ParameterData,
    PropertyData, Symbol, SymbolData, SymbolId, TypeData, TypeParameterData,
};
use crate::table::SymbolTable;
use crate::FileId;

/// Render a type expression back to source-like text. Used for signature
/// comparison before types are resolved.
pub(crate) fn type_text(ast: &Ast, id: ExprId) -> String {
    match ast.expr(id) {
        Expr::Name { ident } => ident.clone(),
        Expr::QualifiedName { left, right } => format!("{}.{}", type_text(ast, *left), right),
        Expr::GenericName { base, type_args } => {
            let args = type_args
                .iter()
                .map(|&a| type_text(ast, a))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}<{}>", type_text(ast, *base), args)
        }
        Expr::PointerType { pointee } => format!("*{}", type_text(ast, *pointee)),
        Expr::ArrayType { element, size } => match size {
            Some(s) => {
                if let Expr::Literal { text, .. } = ast.expr(*s) {
                    format!("{}[{}]", type_text(ast, *element), text)
                } else {
                    format!("{}[]", type_text(ast, *element))
                }
            }
            None => format!("{}[]", type_text(ast, *element)),
        },
        Expr::FunctionType { params, ret } => {
            let params = params
                .iter()
                .map(|&p| type_text(ast, p))
                .collect::<Vec<_>>()
                .join(", ");
            match ret {
                Some(r) => format!("fn({}) -> {}", params, type_text(ast, *r)),
                None => format!("fn({})", params),
            }
        }
        _ => "?".to_string(),
    }
}

pub struct SymbolBuilder<'a> {
    file: FileId,
    ast: &'a Ast,
    table: SymbolTable,
    errors: Vec<SemaError>,
}

impl<'a> SymbolBuilder<'a> {
    /// Build the file-local symbol table for one compilation unit.
    pub fn build(
        file: FileId,
        ast: &'a Ast,
        unit: &CompilationUnit,
    ) -> (SymbolTable, Vec<SemaError>) {
        let mut builder = Self {
            file,
            ast,
            table: SymbolTable::new(),
            errors: Vec::new(),
        };
        for &stmt in &unit.statements {
            builder.visit_stmt(stmt);
        }
        (builder.table, builder.errors)
    }

    // ── Helpers ────────────────────────────────────────────────────────

    fn map_decl(&mut self, stmt: StmtId, symbol: SymbolId) {
        self.table.ast_to_symbol.insert((self.file, stmt), symbol);
        self.table.symbol_to_ast.insert(symbol, (self.file, stmt));
    }

    /// Define a symbol in the current scope with duplicate and modifier
    /// checking. Anonymous (`$`-prefixed) names are exempt.
    fn define_checked(&mut self, symbol: Symbol) -> SymbolId {
        if symbol.modifiers.accessibility_count() > 1 {
            self.errors.push(SemaError::ConflictingAccessibility {
                name: symbol.name.clone(),
                range: symbol.range,
            });
        }

        if !symbol.name.starts_with('$') {
            let existing = self
                .table
                .members_named(self.table.current_scope(), &symbol.name)
                .to_vec();
            if !existing.is_empty() {
                let new_is_function = matches!(symbol.data, SymbolData::Function(_));
                let all_functions = existing
                    .iter()
                    .all(|&e| matches!(self.table.symbol(e).data, SymbolData::Function(_)));
                if !(new_is_function && all_functions) {
                    self.errors.push(SemaError::DuplicateSymbol {
                        name: symbol.name.clone(),
                        range: symbol.range,
                    });
                }
                // Same-signature overloads are caught once parameters are
                // attached; see `check_duplicate_signature`.
            }
        }
        self.table.define(symbol)
    }

    /// After a function's parameters are attached, flag an existing
    /// overload with an identical declared signature.
    fn check_duplicate_signature(&mut self, func: SymbolId) {
        let name = self.table.symbol(func).name.clone();
        let range = self.table.symbol(func).range;
        let Some(parent) = self.table.symbol(func).parent else { return };
        let twins: Vec<SymbolId> = self
            .table
            .members_named(parent, &name)
            .iter()
            .copied()
            .filter(|&s| s != func)
            .collect();
        if twins.iter().any(|&t| self.table.signature_matches(t, func)) {
            self.errors.push(SemaError::DuplicateSignature { name, range });
        }
    }

    /// Create an anonymous scope recorded under `key_stmt`, run `f`
    /// inside it, and pop.
    fn scoped(&mut self, key_stmt: StmtId, name: &str, f: impl FnOnce(&mut Self)) {
        let range = self.ast.stmt_range(key_stmt);
        let scope = self.table.define(Symbol::new(name, range, SymbolData::Block));
        self.table.stmt_scopes.insert((self.file, key_stmt), scope);
        self.table.push_scope(scope);
        f(self);
        self.table.pop_scope();
    }

    /// Visit a control-flow branch inside its wrapper scope: block
    /// children are visited directly (the wrapper already is the scope).
    fn visit_branch(&mut self, id: StmtId) {
        if let Stmt::Block { statements } = self.ast.stmt(id).clone() {
            for &s in &statements {
                self.visit_stmt(s);
            }
        } else {
            self.visit_stmt(id);
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn visit_stmt(&mut self, id: StmtId) {
        match self.ast.stmt(id).clone() {
            Stmt::Block { statements } => {
                self.scoped(id, "$block", |b| {
                    for &s in &statements {
                        b.visit_stmt(s);
                    }
                });
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.visit_expr(condition);
                self.scoped(then_branch, "$if_then", |b| b.visit_branch(then_branch));
                if let Some(else_branch) = else_branch {
                    self.scoped(else_branch, "$if_else", |b| b.visit_branch(else_branch));
                }
            }
            Stmt::While { condition, body } => {
                self.visit_expr(condition);
                self.scoped(body, "$while", |b| b.visit_branch(body));
            }
            Stmt::For { init, condition, updates, body } => {
                self.scoped(id, "$for", |b| {
                    if let Some(init) = init {
                        b.visit_stmt(init);
                    }
                    if let Some(condition) = condition {
                        b.visit_expr(condition);
                    }
                    for &u in &updates {
                        b.visit_expr(u);
                    }
                    b.visit_branch(body);
                });
            }
            Stmt::Return { value } => {
                if let Some(value) = value {
                    self.visit_expr(value);
                }
            }
            Stmt::Break | Stmt::Continue => {}
            Stmt::Expr { expr } => self.visit_expr(expr),
            Stmt::Using { kind, path, alias, .. } => self.visit_using(id, kind, path, alias),
            Stmt::Missing { partial, .. } => {
                // Recovery placeholders are skipped; salvaged children are
                // still visited.
                for &s in &partial {
                    self.visit_stmt(s);
                }
            }
            Stmt::VarDecl { modifiers, variable, initializer } => {
                self.visit_var_decl(id, modifiers, &variable, initializer);
            }
            Stmt::PropertyDecl { modifiers, variable, getter, setter } => {
                self.visit_property(id, modifiers, &variable, getter, setter);
            }
            Stmt::ParamDecl { .. } => {
                // Parameters are defined by their owning function.
            }
            Stmt::FunctionDecl { modifiers, name, name_range, type_params, params, body, .. } => {
                self.visit_function(id, modifiers, name, name_range, &type_params, &params, body, false);
            }
            Stmt::ConstructorDecl { modifiers, params, body } => {
                let in_type = matches!(
                    self.table.symbol(self.table.current_scope()).data,
                    SymbolData::Type(_)
                );
                if !in_type {
                    self.errors.push(SemaError::ConstructorOutsideType {
                        range: self.ast.stmt_range(id),
                    });
                }
                // Named "New" in the table to avoid colliding with the
                // type's own name.
                self.visit_function(
                    id,
                    modifiers,
                    "New".to_string(),
                    self.ast.stmt_range(id),
                    &[],
                    &params,
                    Some(body),
                    true,
                );
            }
            Stmt::EnumCaseDecl { .. } => {
                // Enum cases are defined while visiting their enum.
            }
            Stmt::TypeDecl { modifiers, name, name_range, kind, type_params, members, .. } => {
                self.visit_type_decl(id, modifiers, name, name_range, kind, &type_params, &members);
            }
            Stmt::TypeParamDecl { .. } => {
                // Type parameters are defined by their owner.
            }
            Stmt::NamespaceDecl { path, file_scoped, body } => {
                self.visit_namespace(id, &path, file_scoped, body);
            }
        }
    }

    // ── Declarations ───────────────────────────────────────────────────

    fn visit_type_decl(
        &mut self,
        id: StmtId,
        modifiers: ModifierFlags,
        name: String,
        name_range: quill_common::span::SourceRange,
        kind: TypeDeclKind,
        type_params: &[StmtId],
        members: &[StmtId],
    ) {
        let symbol = Symbol::new(name, name_range, SymbolData::Type(TypeData::new(kind)))
            .with_modifiers(modifiers);
        let type_id = self.define_checked(symbol);
        self.map_decl(id, type_id);

        self.table.push_scope(type_id);

        let mut param_ids = Vec::new();
        for &tp in type_params {
            if let Stmt::TypeParamDecl { name } = self.ast.stmt(tp).clone() {
                let sym = Symbol::new(
                    name,
                    self.ast.stmt_range(tp),
                    SymbolData::TypeParameter(TypeParameterData { ty: None }),
                );
                let sym_id = self.define_checked(sym);
                self.map_decl(tp, sym_id);
                param_ids.push(sym_id);
            }
        }
        if let SymbolData::Type(data) = &mut self.table.symbol_mut(type_id).data {
            data.type_params = param_ids;
        }

        let mut discriminant: i64 = 0;
        for &member in members {
            if let Stmt::EnumCaseDecl { modifiers, name, name_range, .. } =
                self.ast.stmt(member).clone()
            {
                let case = Symbol::new(
                    name,
                    name_range,
                    SymbolData::EnumCase(EnumCaseData {
                        associated_types: Vec::new(),
                        value: discriminant,
                    }),
                )
                .with_modifiers(modifiers);
                let case_id = self.define_checked(case);
                self.map_decl(member, case_id);
                discriminant += 1;
            } else {
                self.visit_stmt(member);
            }
        }

        self.table.pop_scope();
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_function(
        &mut self,
        id: StmtId,
        modifiers: ModifierFlags,
        name: String,
        name_range: quill_common::span::SourceRange,
        type_params: &[StmtId],
        params: &[StmtId],
        body: Option<StmtId>,
        is_constructor: bool,
    ) {
        let mut data = FunctionData::new();
        data.is_constructor = is_constructor;
        let symbol =
            Symbol::new(name, name_range, SymbolData::Function(data)).with_modifiers(modifiers);
        let func_id = self.define_checked(symbol);
        self.map_decl(id, func_id);

        self.table.push_scope(func_id);

        let mut type_param_ids = Vec::new();
        for &tp in type_params {
            if let Stmt::TypeParamDecl { name } = self.ast.stmt(tp).clone() {
                let sym = Symbol::new(
                    name,
                    self.ast.stmt_range(tp),
                    SymbolData::TypeParameter(TypeParameterData { ty: None }),
                );
                let sym_id = self.define_checked(sym);
                self.map_decl(tp, sym_id);
                type_param_ids.push(sym_id);
            }
        }

        let mut param_ids = Vec::new();
        for (index, &param) in params.iter().enumerate() {
            if let Some(sym_id) = self.define_parameter(param, index as u32) {
                param_ids.push(sym_id);
            }
        }

        if let SymbolData::Function(data) = &mut self.table.symbol_mut(func_id).data {
            data.type_params = type_param_ids;
            data.parameters = param_ids;
        }
        self.check_duplicate_signature(func_id);

        // Body statements live directly in the function scope; the body
        // block does not open a fresh scope for top-level locals.
        if let Some(body) = body {
            if let Stmt::Block { statements } = self.ast.stmt(body).clone() {
                for &s in &statements {
                    self.visit_stmt(s);
                }
            } else {
                self.visit_stmt(body);
            }
        }

        self.table.pop_scope();
    }

    fn define_parameter(&mut self, id: StmtId, index: u32) -> Option<SymbolId> {
        let Stmt::ParamDecl { modifiers, param, default } = self.ast.stmt(id).clone() else {
            return None;
        };
        if let Some(default) = default {
            self.visit_expr(default);
        }
        let declared_type_text = param.ty.map(|t| type_text(self.ast, t));
        let symbol = Symbol::new(
            param.name,
            param.name_range,
            SymbolData::Parameter(ParameterData {
                ty: None,
                index,
                has_default: default.is_some(),
                is_ref: modifiers.contains(ModifierFlags::REF),
                is_out: false,
                declared_type_text,
            }),
        )
        .with_modifiers(modifiers);
        let sym_id = self.define_checked(symbol);
        self.map_decl(id, sym_id);
        Some(sym_id)
    }

    fn visit_var_decl(
        &mut self,
        id: StmtId,
        modifiers: ModifierFlags,
        variable: &TypedName,
        initializer: Option<ExprId>,
    ) {
        let in_type = matches!(
            self.table.symbol(self.table.current_scope()).data,
            SymbolData::Type(_)
        );
        let data = if in_type {
            SymbolData::Field(FieldData { ty: None, offset: 0, alignment: 1 })
        } else {
            SymbolData::Local(LocalData { ty: None, is_captured: false })
        };
        let symbol = Symbol::new(variable.name.clone(), variable.name_range, data)
            .with_modifiers(modifiers);
        let sym_id = self.define_checked(symbol);
        self.map_decl(id, sym_id);

        if let Some(init) = initializer {
            self.visit_expr(init);
        }
    }

    fn visit_property(
        &mut self,
        id: StmtId,
        modifiers: ModifierFlags,
        variable: &TypedName,
        getter: Option<PropertyAccessor>,
        setter: Option<PropertyAccessor>,
    ) {
        let symbol = Symbol::new(
            variable.name.clone(),
            variable.name_range,
            SymbolData::Property(PropertyData {
                ty: None,
                has_getter: getter.is_some(),
                has_setter: setter.is_some(),
            }),
        )
        .with_modifiers(modifiers);
        let prop_id = self.define_checked(symbol);
        self.map_decl(id, prop_id);

        self.table.push_scope(prop_id);
        let declared_text = variable.ty.map(|t| type_text(self.ast, t));
        for accessor in [getter, setter].into_iter().flatten() {
            self.visit_accessor(&accessor, declared_text.clone());
        }
        self.table.pop_scope();
    }

    fn visit_accessor(&mut self, accessor: &PropertyAccessor, property_type_text: Option<String>) {
        let name = match accessor.kind {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
        };
        let symbol = Symbol::new(name, accessor.range, SymbolData::Function(FunctionData::new()))
            .with_modifiers(accessor.modifiers);
        let func_id = self.define_checked(symbol);
        self.table.push_scope(func_id);

        // The setter body sees an implicit `value` parameter of the
        // property's type.
        if accessor.kind == AccessorKind::Set {
            let value_param = Symbol::new(
                "value",
                accessor.range,
                SymbolData::Parameter(ParameterData {
                    ty: None,
                    index: 0,
                    has_default: false,
                    is_ref: false,
                    is_out: false,
                    declared_type_text: property_type_text,
                }),
            );
            let value_id = self.table.define(value_param);
            if let SymbolData::Function(data) = &mut self.table.symbol_mut(func_id).data {
                data.parameters.push(value_id);
            }
        }

        match &accessor.body {
            AccessorBody::Auto => {}
            AccessorBody::Expression(expr) => self.visit_expr(*expr),
            AccessorBody::Block(block) => {
                // The accessor function scope doubles as the block scope.
                self.table.stmt_scopes.insert((self.file, *block), func_id);
                if let Stmt::Block { statements } = self.ast.stmt(*block).clone() {
                    for &s in &statements {
                        self.visit_stmt(s);
                    }
                }
            }
        }

        self.table.pop_scope();
    }

    fn visit_namespace(
        &mut self,
        id: StmtId,
        path: &[String],
        file_scoped: bool,
        body: Option<Vec<StmtId>>,
    ) {
        let mut entered = 0;
        for segment in path {
            let existing = self
                .table
                .members_named(self.table.current_scope(), segment)
                .iter()
                .copied()
                .find(|&s| matches!(self.table.symbol(s).data, SymbolData::Namespace(_)));
            let ns = match existing {
                Some(ns) => ns,
                None => self.table.define(Symbol::new(
                    segment.clone(),
                    self.ast.stmt_range(id),
                    SymbolData::Namespace(NamespaceData::default()),
                )),
            };
            self.table.push_scope(ns);
            entered += 1;
        }
        self.map_decl(id, self.table.current_scope());

        if file_scoped {
            // The namespace covers the remainder of the file; the scope
            // stays pushed.
            return;
        }
        for stmt in body.unwrap_or_default() {
            self.visit_stmt(stmt);
        }
        for _ in 0..entered {
            self.table.pop_scope();
        }
    }

    fn visit_using(
        &mut self,
        id: StmtId,
        kind: quill_parser::ast::UsingKind,
        path: Vec<String>,
        alias: Option<String>,
    ) {
        match kind {
            quill_parser::ast::UsingKind::Namespace => {
                // Record the import on the nearest enclosing namespace.
                let ns = self.table.enclosing(self.table.current_scope(), |s| {
                    matches!(s.data, SymbolData::Namespace(_))
                });
                if let Some(ns) = ns {
                    if let SymbolData::Namespace(data) = &mut self.table.symbol_mut(ns).data {
                        data.using_paths.push(path);
                    }
                }
            }
            quill_parser::ast::UsingKind::Alias => {
                if let Some(alias) = alias {
                    let symbol = Symbol::new(
                        alias,
                        self.ast.stmt_range(id),
                        SymbolData::Alias(AliasData { ty: None }),
                    );
                    let sym_id = self.define_checked(symbol);
                    self.map_decl(id, sym_id);
                }
            }
        }
    }

    // ── Expressions (lambda discovery) ─────────────────────────────────

    /// The builder only cares about lambdas inside expressions: each one
    /// gets a parameter scope recorded in `expr_scopes`.
    fn visit_expr(&mut self, id: ExprId) {
        match self.ast.expr(id).clone() {
            Expr::Lambda { params, body } => {
                let scope = self.table.define(Symbol::new(
                    "$lambda",
                    self.ast.expr_range(id),
                    SymbolData::Block,
                ));
                self.table.expr_scopes.insert((self.file, id), scope);
                self.table.push_scope(scope);
                for (index, &param) in params.iter().enumerate() {
                    self.define_parameter(param, index as u32);
                }
                match body {
                    LambdaBody::Expression(e) => self.visit_expr(e),
                    LambdaBody::Block(b) => {
                        self.table.stmt_scopes.insert((self.file, b), scope);
                        if let Stmt::Block { statements } = self.ast.stmt(b).clone() {
                            for &s in &statements {
                                self.visit_stmt(s);
                            }
                        }
                    }
                }
                self.table.pop_scope();
            }
            Expr::ArrayLiteral { elements } => {
                for e in elements {
                    self.visit_expr(e);
                }
            }
            Expr::Paren { inner } => self.visit_expr(inner),
            Expr::Unary { operand, .. } => self.visit_expr(operand),
            Expr::Binary { left, right, .. } => {
                self.visit_expr(left);
                self.visit_expr(right);
            }
            Expr::Assign { target, value, .. } => {
                self.visit_expr(target);
                self.visit_expr(value);
            }
            Expr::Conditional { condition, then_value, else_value } => {
                self.visit_expr(condition);
                self.visit_expr(then_value);
                self.visit_expr(else_value);
            }
            Expr::MemberAccess { object, .. } => self.visit_expr(object),
            Expr::Index { object, index } => {
                self.visit_expr(object);
                self.visit_expr(index);
            }
            Expr::Call { callee, args } => {
                self.visit_expr(callee);
                for a in args {
                    self.visit_expr(a);
                }
            }
            Expr::New { args, .. } => {
                for a in args {
                    self.visit_expr(a);
                }
            }
            Expr::Cast { value, .. } => self.visit_expr(value),
            Expr::Range { start, end, .. } => {
                self.visit_expr(start);
                self.visit_expr(end);
            }
            _ => {}
        }
    }
}
