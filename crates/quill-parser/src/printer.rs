//! Debug tree printer.
//!
//! Emits an indented, bracket-free tree of the syntax: one line per node,
//! children indented two spaces. The semantic phase can supply display
//! strings per expression (resolved types) which are appended as
//! `: type` annotations. Used by tests and the driver's `--print-ast`.

use rustc_hash::FxHashMap;

use crate::arena::{Ast, CompilationUnit, ExprId, StmtId};
use crate::ast::{AccessorBody, Expr, LambdaBody, Stmt, TypeDeclKind, TypedName, UsingKind};

pub struct AstPrinter<'a> {
    ast: &'a Ast,
    annotations: Option<&'a FxHashMap<ExprId, String>>,
    out: String,
    depth: usize,
}

impl<'a> AstPrinter<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self { ast, annotations: None, out: String::new(), depth: 0 }
    }

    /// Attach per-expression display strings (e.g. resolved type names).
    pub fn with_annotations(mut self, annotations: &'a FxHashMap<ExprId, String>) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn print_unit(mut self, unit: &CompilationUnit) -> String {
        self.line("CompilationUnit".to_string());
        self.depth += 1;
        for &stmt in &unit.statements {
            self.print_stmt(stmt);
        }
        self.out
    }

    pub fn print_statement(mut self, stmt: StmtId) -> String {
        self.print_stmt(stmt);
        self.out
    }

    fn line(&mut self, text: String) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(&text);
        self.out.push('\n');
    }

    fn nested(&mut self, header: String, f: impl FnOnce(&mut Self)) {
        self.line(header);
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn typed_name(&self, name: &TypedName) -> String {
        match name.ty {
            Some(_) => format!("{} (typed)", name.name),
            None => format!("{} (inferred)", name.name),
        }
    }

    fn print_stmt(&mut self, id: StmtId) {
        match self.ast.stmt(id).clone() {
            Stmt::Block { statements } => self.nested("Block".into(), |p| {
                for s in statements {
                    p.print_stmt(s);
                }
            }),
            Stmt::If { condition, then_branch, else_branch } => {
                self.nested("If".into(), |p| {
                    p.print_expr(condition);
                    p.print_stmt(then_branch);
                    if let Some(e) = else_branch {
                        p.nested("Else".into(), |p| p.print_stmt(e));
                    }
                });
            }
            Stmt::While { condition, body } => self.nested("While".into(), |p| {
                p.print_expr(condition);
                p.print_stmt(body);
            }),
            Stmt::For { init, condition, updates, body } => self.nested("For".into(), |p| {
                if let Some(i) = init {
                    p.nested("Init".into(), |p| p.print_stmt(i));
                }
                if let Some(c) = condition {
                    p.nested("Cond".into(), |p| p.print_expr(c));
                }
                if !updates.is_empty() {
                    p.nested("Updates".into(), |p| {
                        for u in updates {
                            p.print_expr(u);
                        }
                    });
                }
                p.print_stmt(body);
            }),
            Stmt::Return { value } => self.nested("Return".into(), |p| {
                if let Some(v) = value {
                    p.print_expr(v);
                }
            }),
            Stmt::Break => self.line("Break".into()),
            Stmt::Continue => self.line("Continue".into()),
            Stmt::Expr { expr } => self.nested("ExprStmt".into(), |p| p.print_expr(expr)),
            Stmt::Using { kind, path, alias, aliased_type } => {
                let header = match kind {
                    UsingKind::Namespace => format!("Using {}", path.join(".")),
                    UsingKind::Alias => {
                        format!("UsingAlias {}", alias.as_deref().unwrap_or("?"))
                    }
                };
                self.nested(header, |p| {
                    if let Some(ty) = aliased_type {
                        p.print_expr(ty);
                    }
                });
            }
            Stmt::Missing { message, partial } => {
                self.nested(format!("MissingStmt \"{message}\""), |p| {
                    for s in partial {
                        p.print_stmt(s);
                    }
                });
            }
            Stmt::VarDecl { variable, initializer, .. } => {
                let header = format!("VarDecl {}", self.typed_name(&variable));
                self.nested(header, |p| {
                    if let Some(ty) = variable.ty {
                        p.print_expr(ty);
                    }
                    if let Some(init) = initializer {
                        p.print_expr(init);
                    }
                });
            }
            Stmt::PropertyDecl { variable, getter, setter, .. } => {
                let header = format!("PropertyDecl {}", self.typed_name(&variable));
                self.nested(header, |p| {
                    if let Some(ty) = variable.ty {
                        p.print_expr(ty);
                    }
                    for (label, accessor) in [("Get", getter), ("Set", setter)] {
                        if let Some(acc) = accessor {
                            p.nested(label.into(), |p| match acc.body {
                                AccessorBody::Auto => p.line("Auto".into()),
                                AccessorBody::Expression(e) => p.print_expr(e),
                                AccessorBody::Block(b) => p.print_stmt(b),
                            });
                        }
                    }
                });
            }
            Stmt::ParamDecl { param, default, .. } => {
                let header = format!("Param {}", self.typed_name(&param));
                self.nested(header, |p| {
                    if let Some(ty) = param.ty {
                        p.print_expr(ty);
                    }
                    if let Some(d) = default {
                        p.print_expr(d);
                    }
                });
            }
            Stmt::FunctionDecl { name, type_params, params, return_ty, body, .. } => {
                self.nested(format!("FunctionDecl {name}"), |p| {
                    for tp in type_params {
                        p.print_stmt(tp);
                    }
                    for param in params {
                        p.print_stmt(param);
                    }
                    if let Some(ret) = return_ty {
                        p.nested("ReturnType".into(), |p| p.print_expr(ret));
                    }
                    match body {
                        Some(b) => p.print_stmt(b),
                        None => p.line("Abstract".into()),
                    }
                });
            }
            Stmt::ConstructorDecl { params, body, .. } => {
                self.nested("ConstructorDecl".into(), |p| {
                    for param in params {
                        p.print_stmt(param);
                    }
                    p.print_stmt(body);
                });
            }
            Stmt::EnumCaseDecl { name, payload, .. } => {
                self.nested(format!("EnumCase {name}"), |p| {
                    for item in payload {
                        p.print_stmt(item);
                    }
                });
            }
            Stmt::TypeDecl { name, kind, type_params, base_types, members, .. } => {
                let kind_name = match kind {
                    TypeDeclKind::Value => "type",
                    TypeDeclKind::Ref => "ref type",
                    TypeDeclKind::Static => "static type",
                    TypeDeclKind::Enum => "enum",
                };
                self.nested(format!("TypeDecl {name} ({kind_name})"), |p| {
                    for tp in type_params {
                        p.print_stmt(tp);
                    }
                    for base in base_types {
                        p.nested("Base".into(), |p| p.print_expr(base));
                    }
                    for member in members {
                        p.print_stmt(member);
                    }
                });
            }
            Stmt::TypeParamDecl { name } => self.line(format!("TypeParam {name}")),
            Stmt::NamespaceDecl { path, file_scoped, body } => {
                let scope = if file_scoped { " (file-scoped)" } else { "" };
                self.nested(format!("Namespace {}{scope}", path.join(".")), |p| {
                    if let Some(body) = body {
                        for s in body {
                            p.print_stmt(s);
                        }
                    }
                });
            }
        }
    }

    fn annotation(&self, id: ExprId) -> String {
        match self.annotations.and_then(|m| m.get(&id)) {
            Some(ty) => format!(" : {ty}"),
            None => String::new(),
        }
    }

    fn print_expr(&mut self, id: ExprId) {
        let note = self.annotation(id);
        match self.ast.expr(id).clone() {
            Expr::Literal { kind, text } => self.line(format!("Literal {kind:?} {text}{note}")),
            Expr::ArrayLiteral { elements } => {
                self.nested(format!("ArrayLiteral{note}"), |p| {
                    for e in elements {
                        p.print_expr(e);
                    }
                });
            }
            Expr::Name { ident } => self.line(format!("Name {ident}{note}")),
            Expr::QualifiedName { left, right } => {
                self.nested(format!("QualifiedName .{right}{note}"), |p| p.print_expr(left));
            }
            Expr::GenericName { base, type_args } => {
                self.nested(format!("GenericName{note}"), |p| {
                    p.print_expr(base);
                    for arg in type_args {
                        p.print_expr(arg);
                    }
                });
            }
            Expr::This => self.line(format!("This{note}")),
            Expr::Paren { inner } => self.nested(format!("Paren{note}"), |p| p.print_expr(inner)),
            Expr::Unary { op, operand, postfix } => {
                let position = if postfix { "postfix" } else { "prefix" };
                self.nested(format!("Unary {} ({position}){note}", op.symbol()), |p| {
                    p.print_expr(operand)
                });
            }
            Expr::Binary { left, op, right } => {
                self.nested(format!("Binary {}{note}", op.symbol()), |p| {
                    p.print_expr(left);
                    p.print_expr(right);
                });
            }
            Expr::Assign { target, op, value } => {
                self.nested(format!("Assign {}{note}", op.symbol()), |p| {
                    p.print_expr(target);
                    p.print_expr(value);
                });
            }
            Expr::Conditional { condition, then_value, else_value } => {
                self.nested(format!("Conditional{note}"), |p| {
                    p.print_expr(condition);
                    p.print_expr(then_value);
                    p.print_expr(else_value);
                });
            }
            Expr::MemberAccess { object, member, .. } => {
                self.nested(format!("MemberAccess .{member}{note}"), |p| p.print_expr(object));
            }
            Expr::Index { object, index } => {
                self.nested(format!("Index{note}"), |p| {
                    p.print_expr(object);
                    p.print_expr(index);
                });
            }
            Expr::Call { callee, args } => {
                self.nested(format!("Call{note}"), |p| {
                    p.print_expr(callee);
                    for a in args {
                        p.print_expr(a);
                    }
                });
            }
            Expr::New { ty, args } => {
                self.nested(format!("New{note}"), |p| {
                    p.print_expr(ty);
                    for a in args {
                        p.print_expr(a);
                    }
                });
            }
            Expr::Cast { target_ty, value } => {
                self.nested(format!("Cast{note}"), |p| {
                    p.print_expr(target_ty);
                    p.print_expr(value);
                });
            }
            Expr::Lambda { params, body } => {
                self.nested(format!("Lambda{note}"), |p| {
                    for param in params {
                        p.print_stmt(param);
                    }
                    match body {
                        LambdaBody::Expression(e) => p.print_expr(e),
                        LambdaBody::Block(b) => p.print_stmt(b),
                    }
                });
            }
            Expr::TypeOf { ty } => self.nested(format!("TypeOf{note}"), |p| p.print_expr(ty)),
            Expr::SizeOf { ty } => self.nested(format!("SizeOf{note}"), |p| p.print_expr(ty)),
            Expr::Range { start, end, inclusive } => {
                let op = if inclusive { "..=" } else { ".." };
                self.nested(format!("Range {op}{note}"), |p| {
                    p.print_expr(start);
                    p.print_expr(end);
                });
            }
            Expr::ImplicitMember { member } => self.line(format!("ImplicitMember .{member}{note}")),
            Expr::ArrayType { element, size } => {
                self.nested(format!("ArrayType{note}"), |p| {
                    p.print_expr(element);
                    if let Some(s) = size {
                        p.print_expr(s);
                    }
                });
            }
            Expr::PointerType { pointee } => {
                self.nested(format!("PointerType{note}"), |p| p.print_expr(pointee));
            }
            Expr::FunctionType { params, ret } => {
                self.nested(format!("FunctionType{note}"), |p| {
                    for param in params {
                        p.print_expr(param);
                    }
                    if let Some(r) = ret {
                        p.nested("ReturnType".into(), |p| p.print_expr(r));
                    }
                });
            }
            Expr::Missing { message } => self.line(format!("MissingExpr \"{message}\"{note}")),
        }
    }
}
