//! Tree traversal.
//!
//! The `Visitor` trait gives per-category entry points whose defaults call
//! the free `walk_*` functions, which visit children in source order. An
//! implementation overrides the entry points it cares about and calls
//! `walk_expr`/`walk_stmt` itself to keep traversing below the node it
//! handled; unrelated variants are unaffected.

use crate::arena::{Ast, CompilationUnit, ExprId, StmtId};
use crate::ast::{AccessorBody, Expr, LambdaBody, Stmt};

pub trait Visitor: Sized {
    fn visit_unit(&mut self, ast: &Ast, unit: &CompilationUnit) {
        walk_unit(self, ast, unit);
    }

    fn visit_stmt(&mut self, ast: &Ast, id: StmtId) {
        walk_stmt(self, ast, id);
    }

    fn visit_expr(&mut self, ast: &Ast, id: ExprId) {
        walk_expr(self, ast, id);
    }
}

pub fn walk_unit<V: Visitor>(v: &mut V, ast: &Ast, unit: &CompilationUnit) {
    for &stmt in &unit.statements {
        v.visit_stmt(ast, stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, ast: &Ast, id: StmtId) {
    match ast.stmt(id) {
        Stmt::Block { statements } => {
            for &s in statements {
                v.visit_stmt(ast, s);
            }
        }
        Stmt::If { condition, then_branch, else_branch } => {
            v.visit_expr(ast, *condition);
            v.visit_stmt(ast, *then_branch);
            if let Some(e) = else_branch {
                v.visit_stmt(ast, *e);
            }
        }
        Stmt::While { condition, body } => {
            v.visit_expr(ast, *condition);
            v.visit_stmt(ast, *body);
        }
        Stmt::For { init, condition, updates, body } => {
            if let Some(i) = init {
                v.visit_stmt(ast, *i);
            }
            if let Some(c) = condition {
                v.visit_expr(ast, *c);
            }
            for &u in updates {
                v.visit_expr(ast, u);
            }
            v.visit_stmt(ast, *body);
        }
        Stmt::Return { value } => {
            if let Some(value) = value {
                v.visit_expr(ast, *value);
            }
        }
        Stmt::Break | Stmt::Continue => {}
        Stmt::Expr { expr } => v.visit_expr(ast, *expr),
        Stmt::Using { aliased_type, .. } => {
            if let Some(ty) = aliased_type {
                v.visit_expr(ast, *ty);
            }
        }
        Stmt::Missing { partial, .. } => {
            for &s in partial {
                v.visit_stmt(ast, s);
            }
        }
        Stmt::VarDecl { variable, initializer, .. } => {
            if let Some(ty) = variable.ty {
                v.visit_expr(ast, ty);
            }
            if let Some(init) = initializer {
                v.visit_expr(ast, *init);
            }
        }
        Stmt::PropertyDecl { variable, getter, setter, .. } => {
            if let Some(ty) = variable.ty {
                v.visit_expr(ast, ty);
            }
            for accessor in [getter, setter].into_iter().flatten() {
                match &accessor.body {
                    AccessorBody::Auto => {}
                    AccessorBody::Expression(e) => v.visit_expr(ast, *e),
                    AccessorBody::Block(b) => v.visit_stmt(ast, *b),
                }
            }
        }
        Stmt::ParamDecl { param, default, .. } => {
            if let Some(ty) = param.ty {
                v.visit_expr(ast, ty);
            }
            if let Some(d) = default {
                v.visit_expr(ast, *d);
            }
        }
        Stmt::FunctionDecl { type_params, params, return_ty, body, .. } => {
            for &tp in type_params {
                v.visit_stmt(ast, tp);
            }
            for &p in params {
                v.visit_stmt(ast, p);
            }
            if let Some(ret) = return_ty {
                v.visit_expr(ast, *ret);
            }
            if let Some(b) = body {
                v.visit_stmt(ast, *b);
            }
        }
        Stmt::ConstructorDecl { params, body, .. } => {
            for &p in params {
                v.visit_stmt(ast, p);
            }
            v.visit_stmt(ast, *body);
        }
        Stmt::EnumCaseDecl { payload, .. } => {
            for &p in payload {
                v.visit_stmt(ast, p);
            }
        }
        Stmt::TypeDecl { type_params, base_types, members, .. } => {
            for &tp in type_params {
                v.visit_stmt(ast, tp);
            }
            for &b in base_types {
                v.visit_expr(ast, b);
            }
            for &m in members {
                v.visit_stmt(ast, m);
            }
        }
        Stmt::TypeParamDecl { .. } => {}
        Stmt::NamespaceDecl { body, .. } => {
            if let Some(body) = body {
                for &s in body {
                    v.visit_stmt(ast, s);
                }
            }
        }
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, ast: &Ast, id: ExprId) {
    match ast.expr(id) {
        Expr::Literal { .. }
        | Expr::Name { .. }
        | Expr::This
        | Expr::ImplicitMember { .. }
        | Expr::Missing { .. } => {}
        Expr::ArrayLiteral { elements } => {
            for &e in elements {
                v.visit_expr(ast, e);
            }
        }
        Expr::QualifiedName { left, .. } => v.visit_expr(ast, *left),
        Expr::GenericName { base, type_args } => {
            v.visit_expr(ast, *base);
            for &a in type_args {
                v.visit_expr(ast, a);
            }
        }
        Expr::Paren { inner } => v.visit_expr(ast, *inner),
        Expr::Unary { operand, .. } => v.visit_expr(ast, *operand),
        Expr::Binary { left, right, .. } => {
            v.visit_expr(ast, *left);
            v.visit_expr(ast, *right);
        }
        Expr::Assign { target, value, .. } => {
            v.visit_expr(ast, *target);
            v.visit_expr(ast, *value);
        }
        Expr::Conditional { condition, then_value, else_value } => {
            v.visit_expr(ast, *condition);
            v.visit_expr(ast, *then_value);
            v.visit_expr(ast, *else_value);
        }
        Expr::MemberAccess { object, .. } => v.visit_expr(ast, *object),
        Expr::Index { object, index } => {
            v.visit_expr(ast, *object);
            v.visit_expr(ast, *index);
        }
        Expr::Call { callee, args } => {
            v.visit_expr(ast, *callee);
            for &a in args {
                v.visit_expr(ast, a);
            }
        }
        Expr::New { ty, args } => {
            v.visit_expr(ast, *ty);
            for &a in args {
                v.visit_expr(ast, a);
            }
        }
        Expr::Cast { target_ty, value } => {
            v.visit_expr(ast, *target_ty);
            v.visit_expr(ast, *value);
        }
        Expr::Lambda { params, body } => {
            for &p in params {
                v.visit_stmt(ast, p);
            }
            match body {
                LambdaBody::Expression(e) => v.visit_expr(ast, *e),
                LambdaBody::Block(b) => v.visit_stmt(ast, *b),
            }
        }
        Expr::TypeOf { ty } | Expr::SizeOf { ty } => v.visit_expr(ast, *ty),
        Expr::Range { start, end, .. } => {
            v.visit_expr(ast, *start);
            v.visit_expr(ast, *end);
        }
        Expr::ArrayType { element, size } => {
            v.visit_expr(ast, *element);
            if let Some(s) = size {
                v.visit_expr(ast, *s);
            }
        }
        Expr::PointerType { pointee } => v.visit_expr(ast, *pointee),
        Expr::FunctionType { params, ret } => {
            for &p in params {
                v.visit_expr(ast, p);
            }
            if let Some(r) = ret {
                v.visit_expr(ast, *r);
            }
        }
    }
}
