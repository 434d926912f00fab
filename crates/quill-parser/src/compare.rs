//! Structural tree comparison, used by the round-trip printing tests and
//! available to the driver for golden checks.
//!
//! Two trees are structurally equal when they have the same shape and the
//! same names, operators, literals, and modifiers -- ranges are ignored,
//! and `Paren` nodes are transparent (the printer may add protective
//! parentheses that do not change meaning).

use crate::arena::{Ast, CompilationUnit, ExprId, StmtId};
use crate::ast::{AccessorBody, Expr, LambdaBody, PropertyAccessor, Stmt, TypedName};

pub fn units_eq(a: &Ast, ua: &CompilationUnit, b: &Ast, ub: &CompilationUnit) -> bool {
    stmt_lists_eq(a, &ua.statements, b, &ub.statements)
}

pub fn stmts_eq(a: &Ast, sa: StmtId, b: &Ast, sb: StmtId) -> bool {
    stmt_eq(a, sa, b, sb)
}

pub fn exprs_eq(a: &Ast, ea: ExprId, b: &Ast, eb: ExprId) -> bool {
    expr_eq(a, ea, b, eb)
}

fn stmt_lists_eq(a: &Ast, la: &[StmtId], b: &Ast, lb: &[StmtId]) -> bool {
    la.len() == lb.len() && la.iter().zip(lb).all(|(&x, &y)| stmt_eq(a, x, b, y))
}

fn expr_lists_eq(a: &Ast, la: &[ExprId], b: &Ast, lb: &[ExprId]) -> bool {
    la.len() == lb.len() && la.iter().zip(lb).all(|(&x, &y)| expr_eq(a, x, b, y))
}

fn opt_expr_eq(a: &Ast, ea: Option<ExprId>, b: &Ast, eb: Option<ExprId>) -> bool {
    match (ea, eb) {
        (None, None) => true,
        (Some(x), Some(y)) => expr_eq(a, x, b, y),
        _ => false,
    }
}

fn opt_stmt_eq(a: &Ast, sa: Option<StmtId>, b: &Ast, sb: Option<StmtId>) -> bool {
    match (sa, sb) {
        (None, None) => true,
        (Some(x), Some(y)) => stmt_eq(a, x, b, y),
        _ => false,
    }
}

fn typed_name_eq(a: &Ast, na: &TypedName, b: &Ast, nb: &TypedName) -> bool {
    na.name == nb.name && opt_expr_eq(a, na.ty, b, nb.ty)
}

fn accessor_eq(a: &Ast, xa: &PropertyAccessor, b: &Ast, xb: &PropertyAccessor) -> bool {
    xa.kind == xb.kind
        && xa.modifiers == xb.modifiers
        && match (&xa.body, &xb.body) {
            (AccessorBody::Auto, AccessorBody::Auto) => true,
            (AccessorBody::Expression(x), AccessorBody::Expression(y)) => expr_eq(a, *x, b, *y),
            (AccessorBody::Block(x), AccessorBody::Block(y)) => stmt_eq(a, *x, b, *y),
            _ => false,
        }
}

fn opt_accessor_eq(
    a: &Ast,
    xa: &Option<PropertyAccessor>,
    b: &Ast,
    xb: &Option<PropertyAccessor>,
) -> bool {
    match (xa, xb) {
        (None, None) => true,
        (Some(x), Some(y)) => accessor_eq(a, x, b, y),
        _ => false,
    }
}

/// Chase through `Paren` wrappers.
fn unwrap_paren(ast: &Ast, mut id: ExprId) -> ExprId {
    while let Expr::Paren { inner } = ast.expr(id) {
        id = *inner;
    }
    id
}

fn expr_eq(a: &Ast, ea: ExprId, b: &Ast, eb: ExprId) -> bool {
    let ea = unwrap_paren(a, ea);
    let eb = unwrap_paren(b, eb);
    match (a.expr(ea), b.expr(eb)) {
        (Expr::Literal { kind: ka, text: ta }, Expr::Literal { kind: kb, text: tb }) => {
            ka == kb && ta == tb
        }
        (Expr::ArrayLiteral { elements: xa }, Expr::ArrayLiteral { elements: xb }) => {
            expr_lists_eq(a, xa, b, xb)
        }
        (Expr::Name { ident: ia }, Expr::Name { ident: ib }) => ia == ib,
        (
            Expr::QualifiedName { left: la, right: ra },
            Expr::QualifiedName { left: lb, right: rb },
        ) => ra == rb && expr_eq(a, *la, b, *lb),
        (
            Expr::GenericName { base: ba, type_args: ta },
            Expr::GenericName { base: bb, type_args: tb },
        ) => expr_eq(a, *ba, b, *bb) && expr_lists_eq(a, ta, b, tb),
        (Expr::This, Expr::This) => true,
        (
            Expr::Unary { op: oa, operand: xa, postfix: pa },
            Expr::Unary { op: ob, operand: xb, postfix: pb },
        ) => oa == ob && pa == pb && expr_eq(a, *xa, b, *xb),
        (
            Expr::Binary { left: la, op: oa, right: ra },
            Expr::Binary { left: lb, op: ob, right: rb },
        ) => oa == ob && expr_eq(a, *la, b, *lb) && expr_eq(a, *ra, b, *rb),
        (
            Expr::Assign { target: ta, op: oa, value: va },
            Expr::Assign { target: tb, op: ob, value: vb },
        ) => oa == ob && expr_eq(a, *ta, b, *tb) && expr_eq(a, *va, b, *vb),
        (
            Expr::Conditional { condition: ca, then_value: ta, else_value: ea2 },
            Expr::Conditional { condition: cb, then_value: tb, else_value: eb2 },
        ) => {
            expr_eq(a, *ca, b, *cb) && expr_eq(a, *ta, b, *tb) && expr_eq(a, *ea2, b, *eb2)
        }
        (
            Expr::MemberAccess { object: oa, member: ma, .. },
            Expr::MemberAccess { object: ob, member: mb, .. },
        ) => ma == mb && expr_eq(a, *oa, b, *ob),
        (Expr::Index { object: oa, index: ia }, Expr::Index { object: ob, index: ib }) => {
            expr_eq(a, *oa, b, *ob) && expr_eq(a, *ia, b, *ib)
        }
        (Expr::Call { callee: ca, args: xa }, Expr::Call { callee: cb, args: xb }) => {
            expr_eq(a, *ca, b, *cb) && expr_lists_eq(a, xa, b, xb)
        }
        (Expr::New { ty: ta, args: xa }, Expr::New { ty: tb, args: xb }) => {
            expr_eq(a, *ta, b, *tb) && expr_lists_eq(a, xa, b, xb)
        }
        (
            Expr::Cast { target_ty: ta, value: va },
            Expr::Cast { target_ty: tb, value: vb },
        ) => expr_eq(a, *ta, b, *tb) && expr_eq(a, *va, b, *vb),
        (Expr::Lambda { params: pa, body: ba }, Expr::Lambda { params: pb, body: bb }) => {
            stmt_lists_eq(a, pa, b, pb)
                && match (ba, bb) {
                    (LambdaBody::Expression(x), LambdaBody::Expression(y)) => {
                        expr_eq(a, *x, b, *y)
                    }
                    (LambdaBody::Block(x), LambdaBody::Block(y)) => stmt_eq(a, *x, b, *y),
                    _ => false,
                }
        }
        (Expr::TypeOf { ty: ta }, Expr::TypeOf { ty: tb }) => expr_eq(a, *ta, b, *tb),
        (Expr::SizeOf { ty: ta }, Expr::SizeOf { ty: tb }) => expr_eq(a, *ta, b, *tb),
        (
            Expr::Range { start: sa, end: ea2, inclusive: ia },
            Expr::Range { start: sb, end: eb2, inclusive: ib },
        ) => ia == ib && expr_eq(a, *sa, b, *sb) && expr_eq(a, *ea2, b, *eb2),
        (Expr::ImplicitMember { member: ma }, Expr::ImplicitMember { member: mb }) => ma == mb,
        (
            Expr::ArrayType { element: xa, size: sa },
            Expr::ArrayType { element: xb, size: sb },
        ) => expr_eq(a, *xa, b, *xb) && opt_expr_eq(a, *sa, b, *sb),
        (Expr::PointerType { pointee: pa }, Expr::PointerType { pointee: pb }) => {
            expr_eq(a, *pa, b, *pb)
        }
        (
            Expr::FunctionType { params: pa, ret: ra },
            Expr::FunctionType { params: pb, ret: rb },
        ) => expr_lists_eq(a, pa, b, pb) && opt_expr_eq(a, *ra, b, *rb),
        (Expr::Missing { .. }, Expr::Missing { .. }) => true,
        _ => false,
    }
}

fn stmt_eq(a: &Ast, sa: StmtId, b: &Ast, sb: StmtId) -> bool {
    match (a.stmt(sa), b.stmt(sb)) {
        (Stmt::Block { statements: xa }, Stmt::Block { statements: xb }) => {
            stmt_lists_eq(a, xa, b, xb)
        }
        (
            Stmt::If { condition: ca, then_branch: ta, else_branch: ea },
            Stmt::If { condition: cb, then_branch: tb, else_branch: eb },
        ) => {
            expr_eq(a, *ca, b, *cb)
                && stmt_eq(a, *ta, b, *tb)
                && opt_stmt_eq(a, *ea, b, *eb)
        }
        (Stmt::While { condition: ca, body: ba }, Stmt::While { condition: cb, body: bb }) => {
            expr_eq(a, *ca, b, *cb) && stmt_eq(a, *ba, b, *bb)
        }
        (
            Stmt::For { init: ia, condition: ca, updates: ua, body: ba },
            Stmt::For { init: ib, condition: cb, updates: ub, body: bb },
        ) => {
            opt_stmt_eq(a, *ia, b, *ib)
                && opt_expr_eq(a, *ca, b, *cb)
                && expr_lists_eq(a, ua, b, ub)
                && stmt_eq(a, *ba, b, *bb)
        }
        (Stmt::Return { value: va }, Stmt::Return { value: vb }) => opt_expr_eq(a, *va, b, *vb),
        (Stmt::Break, Stmt::Break) | (Stmt::Continue, Stmt::Continue) => true,
        (Stmt::Expr { expr: ea }, Stmt::Expr { expr: eb }) => expr_eq(a, *ea, b, *eb),
        (
            Stmt::Using { kind: ka, path: pa, alias: aa, aliased_type: ta },
            Stmt::Using { kind: kb, path: pb, alias: ab, aliased_type: tb },
        ) => ka == kb && pa == pb && aa == ab && opt_expr_eq(a, *ta, b, *tb),
        (Stmt::Missing { .. }, Stmt::Missing { .. }) => true,
        (
            Stmt::VarDecl { modifiers: ma, variable: va, initializer: ia },
            Stmt::VarDecl { modifiers: mb, variable: vb, initializer: ib },
        ) => ma == mb && typed_name_eq(a, va, b, vb) && opt_expr_eq(a, *ia, b, *ib),
        (
            Stmt::PropertyDecl { modifiers: ma, variable: va, getter: ga, setter: sa2 },
            Stmt::PropertyDecl { modifiers: mb, variable: vb, getter: gb, setter: sb2 },
        ) => {
            ma == mb
                && typed_name_eq(a, va, b, vb)
                && opt_accessor_eq(a, ga, b, gb)
                && opt_accessor_eq(a, sa2, b, sb2)
        }
        (
            Stmt::ParamDecl { modifiers: ma, param: pa, default: da },
            Stmt::ParamDecl { modifiers: mb, param: pb, default: db },
        ) => ma == mb && typed_name_eq(a, pa, b, pb) && opt_expr_eq(a, *da, b, *db),
        (
            Stmt::FunctionDecl {
                modifiers: ma,
                name: na,
                type_params: ta,
                params: pa,
                return_ty: ra,
                body: ba,
                ..
            },
            Stmt::FunctionDecl {
                modifiers: mb,
                name: nb,
                type_params: tb,
                params: pb,
                return_ty: rb,
                body: bb,
                ..
            },
        ) => {
            ma == mb
                && na == nb
                && stmt_lists_eq(a, ta, b, tb)
                && stmt_lists_eq(a, pa, b, pb)
                && opt_expr_eq(a, *ra, b, *rb)
                && opt_stmt_eq(a, *ba, b, *bb)
        }
        (
            Stmt::ConstructorDecl { modifiers: ma, params: pa, body: ba },
            Stmt::ConstructorDecl { modifiers: mb, params: pb, body: bb },
        ) => ma == mb && stmt_lists_eq(a, pa, b, pb) && stmt_eq(a, *ba, b, *bb),
        (
            Stmt::EnumCaseDecl { modifiers: ma, name: na, payload: pa, .. },
            Stmt::EnumCaseDecl { modifiers: mb, name: nb, payload: pb, .. },
        ) => ma == mb && na == nb && stmt_lists_eq(a, pa, b, pb),
        (
            Stmt::TypeDecl {
                modifiers: ma,
                name: na,
                kind: ka,
                type_params: ta,
                base_types: xa,
                members: mem_a,
                ..
            },
            Stmt::TypeDecl {
                modifiers: mb,
                name: nb,
                kind: kb,
                type_params: tb,
                base_types: xb,
                members: mem_b,
                ..
            },
        ) => {
            ma == mb
                && na == nb
                && ka == kb
                && stmt_lists_eq(a, ta, b, tb)
                && expr_lists_eq(a, xa, b, xb)
                && stmt_lists_eq(a, mem_a, b, mem_b)
        }
        (Stmt::TypeParamDecl { name: na }, Stmt::TypeParamDecl { name: nb }) => na == nb,
        (
            Stmt::NamespaceDecl { path: pa, file_scoped: fa, body: ba },
            Stmt::NamespaceDecl { path: pb, file_scoped: fb, body: bb },
        ) => {
            pa == pb
                && fa == fb
                && match (ba, bb) {
                    (None, None) => true,
                    (Some(x), Some(y)) => stmt_lists_eq(a, x, b, y),
                    _ => false,
                }
        }
        _ => false,
    }
}
