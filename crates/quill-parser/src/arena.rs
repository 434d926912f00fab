use quill_common::span::SourceRange;

use crate::ast::{Expr, Stmt};

/// Handle to an expression node in an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// Handle to a statement (or declaration) node in an [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(pub u32);

/// The node arena for one compilation unit.
///
/// All syntax nodes live in per-category vectors; edges between nodes are
/// integer handles rather than references, so later phases can annotate
/// nodes through side tables without fighting the borrow checker. Nodes
/// are never freed individually; the arena is dropped as a unit at the end
/// of compilation.
#[derive(Debug, Default)]
pub struct Ast {
    exprs: Vec<Expr>,
    expr_ranges: Vec<SourceRange>,
    stmts: Vec<Stmt>,
    stmt_ranges: Vec<SourceRange>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr, range: SourceRange) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        self.expr_ranges.push(range);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt, range: SourceRange) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        self.stmt_ranges.push(range);
        id
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    pub fn expr_range(&self, id: ExprId) -> SourceRange {
        self.expr_ranges[id.0 as usize]
    }

    pub fn stmt_range(&self, id: StmtId) -> SourceRange {
        self.stmt_ranges[id.0 as usize]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }

    /// Whether an expression handle points into this arena.
    pub fn contains_expr(&self, id: ExprId) -> bool {
        (id.0 as usize) < self.exprs.len()
    }

    /// Whether a statement handle points into this arena.
    pub fn contains_stmt(&self, id: StmtId) -> bool {
        (id.0 as usize) < self.stmts.len()
    }

    /// Roll back to a previously captured size, discarding nodes allocated
    /// since. Used by speculative parsing only; handles handed out after
    /// the snapshot become invalid.
    pub(crate) fn truncate(&mut self, expr_len: usize, stmt_len: usize) {
        self.exprs.truncate(expr_len);
        self.expr_ranges.truncate(expr_len);
        self.stmts.truncate(stmt_len);
        self.stmt_ranges.truncate(stmt_len);
    }
}

/// The root of one parsed file: the ordered top-level statements.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    pub statements: Vec<StmtId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, LiteralKind, Stmt};
    use quill_common::span::{SourceLocation, SourceRange};

    fn range(offset: u32, width: u32) -> SourceRange {
        SourceRange::new(SourceLocation::new(offset, 1, offset + 1), width)
    }

    #[test]
    fn alloc_and_fetch() {
        let mut ast = Ast::new();
        let lit = ast.alloc_expr(
            Expr::Literal { kind: LiteralKind::Int, text: "42".into() },
            range(0, 2),
        );
        let stmt = ast.alloc_stmt(Stmt::Expr { expr: lit }, range(0, 3));

        assert!(matches!(ast.expr(lit), Expr::Literal { kind: LiteralKind::Int, .. }));
        assert!(matches!(ast.stmt(stmt), Stmt::Expr { .. }));
        assert_eq!(ast.expr_range(lit).width, 2);
        assert!(ast.contains_expr(lit));
        assert!(!ast.contains_expr(ExprId(99)));
    }

    #[test]
    fn truncate_rolls_back_speculative_nodes() {
        let mut ast = Ast::new();
        let keep = ast.alloc_expr(Expr::This, range(0, 4));
        let (e, s) = (ast.expr_count(), ast.stmt_count());
        ast.alloc_expr(Expr::This, range(5, 4));
        ast.alloc_stmt(Stmt::Break, range(5, 5));
        ast.truncate(e, s);
        assert_eq!(ast.expr_count(), 1);
        assert_eq!(ast.stmt_count(), 0);
        assert!(ast.contains_expr(keep));
    }
}
