//! Recursive-descent driver for the Quill parser.
//!
//! This module owns the parser state: the token cursor, the node arena,
//! the error list, and the context stack that validates `break` /
//! `continue` / `return` placement. Declaration parsing lives in
//! [`items`], the Pratt expression climber in [`expressions`], and type
//! syntax in [`types`].
//!
//! Two recovery strategies combine: required-but-missing syntax produces
//! `Missing` placeholder nodes (always paired with a diagnostic), and
//! after an unparseable statement the driver resynchronizes at the next
//! safe harbor -- a declaration keyword, a block boundary, a `;`, or a
//! major statement keyword. At closing delimiters synchronization stops
//! *at* the token so outer constructs can still close.

pub(crate) mod expressions;
pub(crate) mod items;
pub(crate) mod types;

use quill_common::span::SourceRange;
use quill_common::token::TokenKind;
use quill_lexer::{Checkpoint, TokenStream};

use crate::arena::{Ast, CompilationUnit, ExprId, StmtId};
use crate::ast::{Expr, Stmt, TypedName};
use crate::error::ParseError;
use crate::ParseResult;

/// Where the parser currently is, for context-sensitive validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
    TopLevel,
    TypeBody,
    Namespace,
    Function,
    Loop,
    PropertyGetter,
    PropertySetter,
}

/// Snapshot for speculative parsing: restores the token cursor, discards
/// speculatively allocated nodes, and drops speculative diagnostics.
pub(crate) struct Speculation {
    checkpoint: Checkpoint,
    expr_len: usize,
    stmt_len: usize,
    error_len: usize,
}

pub(crate) struct Parser<'src> {
    pub(crate) tokens: TokenStream,
    pub(crate) source: &'src str,
    pub(crate) ast: Ast,
    pub(crate) errors: Vec<ParseError>,
    contexts: Vec<Context>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: TokenStream, source: &'src str) -> Self {
        Self {
            tokens,
            source,
            ast: Ast::new(),
            errors: Vec::new(),
            contexts: vec![Context::TopLevel],
        }
    }

    pub(crate) fn run(mut self) -> ParseResult {
        let unit = self.parse_compilation_unit();
        ParseResult {
            ast: self.ast,
            unit,
            errors: self.errors,
            tokens: self.tokens,
        }
    }

    // ── Token helpers ──────────────────────────────────────────────────

    pub(crate) fn kind(&self) -> TokenKind {
        self.tokens.current().kind
    }

    pub(crate) fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens.peek(n).kind
    }

    pub(crate) fn current_range(&self) -> SourceRange {
        self.tokens.current().range
    }

    pub(crate) fn prev_range(&self) -> SourceRange {
        self.tokens.previous().range
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.tokens.current().range.text(self.source)
    }

    /// Whether the current token can serve as an identifier. `get`, `set`,
    /// `value`, and `field` are contextual keywords: reserved in their own
    /// positions but usable as ordinary names everywhere else.
    pub(crate) fn at_ident_like(&self) -> bool {
        Self::ident_like(self.kind())
    }

    pub(crate) fn ident_like(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Ident
                | TokenKind::Get
                | TokenKind::Set
                | TokenKind::Value
                | TokenKind::Field
        )
    }

    /// Range from a construct's first token through the last consumed one.
    pub(crate) fn span_from(&self, start: SourceRange) -> SourceRange {
        start.merge(self.prev_range())
    }

    // ── Error reporting ────────────────────────────────────────────────

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(ParseError::error(message, range));
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, range: SourceRange) {
        self.errors.push(ParseError::error(message, range));
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors.push(ParseError::warning(message, range));
    }

    /// Consume `kind` or report `expected 'X'` and continue as if it had
    /// been present.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> bool {
        if self.tokens.consume(kind) {
            true
        } else {
            self.error(format!("expected '{kind}', found '{}'", self.kind()));
            false
        }
    }

    /// Record a diagnostic and produce a `Missing` expression placeholder.
    pub(crate) fn missing_expr(&mut self, message: impl Into<String>) -> ExprId {
        let message = message.into();
        self.error(message.clone());
        let range = self.current_range();
        self.ast.alloc_expr(Expr::Missing { message }, range)
    }

    /// Record a diagnostic and produce a `Missing` statement placeholder,
    /// preserving any salvaged sub-trees.
    pub(crate) fn missing_stmt(&mut self, message: impl Into<String>, partial: Vec<StmtId>) -> StmtId {
        let message = message.into();
        self.error(message.clone());
        let range = self.current_range();
        self.ast.alloc_stmt(Stmt::Missing { message, partial }, range)
    }

    // ── Speculation ────────────────────────────────────────────────────

    pub(crate) fn begin_speculation(&self) -> Speculation {
        Speculation {
            checkpoint: self.tokens.checkpoint(),
            expr_len: self.ast.expr_count(),
            stmt_len: self.ast.stmt_count(),
            error_len: self.errors.len(),
        }
    }

    pub(crate) fn abandon_speculation(&mut self, spec: Speculation) {
        self.tokens.restore(spec.checkpoint);
        self.ast.truncate(spec.expr_len, spec.stmt_len);
        self.errors.truncate(spec.error_len);
    }

    // ── Context stack ──────────────────────────────────────────────────

    pub(crate) fn with_context<T>(&mut self, context: Context, f: impl FnOnce(&mut Self) -> T) -> T {
        self.contexts.push(context);
        let result = f(self);
        self.contexts.pop();
        result
    }

    /// Inside a loop of the current function.
    pub(crate) fn in_loop(&self) -> bool {
        for context in self.contexts.iter().rev() {
            match context {
                Context::Loop => return true,
                Context::Function => return false,
                _ => {}
            }
        }
        false
    }

    pub(crate) fn in_function(&self) -> bool {
        self.contexts.iter().any(|c| {
            matches!(c, Context::Function | Context::PropertyGetter | Context::PropertySetter)
        })
    }

    /// Whether the parser is directly inside a type body (used for member
    /// dispatch; function bodies nested in the type do not count).
    pub(crate) fn at_type_member_level(&self) -> bool {
        self.contexts.last() == Some(&Context::TypeBody)
    }

    // ── Top level ──────────────────────────────────────────────────────

    fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let mut statements = Vec::new();
        while !self.tokens.at_end() {
            let before = self.tokens.position();
            statements.push(self.parse_top_level_statement());
            if self.tokens.position() == before {
                // The statement parser made no progress; drop the token so
                // the loop terminates.
                self.tokens.advance();
            }
        }
        CompilationUnit { statements }
    }

    pub(crate) fn parse_top_level_statement(&mut self) -> StmtId {
        if self.at_declaration_start() {
            self.parse_declaration()
        } else {
            self.parse_statement()
        }
    }

    /// Deterministic declaration dispatch: peek across modifiers and look
    /// at what follows. Never requires unbounded lookahead.
    pub(crate) fn at_declaration_start(&self) -> bool {
        let mut offset = 0;
        while self.peek_kind(offset).is_modifier() {
            offset += 1;
        }
        let kind = self.peek_kind(offset);
        match kind {
            TokenKind::Type
            | TokenKind::Enum
            | TokenKind::Fn
            | TokenKind::Var
            | TokenKind::Using
            | TokenKind::Namespace => true,
            TokenKind::New if self.at_type_member_level() => true,
            // Inside a type body everything member-shaped is a declaration.
            TokenKind::Ident if self.at_type_member_level() => true,
            _ => offset > 0,
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    pub(crate) fn parse_statement(&mut self) -> StmtId {
        match self.kind() {
            TokenKind::LBrace => self.parse_block(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            TokenKind::Continue => self.parse_continue(),
            _ if self.at_declaration_start() => self.parse_declaration(),
            kind if kind.starts_expression() => {
                // `TYPE NAME` at statement level declares a local.
                if kind == TokenKind::Ident {
                    if let Some(decl) = self.try_parse_local_var_decl() {
                        return decl;
                    }
                }
                self.parse_expression_statement()
            }
            kind => {
                let stmt =
                    self.missing_stmt(format!("expected statement, found '{kind}'"), Vec::new());
                self.synchronize();
                stmt
            }
        }
    }

    pub(crate) fn parse_block(&mut self) -> StmtId {
        let start = self.current_range();
        self.expect(TokenKind::LBrace);
        let mut statements = Vec::new();
        while !self.tokens.check(TokenKind::RBrace) && !self.tokens.at_end() {
            let before = self.tokens.position();
            statements.push(self.parse_statement());
            if self.tokens.position() == before {
                self.tokens.advance();
            }
        }
        self.expect(TokenKind::RBrace);
        self.ast.alloc_stmt(Stmt::Block { statements }, self.span_from(start))
    }

    fn parse_if(&mut self) -> StmtId {
        let start = self.current_range();
        self.tokens.advance(); // if
        self.expect(TokenKind::LParen);
        let condition = self.parse_expression(0);
        self.expect(TokenKind::RParen);
        let then_branch = self.parse_statement();
        let else_branch = if self.tokens.consume(TokenKind::Else) {
            Some(self.parse_statement())
        } else {
            None
        };
        self.ast.alloc_stmt(
            Stmt::If { condition, then_branch, else_branch },
            self.span_from(start),
        )
    }

    fn parse_while(&mut self) -> StmtId {
        let start = self.current_range();
        self.tokens.advance(); // while
        self.expect(TokenKind::LParen);
        let condition = self.parse_expression(0);
        self.expect(TokenKind::RParen);
        let body = self.with_context(Context::Loop, |p| p.parse_statement());
        self.ast.alloc_stmt(Stmt::While { condition, body }, self.span_from(start))
    }

    /// `for ( init? ; cond? ; updates,* ) body`
    fn parse_for(&mut self) -> StmtId {
        let start = self.current_range();
        self.tokens.advance(); // for
        self.expect(TokenKind::LParen);

        let init = if self.tokens.consume(TokenKind::Semicolon) {
            None
        } else if self.kind() == TokenKind::Var || self.kind().is_modifier() {
            Some(self.parse_declaration())
        } else if let Some(decl) = self.try_parse_local_var_decl() {
            Some(decl)
        } else {
            let expr_start = self.current_range();
            let expr = self.parse_expression(0);
            self.expect(TokenKind::Semicolon);
            Some(self.ast.alloc_stmt(Stmt::Expr { expr }, self.span_from(expr_start)))
        };

        let condition = if self.tokens.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(0))
        };
        self.expect(TokenKind::Semicolon);

        let mut updates = Vec::new();
        if !self.tokens.check(TokenKind::RParen) {
            loop {
                updates.push(self.parse_expression(0));
                if !self.tokens.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);

        let body = self.with_context(Context::Loop, |p| p.parse_statement());
        self.ast.alloc_stmt(
            Stmt::For { init, condition, updates, body },
            self.span_from(start),
        )
    }

    fn parse_return(&mut self) -> StmtId {
        let start = self.current_range();
        if !self.in_function() {
            self.error("return outside of function");
        }
        self.tokens.advance(); // return
        let value = if self.tokens.check(TokenKind::Semicolon)
            || self.tokens.check(TokenKind::RBrace)
            || !self.kind().starts_expression()
        {
            None
        } else {
            Some(self.parse_expression(0))
        };
        self.expect_statement_end();
        self.ast.alloc_stmt(Stmt::Return { value }, self.span_from(start))
    }

    fn parse_break(&mut self) -> StmtId {
        let start = self.current_range();
        if !self.in_loop() {
            self.error("break outside of loop");
        }
        self.tokens.advance();
        self.expect_statement_end();
        self.ast.alloc_stmt(Stmt::Break, self.span_from(start))
    }

    fn parse_continue(&mut self) -> StmtId {
        let start = self.current_range();
        if !self.in_loop() {
            self.error("continue outside of loop");
        }
        self.tokens.advance();
        self.expect_statement_end();
        self.ast.alloc_stmt(Stmt::Continue, self.span_from(start))
    }

    fn parse_expression_statement(&mut self) -> StmtId {
        let start = self.current_range();
        let expr = self.parse_expression(0);
        self.expect_statement_end();
        self.ast.alloc_stmt(Stmt::Expr { expr }, self.span_from(start))
    }

    /// Speculatively parse `TYPE NAME (= init)?` as a local declaration.
    /// Restores everything and returns `None` when the tokens turn out to
    /// be an ordinary expression.
    fn try_parse_local_var_decl(&mut self) -> Option<StmtId> {
        let spec = self.begin_speculation();
        let start = self.current_range();

        let Some(ty) = self.parse_type_opt() else {
            self.abandon_speculation(spec);
            return None;
        };
        if !self.at_ident_like() {
            self.abandon_speculation(spec);
            return None;
        }

        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let initializer = if self.tokens.consume(TokenKind::Eq) {
            Some(self.parse_expression(0))
        } else {
            None
        };
        self.expect_statement_end();

        Some(self.ast.alloc_stmt(
            Stmt::VarDecl {
                modifiers: Default::default(),
                variable: TypedName { name, name_range, ty: Some(ty) },
                initializer,
            },
            self.span_from(start),
        ))
    }

    /// A statement ends at `;`, at a closing brace, at end of file, or at
    /// a line break. A following token on the same line without a `;` is
    /// an error.
    pub(crate) fn expect_statement_end(&mut self) {
        if self.tokens.consume(TokenKind::Semicolon) {
            return;
        }
        let current = self.tokens.current();
        if matches!(current.kind, TokenKind::Eof | TokenKind::RBrace | TokenKind::RParen) {
            return;
        }
        if current.range.start.line > self.tokens.previous().range.start.line {
            return;
        }
        self.error("expected ';'");
    }

    // ── Synchronization ────────────────────────────────────────────────

    /// Advance to the next safe harbor after an error. Stops *at* closing
    /// delimiters and construct keywords; consumes a stray `;`.
    pub(crate) fn synchronize(&mut self) {
        while !self.tokens.at_end() {
            match self.kind() {
                TokenKind::Semicolon => {
                    self.tokens.advance();
                    return;
                }
                TokenKind::Fn
                | TokenKind::Type
                | TokenKind::Enum
                | TokenKind::Var
                | TokenKind::Using
                | TokenKind::Namespace
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::RParen
                | TokenKind::RBracket => return,
                _ => self.tokens.advance(),
            }
        }
    }
}
