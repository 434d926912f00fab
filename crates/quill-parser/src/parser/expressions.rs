//! Pratt precedence climber for Quill expressions.
//!
//! `parse_expression(min_prec)` parses a unary-or-primary operand with its
//! postfix chain, then loops over binary operators whose precedence is at
//! least `min_prec`. Right-associative operators (assignment, ternary)
//! recurse at their own precedence; left-associative ones at one higher.
//! Ranges (`a..b`, `a..=b`) are primary-level constructs, and generic
//! argument lists after a name are committed only when speculation across
//! a checkpoint succeeds.

use quill_common::token::{precedence, TokenKind};

use crate::arena::{ExprId, StmtId};
use crate::ast::{AssignOp, BinaryOp, Expr, LambdaBody, LiteralKind, Stmt, TypedName, UnaryOp};

use super::{Context, Parser};

impl<'src> Parser<'src> {
    pub(crate) fn parse_expression(&mut self, min_prec: u8) -> ExprId {
        let mut lhs = self.parse_unary();

        loop {
            let kind = self.kind();
            let prec = kind.binary_precedence();
            if prec == precedence::NONE || prec < min_prec {
                break;
            }

            // Ternary: `cond ? then : else`, right-associative.
            if kind == TokenKind::Question {
                self.tokens.advance();
                let then_value = self.parse_expression(0);
                self.expect(TokenKind::Colon);
                let else_value = self.parse_expression(precedence::TERNARY);
                let range = self
                    .ast
                    .expr_range(lhs)
                    .merge(self.ast.expr_range(else_value));
                lhs = self.ast.alloc_expr(
                    Expr::Conditional { condition: lhs, then_value, else_value },
                    range,
                );
                continue;
            }

            // Assignment operators: right-associative, lowest precedence.
            if let Some(op) = AssignOp::from_token(kind) {
                self.tokens.advance();
                let value = self.parse_expression(prec);
                let range = self.ast.expr_range(lhs).merge(self.ast.expr_range(value));
                lhs = self
                    .ast
                    .alloc_expr(Expr::Assign { target: lhs, op, value }, range);
                continue;
            }

            let op = BinaryOp::from_token(kind)
                .expect("token with binary precedence must map to a binary operator");
            self.tokens.advance();
            let rhs = self.parse_expression(prec + 1);
            let range = self.ast.expr_range(lhs).merge(self.ast.expr_range(rhs));
            lhs = self
                .ast
                .alloc_expr(Expr::Binary { left: lhs, op, right: rhs }, range);
        }

        lhs
    }

    /// Prefix operators, then a primary with its postfix chain, then an
    /// optional range tail.
    fn parse_unary(&mut self) -> ExprId {
        if let Some(op) = UnaryOp::from_prefix_token(self.kind()) {
            let start = self.current_range();
            self.tokens.advance();
            let operand = self.parse_unary();
            let range = start.merge(self.ast.expr_range(operand));
            return self
                .ast
                .alloc_expr(Expr::Unary { op, operand, postfix: false }, range);
        }

        let primary = self.parse_primary();
        let lhs = self.parse_postfix(primary);

        if matches!(self.kind(), TokenKind::DotDot | TokenKind::DotDotEq) {
            let inclusive = self.kind() == TokenKind::DotDotEq;
            self.tokens.advance();
            let end = self.parse_unary();
            let range = self.ast.expr_range(lhs).merge(self.ast.expr_range(end));
            return self
                .ast
                .alloc_expr(Expr::Range { start: lhs, end, inclusive }, range);
        }

        lhs
    }

    /// Postfix chain: calls, indexers, member access, post-`++`/`--`, and
    /// speculative generic argument lists after a name.
    fn parse_postfix(&mut self, mut lhs: ExprId) -> ExprId {
        loop {
            match self.kind() {
                TokenKind::LParen => {
                    let args = self.parse_call_args();
                    let range = self.span_from(self.ast.expr_range(lhs));
                    lhs = self.ast.alloc_expr(Expr::Call { callee: lhs, args }, range);
                }
                TokenKind::LBracket => {
                    self.tokens.advance();
                    let index = self.parse_expression(0);
                    self.expect(TokenKind::RBracket);
                    let range = self.span_from(self.ast.expr_range(lhs));
                    lhs = self.ast.alloc_expr(Expr::Index { object: lhs, index }, range);
                }
                TokenKind::Dot => {
                    if !Self::ident_like(self.peek_kind(1)) {
                        self.tokens.advance();
                        self.error("expected member name after '.'");
                        break;
                    }
                    self.tokens.advance(); // .
                    let member_range = self.current_range();
                    let member = self.current_text().to_string();
                    self.tokens.advance();
                    let range = self.ast.expr_range(lhs).merge(member_range);
                    lhs = self.ast.alloc_expr(
                        Expr::MemberAccess { object: lhs, member, member_range },
                        range,
                    );
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.kind() == TokenKind::PlusPlus {
                        UnaryOp::Increment
                    } else {
                        UnaryOp::Decrement
                    };
                    let range = self.span_from(self.ast.expr_range(lhs)).merge(self.current_range());
                    self.tokens.advance();
                    lhs = self
                        .ast
                        .alloc_expr(Expr::Unary { op, operand: lhs, postfix: true }, range);
                }
                TokenKind::Lt if self.can_take_generic_args(lhs) => {
                    match self.try_parse_generic_args() {
                        Some(type_args) => {
                            let range = self.span_from(self.ast.expr_range(lhs));
                            lhs = self
                                .ast
                                .alloc_expr(Expr::GenericName { base: lhs, type_args }, range);
                        }
                        // Not a generic argument list; leave `<` for the
                        // binary loop to parse as a comparison.
                        None => break,
                    }
                }
                _ => break,
            }
        }
        lhs
    }

    fn can_take_generic_args(&self, lhs: ExprId) -> bool {
        matches!(
            self.ast.expr(lhs),
            Expr::Name { .. } | Expr::QualifiedName { .. } | Expr::MemberAccess { .. }
        )
    }

    /// Speculatively parse `<type, ...>` after a name. Commits only when
    /// the closing `>` is followed by a token that cannot continue a
    /// comparison chain; otherwise the checkpoint is restored and `<` is
    /// treated as a binary operator.
    fn try_parse_generic_args(&mut self) -> Option<Vec<ExprId>> {
        let spec = self.begin_speculation();
        self.tokens.advance(); // <

        let mut args = Vec::new();
        loop {
            let Some(ty) = self.parse_type_opt() else {
                self.abandon_speculation(spec);
                return None;
            };
            args.push(ty);
            if self.tokens.consume(TokenKind::Comma) {
                continue;
            }
            break;
        }

        if self.tokens.check(TokenKind::Shr) {
            self.tokens.split_right_shift();
        }
        if !self.tokens.consume(TokenKind::Gt) {
            self.abandon_speculation(spec);
            return None;
        }

        let disambiguating = matches!(
            self.kind(),
            TokenKind::LParen
                | TokenKind::Dot
                | TokenKind::ColonColon
                | TokenKind::Comma
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::Semicolon
                | TokenKind::LBrace
                | TokenKind::Question
                | TokenKind::Gt
                | TokenKind::Eof
        );
        if disambiguating {
            Some(args)
        } else {
            self.abandon_speculation(spec);
            None
        }
    }

    // ── Primaries ──────────────────────────────────────────────────────

    fn parse_primary(&mut self) -> ExprId {
        let start = self.current_range();
        let kind = self.kind();

        if let Some(literal) = LiteralKind::from_token(kind) {
            let text = self.current_text().to_string();
            self.tokens.advance();
            return self.ast.alloc_expr(Expr::Literal { kind: literal, text }, start);
        }

        match kind {
            TokenKind::Ident => {
                // `x => expr` is a single-parameter lambda.
                if self.peek_kind(1) == TokenKind::FatArrow {
                    return self.parse_simple_lambda();
                }
                let ident = self.current_text().to_string();
                self.tokens.advance();
                self.ast.alloc_expr(Expr::Name { ident }, start)
            }
            // `value` and `field` are keywords but name things inside
            // property accessors.
            TokenKind::Value | TokenKind::Field => {
                let ident = self.current_text().to_string();
                self.tokens.advance();
                self.ast.alloc_expr(Expr::Name { ident }, start)
            }
            TokenKind::This => {
                self.tokens.advance();
                self.ast.alloc_expr(Expr::This, start)
            }
            TokenKind::LParen => self.parse_paren_lambda_or_cast(),
            TokenKind::New => {
                self.tokens.advance();
                let ty = self.parse_type();
                let args = if self.tokens.check(TokenKind::LParen) {
                    self.parse_call_args()
                } else {
                    self.error("expected '(' after type in 'new' expression");
                    Vec::new()
                };
                self.ast
                    .alloc_expr(Expr::New { ty, args }, self.span_from(start))
            }
            TokenKind::Typeof => {
                self.tokens.advance();
                self.expect(TokenKind::LParen);
                let ty = self.parse_type();
                self.expect(TokenKind::RParen);
                self.ast.alloc_expr(Expr::TypeOf { ty }, self.span_from(start))
            }
            TokenKind::Sizeof => {
                self.tokens.advance();
                self.expect(TokenKind::LParen);
                let ty = self.parse_type();
                self.expect(TokenKind::RParen);
                self.ast.alloc_expr(Expr::SizeOf { ty }, self.span_from(start))
            }
            TokenKind::LBracket => {
                self.tokens.advance();
                let mut elements = Vec::new();
                if !self.tokens.check(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression(0));
                        if !self.tokens.consume(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket);
                self.ast
                    .alloc_expr(Expr::ArrayLiteral { elements }, self.span_from(start))
            }
            // Leading-dot enum member shorthand: `.Red`.
            TokenKind::Dot => {
                self.tokens.advance();
                if !self.at_ident_like() {
                    return self.missing_expr("expected enum member name after '.'");
                }
                let member = self.current_text().to_string();
                self.tokens.advance();
                self.ast
                    .alloc_expr(Expr::ImplicitMember { member }, self.span_from(start))
            }
            other => self.missing_expr(format!("expected expression, found '{other}'")),
        }
    }

    fn parse_call_args(&mut self) -> Vec<ExprId> {
        self.tokens.advance(); // (
        let mut args = Vec::new();
        if !self.tokens.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(0));
                if !self.tokens.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);
        args
    }

    // ── Lambdas and casts ──────────────────────────────────────────────

    /// `x => body`
    fn parse_simple_lambda(&mut self) -> ExprId {
        let start = self.current_range();
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance(); // parameter name
        self.tokens.advance(); // =>

        let param = self.ast.alloc_stmt(
            Stmt::ParamDecl {
                modifiers: Default::default(),
                param: TypedName { name, name_range, ty: None },
                default: None,
            },
            name_range,
        );
        let body = self.parse_lambda_body();
        self.ast
            .alloc_expr(Expr::Lambda { params: vec![param], body }, self.span_from(start))
    }

    /// Disambiguate `(...)` between a lambda parameter list, a prefix
    /// cast, and a parenthesized expression -- in that order, each tried
    /// across a checkpoint.
    fn parse_paren_lambda_or_cast(&mut self) -> ExprId {
        let start = self.current_range();

        // Lambda: `( params ) => body`
        let spec = self.begin_speculation();
        self.tokens.advance(); // (
        let mut params = Vec::new();
        let mut params_ok = true;
        if !self.tokens.check(TokenKind::RParen) {
            loop {
                match self.parse_lambda_param() {
                    Some(p) => params.push(p),
                    None => {
                        params_ok = false;
                        break;
                    }
                }
                if !self.tokens.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        if params_ok && self.tokens.consume(TokenKind::RParen) && self.tokens.check(TokenKind::FatArrow)
        {
            self.tokens.advance(); // =>
            let body = self.parse_lambda_body();
            return self
                .ast
                .alloc_expr(Expr::Lambda { params, body }, self.span_from(start));
        }
        self.abandon_speculation(spec);

        // Cast: `( type ) operand` -- committed only when the parenthesized
        // text parses as a type and an operand can follow.
        let spec = self.begin_speculation();
        self.tokens.advance(); // (
        if let Some(target_ty) = self.parse_type_opt() {
            if self.tokens.consume(TokenKind::RParen) && self.cast_operand_follows() {
                let value = self.parse_unary();
                let range = start.merge(self.ast.expr_range(value));
                return self.ast.alloc_expr(Expr::Cast { target_ty, value }, range);
            }
        }
        self.abandon_speculation(spec);

        // Parenthesized expression.
        self.tokens.advance(); // (
        let inner = self.parse_expression(0);
        self.expect(TokenKind::RParen);
        self.ast.alloc_expr(Expr::Paren { inner }, self.span_from(start))
    }

    fn cast_operand_follows(&self) -> bool {
        let kind = self.kind();
        kind.is_literal()
            || matches!(
                kind,
                TokenKind::Ident
                    | TokenKind::This
                    | TokenKind::New
                    | TokenKind::Typeof
                    | TokenKind::Sizeof
                    | TokenKind::Value
                    | TokenKind::Field
            )
    }

    /// A lambda parameter: `NAME` or `ref NAME: TYPE`. Silent on failure;
    /// only called under speculation.
    fn parse_lambda_param(&mut self) -> Option<StmtId> {
        let start = self.current_range();
        let modifiers = self.parse_modifiers();
        if self.kind() != TokenKind::Ident {
            return None;
        }
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let ty = if self.tokens.consume(TokenKind::Colon) {
            Some(self.parse_type_opt()?)
        } else {
            None
        };

        Some(self.ast.alloc_stmt(
            Stmt::ParamDecl {
                modifiers,
                param: TypedName { name, name_range, ty },
                default: None,
            },
            self.span_from(start),
        ))
    }

    fn parse_lambda_body(&mut self) -> LambdaBody {
        if self.tokens.check(TokenKind::LBrace) {
            LambdaBody::Block(self.with_context(Context::Function, |p| p.parse_block()))
        } else {
            LambdaBody::Expression(self.parse_expression(0))
        }
    }
}
