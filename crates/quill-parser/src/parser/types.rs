//! Type expression parsing.
//!
//! Type syntax reuses the expression node set with constrained primaries:
//! qualified/generic names, `*T` pointers (prefix), `T[size?]` arrays
//! (postfix), and `fn(T, ...) -> T` function types. `parse_type_opt` is
//! completely silent -- it reports nothing and returns `None` on any
//! mismatch -- so it can run under speculation (local declarations,
//! generic arguments, casts). `parse_type` wraps it for committed type
//! positions, producing a `Missing` node plus diagnostic on failure.

use quill_common::token::TokenKind;

use crate::arena::ExprId;
use crate::ast::{Expr, LiteralKind};

use super::Parser;

impl<'src> Parser<'src> {
    /// Parse a type in a committed type position.
    pub(crate) fn parse_type(&mut self) -> ExprId {
        let spec = self.begin_speculation();
        match self.parse_type_opt() {
            Some(ty) => ty,
            None => {
                self.abandon_speculation(spec);
                self.missing_expr(format!("expected type, found '{}'", self.kind()))
            }
        }
    }

    /// Attempt to parse a type; silent, restartable via the caller's
    /// speculation. Partial nodes may be left in the arena; callers that
    /// must not leak them wrap the call in a speculation of their own.
    pub(crate) fn parse_type_opt(&mut self) -> Option<ExprId> {
        let start = self.current_range();

        let mut ty = match self.kind() {
            // `*T` -- pointer.
            TokenKind::Star => {
                self.tokens.advance();
                let pointee = self.parse_type_opt()?;
                let range = start.merge(self.ast.expr_range(pointee));
                self.ast.alloc_expr(Expr::PointerType { pointee }, range)
            }
            // `fn(T, U) -> R` -- function type.
            TokenKind::Fn => {
                self.tokens.advance();
                if !self.tokens.consume(TokenKind::LParen) {
                    return None;
                }
                let mut params = Vec::new();
                if !self.tokens.check(TokenKind::RParen) {
                    loop {
                        params.push(self.parse_type_opt()?);
                        if !self.tokens.consume(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                if !self.tokens.consume(TokenKind::RParen) {
                    return None;
                }
                let ret = if self.tokens.consume(TokenKind::Arrow) {
                    Some(self.parse_type_opt()?)
                } else {
                    None
                };
                self.ast
                    .alloc_expr(Expr::FunctionType { params, ret }, self.span_from(start))
            }
            TokenKind::Ident => self.parse_name_type()?,
            _ => return None,
        };

        // Array suffixes: `T[]`, `T[4]`, `T[][]`.
        while self.tokens.check(TokenKind::LBracket) {
            self.tokens.advance();
            let size = if self.tokens.check(TokenKind::RBracket) {
                None
            } else if self.kind() == TokenKind::IntLiteral {
                let size_range = self.current_range();
                let text = self.current_text().to_string();
                self.tokens.advance();
                Some(
                    self.ast
                        .alloc_expr(Expr::Literal { kind: LiteralKind::Int, text }, size_range),
                )
            } else {
                return None;
            };
            if !self.tokens.consume(TokenKind::RBracket) {
                return None;
            }
            ty = self
                .ast
                .alloc_expr(Expr::ArrayType { element: ty, size }, self.span_from(start));
        }

        Some(ty)
    }

    /// A possibly qualified, possibly generic name: `a.b.C<T, U>`.
    fn parse_name_type(&mut self) -> Option<ExprId> {
        let start = self.current_range();
        let ident = self.current_text().to_string();
        self.tokens.advance();
        let mut node = self.ast.alloc_expr(Expr::Name { ident }, start);

        loop {
            if self.tokens.check(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Ident {
                self.tokens.advance(); // .
                let right = self.current_text().to_string();
                self.tokens.advance();
                node = self
                    .ast
                    .alloc_expr(Expr::QualifiedName { left: node, right }, self.span_from(start));
            } else if self.tokens.check(TokenKind::Lt) {
                // In type position `<` is always a generic argument list.
                let type_args = self.parse_generic_args_in_type()?;
                node = self
                    .ast
                    .alloc_expr(Expr::GenericName { base: node, type_args }, self.span_from(start));
            } else {
                break;
            }
        }
        Some(node)
    }

    fn parse_generic_args_in_type(&mut self) -> Option<Vec<ExprId>> {
        self.tokens.advance(); // <
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type_opt()?);
            if self.tokens.consume(TokenKind::Comma) {
                continue;
            }
            break;
        }
        // `List<List<i32>>` closes two levels at once; split the `>>` so
        // each list consumes one `>`.
        if self.tokens.check(TokenKind::Shr) {
            self.tokens.split_right_shift();
        }
        if !self.tokens.consume(TokenKind::Gt) {
            return None;
        }
        Some(args)
    }
}
