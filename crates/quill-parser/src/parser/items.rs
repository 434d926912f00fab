//! Declaration parsers: types, enums, functions, constructors, variables,
//! properties, namespaces, and using directives.

use quill_common::modifiers::ModifierFlags;
use quill_common::span::SourceRange;
use quill_common::token::TokenKind;

use crate::arena::StmtId;
use crate::ast::{
    AccessorBody, AccessorKind, PropertyAccessor, Stmt, TypeDeclKind, TypedName, UsingKind,
};

use super::{Context, Parser};

impl<'src> Parser<'src> {
    /// Parse one declaration, starting at its (possibly empty) modifier
    /// run. Dispatch is deterministic from the token after the modifiers.
    pub(crate) fn parse_declaration(&mut self) -> StmtId {
        let start = self.current_range();
        let modifiers = self.parse_modifiers();
        match self.kind() {
            TokenKind::Type | TokenKind::Enum => self.parse_type_decl(modifiers, start),
            TokenKind::Fn => self.parse_function_decl(modifiers, start),
            TokenKind::Var => self.parse_var_decl(modifiers, start),
            TokenKind::New => self.parse_constructor_decl(modifiers, start),
            TokenKind::Using => self.parse_using_directive(modifiers, start),
            TokenKind::Namespace => self.parse_namespace_decl(modifiers, start),
            TokenKind::Ident => self.parse_typed_member_decl(modifiers, start),
            kind => {
                let stmt =
                    self.missing_stmt(format!("expected declaration, found '{kind}'"), Vec::new());
                self.synchronize();
                stmt
            }
        }
    }

    /// Collect a run of modifier keywords into a bitset, warning on
    /// duplicates.
    pub(crate) fn parse_modifiers(&mut self) -> ModifierFlags {
        let mut flags = ModifierFlags::empty();
        while let Some(flag) = ModifierFlags::from_token(self.kind()) {
            // `ref` directly before `type` belongs to the type declaration;
            // `static type` likewise. Both still read as modifier flags.
            if flags.contains(flag) {
                self.warning(format!("duplicate modifier '{}'", self.kind()));
            }
            flags |= flag;
            self.tokens.advance();
        }
        flags
    }

    // ── Type declarations ──────────────────────────────────────────────

    /// `type|ref type|static type|enum NAME <typarams>? (: baseTypes)? { members }`
    fn parse_type_decl(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        let is_enum = self.kind() == TokenKind::Enum;
        self.tokens.advance(); // type / enum

        let kind = if is_enum {
            TypeDeclKind::Enum
        } else if modifiers.contains(ModifierFlags::REF) {
            TypeDeclKind::Ref
        } else if modifiers.contains(ModifierFlags::STATIC) {
            TypeDeclKind::Static
        } else {
            TypeDeclKind::Value
        };

        if self.kind() != TokenKind::Ident {
            return self.missing_stmt(
                format!("expected type name, found '{}'", self.kind()),
                Vec::new(),
            );
        }
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let type_params = if self.tokens.check(TokenKind::Lt) {
            self.parse_type_param_list()
        } else {
            Vec::new()
        };

        let mut base_types = Vec::new();
        if self.tokens.consume(TokenKind::Colon) {
            loop {
                base_types.push(self.parse_type());
                if !self.tokens.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::LBrace);
        let members = self.with_context(Context::TypeBody, |p| p.parse_type_members(is_enum));
        self.expect(TokenKind::RBrace);

        self.ast.alloc_stmt(
            Stmt::TypeDecl {
                modifiers,
                name,
                name_range,
                kind,
                type_params,
                base_types,
                members,
            },
            self.span_from(start),
        )
    }

    fn parse_type_members(&mut self, is_enum: bool) -> Vec<StmtId> {
        let mut members = Vec::new();
        while !self.tokens.check(TokenKind::RBrace) && !self.tokens.at_end() {
            let before = self.tokens.position();
            if is_enum && self.at_enum_case() {
                members.push(self.parse_enum_case());
            } else {
                members.push(self.parse_declaration());
            }
            if self.tokens.position() == before {
                self.tokens.advance();
            }
        }
        members
    }

    /// Inside an enum body, `NAME` followed by `,`, `}`, or `(` is a case
    /// rather than a member declaration.
    fn at_enum_case(&self) -> bool {
        self.kind() == TokenKind::Ident
            && matches!(
                self.peek_kind(1),
                TokenKind::Comma | TokenKind::RBrace | TokenKind::LParen
            )
    }

    /// `NAME` or `NAME(paramList)`, followed by an optional `,`.
    fn parse_enum_case(&mut self) -> StmtId {
        let start = self.current_range();
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let mut payload = Vec::new();
        if self.tokens.check(TokenKind::LParen) {
            payload = self.parse_parameter_list();
        }
        self.tokens.consume(TokenKind::Comma);

        self.ast.alloc_stmt(
            Stmt::EnumCaseDecl {
                modifiers: ModifierFlags::empty(),
                name,
                name_range,
                payload,
            },
            self.span_from(start),
        )
    }

    // ── Functions and constructors ─────────────────────────────────────

    /// `fn NAME <typarams>? ( params ) (: returnType)? body-or-semicolon`
    fn parse_function_decl(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        self.tokens.advance(); // fn

        if !self.at_ident_like() {
            let stmt = self.missing_stmt(
                format!("expected function name, found '{}'", self.kind()),
                Vec::new(),
            );
            self.synchronize();
            return stmt;
        }
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let type_params = if self.tokens.check(TokenKind::Lt) {
            self.parse_type_param_list()
        } else {
            Vec::new()
        };

        let params = self.parse_parameter_list();

        let return_ty = if self.tokens.consume(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };

        // A missing body means the function is abstract.
        let body = if self.tokens.check(TokenKind::LBrace) {
            Some(self.with_context(Context::Function, |p| p.parse_block()))
        } else {
            if !self.tokens.consume(TokenKind::Semicolon) {
                self.error("expected function body or ';'");
            }
            None
        };

        self.ast.alloc_stmt(
            Stmt::FunctionDecl {
                modifiers,
                name,
                name_range,
                type_params,
                params,
                return_ty,
                body,
            },
            self.span_from(start),
        )
    }

    /// `new ( params ) block` -- only legal inside a type body.
    fn parse_constructor_decl(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        if !self.at_type_member_level() {
            self.error("constructor declaration outside of type");
        }
        self.tokens.advance(); // new
        let params = self.parse_parameter_list();
        let body = self.with_context(Context::Function, |p| p.parse_block());
        self.ast.alloc_stmt(
            Stmt::ConstructorDecl { modifiers, params, body },
            self.span_from(start),
        )
    }

    // ── Variables, fields, and properties ──────────────────────────────

    /// `var NAME (: type)? (= init)?`
    fn parse_var_decl(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        self.tokens.advance(); // var

        if !self.at_ident_like() {
            let stmt = self.missing_stmt(
                format!("expected variable name, found '{}'", self.kind()),
                Vec::new(),
            );
            self.synchronize();
            return stmt;
        }
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let ty = if self.tokens.consume(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let initializer = if self.tokens.consume(TokenKind::Eq) {
            Some(self.parse_expression(0))
        } else {
            None
        };
        self.expect_statement_end();

        self.ast.alloc_stmt(
            Stmt::VarDecl {
                modifiers,
                variable: TypedName { name, name_range, ty },
                initializer,
            },
            self.span_from(start),
        )
    }

    /// `TYPE NAME ...` inside a type body: a field (`;` or `= init;`) or,
    /// when a brace follows the name, a property with accessors.
    fn parse_typed_member_decl(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        let ty = self.parse_type();

        if !self.at_ident_like() {
            let stmt = self.missing_stmt(
                format!("expected member name, found '{}'", self.kind()),
                Vec::new(),
            );
            self.synchronize();
            return stmt;
        }
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let variable = TypedName { name, name_range, ty: Some(ty) };

        if self.tokens.check(TokenKind::LBrace) {
            let (getter, setter) = self.parse_property_accessors();
            return self.ast.alloc_stmt(
                Stmt::PropertyDecl { modifiers, variable, getter, setter },
                self.span_from(start),
            );
        }

        let initializer = if self.tokens.consume(TokenKind::Eq) {
            Some(self.parse_expression(0))
        } else {
            None
        };
        self.expect_statement_end();

        self.ast.alloc_stmt(
            Stmt::VarDecl { modifiers, variable, initializer },
            self.span_from(start),
        )
    }

    /// `{ get ...; set ...; }` -- each accessor auto (`;`),
    /// expression-bodied (`=> expr;`), or block-bodied.
    fn parse_property_accessors(
        &mut self,
    ) -> (Option<PropertyAccessor>, Option<PropertyAccessor>) {
        self.tokens.advance(); // {
        let mut getter = None;
        let mut setter = None;

        while !self.tokens.check(TokenKind::RBrace) && !self.tokens.at_end() {
            let accessor_start = self.current_range();
            let accessor_modifiers = self.parse_modifiers();

            let kind = match self.kind() {
                TokenKind::Get => AccessorKind::Get,
                TokenKind::Set => AccessorKind::Set,
                other => {
                    self.error(format!("expected 'get' or 'set', found '{other}'"));
                    self.tokens.advance();
                    continue;
                }
            };
            self.tokens.advance(); // get / set

            let body = if self.tokens.consume(TokenKind::Semicolon) {
                AccessorBody::Auto
            } else if self.tokens.consume(TokenKind::FatArrow) {
                let expr = self.parse_expression(0);
                self.expect(TokenKind::Semicolon);
                AccessorBody::Expression(expr)
            } else if self.tokens.check(TokenKind::LBrace) {
                let context = match kind {
                    AccessorKind::Get => Context::PropertyGetter,
                    AccessorKind::Set => Context::PropertySetter,
                };
                AccessorBody::Block(self.with_context(context, |p| p.parse_block()))
            } else {
                self.error("expected accessor body");
                AccessorBody::Auto
            };

            let accessor = PropertyAccessor {
                kind,
                modifiers: accessor_modifiers,
                body,
                range: self.span_from(accessor_start),
            };
            let slot = match kind {
                AccessorKind::Get => &mut getter,
                AccessorKind::Set => &mut setter,
            };
            if slot.is_some() {
                let which = if kind == AccessorKind::Get { "get" } else { "set" };
                self.error_at(format!("duplicate '{which}' accessor"), accessor.range);
            } else {
                *slot = Some(accessor);
            }
        }
        self.expect(TokenKind::RBrace);
        (getter, setter)
    }

    // ── Namespaces and using directives ────────────────────────────────

    /// `namespace a.b.c;` (file-scoped) or `namespace a.b.c { ... }`.
    fn parse_namespace_decl(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        if !modifiers.is_empty() {
            self.warning("modifiers have no effect on a namespace declaration");
        }
        self.tokens.advance(); // namespace

        let path = self.parse_dotted_path();
        if path.is_empty() {
            let stmt = self.missing_stmt("expected namespace name", Vec::new());
            self.synchronize();
            return stmt;
        }

        let (file_scoped, body) = if self.tokens.consume(TokenKind::Semicolon) {
            (true, None)
        } else {
            self.expect(TokenKind::LBrace);
            let mut statements = Vec::new();
            self.with_context(Context::Namespace, |p| {
                while !p.tokens.check(TokenKind::RBrace) && !p.tokens.at_end() {
                    let before = p.tokens.position();
                    statements.push(p.parse_top_level_statement());
                    if p.tokens.position() == before {
                        p.tokens.advance();
                    }
                }
            });
            self.expect(TokenKind::RBrace);
            (false, Some(statements))
        };

        self.ast.alloc_stmt(
            Stmt::NamespaceDecl { path, file_scoped, body },
            self.span_from(start),
        )
    }

    /// `using a.b.c;` or `using N = TYPE;`
    fn parse_using_directive(&mut self, modifiers: ModifierFlags, start: SourceRange) -> StmtId {
        if !modifiers.is_empty() {
            self.warning("modifiers have no effect on a using directive");
        }
        self.tokens.advance(); // using

        let path = self.parse_dotted_path();
        if path.is_empty() {
            let stmt = self.missing_stmt("expected name after 'using'", Vec::new());
            self.synchronize();
            return stmt;
        }

        let stmt = if self.tokens.consume(TokenKind::Eq) {
            if path.len() > 1 {
                self.error_at("a using alias must be a single identifier", start);
            }
            let alias = path.last().cloned();
            let aliased_type = Some(self.parse_type());
            Stmt::Using { kind: UsingKind::Alias, path, alias, aliased_type }
        } else {
            Stmt::Using { kind: UsingKind::Namespace, path, alias: None, aliased_type: None }
        };
        self.expect_statement_end();
        self.ast.alloc_stmt(stmt, self.span_from(start))
    }

    fn parse_dotted_path(&mut self) -> Vec<String> {
        let mut path = Vec::new();
        if self.kind() != TokenKind::Ident {
            return path;
        }
        path.push(self.current_text().to_string());
        self.tokens.advance();
        while self.tokens.check(TokenKind::Dot) && self.peek_kind(1) == TokenKind::Ident {
            self.tokens.advance(); // .
            path.push(self.current_text().to_string());
            self.tokens.advance();
        }
        path
    }

    // ── Parameters and type parameters ─────────────────────────────────

    /// `( modifiers? NAME (: TYPE)? (= default)? , ... )`
    pub(crate) fn parse_parameter_list(&mut self) -> Vec<StmtId> {
        let mut params = Vec::new();
        if !self.expect(TokenKind::LParen) {
            return params;
        }
        if !self.tokens.check(TokenKind::RParen) {
            loop {
                if let Some(param) = self.parse_parameter() {
                    params.push(param);
                } else {
                    self.tokens.skip_to_any(&[TokenKind::Comma, TokenKind::RParen]);
                }
                if !self.tokens.consume(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen);
        params
    }

    fn parse_parameter(&mut self) -> Option<StmtId> {
        let start = self.current_range();
        let modifiers = self.parse_modifiers();

        if !self.at_ident_like() {
            self.error(format!("expected parameter name, found '{}'", self.kind()));
            return None;
        }
        let name_range = self.current_range();
        let name = self.current_text().to_string();
        self.tokens.advance();

        let ty = if self.tokens.consume(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let default = if self.tokens.consume(TokenKind::Eq) {
            Some(self.parse_expression(0))
        } else {
            None
        };

        Some(self.ast.alloc_stmt(
            Stmt::ParamDecl {
                modifiers,
                param: TypedName { name, name_range, ty },
                default,
            },
            self.span_from(start),
        ))
    }

    /// `<T, U, ...>` -- plain identifiers; constraints are reserved.
    pub(crate) fn parse_type_param_list(&mut self) -> Vec<StmtId> {
        let mut params = Vec::new();
        self.tokens.advance(); // <
        loop {
            if self.kind() != TokenKind::Ident {
                self.error(format!("expected type parameter name, found '{}'", self.kind()));
                break;
            }
            let range = self.current_range();
            let name = self.current_text().to_string();
            self.tokens.advance();
            params.push(self.ast.alloc_stmt(Stmt::TypeParamDecl { name }, range));
            if !self.tokens.consume(TokenKind::Comma) {
                break;
            }
        }
        if self.tokens.check(TokenKind::Shr) {
            self.tokens.split_right_shift();
        }
        self.expect(TokenKind::Gt);
        params
    }
}
