//! Source reproduction from the syntax tree.
//!
//! Emits canonical Quill source -- modifier ordering, property accessor
//! syntax, statement terminators -- that parses back to a structurally
//! identical tree (see [`crate::compare`]). When constructed with the
//! original token stream, comment trivia is re-emitted ahead of each
//! statement, keeping documentation with the code it describes.

use rustc_hash::FxHashMap;

use quill_common::token::TriviaKind;
use quill_lexer::TokenStream;

use crate::arena::{Ast, CompilationUnit, ExprId, StmtId};
use crate::ast::{
    AccessorBody, AccessorKind, Expr, LambdaBody, PropertyAccessor, Stmt, TypeDeclKind, TypedName,
    UsingKind,
};

pub struct CodePrinter<'a> {
    ast: &'a Ast,
    out: String,
    indent: usize,
    /// Token index by start offset, for comment recovery.
    comments: Option<CommentSource<'a>>,
}

struct CommentSource<'a> {
    tokens: &'a TokenStream,
    source: &'a str,
    by_offset: FxHashMap<u32, usize>,
}

impl<'a> CodePrinter<'a> {
    pub fn new(ast: &'a Ast) -> Self {
        Self { ast, out: String::new(), indent: 0, comments: None }
    }

    /// Re-emit comment trivia from the original tokens ahead of each
    /// statement.
    pub fn with_trivia(mut self, tokens: &'a TokenStream, source: &'a str) -> Self {
        let mut by_offset = FxHashMap::default();
        for (i, tok) in tokens.tokens().iter().enumerate() {
            by_offset.insert(tok.range.start.offset, i);
        }
        self.comments = Some(CommentSource { tokens, source, by_offset });
        self
    }

    pub fn print_unit(mut self, unit: &CompilationUnit) -> String {
        for &stmt in &unit.statements {
            self.print_stmt(stmt);
        }
        self.out
    }

    // ── Output helpers ─────────────────────────────────────────────────

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn end_line(&mut self) {
        self.out.push('\n');
    }

    /// Emit any comment trivia attached to the token at `offset`.
    fn emit_leading_comments(&mut self, offset: u32) {
        let Some(comments) = &self.comments else { return };
        let Some(&idx) = comments.by_offset.get(&offset) else { return };
        let token = &comments.tokens.tokens()[idx];
        let mut cursor = token.range.start.offset - token.leading_width();
        let mut lines = Vec::new();
        for trivia in &token.leading {
            let text = &comments.source[cursor as usize..(cursor + trivia.width) as usize];
            cursor += trivia.width;
            if matches!(
                trivia.kind,
                TriviaKind::LineComment | TriviaKind::BlockComment | TriviaKind::DocComment
            ) {
                lines.push(text.to_string());
            }
        }
        for line in lines {
            self.start_line();
            self.push(&line);
            self.end_line();
        }
    }

    fn modifiers(&mut self, flags: quill_common::modifiers::ModifierFlags) {
        for name in flags.canonical_names() {
            self.push(name);
            self.push(" ");
        }
    }

    fn typed_name_var(&mut self, variable: &TypedName) {
        self.push("var ");
        self.push(&variable.name);
        if let Some(ty) = variable.ty {
            self.push(": ");
            self.print_expr(ty);
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn print_stmt(&mut self, id: StmtId) {
        self.emit_leading_comments(self.ast.stmt_range(id).start.offset);
        match self.ast.stmt(id).clone() {
            Stmt::Block { statements } => {
                self.start_line();
                self.push("{");
                self.end_line();
                self.indent += 1;
                for s in statements {
                    self.print_stmt(s);
                }
                self.indent -= 1;
                self.start_line();
                self.push("}");
                self.end_line();
            }
            Stmt::If { condition, then_branch, else_branch } => {
                self.start_line();
                self.push("if (");
                self.print_expr(condition);
                self.push(")");
                self.end_line();
                self.print_stmt(then_branch);
                if let Some(e) = else_branch {
                    self.start_line();
                    self.push("else");
                    self.end_line();
                    self.print_stmt(e);
                }
            }
            Stmt::While { condition, body } => {
                self.start_line();
                self.push("while (");
                self.print_expr(condition);
                self.push(")");
                self.end_line();
                self.print_stmt(body);
            }
            Stmt::For { init, condition, updates, body } => {
                self.start_line();
                self.push("for (");
                match init {
                    Some(i) => self.print_for_init(i),
                    None => self.push(";"),
                }
                self.push(" ");
                if let Some(c) = condition {
                    self.print_expr(c);
                }
                self.push(";");
                for (i, u) in updates.iter().enumerate() {
                    self.push(if i == 0 { " " } else { ", " });
                    self.print_expr(*u);
                }
                self.push(")");
                self.end_line();
                self.print_stmt(body);
            }
            Stmt::Return { value } => {
                self.start_line();
                self.push("return");
                if let Some(v) = value {
                    self.push(" ");
                    self.print_expr(v);
                }
                self.push(";");
                self.end_line();
            }
            Stmt::Break => {
                self.start_line();
                self.push("break;");
                self.end_line();
            }
            Stmt::Continue => {
                self.start_line();
                self.push("continue;");
                self.end_line();
            }
            Stmt::Expr { expr } => {
                self.start_line();
                self.print_expr(expr);
                self.push(";");
                self.end_line();
            }
            Stmt::Using { kind, path, alias, aliased_type } => {
                self.start_line();
                self.push("using ");
                match kind {
                    UsingKind::Namespace => self.push(&path.join(".")),
                    UsingKind::Alias => {
                        self.push(alias.as_deref().unwrap_or(""));
                        self.push(" = ");
                        if let Some(ty) = aliased_type {
                            self.print_expr(ty);
                        }
                    }
                }
                self.push(";");
                self.end_line();
            }
            Stmt::Missing { message, .. } => {
                self.start_line();
                self.push(&format!("/* missing: {message} */;"));
                self.end_line();
            }
            Stmt::VarDecl { modifiers, variable, initializer } => {
                self.start_line();
                self.modifiers(modifiers);
                self.typed_name_var(&variable);
                if let Some(init) = initializer {
                    self.push(" = ");
                    self.print_expr(init);
                }
                self.push(";");
                self.end_line();
            }
            Stmt::PropertyDecl { modifiers, variable, getter, setter } => {
                self.start_line();
                self.modifiers(modifiers);
                if let Some(ty) = variable.ty {
                    self.print_expr(ty);
                    self.push(" ");
                }
                self.push(&variable.name);
                self.push(" {");
                self.end_line();
                self.indent += 1;
                for accessor in [getter, setter].into_iter().flatten() {
                    self.print_accessor(&accessor);
                }
                self.indent -= 1;
                self.start_line();
                self.push("}");
                self.end_line();
            }
            Stmt::ParamDecl { .. } => {
                // Parameters are printed inline by their owners.
                self.print_param_inline(id);
            }
            Stmt::FunctionDecl { modifiers, name, type_params, params, return_ty, body, .. } => {
                self.start_line();
                self.modifiers(modifiers);
                self.push("fn ");
                self.push(&name);
                self.print_type_params(&type_params);
                self.print_param_list(&params);
                if let Some(ret) = return_ty {
                    self.push(": ");
                    self.print_expr(ret);
                }
                match body {
                    Some(b) => {
                        self.end_line();
                        self.print_stmt(b);
                    }
                    None => {
                        self.push(";");
                        self.end_line();
                    }
                }
            }
            Stmt::ConstructorDecl { modifiers, params, body } => {
                self.start_line();
                self.modifiers(modifiers);
                self.push("new");
                self.print_param_list(&params);
                self.end_line();
                self.print_stmt(body);
            }
            Stmt::EnumCaseDecl { name, payload, .. } => {
                self.start_line();
                self.push(&name);
                if !payload.is_empty() {
                    self.print_param_list(&payload);
                }
                self.push(",");
                self.end_line();
            }
            Stmt::TypeDecl { modifiers, name, kind, type_params, base_types, members, .. } => {
                self.start_line();
                let plain = modifiers
                    - (quill_common::modifiers::ModifierFlags::REF
                        | quill_common::modifiers::ModifierFlags::STATIC);
                self.modifiers(plain);
                match kind {
                    TypeDeclKind::Value => self.push("type "),
                    TypeDeclKind::Ref => self.push("ref type "),
                    TypeDeclKind::Static => self.push("static type "),
                    TypeDeclKind::Enum => self.push("enum "),
                }
                self.push(&name);
                self.print_type_params(&type_params);
                for (i, base) in base_types.iter().enumerate() {
                    self.push(if i == 0 { ": " } else { ", " });
                    self.print_expr(*base);
                }
                self.push(" {");
                self.end_line();
                self.indent += 1;
                for member in members {
                    self.print_stmt(member);
                }
                self.indent -= 1;
                self.start_line();
                self.push("}");
                self.end_line();
            }
            Stmt::TypeParamDecl { name } => self.push(&name),
            Stmt::NamespaceDecl { path, file_scoped, body } => {
                self.start_line();
                self.push("namespace ");
                self.push(&path.join("."));
                if file_scoped {
                    self.push(";");
                    self.end_line();
                } else {
                    self.push(" {");
                    self.end_line();
                    self.indent += 1;
                    for s in body.unwrap_or_default() {
                        self.print_stmt(s);
                    }
                    self.indent -= 1;
                    self.start_line();
                    self.push("}");
                    self.end_line();
                }
            }
        }
    }

    fn print_for_init(&mut self, id: StmtId) {
        // For-loop initializers print inline, terminator included.
        match self.ast.stmt(id).clone() {
            Stmt::VarDecl { modifiers, variable, initializer } => {
                self.modifiers(modifiers);
                self.typed_name_var(&variable);
                if let Some(init) = initializer {
                    self.push(" = ");
                    self.print_expr(init);
                }
                self.push(";");
            }
            Stmt::Expr { expr } => {
                self.print_expr(expr);
                self.push(";");
            }
            _ => self.push(";"),
        }
    }

    fn print_accessor(&mut self, accessor: &PropertyAccessor) {
        self.start_line();
        self.modifiers(accessor.modifiers);
        self.push(match accessor.kind {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
        });
        match &accessor.body {
            AccessorBody::Auto => {
                self.push(";");
                self.end_line();
            }
            AccessorBody::Expression(e) => {
                self.push(" => ");
                self.print_expr(*e);
                self.push(";");
                self.end_line();
            }
            AccessorBody::Block(b) => {
                self.end_line();
                self.print_stmt(*b);
            }
        }
    }

    fn print_type_params(&mut self, type_params: &[StmtId]) {
        if type_params.is_empty() {
            return;
        }
        self.push("<");
        for (i, &tp) in type_params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if let Stmt::TypeParamDecl { name } = self.ast.stmt(tp) {
                let name = name.clone();
                self.push(&name);
            }
        }
        self.push(">");
    }

    fn print_param_list(&mut self, params: &[StmtId]) {
        self.push("(");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.print_param_inline(param);
        }
        self.push(")");
    }

    fn print_param_inline(&mut self, id: StmtId) {
        if let Stmt::ParamDecl { modifiers, param, default } = self.ast.stmt(id).clone() {
            self.modifiers(modifiers);
            self.push(&param.name);
            if let Some(ty) = param.ty {
                self.push(": ");
                self.print_expr(ty);
            }
            if let Some(d) = default {
                self.push(" = ");
                self.print_expr(d);
            }
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    /// Whether printing `id` as an operand needs protective parentheses.
    /// Operands at unary-or-tighter level never do; structural comparison
    /// is transparent to `Paren`, so wrapping is always safe.
    fn needs_parens(&self, id: ExprId) -> bool {
        matches!(
            self.ast.expr(id),
            Expr::Binary { .. }
                | Expr::Assign { .. }
                | Expr::Conditional { .. }
                | Expr::Lambda { .. }
                | Expr::Range { .. }
        )
    }

    fn print_operand(&mut self, id: ExprId) {
        if self.needs_parens(id) {
            self.push("(");
            self.print_expr(id);
            self.push(")");
        } else {
            self.print_expr(id);
        }
    }

    fn print_expr(&mut self, id: ExprId) {
        match self.ast.expr(id).clone() {
            Expr::Literal { text, .. } => self.push(&text),
            Expr::ArrayLiteral { elements } => {
                self.push("[");
                for (i, e) in elements.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.print_expr(*e);
                }
                self.push("]");
            }
            Expr::Name { ident } => self.push(&ident),
            Expr::QualifiedName { left, right } => {
                self.print_expr(left);
                self.push(".");
                self.push(&right);
            }
            Expr::GenericName { base, type_args } => {
                self.print_expr(base);
                self.push("<");
                for (i, a) in type_args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.print_expr(*a);
                }
                self.push(">");
            }
            Expr::This => self.push("this"),
            Expr::Paren { inner } => {
                self.push("(");
                self.print_expr(inner);
                self.push(")");
            }
            Expr::Unary { op, operand, postfix } => {
                if postfix {
                    self.print_operand(operand);
                    self.push(op.symbol());
                } else {
                    self.push(op.symbol());
                    self.print_operand(operand);
                }
            }
            Expr::Binary { left, op, right } => {
                self.print_operand(left);
                self.push(" ");
                self.push(op.symbol());
                self.push(" ");
                self.print_operand(right);
            }
            Expr::Assign { target, op, value } => {
                self.print_operand(target);
                self.push(" ");
                self.push(op.symbol());
                self.push(" ");
                // Assignment is right-associative; a nested assignment on
                // the right reparses identically without parens.
                self.print_expr(value);
            }
            Expr::Conditional { condition, then_value, else_value } => {
                self.print_operand(condition);
                self.push(" ? ");
                self.print_operand(then_value);
                self.push(" : ");
                self.print_operand(else_value);
            }
            Expr::MemberAccess { object, member, .. } => {
                self.print_operand(object);
                self.push(".");
                self.push(&member);
            }
            Expr::Index { object, index } => {
                self.print_operand(object);
                self.push("[");
                self.print_expr(index);
                self.push("]");
            }
            Expr::Call { callee, args } => {
                self.print_operand(callee);
                self.push("(");
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.print_expr(*a);
                }
                self.push(")");
            }
            Expr::New { ty, args } => {
                self.push("new ");
                self.print_expr(ty);
                self.push("(");
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.print_expr(*a);
                }
                self.push(")");
            }
            Expr::Cast { target_ty, value } => {
                self.push("(");
                self.print_expr(target_ty);
                self.push(") ");
                self.print_expr(value);
            }
            Expr::Lambda { params, body } => {
                self.print_param_list(&params);
                self.push(" => ");
                match body {
                    LambdaBody::Expression(e) => self.print_expr(e),
                    LambdaBody::Block(b) => {
                        self.end_line();
                        self.print_stmt(b);
                        // Trim the trailing newline a block body prints so
                        // the caller can terminate the statement.
                        while self.out.ends_with('\n') {
                            self.out.pop();
                        }
                    }
                }
            }
            Expr::TypeOf { ty } => {
                self.push("typeof(");
                self.print_expr(ty);
                self.push(")");
            }
            Expr::SizeOf { ty } => {
                self.push("sizeof(");
                self.print_expr(ty);
                self.push(")");
            }
            Expr::Range { start, end, inclusive } => {
                self.print_operand(start);
                self.push(if inclusive { "..=" } else { ".." });
                self.print_operand(end);
            }
            Expr::ImplicitMember { member } => {
                self.push(".");
                self.push(&member);
            }
            Expr::ArrayType { element, size } => {
                self.print_expr(element);
                self.push("[");
                if let Some(s) = size {
                    self.print_expr(s);
                }
                self.push("]");
            }
            Expr::PointerType { pointee } => {
                self.push("*");
                self.print_expr(pointee);
            }
            Expr::FunctionType { params, ret } => {
                self.push("fn(");
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.print_expr(*p);
                }
                self.push(")");
                if let Some(r) = ret {
                    self.push(" -> ");
                    self.print_expr(r);
                }
            }
            Expr::Missing { .. } => self.push("/* missing */"),
        }
    }
}
