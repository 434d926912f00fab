//! The Quill syntax tree: a closed sum over expressions and statements,
//! with declarations as a refinement of statements.
//!
//! Nodes live in an [`crate::arena::Ast`] arena and reference each other
//! through [`ExprId`]/[`StmtId`] handles. Identifier text is owned by the
//! nodes, so the tree has no lifetime tie to the source buffer. Type
//! syntax (`*T`, `T[]`, `fn(T) -> T`, generic names) lives in the
//! expression hierarchy and is interpreted by the semantic phase.

use quill_common::modifiers::ModifierFlags;
use quill_common::span::SourceRange;
use quill_common::token::TokenKind;

use crate::arena::{ExprId, StmtId};

/// Which literal a `Literal` expression carries. The raw text is retained
/// for round-trip printing; numeric decoding happens in the semantic phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    String,
    Char,
    Bool,
    Null,
}

impl LiteralKind {
    pub fn from_token(kind: TokenKind) -> Option<LiteralKind> {
        let lit = match kind {
            TokenKind::IntLiteral => LiteralKind::Int,
            TokenKind::LongLiteral => LiteralKind::Long,
            TokenKind::FloatLiteral => LiteralKind::Float,
            TokenKind::DoubleLiteral => LiteralKind::Double,
            TokenKind::StringLiteral => LiteralKind::String,
            TokenKind::CharLiteral => LiteralKind::Char,
            TokenKind::BoolLiteral => LiteralKind::Bool,
            TokenKind::Null => LiteralKind::Null,
            _ => return None,
        };
        Some(lit)
    }
}

/// Unary operators. Pre/post increment and decrement share a variant;
/// the `postfix` flag on the `Unary` node distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitwiseNot,
    Increment,
    Decrement,
    AddressOf,
    Dereference,
}

impl UnaryOp {
    /// The operator for a token in prefix position.
    pub fn from_prefix_token(kind: TokenKind) -> Option<UnaryOp> {
        let op = match kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitwiseNot,
            TokenKind::PlusPlus => UnaryOp::Increment,
            TokenKind::MinusMinus => UnaryOp::Decrement,
            TokenKind::Amp => UnaryOp::AddressOf,
            TokenKind::Star => UnaryOp::Dereference,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitwiseNot => "~",
            UnaryOp::Increment => "++",
            UnaryOp::Decrement => "--",
            UnaryOp::AddressOf => "&",
            UnaryOp::Dereference => "*",
        }
    }
}

/// Binary (infix) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    Coalesce,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<BinaryOp> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Subtract,
            TokenKind::Star => BinaryOp::Multiply,
            TokenKind::Slash => BinaryOp::Divide,
            TokenKind::Percent => BinaryOp::Modulo,
            TokenKind::EqEq => BinaryOp::Equals,
            TokenKind::NotEq => BinaryOp::NotEquals,
            TokenKind::Lt => BinaryOp::Less,
            TokenKind::LtEq => BinaryOp::LessEqual,
            TokenKind::Gt => BinaryOp::Greater,
            TokenKind::GtEq => BinaryOp::GreaterEqual,
            TokenKind::AmpAmp => BinaryOp::LogicalAnd,
            TokenKind::PipePipe => BinaryOp::LogicalOr,
            TokenKind::Amp => BinaryOp::BitwiseAnd,
            TokenKind::Pipe => BinaryOp::BitwiseOr,
            TokenKind::Caret => BinaryOp::BitwiseXor,
            TokenKind::Shl => BinaryOp::LeftShift,
            TokenKind::Shr => BinaryOp::RightShift,
            TokenKind::Coalesce => BinaryOp::Coalesce,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::Coalesce => "??",
        }
    }
}

/// Assignment operators, including the compound forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    And,
    Or,
    Xor,
    LeftShift,
    RightShift,
    Coalesce,
}

impl AssignOp {
    pub fn from_token(kind: TokenKind) -> Option<AssignOp> {
        let op = match kind {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Subtract,
            TokenKind::StarEq => AssignOp::Multiply,
            TokenKind::SlashEq => AssignOp::Divide,
            TokenKind::PercentEq => AssignOp::Modulo,
            TokenKind::AmpEq => AssignOp::And,
            TokenKind::PipeEq => AssignOp::Or,
            TokenKind::CaretEq => AssignOp::Xor,
            TokenKind::ShlEq => AssignOp::LeftShift,
            TokenKind::ShrEq => AssignOp::RightShift,
            TokenKind::CoalesceEq => AssignOp::Coalesce,
            _ => return None,
        };
        Some(op)
    }

    /// The underlying binary operator of a compound assignment, `None`
    /// for plain `=`.
    pub fn binary_op(self) -> Option<BinaryOp> {
        let op = match self {
            AssignOp::Assign => return None,
            AssignOp::Add => BinaryOp::Add,
            AssignOp::Subtract => BinaryOp::Subtract,
            AssignOp::Multiply => BinaryOp::Multiply,
            AssignOp::Divide => BinaryOp::Divide,
            AssignOp::Modulo => BinaryOp::Modulo,
            AssignOp::And => BinaryOp::BitwiseAnd,
            AssignOp::Or => BinaryOp::BitwiseOr,
            AssignOp::Xor => BinaryOp::BitwiseXor,
            AssignOp::LeftShift => BinaryOp::LeftShift,
            AssignOp::RightShift => BinaryOp::RightShift,
            AssignOp::Coalesce => BinaryOp::Coalesce,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
            AssignOp::Modulo => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::LeftShift => "<<=",
            AssignOp::RightShift => ">>=",
            AssignOp::Coalesce => "??=",
        }
    }
}

/// A name with an optional declared type: the shared building block of
/// variable, parameter, and property declarations. A `None` type means
/// the type is inferred.
#[derive(Debug, Clone)]
pub struct TypedName {
    pub name: String,
    pub name_range: SourceRange,
    pub ty: Option<ExprId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// Body of a property accessor: auto-implemented (`get;`),
/// expression-bodied (`get => expr;`), or a full block.
#[derive(Debug, Clone)]
pub enum AccessorBody {
    Auto,
    Expression(ExprId),
    Block(StmtId),
}

#[derive(Debug, Clone)]
pub struct PropertyAccessor {
    pub kind: AccessorKind,
    pub modifiers: ModifierFlags,
    pub body: AccessorBody,
    pub range: SourceRange,
}

/// What kind of type a `TypeDecl` introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    /// `type T { .. }` -- a value type.
    Value,
    /// `ref type T { .. }` -- a reference type.
    Ref,
    /// `static type T { .. }` -- a namespace-like static holder.
    Static,
    /// `enum T { .. }`.
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsingKind {
    /// `using Some.Namespace;`
    Namespace,
    /// `using Alias = Some.Type;`
    Alias,
}

/// A lambda body is either a bare expression or a block.
#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expression(ExprId),
    Block(StmtId),
}

/// Expression nodes, including type syntax.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal with its raw source text.
    Literal { kind: LiteralKind, text: String },
    /// `[a, b, c]`
    ArrayLiteral { elements: Vec<ExprId> },
    /// A simple identifier in expression or type position.
    Name { ident: String },
    /// `Left.Right` in type/namespace position.
    QualifiedName { left: ExprId, right: String },
    /// `Base<Args, ...>` -- a generic name in expression or type position.
    GenericName { base: ExprId, type_args: Vec<ExprId> },
    /// `this`
    This,
    /// `(inner)`
    Paren { inner: ExprId },
    /// Prefix or postfix unary operation.
    Unary { op: UnaryOp, operand: ExprId, postfix: bool },
    Binary { left: ExprId, op: BinaryOp, right: ExprId },
    Assign { target: ExprId, op: AssignOp, value: ExprId },
    /// `cond ? then : else`
    Conditional { condition: ExprId, then_value: ExprId, else_value: ExprId },
    /// `object.member` in value position.
    MemberAccess { object: ExprId, member: String, member_range: SourceRange },
    /// `object[index]`
    Index { object: ExprId, index: ExprId },
    Call { callee: ExprId, args: Vec<ExprId> },
    /// `new Type(args)`
    New { ty: ExprId, args: Vec<ExprId> },
    /// `(Type) value`
    Cast { target_ty: ExprId, value: ExprId },
    Lambda { params: Vec<StmtId>, body: LambdaBody },
    /// `typeof(T)`
    TypeOf { ty: ExprId },
    /// `sizeof(T)`
    SizeOf { ty: ExprId },
    /// `start..end` / `start..=end`
    Range { start: ExprId, end: ExprId, inclusive: bool },
    /// Leading-dot enum member shorthand: `.Red`.
    ImplicitMember { member: String },
    /// `T[]` or `T[n]` in type position.
    ArrayType { element: ExprId, size: Option<ExprId> },
    /// `*T` in type position.
    PointerType { pointee: ExprId },
    /// `fn(T, U) -> R` in type position; `None` return means void.
    FunctionType { params: Vec<ExprId>, ret: Option<ExprId> },
    /// Error-recovery placeholder; always paired with a diagnostic.
    Missing { message: String },
}

/// Statement nodes. Declarations are statements; `is_declaration`
/// distinguishes them where it matters.
#[derive(Debug, Clone)]
pub enum Stmt {
    Block { statements: Vec<StmtId> },
    If { condition: ExprId, then_branch: StmtId, else_branch: Option<StmtId> },
    While { condition: ExprId, body: StmtId },
    For {
        init: Option<StmtId>,
        condition: Option<ExprId>,
        updates: Vec<ExprId>,
        body: StmtId,
    },
    Return { value: Option<ExprId> },
    Break,
    Continue,
    Expr { expr: ExprId },
    Using {
        kind: UsingKind,
        path: Vec<String>,
        alias: Option<String>,
        aliased_type: Option<ExprId>,
    },
    /// Error-recovery placeholder preserving any salvaged sub-trees.
    Missing { message: String, partial: Vec<StmtId> },

    // ── Declarations ───────────────────────────────────────────────────
    VarDecl {
        modifiers: ModifierFlags,
        variable: TypedName,
        initializer: Option<ExprId>,
    },
    PropertyDecl {
        modifiers: ModifierFlags,
        variable: TypedName,
        getter: Option<PropertyAccessor>,
        setter: Option<PropertyAccessor>,
    },
    ParamDecl {
        modifiers: ModifierFlags,
        param: TypedName,
        default: Option<ExprId>,
    },
    FunctionDecl {
        modifiers: ModifierFlags,
        name: String,
        name_range: SourceRange,
        type_params: Vec<StmtId>,
        params: Vec<StmtId>,
        return_ty: Option<ExprId>,
        /// `None` means no body (abstract).
        body: Option<StmtId>,
    },
    ConstructorDecl {
        modifiers: ModifierFlags,
        params: Vec<StmtId>,
        body: StmtId,
    },
    EnumCaseDecl {
        modifiers: ModifierFlags,
        name: String,
        name_range: SourceRange,
        payload: Vec<StmtId>,
    },
    TypeDecl {
        modifiers: ModifierFlags,
        name: String,
        name_range: SourceRange,
        kind: TypeDeclKind,
        type_params: Vec<StmtId>,
        base_types: Vec<ExprId>,
        members: Vec<StmtId>,
    },
    TypeParamDecl { name: String },
    NamespaceDecl {
        path: Vec<String>,
        file_scoped: bool,
        body: Option<Vec<StmtId>>,
    },
}

impl Stmt {
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Stmt::VarDecl { .. }
                | Stmt::PropertyDecl { .. }
                | Stmt::ParamDecl { .. }
                | Stmt::FunctionDecl { .. }
                | Stmt::ConstructorDecl { .. }
                | Stmt::EnumCaseDecl { .. }
                | Stmt::TypeDecl { .. }
                | Stmt::TypeParamDecl { .. }
                | Stmt::NamespaceDecl { .. }
                | Stmt::Using { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_kind_from_token() {
        assert_eq!(LiteralKind::from_token(TokenKind::IntLiteral), Some(LiteralKind::Int));
        assert_eq!(LiteralKind::from_token(TokenKind::Null), Some(LiteralKind::Null));
        assert_eq!(LiteralKind::from_token(TokenKind::Ident), None);
    }

    #[test]
    fn unary_op_prefix_tokens() {
        assert_eq!(UnaryOp::from_prefix_token(TokenKind::Minus), Some(UnaryOp::Minus));
        assert_eq!(UnaryOp::from_prefix_token(TokenKind::Amp), Some(UnaryOp::AddressOf));
        assert_eq!(UnaryOp::from_prefix_token(TokenKind::Star), Some(UnaryOp::Dereference));
        assert_eq!(UnaryOp::from_prefix_token(TokenKind::EqEq), None);
    }

    #[test]
    fn compound_assign_desugars_to_binary() {
        assert_eq!(AssignOp::Add.binary_op(), Some(BinaryOp::Add));
        assert_eq!(AssignOp::Coalesce.binary_op(), Some(BinaryOp::Coalesce));
        assert_eq!(AssignOp::Assign.binary_op(), None);
    }

    #[test]
    fn operator_symbols_round_trip_tokens() {
        for (token, symbol) in [
            (TokenKind::Shl, "<<"),
            (TokenKind::Coalesce, "??"),
            (TokenKind::EqEq, "=="),
        ] {
            let op = BinaryOp::from_token(token).unwrap();
            assert_eq!(op.symbol(), symbol);
        }
    }
}
