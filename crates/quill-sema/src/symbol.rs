//! Symbol representation.
//!
//! Symbols live in an arena owned by the [`crate::table::SymbolTable`] and
//! reference each other exclusively through [`SymbolId`] handles: parent
//! links, member lists, parameter lists, base classes, and vtable slots
//! are all ids, which keeps the inherently cyclic symbol graph simple to
//! own and mutate.

use rustc_hash::FxHashMap;

use quill_common::modifiers::ModifierFlags;
use quill_common::span::SourceRange;
use quill_parser::ast::TypeDeclKind;

use crate::ty::TypeId;

/// Handle to a symbol in the table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessibility {
    Private,
    Protected,
    Public,
}

impl Accessibility {
    pub fn name(self) -> &'static str {
        match self {
            Accessibility::Private => "private",
            Accessibility::Protected => "protected",
            Accessibility::Public => "public",
        }
    }

    /// Derive accessibility from declaration modifiers. Unannotated
    /// declarations are public; `private`/`protected` restrict.
    pub fn from_modifiers(flags: ModifierFlags) -> Accessibility {
        if flags.contains(ModifierFlags::PRIVATE) {
            Accessibility::Private
        } else if flags.contains(ModifierFlags::PROTECTED) {
            Accessibility::Protected
        } else {
            Accessibility::Public
        }
    }
}

/// Coarse symbol classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Namespace,
    Type,
    Function,
    Variable,
    Property,
    EnumCase,
    Block,
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceData {
    /// `using` namespace paths recorded by the builder; resolved to
    /// symbol ids after the merge.
    pub using_paths: Vec<Vec<String>>,
    pub using_namespaces: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct TypeData {
    /// The canonical type this symbol defines; filled by the resolver.
    pub ty: Option<TypeId>,
    pub decl_kind: TypeDeclKind,
    pub base_class: Option<SymbolId>,
    pub interfaces: Vec<SymbolId>,
    pub type_params: Vec<SymbolId>,
    pub vtable: Vec<SymbolId>,
    pub size: u32,
    pub alignment: u32,
}

impl TypeData {
    pub fn new(decl_kind: TypeDeclKind) -> Self {
        Self {
            ty: None,
            decl_kind,
            base_class: None,
            interfaces: Vec::new(),
            type_params: Vec::new(),
            vtable: Vec::new(),
            size: 0,
            alignment: 1,
        }
    }

    pub fn is_reference_type(&self) -> bool {
        self.decl_kind == TypeDeclKind::Ref
    }

    pub fn is_value_type(&self) -> bool {
        matches!(self.decl_kind, TypeDeclKind::Value | TypeDeclKind::Enum)
    }
}

#[derive(Debug, Clone)]
pub struct FunctionData {
    pub return_type: Option<TypeId>,
    /// Ids of the child parameter symbols, in declaration order.
    pub parameters: Vec<SymbolId>,
    pub type_params: Vec<SymbolId>,
    pub vtable_index: Option<u32>,
    pub is_constructor: bool,
    pub is_operator: bool,
}

impl FunctionData {
    pub fn new() -> Self {
        Self {
            return_type: None,
            parameters: Vec::new(),
            type_params: Vec::new(),
            vtable_index: None,
            is_constructor: false,
            is_operator: false,
        }
    }
}

impl Default for FunctionData {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct FieldData {
    pub ty: Option<TypeId>,
    pub offset: u32,
    pub alignment: u32,
}

#[derive(Debug, Clone)]
pub struct ParameterData {
    pub ty: Option<TypeId>,
    pub index: u32,
    pub has_default: bool,
    pub is_ref: bool,
    pub is_out: bool,
    /// Rendered declared type, used to compare signatures before types
    /// are resolved (per-file tables merge ahead of resolution).
    pub declared_type_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LocalData {
    pub ty: Option<TypeId>,
    pub is_captured: bool,
}

#[derive(Debug, Clone)]
pub struct PropertyData {
    pub ty: Option<TypeId>,
    pub has_getter: bool,
    pub has_setter: bool,
}

#[derive(Debug, Clone)]
pub struct EnumCaseData {
    pub associated_types: Vec<TypeId>,
    /// Discriminant value.
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct TypeParameterData {
    pub ty: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct AliasData {
    /// Target of a `using N = TYPE;` alias; resolved after the merge.
    pub ty: Option<TypeId>,
}

/// Variant payload of a symbol.
#[derive(Debug, Clone)]
pub enum SymbolData {
    Namespace(NamespaceData),
    Type(TypeData),
    Function(FunctionData),
    Field(FieldData),
    Parameter(ParameterData),
    Local(LocalData),
    Property(PropertyData),
    EnumCase(EnumCaseData),
    TypeParameter(TypeParameterData),
    Alias(AliasData),
    /// Anonymous scope introduced for blocks and control-flow bodies.
    Block,
}

impl SymbolData {
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolData::Namespace(_) => SymbolKind::Namespace,
            SymbolData::Type(_) | SymbolData::TypeParameter(_) | SymbolData::Alias(_) => {
                SymbolKind::Type
            }
            SymbolData::Function(_) => SymbolKind::Function,
            SymbolData::Field(_) | SymbolData::Parameter(_) | SymbolData::Local(_) => {
                SymbolKind::Variable
            }
            SymbolData::Property(_) => SymbolKind::Property,
            SymbolData::EnumCase(_) => SymbolKind::EnumCase,
            SymbolData::Block => SymbolKind::Block,
        }
    }
}

/// One symbol: name, location, access, parent link, modifier flags, the
/// variant payload, and (for containers) the member multimap plus an
/// ordered member list for deterministic iteration.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub range: SourceRange,
    pub access: Accessibility,
    pub modifiers: ModifierFlags,
    pub parent: Option<SymbolId>,
    pub data: SymbolData,
    pub members: Vec<SymbolId>,
    pub by_name: FxHashMap<String, Vec<SymbolId>>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, range: SourceRange, data: SymbolData) -> Self {
        Self {
            name: name.into(),
            range,
            access: Accessibility::Public,
            modifiers: ModifierFlags::empty(),
            parent: None,
            data,
            members: Vec::new(),
            by_name: FxHashMap::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.access = Accessibility::from_modifiers(modifiers);
        self.modifiers = modifiers;
        self
    }

    pub fn kind(&self) -> SymbolKind {
        self.data.kind()
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self.kind(),
            SymbolKind::Namespace
                | SymbolKind::Type
                | SymbolKind::Function
                | SymbolKind::Property
                | SymbolKind::Block
        )
    }

    pub fn as_namespace(&self) -> Option<&NamespaceData> {
        match &self.data {
            SymbolData::Namespace(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeData> {
        match &self.data {
            SymbolData::Type(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionData> {
        match &self.data {
            SymbolData::Function(d) => Some(d),
            _ => None,
        }
    }

    /// The declared or inferred type carried by this symbol, if any.
    pub fn value_type(&self) -> Option<TypeId> {
        match &self.data {
            SymbolData::Field(d) => d.ty,
            SymbolData::Parameter(d) => d.ty,
            SymbolData::Local(d) => d.ty,
            SymbolData::Property(d) => d.ty,
            SymbolData::Type(d) => d.ty,
            SymbolData::TypeParameter(d) => d.ty,
            SymbolData::Alias(d) => d.ty,
            _ => None,
        }
    }

    pub fn set_value_type(&mut self, ty: TypeId) {
        match &mut self.data {
            SymbolData::Field(d) => d.ty = Some(ty),
            SymbolData::Parameter(d) => d.ty = Some(ty),
            SymbolData::Local(d) => d.ty = Some(ty),
            SymbolData::Property(d) => d.ty = Some(ty),
            SymbolData::Type(d) => d.ty = Some(ty),
            SymbolData::TypeParameter(d) => d.ty = Some(ty),
            SymbolData::Alias(d) => d.ty = Some(ty),
            _ => {}
        }
    }

    /// Whether reading this symbol yields an assignable location.
    pub fn is_lvalue_symbol(&self) -> bool {
        matches!(
            self.data,
            SymbolData::Field(_) | SymbolData::Parameter(_) | SymbolData::Local(_)
        )
    }
}
