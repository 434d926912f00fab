//! Canonicalized type representation.
//!
//! All types are interned in the [`TypeSystem`] pool: structurally equal
//! types share one [`TypeId`], so type equality is id equality. Inference
//! variables are `Type::Unresolved(TyVar)` entries keyed into the `ena`
//! union-find table owned by the inference context.

use rustc_hash::FxHashMap;

use crate::symbol::SymbolId;

/// Handle to an interned type. Equality is canonical identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

/// An inference variable, keyed into the `ena` unification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TyVar(pub u32);

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<TypeId>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for TypeId {}

/// The built-in primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Void,
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::U8,
        PrimitiveKind::U16,
        PrimitiveKind::U32,
        PrimitiveKind::U64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn size(self) -> u32 {
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Bool | PrimitiveKind::Char | PrimitiveKind::I8 | PrimitiveKind::U8 => 1,
            PrimitiveKind::I16 | PrimitiveKind::U16 => 2,
            PrimitiveKind::I32 | PrimitiveKind::U32 | PrimitiveKind::F32 => 4,
            PrimitiveKind::I64 | PrimitiveKind::U64 | PrimitiveKind::F64 => 8,
        }
    }

    pub fn alignment(self) -> u32 {
        self.size().max(1)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8
                | PrimitiveKind::I16
                | PrimitiveKind::I32
                | PrimitiveKind::I64
                | PrimitiveKind::U8
                | PrimitiveKind::U16
                | PrimitiveKind::U32
                | PrimitiveKind::U64
                | PrimitiveKind::Char
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, PrimitiveKind::F32 | PrimitiveKind::F64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_float()
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64
        )
    }

    /// Rank within the widening ladder; wider kinds have higher rank.
    pub fn numeric_rank(self) -> Option<u32> {
        let rank = match self {
            PrimitiveKind::I8 | PrimitiveKind::U8 | PrimitiveKind::Char => 1,
            PrimitiveKind::I16 | PrimitiveKind::U16 => 2,
            PrimitiveKind::I32 | PrimitiveKind::U32 => 3,
            PrimitiveKind::I64 | PrimitiveKind::U64 => 4,
            PrimitiveKind::F32 => 5,
            PrimitiveKind::F64 => 6,
            _ => return None,
        };
        Some(rank)
    }
}

/// How values of a type are stored and passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    /// Stored directly: primitives and value types.
    Direct,
    /// Accessed through an implicit pointer: reference types and arrays.
    Indirect,
    /// An explicit pointer type.
    Explicit,
}

/// A canonicalized type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Pointer(TypeId),
    /// `fixed_size` of -1 means the length is not part of the type.
    Array { element: TypeId, fixed_size: i32 },
    Function { ret: TypeId, params: Vec<TypeId> },
    /// A declared (non-generic) named type.
    Named(SymbolId),
    /// A generic type instantiation, e.g. `Box<i32>`.
    Generic { definition: SymbolId, args: Vec<TypeId> },
    /// A type parameter such as `T`; `id` is unique per declaration.
    TypeParam { name: String, id: u32 },
    /// The built-in range type over an integral element.
    Range(TypeId),
    /// An inference variable.
    Unresolved(TyVar),
}

/// The canonical type pool.
///
/// Primitives are interned at construction; structural constructors
/// consult the lookup table and return the existing id on a hit, so
/// equality stays id-based everywhere downstream.
pub struct TypeSystem {
    types: Vec<Type>,
    lookup: FxHashMap<Type, TypeId>,
    next_param_id: u32,
}

impl TypeSystem {
    pub fn new() -> Self {
        let mut ts = Self {
            types: Vec::new(),
            lookup: FxHashMap::default(),
            next_param_id: 0,
        };
        for kind in PrimitiveKind::ALL {
            ts.intern(Type::Primitive(kind));
        }
        ts
    }

    fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.lookup.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.lookup.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ── Constructors ───────────────────────────────────────────────────

    pub fn primitive(&mut self, kind: PrimitiveKind) -> TypeId {
        self.intern(Type::Primitive(kind))
    }

    pub fn void(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::Void)
    }

    pub fn bool_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::Bool)
    }

    pub fn char_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::Char)
    }

    pub fn i32_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::I32)
    }

    pub fn i64_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::I64)
    }

    pub fn u64_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::U64)
    }

    pub fn f32_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::F32)
    }

    pub fn f64_type(&mut self) -> TypeId {
        self.primitive(PrimitiveKind::F64)
    }

    /// `string` is an alias for `*char`.
    pub fn string_type(&mut self) -> TypeId {
        let c = self.char_type();
        self.pointer(c)
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.intern(Type::Pointer(pointee))
    }

    pub fn array(&mut self, element: TypeId, fixed_size: i32) -> TypeId {
        self.intern(Type::Array { element, fixed_size })
    }

    pub fn function(&mut self, ret: TypeId, params: Vec<TypeId>) -> TypeId {
        self.intern(Type::Function { ret, params })
    }

    pub fn named(&mut self, definition: SymbolId) -> TypeId {
        self.intern(Type::Named(definition))
    }

    pub fn generic(&mut self, definition: SymbolId, args: Vec<TypeId>) -> TypeId {
        self.intern(Type::Generic { definition, args })
    }

    pub fn range(&mut self, element: TypeId) -> TypeId {
        self.intern(Type::Range(element))
    }

    /// A fresh type parameter with a unique id.
    pub fn type_param(&mut self, name: &str) -> TypeId {
        let id = self.next_param_id;
        self.next_param_id += 1;
        self.intern(Type::TypeParam { name: name.to_string(), id })
    }

    /// The interned form of an inference variable.
    pub fn unresolved(&mut self, var: TyVar) -> TypeId {
        self.intern(Type::Unresolved(var))
    }

    pub fn primitive_by_name(&mut self, name: &str) -> Option<TypeId> {
        if name == "string" {
            return Some(self.string_type());
        }
        PrimitiveKind::from_name(name).map(|k| self.primitive(k))
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn is_void(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Primitive(PrimitiveKind::Void))
    }

    pub fn as_primitive(&self, id: TypeId) -> Option<PrimitiveKind> {
        match self.get(id) {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        self.as_primitive(id).is_some_and(|k| k.is_numeric())
    }

    pub fn is_integral(&self, id: TypeId) -> bool {
        self.as_primitive(id).is_some_and(|k| k.is_integral())
    }

    pub fn is_unresolved(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Unresolved(_))
    }

    /// Whether the type (or any component) contains an inference variable.
    pub fn contains_unresolved(&self, id: TypeId) -> bool {
        match self.get(id) {
            Type::Unresolved(_) => true,
            Type::Primitive(_) | Type::Named(_) | Type::TypeParam { .. } => false,
            Type::Pointer(p) => self.contains_unresolved(*p),
            Type::Array { element, .. } => self.contains_unresolved(*element),
            Type::Range(e) => self.contains_unresolved(*e),
            Type::Function { ret, params } => {
                self.contains_unresolved(*ret)
                    || params.iter().any(|&p| self.contains_unresolved(p))
            }
            Type::Generic { args, .. } => args.iter().any(|&a| self.contains_unresolved(a)),
        }
    }

    /// Substitute type parameters by id, rebuilding composites through the
    /// interner. Used to instantiate generic member signatures.
    pub fn substitute_params(&mut self, id: TypeId, map: &FxHashMap<u32, TypeId>) -> TypeId {
        match self.get(id).clone() {
            Type::TypeParam { id: param_id, .. } => map.get(&param_id).copied().unwrap_or(id),
            Type::Pointer(p) => {
                let p = self.substitute_params(p, map);
                self.pointer(p)
            }
            Type::Array { element, fixed_size } => {
                let element = self.substitute_params(element, map);
                self.array(element, fixed_size)
            }
            Type::Range(e) => {
                let e = self.substitute_params(e, map);
                self.range(e)
            }
            Type::Function { ret, params } => {
                let ret = self.substitute_params(ret, map);
                let params = params.iter().map(|&p| self.substitute_params(p, map)).collect();
                self.function(ret, params)
            }
            Type::Generic { definition, args } => {
                let args = args.iter().map(|&a| self.substitute_params(a, map)).collect();
                self.generic(definition, args)
            }
            Type::Primitive(_) | Type::Named(_) | Type::Unresolved(_) => id,
        }
    }
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_are_canonical() {
        let mut ts = TypeSystem::new();
        assert_eq!(ts.i32_type(), ts.primitive(PrimitiveKind::I32));
        assert_ne!(ts.i32_type(), ts.i64_type());
    }

    #[test]
    fn structural_types_are_interned() {
        let mut ts = TypeSystem::new();
        let i32t = ts.i32_type();
        let p1 = ts.pointer(i32t);
        let p2 = ts.pointer(i32t);
        assert_eq!(p1, p2, "equal structural types must share identity");

        let f1 = ts.function(i32t, vec![i32t, i32t]);
        let f2 = ts.function(i32t, vec![i32t, i32t]);
        assert_eq!(f1, f2);
        let f3 = ts.function(i32t, vec![i32t]);
        assert_ne!(f1, f3);
    }

    #[test]
    fn string_is_pointer_to_char() {
        let mut ts = TypeSystem::new();
        let s = ts.string_type();
        let c = ts.char_type();
        assert_eq!(ts.get(s), &Type::Pointer(c));
        assert_eq!(ts.primitive_by_name("string"), Some(s));
    }

    #[test]
    fn primitive_names_round_trip() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_name("int"), None);
    }

    #[test]
    fn type_params_are_distinct() {
        let mut ts = TypeSystem::new();
        let a = ts.type_param("T");
        let b = ts.type_param("T");
        assert_ne!(a, b, "each type parameter declaration is its own type");
    }

    #[test]
    fn substitute_params_rebuilds_canonically() {
        let mut ts = TypeSystem::new();
        let t = ts.type_param("T");
        let Type::TypeParam { id: param_id, .. } = ts.get(t).clone() else {
            panic!("expected type parameter");
        };
        let i32t = ts.i32_type();
        let ptr_t = ts.pointer(t);

        let mut map = FxHashMap::default();
        map.insert(param_id, i32t);
        let substituted = ts.substitute_params(ptr_t, &map);
        let expected = ts.pointer(i32t);
        assert_eq!(substituted, expected);
    }

    #[test]
    fn widening_ranks_order_numerics() {
        assert!(PrimitiveKind::I8.numeric_rank() < PrimitiveKind::I32.numeric_rank());
        assert!(PrimitiveKind::I64.numeric_rank() < PrimitiveKind::F32.numeric_rank());
        assert_eq!(PrimitiveKind::Bool.numeric_rank(), None);
    }
}
