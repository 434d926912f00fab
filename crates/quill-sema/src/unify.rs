//! Unification over canonicalized types.
//!
//! The inference context owns an `ena` union-find table keyed by
//! [`TyVar`]. Types are resolved through the table before comparison;
//! binding a variable to a type runs the occurs check first. Composite
//! types are rebuilt through the canonical [`TypeSystem`] during
//! substitution so equality stays id-based.

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashSet;

use crate::ty::{TyVar, Type, TypeId, TypeSystem};

/// A failed unification, to be wrapped with location and context by the
/// resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum UnifyError {
    Mismatch { left: TypeId, right: TypeId },
    Arity { expected: usize, found: usize },
    /// The occurs check failed: a variable appears inside its own binding.
    Infinite,
}

/// The inference context: the union-find table plus bookkeeping for
/// literal-originated variables that receive defaults at finalization.
pub struct InferCtx {
    table: InPlaceUnificationTable<TyVar>,
    /// Variables created for integer literals; default to `i32`.
    pub int_literal_vars: FxHashSet<TyVar>,
    /// Variables created for unsuffixed float literals; default to `f64`.
    pub float_literal_vars: FxHashSet<TyVar>,
    /// Variables minted on error-recovery paths; the final
    /// unresolved-type sweep skips their whole equivalence class.
    pub suppressed_vars: FxHashSet<TyVar>,
}

impl InferCtx {
    pub fn new() -> Self {
        Self {
            table: InPlaceUnificationTable::new(),
            int_literal_vars: FxHashSet::default(),
            float_literal_vars: FxHashSet::default(),
            suppressed_vars: FxHashSet::default(),
        }
    }

    // ── Variable creation ──────────────────────────────────────────────

    /// A fresh type variable, interned as a type.
    pub fn fresh_var(&mut self, ts: &mut TypeSystem) -> TypeId {
        let var = self.table.new_key(None);
        ts.unresolved(var)
    }

    /// A fresh variable for an integer literal (defaults to `i32`).
    pub fn fresh_int_literal(&mut self, ts: &mut TypeSystem) -> TypeId {
        let var = self.table.new_key(None);
        self.int_literal_vars.insert(var);
        ts.unresolved(var)
    }

    /// A fresh variable for a float literal (defaults to `f64`).
    pub fn fresh_float_literal(&mut self, ts: &mut TypeSystem) -> TypeId {
        let var = self.table.new_key(None);
        self.float_literal_vars.insert(var);
        ts.unresolved(var)
    }

    // ── Substitution ───────────────────────────────────────────────────

    /// Chase the substitution to a fixed point. Unbound variables
    /// normalize to their union-find root; composites are rebuilt through
    /// the canonical pool so identity comparison keeps working.
    pub fn apply(&mut self, ty: TypeId, ts: &mut TypeSystem) -> TypeId {
        match ts.get(ty).clone() {
            Type::Unresolved(var) => match self.table.probe_value(var) {
                Some(inner) => self.apply(inner, ts),
                None => {
                    let root = self.table.find(var);
                    ts.unresolved(root)
                }
            },
            Type::Pointer(p) => {
                let p = self.apply(p, ts);
                ts.pointer(p)
            }
            Type::Array { element, fixed_size } => {
                let element = self.apply(element, ts);
                ts.array(element, fixed_size)
            }
            Type::Range(e) => {
                let e = self.apply(e, ts);
                ts.range(e)
            }
            Type::Function { ret, params } => {
                let ret = self.apply(ret, ts);
                let params = params.into_iter().map(|p| self.apply(p, ts)).collect();
                ts.function(ret, params)
            }
            Type::Generic { definition, args } => {
                let args = args.into_iter().map(|a| self.apply(a, ts)).collect();
                ts.generic(definition, args)
            }
            Type::Primitive(_) | Type::Named(_) | Type::TypeParam { .. } => ty,
        }
    }

    // ── Occurs check ───────────────────────────────────────────────────

    /// Whether `var` occurs anywhere inside `ty` (following bindings).
    /// Prevents infinite types like `a = *a`.
    pub fn occurs_in(&mut self, var: TyVar, ty: TypeId, ts: &TypeSystem) -> bool {
        match ts.get(ty).clone() {
            Type::Unresolved(v) => {
                if self.table.find(v) == self.table.find(var) {
                    return true;
                }
                match self.table.probe_value(v) {
                    Some(inner) => self.occurs_in(var, inner, ts),
                    None => false,
                }
            }
            Type::Pointer(p) => self.occurs_in(var, p, ts),
            Type::Array { element, .. } => self.occurs_in(var, element, ts),
            Type::Range(e) => self.occurs_in(var, e, ts),
            Type::Function { ret, params } => {
                self.occurs_in(var, ret, ts) || params.iter().any(|&p| self.occurs_in(var, p, ts))
            }
            Type::Generic { args, .. } => args.iter().any(|&a| self.occurs_in(var, a, ts)),
            Type::Primitive(_) | Type::Named(_) | Type::TypeParam { .. } => false,
        }
    }

    // ── Unification ────────────────────────────────────────────────────

    /// Solve `a = b`. Both sides are substituted first; variables bind to
    /// the other side (occurs check permitting); composites of the same
    /// shape unify child-wise; anything else is a mismatch.
    pub fn unify(&mut self, a: TypeId, b: TypeId, ts: &mut TypeSystem) -> Result<(), UnifyError> {
        let a = self.apply(a, ts);
        let b = self.apply(b, ts);
        if a == b {
            return Ok(());
        }

        match (ts.get(a).clone(), ts.get(b).clone()) {
            (Type::Unresolved(v1), Type::Unresolved(v2)) => {
                // A literal-default marker survives a var-var union.
                self.propagate_literal_markers(v1, v2);
                self.table
                    .unify_var_var(v1, v2)
                    .expect("unifying two unbound vars cannot fail");
                Ok(())
            }
            (Type::Unresolved(v), _) => self.bind(v, b, ts),
            (_, Type::Unresolved(v)) => self.bind(v, a, ts),
            (Type::Pointer(p1), Type::Pointer(p2)) => self.unify(p1, p2, ts),
            (
                Type::Array { element: e1, fixed_size: s1 },
                Type::Array { element: e2, fixed_size: s2 },
            ) => {
                if s1 == s2 || s1 < 0 || s2 < 0 {
                    self.unify(e1, e2, ts)
                } else {
                    Err(UnifyError::Mismatch { left: a, right: b })
                }
            }
            (Type::Range(e1), Type::Range(e2)) => self.unify(e1, e2, ts),
            (
                Type::Function { ret: r1, params: p1 },
                Type::Function { ret: r2, params: p2 },
            ) => {
                if p1.len() != p2.len() {
                    return Err(UnifyError::Arity { expected: p1.len(), found: p2.len() });
                }
                for (x, y) in p1.into_iter().zip(p2) {
                    self.unify(x, y, ts)?;
                }
                self.unify(r1, r2, ts)
            }
            (
                Type::Generic { definition: d1, args: a1 },
                Type::Generic { definition: d2, args: a2 },
            ) => {
                if d1 != d2 {
                    return Err(UnifyError::Mismatch { left: a, right: b });
                }
                if a1.len() != a2.len() {
                    return Err(UnifyError::Arity { expected: a1.len(), found: a2.len() });
                }
                for (x, y) in a1.into_iter().zip(a2) {
                    self.unify(x, y, ts)?;
                }
                Ok(())
            }
            _ => Err(UnifyError::Mismatch { left: a, right: b }),
        }
    }

    fn bind(&mut self, var: TyVar, ty: TypeId, ts: &mut TypeSystem) -> Result<(), UnifyError> {
        if self.occurs_in(var, ty, ts) {
            return Err(UnifyError::Infinite);
        }
        // Literal-originated variables only accept numeric types: an
        // integer literal can become any numeric, a float literal only a
        // floating-point kind.
        if self.int_literal_vars.contains(&var) && !literal_compatible(ty, ts, false) {
            return Err(UnifyError::Mismatch { left: ts.i32_type(), right: ty });
        }
        if self.float_literal_vars.contains(&var) && !literal_compatible(ty, ts, true) {
            return Err(UnifyError::Mismatch { left: ts.f64_type(), right: ty });
        }
        self.table
            .unify_var_value(var, Some(ty))
            .expect("binding an unbound var after the occurs check cannot fail");
        Ok(())
    }

    fn propagate_literal_markers(&mut self, v1: TyVar, v2: TyVar) {
        if self.int_literal_vars.contains(&v1) {
            self.int_literal_vars.insert(v2);
        }
        if self.int_literal_vars.contains(&v2) {
            self.int_literal_vars.insert(v1);
        }
        if self.float_literal_vars.contains(&v1) {
            self.float_literal_vars.insert(v2);
        }
        if self.float_literal_vars.contains(&v2) {
            self.float_literal_vars.insert(v1);
        }
        if self.suppressed_vars.contains(&v1) {
            self.suppressed_vars.insert(v2);
        }
        if self.suppressed_vars.contains(&v2) {
            self.suppressed_vars.insert(v1);
        }
    }

    // ── Finalization support ───────────────────────────────────────────

    /// Number of variables still unbound; used to detect fixed-point
    /// progress across resolution passes.
    pub fn unbound_count(&mut self) -> usize {
        let len = self.table.len() as u32;
        let mut count = 0;
        for i in 0..len {
            let root = self.table.find(TyVar(i));
            if root == TyVar(i) && self.table.probe_value(root).is_none() {
                count += 1;
            }
        }
        count
    }

    /// Bind still-unbound literal variables to their defaults
    /// (`i32` / `f64`). Float-marked variables go first so a variable
    /// carrying both markers (`1 + 1.5`) settles on `f64`. Returns how
    /// many were defaulted.
    pub fn apply_literal_defaults(&mut self, ts: &mut TypeSystem) -> usize {
        let i32t = ts.i32_type();
        let f64t = ts.f64_type();
        let mut defaulted = 0;
        for &var in self.float_literal_vars.clone().iter() {
            let root = self.table.find(var);
            if self.table.probe_value(root).is_none() {
                let _ = self.table.unify_var_value(root, Some(f64t));
                defaulted += 1;
            }
        }
        for &var in self.int_literal_vars.clone().iter() {
            let root = self.table.find(var);
            if self.table.probe_value(root).is_none() {
                let _ = self.table.unify_var_value(root, Some(i32t));
                defaulted += 1;
            }
        }
        defaulted
    }
}

impl Default for InferCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a type is acceptable for a literal-originated variable.
fn literal_compatible(ty: TypeId, ts: &TypeSystem, float_only: bool) -> bool {
    match ts.get(ty) {
        Type::Primitive(kind) => {
            if float_only {
                kind.is_float()
            } else {
                kind.is_numeric()
            }
        }
        // Anything still containing variables stays negotiable.
        Type::Unresolved(_) => true,
        _ => false,
    }
}
