//! The symbol table: a scoped symbol graph with qualified lookup,
//! overload collection, and multi-file merging.

use rustc_hash::FxHashMap;

use quill_parser::arena::{ExprId, StmtId};

use crate::symbol::{Symbol, SymbolData, SymbolId};
use crate::ty::{TypeId, TypeSystem};
use crate::FileId;

/// A scoped symbol graph for one file (before merge) or the whole program
/// (after). Owns the symbol arena; the current-scope cursor is used by the
/// builder and resolver while walking declarations.
///
/// The AST is linked to symbols only through the side maps here --
/// declaration nodes do not hold symbol ids.
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    root: SymbolId,
    current_scope: SymbolId,
    /// Declaration node -> the symbol it created.
    pub ast_to_symbol: FxHashMap<(FileId, StmtId), SymbolId>,
    /// Reverse direction of `ast_to_symbol`.
    pub symbol_to_ast: FxHashMap<SymbolId, (FileId, StmtId)>,
    /// Statement -> the anonymous scope entered when visiting it
    /// (`$block`, `$if_then`, `$while`, ...). Shared convention between
    /// the builder and the resolver.
    pub stmt_scopes: FxHashMap<(FileId, StmtId), SymbolId>,
    /// Lambda expression -> the scope holding its parameters.
    pub expr_scopes: FxHashMap<(FileId, ExprId), SymbolId>,
}

impl SymbolTable {
    /// Create a table containing only the root (global) namespace.
    pub fn new() -> Self {
        let root_symbol = Symbol::new(
            "",
            quill_common::span::SourceRange::empty_at(
                quill_common::span::SourceLocation::start_of_file(),
            ),
            SymbolData::Namespace(Default::default()),
        );
        let root = SymbolId(0);
        Self {
            symbols: vec![root_symbol],
            root,
            current_scope: root,
            ast_to_symbol: FxHashMap::default(),
            symbol_to_ast: FxHashMap::default(),
            stmt_scopes: FxHashMap::default(),
            expr_scopes: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    pub fn current_scope(&self) -> SymbolId {
        self.current_scope
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len() as u32).map(SymbolId)
    }

    // ── Construction ───────────────────────────────────────────────────

    /// Add a symbol under `parent`, wiring the parent link, ordered
    /// member list, and name multimap.
    pub fn add_symbol(&mut self, parent: SymbolId, mut symbol: Symbol) -> SymbolId {
        symbol.parent = Some(parent);
        let id = SymbolId(self.symbols.len() as u32);
        let name = symbol.name.clone();
        self.symbols.push(symbol);
        let parent_sym = self.symbol_mut(parent);
        parent_sym.members.push(id);
        parent_sym.by_name.entry(name).or_default().push(id);
        id
    }

    /// Add a symbol under the current scope.
    pub fn define(&mut self, symbol: Symbol) -> SymbolId {
        self.add_symbol(self.current_scope, symbol)
    }

    pub fn push_scope(&mut self, scope: SymbolId) {
        self.current_scope = scope;
    }

    pub fn pop_scope(&mut self) {
        if let Some(parent) = self.symbol(self.current_scope).parent {
            self.current_scope = parent;
        }
    }

    // ── Lookup ─────────────────────────────────────────────────────────

    /// Members of `scope` with the given name (non-recursive).
    pub fn members_named(&self, scope: SymbolId, name: &str) -> &[SymbolId] {
        self.symbol(scope)
            .by_name
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a name from the current scope outward.
    pub fn resolve(&self, name: &str) -> Option<SymbolId> {
        self.resolve_from(self.current_scope, name)
    }

    /// Resolve from an explicit starting scope, walking parents and
    /// consulting each namespace's imported (`using`) namespaces.
    pub fn resolve_from(&self, scope: SymbolId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(&found) = self.members_named(id, name).first() {
                return Some(found);
            }
            current = self.symbol(id).parent;
        }
        // Second pass: imported namespaces.
        let mut current = Some(scope);
        while let Some(id) = current {
            if let SymbolData::Namespace(ns) = &self.symbol(id).data {
                for &imported in &ns.using_namespaces {
                    if let Some(&found) = self.members_named(imported, name).first() {
                        return Some(found);
                    }
                }
            }
            current = self.symbol(id).parent;
        }
        None
    }

    /// Resolve only in the current scope, without walking outward.
    pub fn resolve_local(&self, name: &str) -> Option<SymbolId> {
        self.members_named(self.current_scope, name).first().copied()
    }

    /// Resolve a dotted path: the head from the current scope, then each
    /// segment inside the previous container.
    pub fn resolve_path(&self, scope: SymbolId, path: &[String]) -> Option<SymbolId> {
        let (head, rest) = path.split_first()?;
        let mut symbol = self.resolve_from(scope, head)?;
        for segment in rest {
            symbol = self.members_named(symbol, segment).first().copied()?;
        }
        Some(symbol)
    }

    /// Collect all function overloads visible from `scope` under `name`,
    /// innermost first.
    pub fn functions_named(&self, scope: SymbolId, name: &str) -> Vec<SymbolId> {
        let mut found = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            for &member in self.members_named(id, name) {
                if matches!(self.symbol(member).data, SymbolData::Function(_)) {
                    found.push(member);
                }
            }
            if let SymbolData::Namespace(ns) = &self.symbol(id).data {
                for &imported in &ns.using_namespaces {
                    for &member in self.members_named(imported, name) {
                        if matches!(self.symbol(member).data, SymbolData::Function(_)) {
                            found.push(member);
                        }
                    }
                }
            }
            current = self.symbol(id).parent;
        }
        found
    }

    /// Resolve a function by exact parameter types.
    pub fn resolve_function(
        &self,
        scope: SymbolId,
        name: &str,
        arg_types: &[TypeId],
    ) -> Option<SymbolId> {
        self.functions_named(scope, name).into_iter().find(|&f| {
            let Some(data) = self.symbol(f).as_function() else {
                return false;
            };
            data.parameters.len() == arg_types.len()
                && data
                    .parameters
                    .iter()
                    .zip(arg_types)
                    .all(|(&p, &a)| self.symbol(p).value_type() == Some(a))
        })
    }

    /// The innermost enclosing symbol of the given predicate, starting at
    /// `scope` itself.
    pub fn enclosing(&self, scope: SymbolId, pred: impl Fn(&Symbol) -> bool) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if pred(self.symbol(id)) {
                return Some(id);
            }
            current = self.symbol(id).parent;
        }
        None
    }

    /// Dotted path from the root namespace (whose own name is empty).
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(sym_id) = current {
            let sym = self.symbol(sym_id);
            if !sym.name.is_empty() {
                parts.push(sym.name.clone());
            }
            current = sym.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Mangled name for code generation: the qualified path plus `$`-
    /// separated parameter type names.
    pub fn mangled_name(&self, func: SymbolId, ts: &TypeSystem) -> String {
        let mut name = self.qualified_name(func);
        if let Some(data) = self.symbol(func).as_function() {
            for &param in &data.parameters {
                name.push('$');
                match self.symbol(param).value_type() {
                    Some(ty) => name.push_str(&self.display_type(ts, ty)),
                    None => name.push('?'),
                }
            }
        }
        name
    }

    /// Whether two functions in this table have matching signatures:
    /// same name, same arity, same parameter types (resolved ids when
    /// both sides have them, declared type text otherwise).
    pub fn signature_matches(&self, a: SymbolId, b: SymbolId) -> bool {
        self.signatures_match_across(a, self, b)
    }

    /// Signature comparison where `b` lives in `other` (merge time).
    pub fn signatures_match_across(&self, a: SymbolId, other: &SymbolTable, b: SymbolId) -> bool {
        let (Some(fa), Some(fb)) = (self.symbol(a).as_function(), other.symbol(b).as_function())
        else {
            return false;
        };
        if self.symbol(a).name != other.symbol(b).name
            || fa.parameters.len() != fb.parameters.len()
        {
            return false;
        }
        fa.parameters.iter().zip(&fb.parameters).all(|(&pa, &pb)| {
            let (sa, sb) = (self.symbol(pa), other.symbol(pb));
            let (
                SymbolData::Parameter(da),
                SymbolData::Parameter(db),
            ) = (&sa.data, &sb.data)
            else {
                return false;
            };
            match (da.ty, db.ty) {
                (Some(ta), Some(tb)) => ta == tb,
                _ => da.declared_type_text == db.declared_type_text,
            }
        })
    }

    // ── Display ────────────────────────────────────────────────────────

    /// Human-readable type name; needs the table for named types.
    pub fn display_type(&self, ts: &TypeSystem, id: TypeId) -> String {
        use crate::ty::Type;
        match ts.get(id) {
            Type::Primitive(kind) => kind.name().to_string(),
            Type::Pointer(p) => format!("*{}", self.display_type(ts, *p)),
            Type::Array { element, fixed_size } => {
                if *fixed_size < 0 {
                    format!("{}[]", self.display_type(ts, *element))
                } else {
                    format!("{}[{}]", self.display_type(ts, *element), fixed_size)
                }
            }
            Type::Function { ret, params } => {
                let params = params
                    .iter()
                    .map(|&p| self.display_type(ts, p))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("fn({}) -> {}", params, self.display_type(ts, *ret))
            }
            Type::Named(sym) => self.symbol(*sym).name.clone(),
            Type::Generic { definition, args } => {
                let args = args
                    .iter()
                    .map(|&a| self.display_type(ts, a))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}<{}>", self.symbol(*definition).name, args)
            }
            Type::TypeParam { name, .. } => name.clone(),
            Type::Range(e) => format!("Range<{}>", self.display_type(ts, *e)),
            Type::Unresolved(v) => format!("?{}", v.0),
        }
    }

    /// Render the table as an indented tree (driver `--print-symbols`).
    pub fn dump(&self, ts: &TypeSystem) -> String {
        let mut out = String::new();
        self.dump_symbol(ts, self.root, 0, &mut out);
        out
    }

    fn dump_symbol(&self, ts: &TypeSystem, id: SymbolId, depth: usize, out: &mut String) {
        let sym = self.symbol(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        let name = if sym.name.is_empty() { "<global>" } else { &sym.name };
        out.push_str(&format!("{:?} {}", sym.kind(), name));
        if let Some(ty) = sym.value_type() {
            out.push_str(&format!(": {}", self.display_type(ts, ty)));
        }
        if let Some(f) = sym.as_function() {
            if let Some(ret) = f.return_type {
                out.push_str(&format!(" -> {}", self.display_type(ts, ret)));
            }
        }
        out.push('\n');
        for &member in &sym.members {
            self.dump_symbol(ts, member, depth + 1, out);
        }
    }

    // ── Merge ──────────────────────────────────────────────────────────

    /// Fold `other` into this table. Namespaces with the same name merge
    /// recursively; functions join overload sets unless a signature
    /// collides; anything else with a taken name is a conflict. Returns
    /// conflict messages; non-conflicting symbols are adopted and their
    /// parent links rebuilt.
    pub fn merge(&mut self, other: SymbolTable) -> Vec<String> {
        let mut conflicts = Vec::new();
        let mut remap: FxHashMap<SymbolId, SymbolId> = FxHashMap::default();
        remap.insert(other.root(), self.root);

        let root = self.root;
        self.merge_namespace(root, other.root(), &other, &mut conflicts, &mut remap);

        // Carry the AST side maps across, remapped to adopted ids.
        for ((file, stmt), sym) in &other.ast_to_symbol {
            if let Some(&new_id) = remap.get(sym) {
                self.ast_to_symbol.insert((*file, *stmt), new_id);
                self.symbol_to_ast.insert(new_id, (*file, *stmt));
            }
        }
        for ((file, stmt), scope) in &other.stmt_scopes {
            if let Some(&new_id) = remap.get(scope) {
                self.stmt_scopes.insert((*file, *stmt), new_id);
            }
        }
        for ((file, expr), scope) in &other.expr_scopes {
            if let Some(&new_id) = remap.get(scope) {
                self.expr_scopes.insert((*file, *expr), new_id);
            }
        }
        conflicts
    }

    fn merge_namespace(
        &mut self,
        target: SymbolId,
        source: SymbolId,
        other: &SymbolTable,
        conflicts: &mut Vec<String>,
        remap: &mut FxHashMap<SymbolId, SymbolId>,
    ) {
        // Imported namespace paths accumulate on the merged namespace.
        if let (SymbolData::Namespace(src), SymbolData::Namespace(_)) =
            (&other.symbol(source).data, &self.symbol(target).data)
        {
            let pending = src.using_paths.clone();
            if let SymbolData::Namespace(dst) = &mut self.symbol_mut(target).data {
                dst.using_paths.extend(pending);
            }
        }

        for &child in &other.symbol(source).members {
            let child_sym = other.symbol(child);
            let name = child_sym.name.clone();
            let existing = self.members_named(target, &name).to_vec();

            if !existing.is_empty() && !name.starts_with('$') {
                // Both namespaces: merge recursively.
                if existing.len() == 1
                    && matches!(child_sym.data, SymbolData::Namespace(_))
                    && matches!(self.symbol(existing[0]).data, SymbolData::Namespace(_))
                {
                    remap.insert(child, existing[0]);
                    self.merge_namespace(existing[0], child, other, conflicts, remap);
                    continue;
                }

                // Both functions: add as an overload unless the signature
                // is already taken.
                if matches!(child_sym.data, SymbolData::Function(_))
                    && existing
                        .iter()
                        .all(|&e| matches!(self.symbol(e).data, SymbolData::Function(_)))
                {
                    let collides = existing
                        .iter()
                        .any(|&e| self.signatures_match_across(e, other, child));
                    if collides {
                        conflicts.push(format!(
                            "Symbol conflict: '{}' already exists in namespace '{}'",
                            name,
                            self.qualified_name(target)
                        ));
                        continue;
                    }
                    // Falls through to adoption as a new overload.
                } else {
                    conflicts.push(format!(
                        "Symbol conflict: '{}' already exists in namespace '{}'",
                        name,
                        self.qualified_name(target)
                    ));
                    continue;
                }
            }

            self.adopt_subtree(target, child, other, remap);
        }
    }

    /// Deep-copy a symbol subtree from `other` under `parent`, recording
    /// the id mapping and rewiring intra-data symbol references.
    fn adopt_subtree(
        &mut self,
        parent: SymbolId,
        source: SymbolId,
        other: &SymbolTable,
        remap: &mut FxHashMap<SymbolId, SymbolId>,
    ) -> SymbolId {
        let src = other.symbol(source);
        let mut copy = src.clone();
        copy.parent = None;
        copy.members = Vec::new();
        copy.by_name = FxHashMap::default();
        let new_id = self.add_symbol(parent, copy);
        remap.insert(source, new_id);

        for &member in &src.members {
            self.adopt_subtree(new_id, member, other, remap);
        }

        // Child-referencing payload fields point at adopted ids now.
        let data = &mut self.symbol_mut(new_id).data;
        match data {
            SymbolData::Function(f) => {
                f.parameters = f
                    .parameters
                    .iter()
                    .map(|p| remap.get(p).copied().unwrap_or(*p))
                    .collect();
                f.type_params = f
                    .type_params
                    .iter()
                    .map(|p| remap.get(p).copied().unwrap_or(*p))
                    .collect();
            }
            SymbolData::Type(t) => {
                t.type_params = t
                    .type_params
                    .iter()
                    .map(|p| remap.get(p).copied().unwrap_or(*p))
                    .collect();
                t.base_class = t.base_class.map(|b| remap.get(&b).copied().unwrap_or(b));
                t.vtable = t.vtable.iter().map(|v| remap.get(v).copied().unwrap_or(*v)).collect();
            }
            _ => {}
        }
        new_id
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{FunctionData, LocalData, NamespaceData, ParameterData};
    use quill_common::span::{SourceLocation, SourceRange};

    fn range() -> SourceRange {
        SourceRange::new(SourceLocation::start_of_file(), 0)
    }

    fn namespace(name: &str) -> Symbol {
        Symbol::new(name, range(), SymbolData::Namespace(NamespaceData::default()))
    }

    fn local(name: &str) -> Symbol {
        Symbol::new(name, range(), SymbolData::Local(LocalData { ty: None, is_captured: false }))
    }

    fn function(name: &str) -> Symbol {
        Symbol::new(name, range(), SymbolData::Function(FunctionData::new()))
    }

    fn add_param(table: &mut SymbolTable, func: SymbolId, name: &str, text: &str, index: u32) {
        let param = Symbol::new(
            name,
            range(),
            SymbolData::Parameter(ParameterData {
                ty: None,
                index,
                has_default: false,
                is_ref: false,
                is_out: false,
                declared_type_text: Some(text.to_string()),
            }),
        );
        let id = table.add_symbol(func, param);
        if let SymbolData::Function(f) = &mut table.symbol_mut(func).data {
            f.parameters.push(id);
        }
    }

    #[test]
    fn child_parent_links_are_consistent() {
        let mut table = SymbolTable::new();
        let ns = table.define(namespace("app"));
        let x = table.add_symbol(ns, local("x"));
        assert_eq!(table.symbol(x).parent, Some(ns));
        assert!(table.symbol(ns).members.contains(&x));
        assert_eq!(table.members_named(ns, "x"), &[x]);
    }

    #[test]
    fn qualified_names_are_dotted_from_root() {
        let mut table = SymbolTable::new();
        let app = table.define(namespace("app"));
        let core = table.add_symbol(app, namespace("core"));
        let x = table.add_symbol(core, local("x"));
        assert_eq!(table.qualified_name(x), "app.core.x");
        assert_eq!(table.qualified_name(table.root()), "");
    }

    #[test]
    fn resolve_walks_outward() {
        let mut table = SymbolTable::new();
        let outer = table.define(namespace("outer"));
        table.add_symbol(outer, local("x"));
        let inner = table.add_symbol(outer, namespace("inner"));
        table.push_scope(inner);
        assert!(table.resolve("x").is_some());
        assert!(table.resolve_local("x").is_none());
        table.pop_scope();
        assert_eq!(table.current_scope(), outer);
    }

    #[test]
    fn merge_disjoint_namespaces_is_commutative() {
        let build = |names: &[&str]| {
            let mut t = SymbolTable::new();
            for n in names {
                t.define(namespace(n));
            }
            t
        };

        let mut ab = build(&["a"]);
        assert!(ab.merge(build(&["b"])).is_empty());
        let mut ba = build(&["b"]);
        assert!(ba.merge(build(&["a"])).is_empty());

        let names = |t: &SymbolTable| {
            let mut v: Vec<String> = t
                .symbol(t.root())
                .members
                .iter()
                .map(|&m| t.symbol(m).name.clone())
                .collect();
            v.sort();
            v
        };
        assert_eq!(names(&ab), names(&ba));
    }

    #[test]
    fn merge_same_namespace_merges_contents() {
        let mut a = SymbolTable::new();
        let ns_a = a.define(namespace("app"));
        a.add_symbol(ns_a, local("x"));

        let mut b = SymbolTable::new();
        let ns_b = b.define(namespace("app"));
        b.add_symbol(ns_b, local("y"));

        let conflicts = a.merge(b);
        assert!(conflicts.is_empty(), "{conflicts:?}");
        let app = a.members_named(a.root(), "app")[0];
        assert!(!a.members_named(app, "x").is_empty());
        assert!(!a.members_named(app, "y").is_empty());
    }

    #[test]
    fn merge_function_against_variable_conflicts() {
        let mut a = SymbolTable::new();
        a.define(function("foo"));

        let mut b = SymbolTable::new();
        b.define(local("foo"));

        let conflicts = a.merge(b);
        assert_eq!(conflicts, vec!["Symbol conflict: 'foo' already exists in namespace ''"]);
    }

    #[test]
    fn merge_distinct_signatures_overload() {
        let mut a = SymbolTable::new();
        let f_a = a.define(function("f"));
        add_param(&mut a, f_a, "x", "i32", 0);

        let mut b = SymbolTable::new();
        let f_b = b.define(function("f"));
        add_param(&mut b, f_b, "x", "f64", 0);

        let conflicts = a.merge(b);
        assert!(conflicts.is_empty(), "{conflicts:?}");
        assert_eq!(a.members_named(a.root(), "f").len(), 2);
    }

    #[test]
    fn merge_same_signature_conflicts() {
        let mut a = SymbolTable::new();
        let f_a = a.define(function("f"));
        add_param(&mut a, f_a, "x", "i32", 0);

        let mut b = SymbolTable::new();
        let f_b = b.define(function("f"));
        add_param(&mut b, f_b, "y", "i32", 0);

        let conflicts = a.merge(b);
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].contains("'f'"));
    }

    #[test]
    fn resolve_function_matches_exact_parameter_types() {
        let mut table = SymbolTable::new();
        let mut ts = crate::ty::TypeSystem::new();
        let i32t = ts.i32_type();
        let f64t = ts.f64_type();

        let f_int = table.define(function("f"));
        add_param(&mut table, f_int, "x", "i32", 0);
        let f_float = table.define(function("f"));
        add_param(&mut table, f_float, "x", "f64", 0);

        // Attach resolved parameter types.
        let set = |table: &mut SymbolTable, func: SymbolId, ty| {
            let param = table.symbol(func).as_function().unwrap().parameters[0];
            table.symbol_mut(param).set_value_type(ty);
        };
        set(&mut table, f_int, i32t);
        set(&mut table, f_float, f64t);

        assert_eq!(table.resolve_function(table.root(), "f", &[i32t]), Some(f_int));
        assert_eq!(table.resolve_function(table.root(), "f", &[f64t]), Some(f_float));
        assert_eq!(table.resolve_function(table.root(), "f", &[i32t, i32t]), None);

        assert_eq!(table.mangled_name(f_int, &ts), "f$i32");
    }

    #[test]
    fn adopted_function_parameters_are_rewired() {
        let mut b = SymbolTable::new();
        let f_b = b.define(function("g"));
        add_param(&mut b, f_b, "x", "i32", 0);

        let mut a = SymbolTable::new();
        assert!(a.merge(b).is_empty());
        let g = a.members_named(a.root(), "g")[0];
        let params = a.symbol(g).as_function().unwrap().parameters.clone();
        assert_eq!(params.len(), 1);
        // The parameter id must point into the merged table and be a
        // child of the adopted function.
        assert_eq!(a.symbol(params[0]).parent, Some(g));
        assert_eq!(a.symbol(params[0]).name, "x");
    }
}
