//! Conversion classification and overload resolution.

use crate::symbol::{SymbolData, SymbolId};
use crate::table::SymbolTable;
use crate::ty::{PrimitiveKind, Type, TypeId, TypeSystem};

/// How one type converts to another. Only `Identity` and the two
/// implicit kinds are allowed without a cast; explicit casts accept
/// everything except `NotConvertible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    Identity,
    ImplicitNumericWidening,
    ImplicitReferenceUpcast,
    ExplicitNumericNarrowing,
    ExplicitUnrelatedPointer,
    NotConvertible,
}

impl ConversionKind {
    pub fn is_implicit(self) -> bool {
        matches!(
            self,
            ConversionKind::Identity
                | ConversionKind::ImplicitNumericWidening
                | ConversionKind::ImplicitReferenceUpcast
        )
    }

    pub fn is_explicit_only(self) -> bool {
        matches!(
            self,
            ConversionKind::ExplicitNumericNarrowing | ConversionKind::ExplicitUnrelatedPointer
        )
    }
}

/// Classify a conversion from `from` to `to`.
pub fn check_conversion(
    from: TypeId,
    to: TypeId,
    ts: &TypeSystem,
    table: &SymbolTable,
) -> ConversionKind {
    if from == to {
        return ConversionKind::Identity;
    }

    match (ts.get(from), ts.get(to)) {
        (Type::Primitive(a), Type::Primitive(b)) => classify_numeric(*a, *b),
        (Type::Pointer(pa), Type::Pointer(pb)) => {
            if pa == pb {
                ConversionKind::Identity
            } else if is_ancestor_type(table, ts, *pa, *pb) {
                ConversionKind::ImplicitReferenceUpcast
            } else {
                ConversionKind::ExplicitUnrelatedPointer
            }
        }
        (Type::Named(_), Type::Named(_)) | (Type::Generic { .. }, Type::Named(_)) => {
            if is_ancestor_type(table, ts, from, to) {
                ConversionKind::ImplicitReferenceUpcast
            } else {
                ConversionKind::NotConvertible
            }
        }
        // A sized array converts to the unsized view of the same element.
        (
            Type::Array { element: ea, .. },
            Type::Array { element: eb, fixed_size: -1 },
        ) if ea == eb => ConversionKind::ImplicitReferenceUpcast,
        _ => ConversionKind::NotConvertible,
    }
}

fn classify_numeric(from: PrimitiveKind, to: PrimitiveKind) -> ConversionKind {
    if from == to {
        return ConversionKind::Identity;
    }
    if !from.is_numeric() || !to.is_numeric() {
        return ConversionKind::NotConvertible;
    }
    let (Some(from_rank), Some(to_rank)) = (from.numeric_rank(), to.numeric_rank()) else {
        return ConversionKind::NotConvertible;
    };

    if to_rank > from_rank {
        // Unsigned widens into a strictly larger signed type or a float;
        // signed never implicitly widens into unsigned.
        let sign_ok = if to.is_float() {
            true
        } else if from.is_signed() {
            to.is_signed()
        } else {
            true
        };
        if sign_ok {
            return ConversionKind::ImplicitNumericWidening;
        }
    }
    ConversionKind::ExplicitNumericNarrowing
}

/// Whether `ancestor` appears on `ty`'s base-class chain.
fn is_ancestor_type(table: &SymbolTable, ts: &TypeSystem, ty: TypeId, ancestor: TypeId) -> bool {
    let def = match ts.get(ty) {
        Type::Named(sym) => *sym,
        Type::Generic { definition, .. } => *definition,
        _ => return false,
    };
    let ancestor_def = match ts.get(ancestor) {
        Type::Named(sym) => *sym,
        Type::Generic { definition, .. } => *definition,
        _ => return false,
    };

    let mut current = table.symbol(def).as_type().and_then(|t| t.base_class);
    while let Some(base) = current {
        if base == ancestor_def {
            return true;
        }
        current = table.symbol(base).as_type().and_then(|t| t.base_class);
    }
    table
        .symbol(def)
        .as_type()
        .map(|t| t.interfaces.contains(&ancestor_def))
        .unwrap_or(false)
}

/// The outcome of overload resolution.
#[derive(Debug)]
pub enum OverloadOutcome {
    /// Exactly one best candidate.
    Selected(SymbolId),
    /// Two or more candidates tie on every criterion.
    Ambiguous,
    /// No candidate survives arity and convertibility checks.
    NoMatch,
}

/// Pick the best function from `candidates` for the given argument types.
///
/// Candidates with the wrong arity are discarded, then any requiring a
/// non-convertible or explicit-only conversion. Survivors are ranked by
/// fewest non-identity conversions, ties broken by fewest widenings;
/// an unbreakable tie is ambiguous.
pub fn resolve_overload(
    candidates: &[SymbolId],
    arg_types: &[TypeId],
    ts: &TypeSystem,
    table: &SymbolTable,
) -> OverloadOutcome {
    struct Ranked {
        symbol: SymbolId,
        non_identity: usize,
        widenings: usize,
    }

    let mut survivors: Vec<Ranked> = Vec::new();

    'candidates: for &candidate in candidates {
        let SymbolData::Function(data) = &table.symbol(candidate).data else {
            continue;
        };
        if data.parameters.len() != arg_types.len() {
            continue;
        }

        let mut non_identity = 0;
        let mut widenings = 0;
        for (&param, &arg) in data.parameters.iter().zip(arg_types) {
            let Some(param_ty) = table.symbol(param).value_type() else {
                // Unresolved parameter type: treat as a wildcard match.
                non_identity += 1;
                continue;
            };
            // Unresolved argument types match anything (they will be
            // unified with the chosen parameter afterwards).
            if ts.contains_unresolved(arg) || ts.contains_unresolved(param_ty) {
                continue;
            }
            let conv = check_conversion(arg, param_ty, ts, table);
            match conv {
                ConversionKind::Identity => {}
                ConversionKind::ImplicitNumericWidening => {
                    non_identity += 1;
                    widenings += 1;
                }
                ConversionKind::ImplicitReferenceUpcast => non_identity += 1,
                _ => continue 'candidates,
            }
        }
        survivors.push(Ranked { symbol: candidate, non_identity, widenings });
    }

    if survivors.is_empty() {
        return OverloadOutcome::NoMatch;
    }

    survivors.sort_by_key(|r| (r.non_identity, r.widenings));
    if survivors.len() > 1 {
        let (a, b) = (&survivors[0], &survivors[1]);
        if a.non_identity == b.non_identity && a.widenings == b.widenings {
            return OverloadOutcome::Ambiguous;
        }
    }
    OverloadOutcome::Selected(survivors[0].symbol)
}
