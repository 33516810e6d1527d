//! Overload resolution.

use crate::subtype::TypeRelation;
use tarn_binder::{DeclKind, Session, SymbolId};
use tarn_types::Type;

/// Outcome of resolving a named call against its candidate set.
#[derive(Clone, Debug)]
pub enum CallResolution {
    Resolved { symbol: SymbolId, return_type: Type },
    Ambiguous(Vec<SymbolId>),
    NoneApplicable,
    NoCandidates,
}

#[derive(Clone, Debug)]
struct Candidate {
    symbol: SymbolId,
    params: Vec<Type>,
    return_type: Type,
}

/// Pick the unique most specific applicable candidate.
///
/// Applicability: arity match and every argument a subtype of its parameter.
/// Specificity: A beats B when each of A's parameter types is a subtype of
/// B's. Two applicable candidates neither of which beats the other are an
/// ambiguity, reported rather than resolved arbitrarily.
pub fn resolve_call(
    session: &Session,
    candidates: &[SymbolId],
    arg_types: &[Type],
    relation: &dyn TypeRelation,
) -> CallResolution {
    if candidates.is_empty() {
        return CallResolution::NoCandidates;
    }
    let mut applicable: Vec<Candidate> = Vec::new();
    for &symbol in candidates {
        let cell = session.graph.cell_of(symbol);
        let decl = cell.read();
        let candidate = match &decl.kind {
            DeclKind::Function(function) => Candidate {
                symbol,
                params: function
                    .params
                    .iter()
                    .map(|param| param.type_ref.ty().unwrap_or_else(|| Type::error("unresolved parameter type")))
                    .collect(),
                return_type: function
                    .return_type
                    .ty()
                    .unwrap_or_else(|| Type::error("unresolved return type")),
            },
            // A property used as a callee candidate resolves as itself when
            // no arguments are supplied.
            DeclKind::Property(property) if arg_types.is_empty() => Candidate {
                symbol,
                params: Vec::new(),
                return_type: property
                    .type_ref
                    .ty()
                    .unwrap_or_else(|| Type::error("unresolved property type")),
            },
            _ => continue,
        };
        if is_applicable(&candidate, arg_types, relation) {
            applicable.push(candidate);
        }
    }

    match applicable.len() {
        0 => CallResolution::NoneApplicable,
        1 => {
            let winner = applicable.remove(0);
            CallResolution::Resolved {
                symbol: winner.symbol,
                return_type: winner.return_type,
            }
        }
        _ => {
            let most_specific: Vec<&Candidate> = applicable
                .iter()
                .filter(|candidate| {
                    applicable
                        .iter()
                        .filter(|other| other.symbol != candidate.symbol)
                        .all(|other| beats(candidate, other, relation))
                })
                .collect();
            match most_specific.as_slice() {
                [winner] => CallResolution::Resolved {
                    symbol: winner.symbol,
                    return_type: winner.return_type.clone(),
                },
                _ => CallResolution::Ambiguous(
                    applicable.iter().map(|candidate| candidate.symbol).collect(),
                ),
            }
        }
    }
}

fn is_applicable(candidate: &Candidate, arg_types: &[Type], relation: &dyn TypeRelation) -> bool {
    if candidate.params.len() != arg_types.len() {
        return false;
    }
    candidate
        .params
        .iter()
        .zip(arg_types)
        .all(|(param, arg)| parameter_accepts(param, arg, relation))
}

/// A parameter typed by one of the callee's own type parameters accepts any
/// argument at this stage; the constraint solver judges it afterwards.
fn parameter_accepts(param: &Type, arg: &Type, relation: &dyn TypeRelation) -> bool {
    if matches!(
        param.lower_bound_if_flexible(),
        tarn_types::SimpleType::TypeParameter(_)
    ) {
        return true;
    }
    relation.is_subtype(arg, param)
}

fn beats(a: &Candidate, b: &Candidate, relation: &dyn TypeRelation) -> bool {
    a.params.len() == b.params.len()
        && a.params
            .iter()
            .zip(&b.params)
            .all(|(pa, pb)| relation.is_subtype(pa, pb))
}
