//! Subtyping queries over the resolved graph.
//!
//! Flexible types follow the permissive platform rule: the lower bound
//! stands in on the subtype side, the upper bound on the supertype side.
//! Error types are compatible in both directions so that one failure does
//! not cascade through every downstream constraint.

use crate::resolve::supertypes_of_class_type;
use std::sync::Arc;
use tarn_binder::Session;
use tarn_common::Variance;
use tarn_types::{Nullability, SimpleType, Type, TypeProjection};

const MAX_SUPERTYPE_DEPTH: usize = 64;

/// Relation oracle consumed by the inference engine. The session-backed
/// implementation below walks the class hierarchy; tests substitute simpler
/// oracles.
pub trait TypeRelation {
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool;
}

pub struct SubtypeChecker {
    session: Arc<Session>,
}

impl SubtypeChecker {
    pub fn new(session: Arc<Session>) -> Self {
        SubtypeChecker { session }
    }

    fn check(&self, sub: &Type, sup: &Type, depth: usize) -> bool {
        if depth > MAX_SUPERTYPE_DEPTH {
            return false;
        }
        if sub == sup {
            return true;
        }
        if sub.is_error() || sup.is_error() {
            return true;
        }

        // Flexible bounds select the permissive side.
        if let Type::Flexible(flexible) = sub {
            return self.check(&Type::Simple((*flexible.lower).clone()), sup, depth + 1);
        }
        if let Type::Flexible(flexible) = sup {
            return self.check(sub, &Type::Simple((*flexible.upper).clone()), depth + 1);
        }

        // Nullability gate: a nullable subtype needs a nullable (or
        // unknown) supertype position.
        if sub.nullability() == Nullability::Nullable && sup.nullability() == Nullability::NotNull {
            return false;
        }

        let (Type::Simple(sub_simple), Type::Simple(sup_simple)) = (sub, sup) else {
            return false;
        };

        match (sub_simple, sup_simple) {
            (SimpleType::DefinitelyNotNull(inner), _) => {
                // The wrapper forces not-null whatever the inner type says.
                let not_null =
                    Type::Simple((**inner).clone()).with_nullability(Nullability::NotNull);
                self.check(&not_null, sup, depth + 1)
            }
            (_, SimpleType::DefinitelyNotNull(inner)) => {
                sub.nullability() == Nullability::NotNull
                    && self.check(sub, &Type::Simple((**inner).clone()), depth + 1)
            }
            (SimpleType::Intersection(intersection), _) => intersection
                .types()
                .iter()
                .any(|component| self.check(component, sup, depth + 1)),
            (_, SimpleType::Intersection(intersection)) => intersection
                .types()
                .iter()
                .all(|component| self.check(sub, component, depth + 1)),
            (SimpleType::TypeParameter(sub_param), SimpleType::TypeParameter(sup_param)) => {
                sub_param.id == sup_param.id
            }
            (SimpleType::Captured(captured), _) => {
                // A captured `out T` projection is usable wherever T is.
                match &captured.constructor.projection {
                    TypeProjection::Argument {
                        variance: Variance::Out | Variance::Invariant,
                        ty,
                    } => self.check(ty, sup, depth + 1),
                    _ => sup.is_any(),
                }
            }
            (SimpleType::Class(_), _) if sub.is_nothing() => true,
            (SimpleType::Class(sub_class), SimpleType::Class(sup_class)) => {
                if sup.is_any() {
                    return true;
                }
                if sub_class.tag.class_id() == sup_class.tag.class_id() {
                    return self.arguments_compatible(sub_class, sup_class, depth);
                }
                // Walk the declared supertypes, substituted at this use.
                let supertypes =
                    supertypes_of_class_type(&self.session, sub_class, sub.nullability());
                supertypes
                    .iter()
                    .any(|supertype| self.check(supertype, sup, depth + 1))
            }
            _ => false,
        }
    }

    fn arguments_compatible(
        &self,
        sub: &tarn_types::ClassType,
        sup: &tarn_types::ClassType,
        depth: usize,
    ) -> bool {
        if sub.arguments.len() != sup.arguments.len() {
            return false;
        }
        sub.arguments.iter().zip(&sup.arguments).all(|(s, t)| {
            match (s, t) {
                // A star on the supertype side accepts any argument.
                (_, TypeProjection::Star) => true,
                (TypeProjection::Star, _) => false,
                (
                    TypeProjection::Argument { ty: sub_ty, .. },
                    TypeProjection::Argument {
                        variance: sup_variance,
                        ty: sup_ty,
                    },
                ) => match sup_variance {
                    Variance::Invariant => sub_ty == sup_ty,
                    Variance::Out => self.check(sub_ty, sup_ty, depth + 1),
                    Variance::In => self.check(sup_ty, sub_ty, depth + 1),
                },
            }
        })
    }
}

impl TypeRelation for SubtypeChecker {
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        self.check(sub, sup, 0)
    }
}

/// Relation that only accepts structurally equal types (plus the error-type
/// escape hatch). Used where no session is available.
pub struct StructuralRelation;

impl TypeRelation for StructuralRelation {
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        sub == sup || sub.is_error() || sup.is_error() || sub.is_nothing() || sup.is_any()
    }
}
