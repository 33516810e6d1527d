//! Type-parameter substitution.
//!
//! Shared by type-alias expansion and fake-override synthesis: both need to
//! push concrete arguments through a declaration's signature.

use crate::types::{
    CapturedType, ClassType, FlexibleType, SimpleType, Type, TypeParameterId, TypeProjection,
};
use rustc_hash::FxHashMap;

/// Maps type-parameter ids to replacement types. Projections substituting an
/// invariant use keep their use-site variance.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitutor {
    map: FxHashMap<TypeParameterId, Type>,
}

impl TypeSubstitutor {
    pub fn new(map: FxHashMap<TypeParameterId, Type>) -> Self {
        TypeSubstitutor { map }
    }

    pub fn empty() -> Self {
        TypeSubstitutor::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn bind(&mut self, param: TypeParameterId, ty: Type) {
        self.map.insert(param, ty);
    }

    pub fn substitute(&self, ty: &Type) -> Type {
        if self.map.is_empty() {
            return ty.clone();
        }
        match ty {
            Type::Simple(simple) => self.substitute_simple_spreading(simple),
            Type::Flexible(flexible) => Type::Flexible(FlexibleType {
                lower: Box::new(self.substitute_bound(&flexible.lower, true)),
                upper: Box::new(self.substitute_bound(&flexible.upper, false)),
                flavor: flexible.flavor,
            }),
        }
    }

    /// Substitute inside a simple type. If a type-parameter use is replaced
    /// by a flexible type, the flexibility spreads outward (the result is
    /// the whole replacement, not one of its bounds).
    fn substitute_simple_spreading(&self, simple: &SimpleType) -> Type {
        match simple {
            SimpleType::TypeParameter(param) => match self.map.get(&param.id) {
                Some(replacement) => {
                    // The use-site nullability wins when it is nullable: a
                    // `T?` position stays nullable whatever T becomes.
                    if param.nullability.is_nullable() {
                        replacement
                            .clone()
                            .with_nullability(crate::types::Nullability::Nullable)
                    } else {
                        replacement.clone()
                    }
                }
                None => Type::Simple(simple.clone()),
            },
            SimpleType::Class(class) => Type::Simple(SimpleType::Class(ClassType {
                tag: class.tag.clone(),
                arguments: class
                    .arguments
                    .iter()
                    .map(|arg| self.substitute_projection(arg))
                    .collect(),
                nullability: class.nullability,
                attributes: class.attributes,
            })),
            SimpleType::DefinitelyNotNull(inner) => {
                match self.substitute_simple_spreading(inner) {
                    Type::Simple(substituted) => {
                        Type::Simple(substituted.make_definitely_not_null())
                    }
                    // A definitely-not-null position takes the lower bound
                    // of a flexible replacement; that bound is already the
                    // non-null view.
                    Type::Flexible(flexible) => {
                        Type::Simple(flexible.lower.clone().make_definitely_not_null())
                    }
                }
            }
            SimpleType::Intersection(intersection) => {
                let components = intersection
                    .types()
                    .iter()
                    .map(|component| self.substitute(component))
                    .collect();
                crate::types::intersect_types(components)
            }
            SimpleType::Captured(captured) => {
                // Captured types keep their constructor identity; only the
                // stored lower type is substituted.
                let lower_type = captured
                    .lower_type
                    .as_ref()
                    .map(|lower| Box::new(self.substitute(lower)));
                Type::Simple(SimpleType::Captured(CapturedType {
                    status: captured.status,
                    constructor: captured.constructor.clone(),
                    lower_type,
                    nullability: captured.nullability,
                    attributes: captured.attributes,
                }))
            }
            SimpleType::Error(_) => Type::Simple(simple.clone()),
        }
    }

    /// Substitute a flexible bound, projecting flexible replacements back to
    /// the matching bound so the result stays simple.
    fn substitute_bound(&self, bound: &SimpleType, lower: bool) -> SimpleType {
        match self.substitute_simple_spreading(bound) {
            Type::Simple(simple) => simple,
            Type::Flexible(flexible) => {
                if lower {
                    *flexible.lower
                } else {
                    *flexible.upper
                }
            }
        }
    }

    pub fn substitute_projection(&self, projection: &TypeProjection) -> TypeProjection {
        match projection {
            TypeProjection::Star => TypeProjection::Star,
            TypeProjection::Argument { variance, ty } => TypeProjection::Argument {
                variance: *variance,
                ty: Box::new(self.substitute(ty)),
            },
        }
    }
}

/// Substitutor binding `params[i]` to `arguments[i]`. Star projections bind
/// the parameter to nullable Any (its implicit upper view); variance
/// projections bind the projected type.
pub fn substitutor_for_arguments(
    params: &[TypeParameterId],
    arguments: &[TypeProjection],
) -> TypeSubstitutor {
    let mut substitutor = TypeSubstitutor::empty();
    for (param, argument) in params.iter().zip(arguments) {
        let ty = match argument {
            TypeProjection::Star => crate::builtins::nullable_any_type(),
            TypeProjection::Argument { ty, .. } => (**ty).clone(),
        };
        substitutor.bind(*param, ty);
    }
    substitutor
}
