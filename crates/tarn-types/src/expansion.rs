//! Type-alias expansion.

use crate::substitution::substitutor_for_arguments;
use crate::types::{Nullability, SimpleType, Type, TypeParameterId};
use rustc_hash::FxHashSet;
use tarn_common::ClassId;
use tarn_common::limits::MAX_ALIAS_EXPANSION_DEPTH;
use tracing::trace;

/// Resolves a class id to its alias expansion, if the id names a type alias.
/// Implemented by the session's symbol surface.
pub trait TypeAliasExpander {
    fn expand_alias(&self, id: &ClassId) -> Option<AliasExpansion>;
}

/// One step of alias indirection: the alias's own type parameters, in
/// declaration order, and the type it abbreviates.
#[derive(Clone, Debug)]
pub struct AliasExpansion {
    pub type_params: Vec<TypeParameterId>,
    pub expanded: Type,
}

/// Follow type-alias indirection until a non-alias class-like type remains.
///
/// Expansion is top-level: arguments of the result are expanded on demand by
/// their own consumers. A use-site `?` survives expansion (the expansion of
/// a nullable alias use is nullable). A cyclic alias chain is detected via a
/// visited set and reported as an error type instead of looping; resolution
/// stays total.
pub fn fully_expanded_type(ty: &Type, expander: &dyn TypeAliasExpander) -> Type {
    let mut current = ty.clone();
    let mut visited: FxHashSet<ClassId> = FxHashSet::default();
    for _ in 0..MAX_ALIAS_EXPANSION_DEPTH {
        let class = match current.lower_bound_if_flexible() {
            SimpleType::Class(class) => class.clone(),
            _ => return current,
        };
        let id = class.tag.class_id();
        let Some(expansion) = expander.expand_alias(id) else {
            return current;
        };
        if !visited.insert(id.clone()) {
            return Type::error(format!("recursive type alias: {id}"));
        }
        trace!(alias = %id, "expanding type alias");
        let substitutor = substitutor_for_arguments(&expansion.type_params, &class.arguments);
        let mut next = substitutor.substitute(&expansion.expanded);
        if class.nullability == Nullability::Nullable {
            next = next.with_nullability(Nullability::Nullable);
        }
        if !class.attributes.is_empty() {
            let merged = next.attributes().add(class.attributes);
            next = next.with_attributes(merged);
        }
        current = next;
    }
    Type::error(format!(
        "type alias expansion exceeded {MAX_ALIAS_EXPANSION_DEPTH} steps"
    ))
}
