//! Type attributes: an extensible tag bag riding on every type instance.

use bitflags::bitflags;

bitflags! {
    /// Compiler-understood attributes attached to a type. Attribute sets are
    /// immutable values; `add`/`intersect` return new sets.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TypeAttributes: u8 {
        /// The type came from a raw (unparameterized) foreign generic.
        const RAW_TYPE = 1 << 0;
        /// Nullability was enhanced from foreign annotations.
        const ENHANCED_NULLABILITY = 1 << 1;
        /// Inference must not use this position as an inference site.
        const NO_INFER = 1 << 2;
        /// Function type with an extension receiver.
        const EXTENSION_FUNCTION = 1 << 3;
        /// Type-parameter use opted out of variance conflict checking.
        const UNSAFE_VARIANCE = 1 << 4;
    }
}

impl TypeAttributes {
    /// Attributes common to both sets. This is the merge used when building
    /// an intersection type's attributes from its components.
    pub fn intersect_with(self, other: TypeAttributes) -> TypeAttributes {
        self & other
    }

    /// This set plus `attribute`.
    pub fn add(self, attribute: TypeAttributes) -> TypeAttributes {
        self | attribute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_keeps_only_common_attributes() {
        let a = TypeAttributes::RAW_TYPE | TypeAttributes::NO_INFER;
        let b = TypeAttributes::RAW_TYPE | TypeAttributes::ENHANCED_NULLABILITY;
        assert_eq!(a.intersect_with(b), TypeAttributes::RAW_TYPE);
    }

    #[test]
    fn add_and_contains() {
        let attrs = TypeAttributes::empty().add(TypeAttributes::EXTENSION_FUNCTION);
        assert!(attrs.contains(TypeAttributes::EXTENSION_FUNCTION));
        assert!(!attrs.contains(TypeAttributes::RAW_TYPE));
    }
}
