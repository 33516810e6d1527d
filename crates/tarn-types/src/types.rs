//! The sealed type hierarchy.
//!
//! Types are immutable values; "mutation" is always copy-with-replacement.
//! Most variants compare structurally, but three deliberately do not:
//! flexible types compare by bounds alone, captured types compare by
//! constructor identity plus projection, and error types compare by
//! instance identity. Keep that in mind before reaching for `==`.

use crate::attributes::TypeAttributes;
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tarn_common::{ClassId, Name, Variance};

/// Nullability of a type position. The order is from most nullable to least,
/// so `max` over a set of intersected types yields the strictest member (an
/// intersection with one not-null component is effectively not-null).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Nullability {
    Nullable,
    Unknown,
    NotNull,
}

impl Nullability {
    pub fn is_nullable(self) -> bool {
        matches!(self, Nullability::Nullable)
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Nullability::Nullable => "?",
            Nullability::Unknown => "!",
            Nullability::NotNull => "",
        }
    }
}

/// Lazy reference to a class-like declaration by qualified id. Deliberately
/// not an eager link: the referent may not be resolved yet (forward
/// references, cyclic supertypes), so consumers go through a symbol provider
/// to materialize it on demand.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LookupTag {
    class_id: ClassId,
}

impl LookupTag {
    pub fn new(class_id: ClassId) -> Self {
        LookupTag { class_id }
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }
}

/// Identity of a type-parameter declaration, allocated by the symbol arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParameterId(pub u32);

/// One type argument: either a star projection or a type with a use-site
/// variance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeProjection {
    Star,
    Argument { variance: Variance, ty: Box<Type> },
}

impl TypeProjection {
    pub fn invariant(ty: Type) -> Self {
        TypeProjection::Argument {
            variance: Variance::Invariant,
            ty: Box::new(ty),
        }
    }

    pub fn out(ty: Type) -> Self {
        TypeProjection::Argument {
            variance: Variance::Out,
            ty: Box::new(ty),
        }
    }

    pub fn in_(ty: Type) -> Self {
        TypeProjection::Argument {
            variance: Variance::In,
            ty: Box::new(ty),
        }
    }

    pub fn ty(&self) -> Option<&Type> {
        match self {
            TypeProjection::Star => None,
            TypeProjection::Argument { ty, .. } => Some(&**ty),
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, TypeProjection::Star)
    }
}

pub type TypeArguments = SmallVec<[TypeProjection; 2]>;

/// A class-like type: lookup tag, arguments, nullability, attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub tag: LookupTag,
    pub arguments: TypeArguments,
    pub nullability: Nullability,
    pub attributes: TypeAttributes,
}

impl ClassType {
    pub fn new(tag: LookupTag, arguments: Vec<TypeProjection>, nullability: Nullability) -> Self {
        ClassType {
            tag,
            arguments: arguments.into(),
            nullability,
            attributes: TypeAttributes::empty(),
        }
    }

    pub fn with_attributes(mut self, attributes: TypeAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// A use of a type parameter as a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParameterType {
    pub id: TypeParameterId,
    pub name: Name,
    pub nullability: Nullability,
    pub attributes: TypeAttributes,
}

impl TypeParameterType {
    pub fn new(id: TypeParameterId, name: Name) -> Self {
        TypeParameterType {
            id,
            name,
            nullability: Nullability::NotNull,
            attributes: TypeAttributes::empty(),
        }
    }
}

/// Why a type was captured.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CaptureStatus {
    ForSubtyping,
    FromExpression,
    ForApproximation,
}

/// Constructor of a captured type: the source projection, lazily computed
/// supertypes, and an optional identity used to merge captures that
/// originate from the same projection instance.
#[derive(Debug)]
pub struct CapturedTypeConstructor {
    pub projection: TypeProjection,
    pub type_parameter: Option<TypeParameterId>,
    identity: Option<Arc<CapturedTypeConstructor>>,
    supertypes: OnceLock<Vec<Type>>,
}

impl CapturedTypeConstructor {
    pub fn new(
        projection: TypeProjection,
        type_parameter: Option<TypeParameterId>,
        identity: Option<Arc<CapturedTypeConstructor>>,
    ) -> Arc<Self> {
        // Unwrap transitive identity so chains collapse to the origin.
        let identity = identity.map(|outer| match &outer.identity {
            Some(origin) => Arc::clone(origin),
            None => outer,
        });
        if let Some(identity) = &identity {
            assert!(
                identity.identity.is_none(),
                "captured type identity must not itself carry an external identity"
            );
        }
        Arc::new(CapturedTypeConstructor {
            projection,
            type_parameter,
            identity,
            supertypes: OnceLock::new(),
        })
    }

    pub fn identity(&self) -> Option<&Arc<CapturedTypeConstructor>> {
        self.identity.as_ref()
    }

    pub fn supertypes(&self) -> Option<&[Type]> {
        self.supertypes.get().map(Vec::as_slice)
    }

    /// Fill in the computed supertypes. At most once; later calls are
    /// ignored (first writer wins, matching the once-computed cache rule).
    pub fn init_supertypes(&self, supertypes: Vec<Type>) {
        let _ = self.supertypes.set(supertypes);
    }
}

/// A captured type projection.
#[derive(Clone, Debug)]
pub struct CapturedType {
    pub status: CaptureStatus,
    pub constructor: Arc<CapturedTypeConstructor>,
    pub lower_type: Option<Box<Type>>,
    pub nullability: Nullability,
    pub attributes: TypeAttributes,
}

impl CapturedType {
    pub fn new(status: CaptureStatus, constructor: Arc<CapturedTypeConstructor>) -> Self {
        CapturedType {
            status,
            constructor,
            lower_type: None,
            nullability: Nullability::NotNull,
            attributes: TypeAttributes::empty(),
        }
    }

    fn constructors_equal(a: &Arc<CapturedTypeConstructor>, b: &Arc<CapturedTypeConstructor>) -> bool {
        if Arc::ptr_eq(a, b) {
            return true;
        }
        // Merging captures from the same projection instance: both must
        // carry the same identity object, then compare structurally.
        match (a.identity(), b.identity()) {
            (Some(ia), Some(ib)) if Arc::ptr_eq(ia, ib) => {
                a.projection == b.projection && a.type_parameter == b.type_parameter
            }
            _ => false,
        }
    }
}

impl PartialEq for CapturedType {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.nullability == other.nullability
            && self.lower_type == other.lower_type
            && CapturedType::constructors_equal(&self.constructor, &other.constructor)
    }
}

impl Eq for CapturedType {}

impl std::hash::Hash for CapturedType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.status.hash(state);
        self.nullability.hash(state);
        self.constructor.projection.hash(state);
        self.constructor.type_parameter.hash(state);
    }
}

/// Intersection type: a non-empty, flat component list. Never nested — use
/// [`crate::intersect_types`] to build one, which maintains the invariant.
#[derive(Clone, Debug)]
pub struct IntersectionType {
    types: Arc<[Type]>,
    /// Explicit upper bound recorded when the natural common supertype would
    /// violate an outstanding constraint; used by approximation.
    pub upper_bound_for_approximation: Option<Box<Type>>,
}

impl IntersectionType {
    pub fn new(types: Vec<Type>, upper_bound_for_approximation: Option<Type>) -> Self {
        assert!(!types.is_empty(), "intersection type with no components");
        for ty in &types {
            assert!(
                !matches!(ty, Type::Simple(SimpleType::Intersection(_))),
                "intersection types must be flat; intersect the components instead"
            );
        }
        IntersectionType {
            types: types.into(),
            upper_bound_for_approximation: upper_bound_for_approximation.map(Box::new),
        }
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn effective_nullability(&self) -> Nullability {
        self.types
            .iter()
            .map(Type::nullability)
            .max()
            .expect("intersection type is never empty")
    }

    pub fn attributes(&self) -> TypeAttributes {
        let mut iter = self.types.iter().map(Type::attributes);
        let first = iter.next().expect("intersection type is never empty");
        iter.fold(first, TypeAttributes::intersect_with)
    }
}

impl PartialEq for IntersectionType {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl Eq for IntersectionType {}

impl std::hash::Hash for IntersectionType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.types.hash(state);
    }
}

static NEXT_ERROR_TYPE_ID: AtomicU64 = AtomicU64::new(0);

/// Type standing in for an unresolvable or ill-formed position. Carries its
/// diagnostic and an optional delegated fallback for graceful degradation.
/// Identity equality: two error types are only equal if one is a clone of
/// the other.
#[derive(Clone, Debug)]
pub struct ErrorType {
    id: u64,
    pub diagnostic: String,
    pub delegated: Option<Box<Type>>,
}

impl ErrorType {
    pub fn new(diagnostic: impl Into<String>) -> Self {
        ErrorType {
            id: NEXT_ERROR_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            diagnostic: diagnostic.into(),
            delegated: None,
        }
    }

    pub fn with_delegate(diagnostic: impl Into<String>, delegated: Type) -> Self {
        ErrorType {
            id: NEXT_ERROR_TYPE_ID.fetch_add(1, Ordering::Relaxed),
            diagnostic: diagnostic.into(),
            delegated: Some(Box::new(delegated)),
        }
    }
}

impl PartialEq for ErrorType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ErrorType {}

impl std::hash::Hash for ErrorType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A rigid (non-flexible) type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleType {
    Class(ClassType),
    TypeParameter(TypeParameterType),
    Captured(CapturedType),
    DefinitelyNotNull(Box<SimpleType>),
    Intersection(IntersectionType),
    Error(ErrorType),
}

impl SimpleType {
    pub fn nullability(&self) -> Nullability {
        match self {
            SimpleType::Class(class) => class.nullability,
            SimpleType::TypeParameter(param) => param.nullability,
            SimpleType::Captured(captured) => captured.nullability,
            SimpleType::DefinitelyNotNull(_) => Nullability::NotNull,
            SimpleType::Intersection(_) => Nullability::NotNull,
            SimpleType::Error(_) => Nullability::Unknown,
        }
    }

    pub fn attributes(&self) -> TypeAttributes {
        match self {
            SimpleType::Class(class) => class.attributes,
            SimpleType::TypeParameter(param) => param.attributes,
            SimpleType::Captured(captured) => captured.attributes,
            SimpleType::DefinitelyNotNull(inner) => inner.attributes(),
            SimpleType::Intersection(intersection) => intersection.attributes(),
            SimpleType::Error(_) => TypeAttributes::empty(),
        }
    }

    pub fn is_class_like(&self) -> bool {
        matches!(self, SimpleType::Class(_) | SimpleType::Error(_))
    }

    /// Strip one definitely-not-null wrapper, if present.
    pub fn unwrap_definitely_not_null(&self) -> &SimpleType {
        match self {
            SimpleType::DefinitelyNotNull(inner) => inner,
            other => other,
        }
    }

    /// Wrap in a definitely-not-null type unless that would be a no-op.
    pub fn make_definitely_not_null(self) -> SimpleType {
        match self {
            already @ SimpleType::DefinitelyNotNull(_) => already,
            SimpleType::Class(class) if class.nullability == Nullability::NotNull => {
                SimpleType::Class(class)
            }
            other => SimpleType::DefinitelyNotNull(Box::new(other)),
        }
    }

    pub fn with_nullability(self, nullability: Nullability) -> SimpleType {
        match self {
            SimpleType::Class(mut class) => {
                class.nullability = nullability;
                SimpleType::Class(class)
            }
            SimpleType::TypeParameter(mut param) => {
                param.nullability = nullability;
                SimpleType::TypeParameter(param)
            }
            SimpleType::Captured(mut captured) => {
                captured.nullability = nullability;
                SimpleType::Captured(captured)
            }
            SimpleType::DefinitelyNotNull(inner) if nullability == Nullability::NotNull => {
                SimpleType::DefinitelyNotNull(inner)
            }
            SimpleType::DefinitelyNotNull(inner) => inner.with_nullability(nullability),
            // Intersections and errors keep their intrinsic nullability.
            other @ (SimpleType::Intersection(_) | SimpleType::Error(_)) => other,
        }
    }
}

/// Why a flexible type is flexible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FlexibilityFlavor {
    /// Ordinary platform type from a foreign declaration.
    Platform,
    /// The dynamic type.
    Dynamic,
    /// Raw use of a foreign generic.
    Raw,
}

/// A lower/upper bound pair reconciling differing nullability information.
/// Equality and hashing look at the bounds only; the flavor is a provenance
/// tag (two flavors over identical bounds denote the same type).
#[derive(Clone, Debug)]
pub struct FlexibleType {
    pub lower: Box<SimpleType>,
    pub upper: Box<SimpleType>,
    pub flavor: FlexibilityFlavor,
}

impl FlexibleType {
    pub fn platform(lower: SimpleType, upper: SimpleType) -> Self {
        FlexibleType {
            lower: Box::new(lower),
            upper: Box::new(upper),
            flavor: FlexibilityFlavor::Platform,
        }
    }

    /// The dynamic type, `Nothing..Any?`.
    pub fn dynamic() -> Self {
        let lower = match crate::builtins::nothing_type() {
            Type::Simple(simple) => simple,
            Type::Flexible(_) => unreachable!("builtin Nothing is simple"),
        };
        let upper = match crate::builtins::nullable_any_type() {
            Type::Simple(simple) => simple,
            Type::Flexible(_) => unreachable!("builtin Any is simple"),
        };
        FlexibleType {
            lower: Box::new(lower),
            upper: Box::new(upper),
            flavor: FlexibilityFlavor::Dynamic,
        }
    }

    /// Raw type over class-like bounds. Panics on non-class-like bounds:
    /// that is a builder bug, not user input.
    pub fn raw(lower: SimpleType, upper: SimpleType) -> Self {
        assert!(
            lower.is_class_like() && upper.is_class_like(),
            "raw bounds must be class-like types, but {lower:?} and {upper:?} were found"
        );
        let lower = match lower {
            SimpleType::Class(class) => {
                let attributes = class.attributes.add(TypeAttributes::RAW_TYPE);
                SimpleType::Class(class.with_attributes(attributes))
            }
            other => other,
        };
        FlexibleType {
            lower: Box::new(lower),
            upper: Box::new(upper),
            flavor: FlexibilityFlavor::Raw,
        }
    }

    /// Nullability collapses to `Unknown` when the bounds disagree.
    pub fn nullability(&self) -> Nullability {
        let lower = self.lower.nullability();
        if lower == self.upper.nullability() {
            lower
        } else {
            Nullability::Unknown
        }
    }

    pub fn is_dynamic(&self) -> bool {
        self.flavor == FlexibilityFlavor::Dynamic
    }
}

impl PartialEq for FlexibleType {
    fn eq(&self, other: &Self) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }
}

impl Eq for FlexibleType {}

impl std::hash::Hash for FlexibleType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
        self.upper.hash(state);
    }
}

/// Any Tarn type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Simple(SimpleType),
    Flexible(FlexibleType),
}

impl Type {
    pub fn class(tag: LookupTag, arguments: Vec<TypeProjection>, nullability: Nullability) -> Type {
        Type::Simple(SimpleType::Class(ClassType::new(tag, arguments, nullability)))
    }

    pub fn class_by_id(id: ClassId, nullability: Nullability) -> Type {
        Type::class(LookupTag::new(id), Vec::new(), nullability)
    }

    pub fn type_parameter(id: TypeParameterId, name: Name) -> Type {
        Type::Simple(SimpleType::TypeParameter(TypeParameterType::new(id, name)))
    }

    pub fn error(diagnostic: impl Into<String>) -> Type {
        Type::Simple(SimpleType::Error(ErrorType::new(diagnostic)))
    }

    pub fn nullability(&self) -> Nullability {
        match self {
            Type::Simple(simple) => simple.nullability(),
            Type::Flexible(flexible) => flexible.nullability(),
        }
    }

    pub fn attributes(&self) -> TypeAttributes {
        match self {
            Type::Simple(simple) => simple.attributes(),
            Type::Flexible(flexible) => flexible.lower.attributes(),
        }
    }

    /// Type arguments; the flexible case delegates to the lower bound.
    pub fn arguments(&self) -> &[TypeProjection] {
        match self.lower_bound_if_flexible() {
            SimpleType::Class(class) => &class.arguments,
            _ => &[],
        }
    }

    /// Self for simple types, the lower bound for flexible ones.
    pub fn lower_bound_if_flexible(&self) -> &SimpleType {
        match self {
            Type::Simple(simple) => simple,
            Type::Flexible(flexible) => &flexible.lower,
        }
    }

    pub fn upper_bound_if_flexible(&self) -> &SimpleType {
        match self {
            Type::Simple(simple) => simple,
            Type::Flexible(flexible) => &flexible.upper,
        }
    }

    pub fn unwrap_flexible_and_definitely_not_null(&self) -> &SimpleType {
        self.lower_bound_if_flexible().unwrap_definitely_not_null()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Simple(SimpleType::Error(_)))
    }

    /// Recursively look for an error type anywhere in this type.
    pub fn contains_error(&self) -> bool {
        self.contains(&mut |ty| ty.is_error())
    }

    /// Depth-first search over this type and its components/arguments.
    pub fn contains(&self, predicate: &mut dyn FnMut(&Type) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        match self {
            Type::Simple(SimpleType::Class(class)) => class
                .arguments
                .iter()
                .filter_map(TypeProjection::ty)
                .any(|arg| arg.contains(predicate)),
            Type::Simple(SimpleType::DefinitelyNotNull(inner)) => {
                Type::Simple((**inner).clone()).contains(predicate)
            }
            Type::Simple(SimpleType::Intersection(intersection)) => intersection
                .types()
                .iter()
                .any(|component| component.contains(predicate)),
            Type::Simple(SimpleType::Captured(captured)) => captured
                .constructor
                .projection
                .ty()
                .is_some_and(|projected| projected.contains(predicate)),
            Type::Simple(SimpleType::TypeParameter(_) | SimpleType::Error(_)) => false,
            Type::Flexible(flexible) => {
                Type::Simple((*flexible.lower).clone()).contains(predicate)
                    || Type::Simple((*flexible.upper).clone()).contains(predicate)
            }
        }
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        match self.lower_bound_if_flexible() {
            SimpleType::Class(class) => Some(class.tag.class_id()),
            _ => None,
        }
    }

    pub fn is_unit(&self) -> bool {
        self.class_id() == Some(&*crate::builtins::UNIT) && !self.nullability().is_nullable()
    }

    pub fn is_nothing(&self) -> bool {
        self.class_id() == Some(&*crate::builtins::NOTHING)
    }

    pub fn is_any(&self) -> bool {
        self.class_id() == Some(&*crate::builtins::ANY)
    }

    pub fn with_nullability(self, nullability: Nullability) -> Type {
        match self {
            Type::Simple(simple) => Type::Simple(simple.with_nullability(nullability)),
            Type::Flexible(flexible) => Type::Flexible(FlexibleType {
                lower: Box::new(flexible.lower.with_nullability(nullability)),
                upper: Box::new(flexible.upper.with_nullability(nullability)),
                flavor: flexible.flavor,
            }),
        }
    }

    /// Copy with the attribute set replaced. Only class-like and
    /// type-parameter positions carry their own attributes; other variants
    /// are returned unchanged.
    pub fn with_attributes(self, attributes: TypeAttributes) -> Type {
        match self {
            Type::Simple(SimpleType::Class(class)) => {
                Type::Simple(SimpleType::Class(class.with_attributes(attributes)))
            }
            Type::Simple(SimpleType::TypeParameter(mut param)) => {
                param.attributes = attributes;
                Type::Simple(SimpleType::TypeParameter(param))
            }
            Type::Simple(SimpleType::Captured(mut captured)) => {
                captured.attributes = attributes;
                Type::Simple(SimpleType::Captured(captured))
            }
            other => other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Simple(simple) => write!(f, "{simple}"),
            Type::Flexible(flexible) if flexible.is_dynamic() => f.write_str("dynamic"),
            Type::Flexible(flexible) => {
                write!(f, "{}..{}", flexible.lower, flexible.upper)
            }
        }
    }
}

impl fmt::Display for SimpleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimpleType::Class(class) => {
                write!(f, "{}", class.tag.class_id().short_name())?;
                if !class.arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in class.arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        match arg {
                            TypeProjection::Star => f.write_str("*")?,
                            TypeProjection::Argument { variance, ty } => {
                                let label = variance.label();
                                if !label.is_empty() {
                                    write!(f, "{label} ")?;
                                }
                                write!(f, "{ty}")?;
                            }
                        }
                    }
                    f.write_str(">")?;
                }
                f.write_str(class.nullability.suffix())
            }
            SimpleType::TypeParameter(param) => {
                write!(f, "{}{}", param.name, param.nullability.suffix())
            }
            SimpleType::Captured(captured) => match &captured.constructor.projection {
                TypeProjection::Star => f.write_str("CapturedType(*)"),
                TypeProjection::Argument { variance, ty } => {
                    let label = variance.label();
                    if label.is_empty() {
                        write!(f, "CapturedType({ty})")
                    } else {
                        write!(f, "CapturedType({label} {ty})")
                    }
                }
            },
            SimpleType::DefinitelyNotNull(inner) => write!(f, "{inner} & Any"),
            SimpleType::Intersection(intersection) => {
                for (i, component) in intersection.types().iter().enumerate() {
                    if i > 0 {
                        f.write_str(" & ")?;
                    }
                    write!(f, "{component}")?;
                }
                Ok(())
            }
            SimpleType::Error(error) => write!(f, "ERROR({})", error.diagnostic),
        }
    }
}

/// Build an intersection of `types`, flattening nested intersections and
/// deduplicating components. A single remaining component is returned as
/// itself.
pub fn intersect_types(types: Vec<Type>) -> Type {
    assert!(!types.is_empty(), "cannot intersect zero types");
    let mut flat: Vec<Type> = Vec::with_capacity(types.len());
    for ty in types {
        match ty {
            Type::Simple(SimpleType::Intersection(intersection)) => {
                for component in intersection.types() {
                    if !flat.contains(component) {
                        flat.push(component.clone());
                    }
                }
            }
            other => {
                if !flat.contains(&other) {
                    flat.push(other);
                }
            }
        }
    }
    if flat.len() == 1 {
        return flat.into_iter().next().expect("one component");
    }
    Type::Simple(SimpleType::Intersection(IntersectionType::new(flat, None)))
}
