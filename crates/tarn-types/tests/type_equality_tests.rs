use tarn_common::{ClassId, Name, PackageFqName};
use tarn_types::{
    CaptureStatus, CapturedType, CapturedTypeConstructor, ErrorType, FlexibleType, IntersectionType,
    LookupTag, Nullability, SimpleType, Type, TypeAttributes, TypeParameterId, TypeProjection,
    builtins, intersect_types,
};

fn class(name: &str, nullability: Nullability) -> SimpleType {
    let id = ClassId::top_level(PackageFqName::new("demo"), Name::new(name));
    SimpleType::Class(tarn_types::ClassType::new(
        LookupTag::new(id),
        Vec::new(),
        nullability,
    ))
}

#[test]
fn flexible_nullability_collapses_on_disagreement() {
    let agreeing = FlexibleType::platform(
        class("Foo", Nullability::NotNull),
        class("Foo", Nullability::NotNull),
    );
    assert_eq!(agreeing.nullability(), Nullability::NotNull);

    let disagreeing = FlexibleType::platform(
        class("Foo", Nullability::NotNull),
        class("Foo", Nullability::Nullable),
    );
    assert_eq!(disagreeing.nullability(), Nullability::Unknown);
}

#[test]
fn flexible_types_compare_by_bounds() {
    let a = FlexibleType::platform(
        class("Foo", Nullability::NotNull),
        class("Foo", Nullability::Nullable),
    );
    let b = FlexibleType::platform(
        class("Foo", Nullability::NotNull),
        class("Foo", Nullability::Nullable),
    );
    assert_eq!(a, b);
}

#[test]
fn flexible_type_delegates_to_lower_bound() {
    let id = ClassId::top_level(PackageFqName::new("demo"), Name::new("Box"));
    let arg = TypeProjection::invariant(builtins::int_type());
    let lower = SimpleType::Class(tarn_types::ClassType::new(
        LookupTag::new(id.clone()),
        vec![arg.clone()],
        Nullability::NotNull,
    ));
    let upper = SimpleType::Class(tarn_types::ClassType::new(
        LookupTag::new(id),
        vec![TypeProjection::Star],
        Nullability::Nullable,
    ));
    let flexible = Type::Flexible(FlexibleType::platform(lower, upper));
    assert_eq!(flexible.arguments(), &[arg]);
}

#[test]
fn dynamic_type_spans_nothing_to_nullable_any() {
    let dynamic = FlexibleType::dynamic();
    assert!(dynamic.is_dynamic());
    assert!(Type::Simple((*dynamic.lower).clone()).is_nothing());
    assert!(Type::Simple((*dynamic.upper).clone()).is_any());
    assert_eq!(Type::Flexible(dynamic).to_string(), "dynamic");
}

#[test]
fn raw_type_tags_lower_bound_and_requires_class_like_bounds() {
    let raw = FlexibleType::raw(
        class("Foo", Nullability::NotNull),
        class("Foo", Nullability::Nullable),
    );
    assert!(raw.lower.attributes().contains(TypeAttributes::RAW_TYPE));
}

#[test]
#[should_panic(expected = "class-like")]
fn raw_type_from_type_parameter_bound_panics() {
    let param = SimpleType::TypeParameter(tarn_types::TypeParameterType::new(
        TypeParameterId(0),
        Name::new("T"),
    ));
    let _ = FlexibleType::raw(param, class("Foo", Nullability::NotNull));
}

#[test]
fn error_types_compare_by_identity() {
    let a = Type::error("unresolved");
    let b = Type::error("unresolved");
    assert_ne!(a, b, "same message, distinct instances");
    assert_eq!(a, a.clone(), "a clone is the same instance");
}

#[test]
fn error_type_can_delegate() {
    let fallback = builtins::int_type();
    let error = ErrorType::with_delegate("inference failed", fallback.clone());
    assert_eq!(error.delegated.as_deref(), Some(&fallback));
}

#[test]
fn captured_types_compare_by_constructor_identity() {
    let projection = TypeProjection::out(builtins::string_type());
    let origin = CapturedTypeConstructor::new(projection.clone(), None, None);

    let merged_a = CapturedTypeConstructor::new(projection.clone(), None, Some(origin.clone()));
    let merged_b = CapturedTypeConstructor::new(projection.clone(), None, Some(origin.clone()));
    let unrelated = CapturedTypeConstructor::new(projection.clone(), None, None);

    let a = CapturedType::new(CaptureStatus::ForSubtyping, merged_a);
    let b = CapturedType::new(CaptureStatus::ForSubtyping, merged_b);
    let c = CapturedType::new(CaptureStatus::ForSubtyping, unrelated);

    assert_eq!(a, b, "same identity + same projection merge");
    assert_ne!(a, c, "no shared identity, no merge");
}

#[test]
fn captured_identity_unwraps_transitively() {
    let projection = TypeProjection::Star;
    let origin = CapturedTypeConstructor::new(projection.clone(), None, None);
    let level1 = CapturedTypeConstructor::new(projection.clone(), None, Some(origin.clone()));
    // Pointing at level1 must collapse to the origin rather than chain.
    let level2 = CapturedTypeConstructor::new(projection, None, Some(level1));
    assert!(std::sync::Arc::ptr_eq(
        level2.identity().expect("identity"),
        &origin
    ));
}

#[test]
fn captured_supertypes_initialize_at_most_once() {
    let ctor = CapturedTypeConstructor::new(TypeProjection::Star, None, None);
    assert!(ctor.supertypes().is_none());
    ctor.init_supertypes(vec![builtins::any_type()]);
    ctor.init_supertypes(vec![builtins::int_type()]);
    assert_eq!(ctor.supertypes(), Some(&[builtins::any_type()][..]));
}

#[test]
fn intersection_is_flat_and_deduplicated() {
    let nested = intersect_types(vec![builtins::int_type(), builtins::string_type()]);
    let flattened = intersect_types(vec![nested, builtins::int_type(), builtins::boolean_type()]);
    match &flattened {
        Type::Simple(SimpleType::Intersection(intersection)) => {
            assert_eq!(intersection.types().len(), 3);
        }
        other => panic!("expected an intersection, got {other}"),
    }
}

#[test]
fn intersection_of_one_collapses() {
    let single = intersect_types(vec![builtins::int_type(), builtins::int_type()]);
    assert_eq!(single, builtins::int_type());
}

#[test]
#[should_panic(expected = "flat")]
fn nested_intersection_construction_panics() {
    let inner = intersect_types(vec![builtins::int_type(), builtins::string_type()]);
    let _ = IntersectionType::new(vec![inner, builtins::boolean_type()], None);
}

#[test]
fn intersection_effective_nullability_is_strictest() {
    let nullable_string = builtins::string_type().with_nullability(Nullability::Nullable);
    let ty = intersect_types(vec![nullable_string, builtins::int_type()]);
    match ty {
        Type::Simple(SimpleType::Intersection(intersection)) => {
            // Declared nullability of an intersection is not-null; the
            // effective value is the max (strictest) over components.
            assert_eq!(intersection.effective_nullability(), Nullability::NotNull);
        }
        other => panic!("expected an intersection, got {other}"),
    }
}

#[test]
fn definitely_not_null_unwraps() {
    let param = SimpleType::TypeParameter(tarn_types::TypeParameterType::new(
        TypeParameterId(1),
        Name::new("T"),
    ));
    let dnn = param.clone().make_definitely_not_null();
    assert_eq!(dnn.nullability(), Nullability::NotNull);
    assert_eq!(dnn.unwrap_definitely_not_null(), &param);
    // Wrapping twice is a no-op.
    assert_eq!(dnn.clone().make_definitely_not_null(), dnn);
}

#[test]
fn lower_bound_if_flexible_returns_self_for_simple() {
    let simple = builtins::int_type();
    assert_eq!(
        simple.lower_bound_if_flexible(),
        simple.lower_bound_if_flexible()
    );
    let flexible = Type::Flexible(FlexibleType::platform(
        class("Foo", Nullability::NotNull),
        class("Foo", Nullability::Nullable),
    ));
    assert_eq!(
        flexible.lower_bound_if_flexible(),
        &class("Foo", Nullability::NotNull)
    );
}
