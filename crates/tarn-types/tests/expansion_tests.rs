use rustc_hash::FxHashMap;
use tarn_common::{ClassId, Name, PackageFqName};
use tarn_types::{
    AliasExpansion, LookupTag, Nullability, SimpleType, Type, TypeAliasExpander, TypeParameterId,
    TypeProjection, TypeSubstitutor, builtins, fully_expanded_type,
};

struct TableExpander {
    aliases: FxHashMap<ClassId, AliasExpansion>,
}

impl TableExpander {
    fn new() -> Self {
        TableExpander {
            aliases: FxHashMap::default(),
        }
    }

    fn alias(mut self, id: ClassId, params: Vec<TypeParameterId>, expanded: Type) -> Self {
        self.aliases.insert(
            id,
            AliasExpansion {
                type_params: params,
                expanded,
            },
        );
        self
    }
}

impl TypeAliasExpander for TableExpander {
    fn expand_alias(&self, id: &ClassId) -> Option<AliasExpansion> {
        self.aliases.get(id).cloned()
    }
}

fn id(name: &str) -> ClassId {
    ClassId::top_level(PackageFqName::new("demo"), Name::new(name))
}

fn use_of(class_id: ClassId) -> Type {
    Type::class_by_id(class_id, Nullability::NotNull)
}

#[test]
fn non_alias_type_expands_to_itself() {
    let expander = TableExpander::new();
    let ty = builtins::int_type();
    assert_eq!(fully_expanded_type(&ty, &expander), ty);
}

#[test]
fn alias_chain_expands_to_the_eventual_class() {
    // A = B, B = Int
    let expander = TableExpander::new()
        .alias(id("A"), vec![], use_of(id("B")))
        .alias(id("B"), vec![], builtins::int_type());
    let expanded = fully_expanded_type(&use_of(id("A")), &expander);
    assert_eq!(expanded, builtins::int_type());
}

#[test]
fn expansion_is_idempotent() {
    let expander = TableExpander::new().alias(id("A"), vec![], builtins::string_type());
    let once = fully_expanded_type(&use_of(id("A")), &expander);
    let twice = fully_expanded_type(&once, &expander);
    assert_eq!(once, twice);
}

#[test]
fn generic_alias_substitutes_its_arguments() {
    // Wrapped<T> = Box<T>; Wrapped<Int> must expand to Box<Int>.
    let param = TypeParameterId(7);
    let box_of_t = Type::class(
        LookupTag::new(id("Box")),
        vec![TypeProjection::invariant(Type::type_parameter(
            param,
            Name::new("T"),
        ))],
        Nullability::NotNull,
    );
    let expander = TableExpander::new().alias(id("Wrapped"), vec![param], box_of_t);

    let use_site = Type::class(
        LookupTag::new(id("Wrapped")),
        vec![TypeProjection::invariant(builtins::int_type())],
        Nullability::NotNull,
    );
    let expanded = fully_expanded_type(&use_site, &expander);
    assert_eq!(expanded.class_id(), Some(&id("Box")));
    assert_eq!(
        expanded.arguments(),
        &[TypeProjection::invariant(builtins::int_type())]
    );
}

#[test]
fn nullable_alias_use_stays_nullable() {
    let expander = TableExpander::new().alias(id("A"), vec![], builtins::string_type());
    let use_site = Type::class_by_id(id("A"), Nullability::Nullable);
    let expanded = fully_expanded_type(&use_site, &expander);
    assert_eq!(expanded.nullability(), Nullability::Nullable);
}

#[test]
fn self_referential_alias_fails_explicitly() {
    let expander = TableExpander::new().alias(id("Loop"), vec![], use_of(id("Loop")));
    let expanded = fully_expanded_type(&use_of(id("Loop")), &expander);
    assert!(expanded.is_error(), "cycle must surface, not spin");
    match expanded {
        Type::Simple(SimpleType::Error(error)) => {
            assert!(error.diagnostic.contains("recursive type alias"));
        }
        other => panic!("expected an error type, got {other}"),
    }
}

#[test]
fn mutually_recursive_aliases_fail_explicitly() {
    let expander = TableExpander::new()
        .alias(id("A"), vec![], use_of(id("B")))
        .alias(id("B"), vec![], use_of(id("A")));
    assert!(fully_expanded_type(&use_of(id("A")), &expander).is_error());
}

#[test]
fn substitutor_replaces_parameters_structurally() {
    let param = TypeParameterId(3);
    let mut substitutor = TypeSubstitutor::empty();
    substitutor.bind(param, builtins::string_type());

    let list_of_t = Type::class(
        LookupTag::new(id("List")),
        vec![TypeProjection::out(Type::type_parameter(
            param,
            Name::new("T"),
        ))],
        Nullability::NotNull,
    );
    let substituted = substitutor.substitute(&list_of_t);
    assert_eq!(
        substituted.arguments(),
        &[TypeProjection::out(builtins::string_type())]
    );
}

#[test]
fn nullable_parameter_use_keeps_nullability_after_substitution() {
    let param = TypeParameterId(4);
    let mut substitutor = TypeSubstitutor::empty();
    substitutor.bind(param, builtins::int_type());

    let nullable_t =
        Type::type_parameter(param, Name::new("T")).with_nullability(Nullability::Nullable);
    let substituted = substitutor.substitute(&nullable_t);
    assert_eq!(substituted.nullability(), Nullability::Nullable);
}
