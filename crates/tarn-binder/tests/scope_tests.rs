//! Member-scope contracts: declared vs combined, fake-override synthesis,
//! substitution, and the at-most-once cache.

use std::sync::Arc;
use tarn_binder::{
    DeclId, DeclKind, DeclarationCell, DeclarationGraph, DeclarationGraphBuilder, GraphFile,
    GraphSymbolProvider, ModulePlatform, ModuleRegistry, ResolvePhase, ScopeProvider,
};
use tarn_common::{ClassId, ElementKind, FakeElementKind, FileId, Modality, Name, PackageFqName};
use tarn_syntax::{ClassKind, Modifiers, NodeIndex, SyntaxBuilder};
use tarn_types::{LookupTag, Nullability, Type, TypeProjection, builtins};

fn package() -> PackageFqName {
    PackageFqName::new("demo")
}

fn advance_to(cell: &DeclarationCell, phase: ResolvePhase) {
    while cell.phase() < phase {
        let next = cell.phase().next().expect("phase beyond last");
        cell.advance_phase(next);
    }
}

/// Test-local stand-in for the resolution engine: resolves the few type
/// positions these fixtures use and advances every declaration to
/// `TypesResolved`.
fn force_resolve(graph: &DeclarationGraph, resolve: impl Fn(DeclId, &DeclarationGraph)) {
    for id in graph.all_decl_ids() {
        resolve(id, graph);
    }
    for id in graph.all_decl_ids() {
        advance_to(&graph.cell(id), ResolvePhase::TypesResolved);
    }
}

struct Fixture {
    graph: Arc<DeclarationGraph>,
    file: GraphFile,
}

fn build_fixture(configure: impl FnOnce(&mut SyntaxBuilder) -> NodeIndex) -> Fixture {
    let graph = Arc::new(DeclarationGraph::new());
    let modules = ModuleRegistry::new();
    let module = modules.add_source_module("demo", ModulePlatform::Platform);
    modules.register_file(FileId(0), module);
    let mut b = SyntaxBuilder::new(FileId(0));
    let root = configure(&mut b);
    let arena = b.finish();
    let file = DeclarationGraphBuilder::build_file(&graph, module, &arena, root);
    Fixture { graph, file }
}

/// `open class Base { open val a: Int = 0 }` and `class Derived : Base()`.
fn base_derived() -> (Fixture, DeclId, DeclId) {
    let fixture = build_fixture(|b| {
        let int = b.simple_type("Int");
        let init = b.int_literal(0);
        let a = b.property(
            "a",
            false,
            Modifiers::default().with_modality(Modality::Open),
            int,
            init,
        );
        let base = b.class(
            "Base",
            ClassKind::Class,
            Modifiers::default().with_modality(Modality::Open),
            vec![],
            vec![],
            vec![a],
        );
        let base_ref = b.simple_type("Base");
        let derived = b.class(
            "Derived",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![base_ref],
            vec![],
        );
        b.source_file(package(), vec![base, derived])
    });
    let base = fixture.file.top_level[0];
    let derived = fixture.file.top_level[1];

    let base_type = Type::class_by_id(
        ClassId::top_level(package(), Name::new("Base")),
        Nullability::NotNull,
    );
    fixture.graph.cell(derived).write().supertypes = vec![base_type];
    force_resolve(&fixture.graph, |id, graph| {
        let cell = graph.cell(id);
        let decl = cell.read();
        if let DeclKind::Property(property) = &decl.kind {
            property.type_ref.resolve_to(builtins::int_type());
        }
    });
    (fixture, base, derived)
}

#[test]
fn combined_scope_contains_a_fake_override_for_inherited_member() {
    let (fixture, _base, derived) = base_derived();
    let graph = &fixture.graph;
    let provider = GraphSymbolProvider::new(Arc::clone(graph));
    let scopes = ScopeProvider::new();

    let derived_symbol = graph.cell(derived).symbol();
    let combined = scopes.combined_member_scope(graph, &provider, derived_symbol);
    let members = combined.callables_by_name(&Name::new("a"));
    assert_eq!(members.len(), 1);
    let member = &members[0];
    assert!(member.is_fake_override);
    assert_eq!(member.containing_class, derived_symbol);
    assert_eq!(member.signature.return_type, builtins::int_type());

    // The materialized node points back at the original and carries the
    // fake-override source kind.
    let fake_cell = graph.cell_of(member.symbol);
    let fake = fake_cell.read();
    assert_eq!(
        fake.source.kind(),
        ElementKind::Fake(FakeElementKind::FakeOverride)
    );
    assert_eq!(fake.containing_class, Some(derived_symbol));
    assert!(fake.is_fake_override());
    assert_eq!(fake_cell.phase(), ResolvePhase::BodyResolved);
}

#[test]
fn declared_scope_never_contains_fake_overrides() {
    let (fixture, base, derived) = base_derived();
    let graph = &fixture.graph;
    let provider = GraphSymbolProvider::new(Arc::clone(graph));
    let scopes = ScopeProvider::new();

    let derived_symbol = graph.cell(derived).symbol();
    // Materialize the combined scope first, so a fake override for `a`
    // exists in the graph; the declared scope must still not see it.
    let _ = scopes.combined_member_scope(graph, &provider, derived_symbol);
    let declared = scopes.declared_member_scope(graph, derived_symbol);
    assert!(declared.callables_by_name(&Name::new("a")).is_empty());
    assert!(declared.is_empty());

    let base_symbol = graph.cell(base).symbol();
    let base_declared = scopes.declared_member_scope(graph, base_symbol);
    assert_eq!(base_declared.callables_by_name(&Name::new("a")).len(), 1);
    assert!(!base_declared.callables_by_name(&Name::new("a"))[0].is_fake_override);
}

#[test]
fn fake_override_signature_substitutes_supertype_arguments() {
    // `class Box<T> { val item: T }`, `class IntBox : Box<Int>()`:
    // IntBox's fake override of `item` must have type Int.
    let fixture = build_fixture(|b| {
        let t_param = b.type_param("T", vec![]);
        let t_ref = b.simple_type("T");
        let item = b.property(
            "item",
            false,
            Modifiers::default().with_modality(Modality::Open),
            t_ref,
            NodeIndex::NONE,
        );
        let box_class = b.class(
            "Box",
            ClassKind::Class,
            Modifiers::default().with_modality(Modality::Open),
            vec![t_param],
            vec![],
            vec![item],
        );
        let int_ref = b.simple_type("Int");
        let box_of_int = b.generic_type("Box", vec![int_ref]);
        let int_box = b.class(
            "IntBox",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![box_of_int],
            vec![],
        );
        b.source_file(package(), vec![box_class, int_box])
    });
    let graph = &fixture.graph;
    let box_id = fixture.file.top_level[0];
    let int_box_id = fixture.file.top_level[1];

    let t_id = {
        let cell = graph.cell(box_id);
        let decl = cell.read();
        decl.as_class().expect("class").type_params[0].id
    };
    let box_of_int = Type::class(
        LookupTag::new(ClassId::top_level(package(), Name::new("Box"))),
        vec![TypeProjection::invariant(builtins::int_type())],
        Nullability::NotNull,
    );
    graph.cell(int_box_id).write().supertypes = vec![box_of_int];
    force_resolve(graph, |id, graph| {
        let cell = graph.cell(id);
        let decl = cell.read();
        if let DeclKind::Property(property) = &decl.kind {
            property
                .type_ref
                .resolve_to(Type::type_parameter(t_id, Name::new("T")));
        }
    });

    let provider = GraphSymbolProvider::new(Arc::clone(graph));
    let scopes = ScopeProvider::new();
    let int_box_symbol = graph.cell(int_box_id).symbol();
    let combined = scopes.combined_member_scope(graph, &provider, int_box_symbol);
    let members = combined.callables_by_name(&Name::new("item"));
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].signature.return_type, builtins::int_type());
}

#[test]
fn textual_override_suppresses_fake_override_synthesis() {
    let fixture = build_fixture(|b| {
        let int_base = b.simple_type("Int");
        let a_base = b.property(
            "a",
            false,
            Modifiers::default().with_modality(Modality::Open),
            int_base,
            NodeIndex::NONE,
        );
        let base = b.class(
            "Base",
            ClassKind::Class,
            Modifiers::default().with_modality(Modality::Open),
            vec![],
            vec![],
            vec![a_base],
        );
        let int_override = b.simple_type("Int");
        let a_override = b.property(
            "a",
            false,
            Modifiers::default().with_modality(Modality::Open),
            int_override,
            NodeIndex::NONE,
        );
        let base_ref = b.simple_type("Base");
        let derived = b.class(
            "Derived",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![base_ref],
            vec![a_override],
        );
        b.source_file(package(), vec![base, derived])
    });
    let graph = &fixture.graph;
    let derived_id = fixture.file.top_level[1];
    let base_type = Type::class_by_id(
        ClassId::top_level(package(), Name::new("Base")),
        Nullability::NotNull,
    );
    graph.cell(derived_id).write().supertypes = vec![base_type];
    force_resolve(graph, |id, graph| {
        let cell = graph.cell(id);
        let decl = cell.read();
        if let DeclKind::Property(property) = &decl.kind {
            property.type_ref.resolve_to(builtins::int_type());
        }
    });

    let provider = GraphSymbolProvider::new(Arc::clone(graph));
    let scopes = ScopeProvider::new();
    let derived_symbol = graph.cell(derived_id).symbol();
    let combined = scopes.combined_member_scope(graph, &provider, derived_symbol);
    let members = combined.callables_by_name(&Name::new("a"));
    assert_eq!(members.len(), 1, "override replaces, never duplicates");
    assert!(!members[0].is_fake_override);
}

#[test]
fn combined_scope_is_computed_once_and_shared() {
    let (fixture, _base, derived) = base_derived();
    let graph = &fixture.graph;
    let provider = GraphSymbolProvider::new(Arc::clone(graph));
    let scopes = ScopeProvider::new();
    let derived_symbol = graph.cell(derived).symbol();

    let first = scopes.combined_member_scope(graph, &provider, derived_symbol);
    let second = scopes.combined_member_scope(graph, &provider, derived_symbol);
    assert!(Arc::ptr_eq(&first, &second));

    scopes.invalidate(derived_symbol);
    let third = scopes.combined_member_scope(graph, &provider, derived_symbol);
    assert!(!Arc::ptr_eq(&first, &third), "eviction forces a recompute");
}

#[test]
fn concurrent_scope_requests_agree() {
    let (fixture, _base, derived) = base_derived();
    let graph = Arc::clone(&fixture.graph);
    let provider = GraphSymbolProvider::new(Arc::clone(&graph));
    let scopes = ScopeProvider::new();
    let derived_symbol = graph.cell(derived).symbol();

    use rayon::prelude::*;
    let results: Vec<usize> = (0..32)
        .into_par_iter()
        .map(|_| {
            scopes
                .combined_member_scope(&graph, &provider, derived_symbol)
                .callables_by_name(&Name::new("a"))
                .len()
        })
        .collect();
    assert!(results.iter().all(|&count| count == 1));
}
