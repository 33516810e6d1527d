use tarn_binder::{
    DeclKind, DeclarationGraph, DeclarationGraphBuilder, DeclarationOrigin, ExprKind,
    GraphSymbolProvider, JumpKind, ModulePlatform, ModuleRegistry, RequireSymbol, ResolvePhase,
    SymbolProvider,
};
use tarn_common::{ClassId, ElementKind, FakeElementKind, FileId, Name, PackageFqName};
use tarn_syntax::{ClassKind, Modifiers, NodeIndex, PropertyNode, SyntaxBuilder};

fn package() -> PackageFqName {
    PackageFqName::new("demo")
}

fn build(
    configure: impl FnOnce(&mut SyntaxBuilder) -> NodeIndex,
) -> (std::sync::Arc<DeclarationGraph>, tarn_binder::GraphFile) {
    let graph = std::sync::Arc::new(DeclarationGraph::new());
    let modules = ModuleRegistry::new();
    let module = modules.add_source_module("demo", ModulePlatform::Platform);
    modules.register_file(FileId(0), module);
    let mut b = SyntaxBuilder::new(FileId(0));
    let root = configure(&mut b);
    let arena = b.finish();
    let file = DeclarationGraphBuilder::build_file(&graph, module, &arena, root);
    (graph, file)
}

#[test]
fn class_gets_an_implicit_constructor() {
    let (graph, file) = build(|b| {
        let class = b.class(
            "Empty",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        b.source_file(package(), vec![class])
    });
    let class_cell = graph.cell(file.top_level[0]);
    let class = class_cell.read();
    let members = &class.as_class().expect("class decl").members;
    assert_eq!(members.len(), 1);

    let ctor_cell = graph.cell(members[0]);
    let ctor = ctor_cell.read();
    assert_eq!(ctor.name.as_str(), "<init>");
    assert_eq!(ctor.origin, DeclarationOrigin::Synthetic);
    assert_eq!(
        ctor.source.kind(),
        ElementKind::Fake(FakeElementKind::ImplicitConstructor)
    );
    assert_eq!(ctor.containing_class, Some(class.symbol));
}

#[test]
fn interfaces_get_no_implicit_constructor() {
    let (graph, file) = build(|b| {
        let class = b.class(
            "Marker",
            ClassKind::Interface,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        b.source_file(package(), vec![class])
    });
    let class_cell = graph.cell(file.top_level[0]);
    assert!(class_cell.read().as_class().expect("class").members.is_empty());
}

#[test]
fn property_without_accessors_gets_default_ones() {
    let (graph, file) = build(|b| {
        let ty = b.simple_type("Int");
        let init = b.int_literal(0);
        let prop = b.property("counter", true, Modifiers::default(), ty, init);
        b.source_file(package(), vec![prop])
    });
    let cell = graph.cell(file.top_level[0]);
    let decl = cell.read();
    let property = decl.as_property().expect("property decl");

    let getter = property.getter.as_ref().expect("synthesized getter");
    assert_eq!(
        getter.source.kind(),
        ElementKind::Fake(FakeElementKind::DefaultAccessor)
    );
    assert!(getter.return_type.is_implicit());

    let setter = property.setter.as_ref().expect("synthesized setter");
    let param = setter.param.as_ref().expect("setter value parameter");
    assert_eq!(param.name.as_str(), "value");
}

#[test]
fn val_without_setter_syntax_has_no_setter() {
    let (graph, file) = build(|b| {
        let ty = b.simple_type("Int");
        let init = b.int_literal(1);
        let prop = b.property("a", false, Modifiers::default(), ty, init);
        b.source_file(package(), vec![prop])
    });
    let cell = graph.cell(file.top_level[0]);
    let decl = cell.read();
    assert!(decl.as_property().expect("property").setter.is_none());
}

#[test]
fn delegated_property_accessors_carry_the_delegation_kind() {
    let (graph, file) = build(|b| {
        let delegate = b.call("lazyOf", vec![]);
        let prop = b.property_full(PropertyNode {
            name: Name::new("cached"),
            is_var: false,
            modifiers: Modifiers::default(),
            receiver_type: NodeIndex::NONE,
            type_params: vec![],
            type_ref: NodeIndex::NONE,
            initializer: NodeIndex::NONE,
            delegate,
            getter: NodeIndex::NONE,
            setter: NodeIndex::NONE,
        });
        b.source_file(package(), vec![prop])
    });
    let cell = graph.cell(file.top_level[0]);
    let decl = cell.read();
    let property = decl.as_property().expect("property");
    assert!(property.delegate.is_some());
    assert_eq!(
        property.getter.as_ref().expect("getter").source.kind(),
        ElementKind::Fake(FakeElementKind::DelegatedPropertyAccessor)
    );
}

#[test]
fn type_aliases_share_the_class_id_namespace() {
    let (graph, _file) = build(|b| {
        let target = b.simple_type("Int");
        let alias = b.type_alias("Meters", Modifiers::default(), vec![], target);
        b.source_file(package(), vec![alias])
    });
    let provider = GraphSymbolProvider::new(graph);
    let id = ClassId::top_level(package(), Name::new("Meters"));
    assert!(provider.find_type_alias(&id).is_some());
    assert!(provider.find_class(&id).is_none(), "an alias is not a class");
}

#[test]
fn jumps_resolve_to_their_lexical_loop() {
    let (graph, file) = build(|b| {
        let brk = b.break_expr(Some("outer"));
        let inner_body = b.block(vec![brk]);
        let inner = b.loop_expr(None, inner_body);
        let outer_body = b.block(vec![inner]);
        let outer = b.loop_expr(Some("outer"), outer_body);
        let fn_body = b.block(vec![outer]);
        let f = b.function(
            "f",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            fn_body,
        );
        b.source_file(package(), vec![f])
    });
    let cell = graph.cell(file.top_level[0]);
    let decl = cell.read();
    let body = decl.as_function().expect("function").body.expect("body");

    // Walk: body block -> outer loop -> its block -> inner loop -> block -> jump.
    let outer_id = match &graph.expr(body).kind {
        ExprKind::Block { statements } => statements[0],
        other => panic!("expected block, got {other:?}"),
    };
    let jump = {
        let mut current = outer_id;
        loop {
            let expr = graph.expr(current);
            match &expr.kind {
                ExprKind::Loop { body, .. } => current = *body,
                ExprKind::Block { statements } => current = statements[0],
                ExprKind::Jump { kind, target } => break (*kind, *target),
                other => panic!("unexpected expression {other:?}"),
            }
        }
    };
    assert_eq!(jump.0, JumpKind::Break);
    assert_eq!(jump.1, Some(outer_id), "labeled break targets the outer loop");
}

#[test]
fn new_declarations_start_unresolved() {
    let (graph, file) = build(|b| {
        let f = b.function(
            "f",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            NodeIndex::NONE,
        );
        b.source_file(package(), vec![f])
    });
    let cell = graph.cell(file.top_level[0]);
    assert_eq!(cell.phase(), ResolvePhase::Unresolved);
}

#[test]
#[should_panic(expected = "non-monotonic")]
fn skipping_a_phase_fails_fast() {
    let (graph, file) = build(|b| {
        let f = b.function(
            "f",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            NodeIndex::NONE,
        );
        b.source_file(package(), vec![f])
    });
    let cell = graph.cell(file.top_level[0]);
    cell.advance_phase(ResolvePhase::TypesResolved);
}

#[test]
fn packages_are_discoverable_through_the_provider() {
    let (graph, _file) = build(|b| {
        let class = b.class(
            "Anchor",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        b.source_file(package(), vec![class])
    });
    let provider = GraphSymbolProvider::new(graph);
    assert!(provider.find_package(&package()));
    assert!(!provider.find_package(&PackageFqName::new("nowhere")));
}

#[test]
#[should_panic(expected = "class not found by id: demo/Ghost")]
fn tooling_lookup_miss_names_the_missing_id() {
    let (graph, _file) = build(|b| b.source_file(package(), vec![]));
    let provider = GraphSymbolProvider::new(graph);
    let _ = provider.class_by_id_or_fail(&ClassId::top_level(package(), Name::new("Ghost")));
}

#[test]
#[should_panic(expected = "duplicate class-like registration")]
fn colliding_class_ids_fail_fast() {
    build(|b| {
        let first = b.class(
            "Dup",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        let second = b.class(
            "Dup",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        b.source_file(package(), vec![first, second])
    });
}
