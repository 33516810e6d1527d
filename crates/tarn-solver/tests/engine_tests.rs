//! Phase-advancement engine: totality, single-flight, cancellation, and
//! body resolution against the scopes.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tarn_binder::{
    DanglingAwarePrivateVisibility, DeclarationGraph, DeclarationGraphBuilder, GraphSymbolProvider,
    ModulePlatform, ModuleRegistry, ResolvePhase, ScopeProvider, Session,
};
use tarn_common::{CancellationToken, DiagnosticSink, FileId, LanguageFeatures, PackageFqName};
use tarn_solver::ResolutionEngine;
use tarn_syntax::{ClassKind, Modifiers, NodeArena, NodeIndex, SyntaxBuilder};
use tarn_types::builtins;

struct Fixture {
    engine: ResolutionEngine,
    session: Arc<Session>,
    sink: Arc<DiagnosticSink>,
    file: tarn_binder::GraphFile,
}

fn fixture(configure: impl FnOnce(&mut SyntaxBuilder) -> NodeIndex) -> Fixture {
    // Honors RUST_LOG when a test needs phase traces.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let graph = Arc::new(DeclarationGraph::new());
    let modules = Arc::new(ModuleRegistry::new());
    let module = modules.add_source_module("demo", ModulePlatform::Platform);
    modules.register_file(FileId(0), module);

    let mut b = SyntaxBuilder::new(FileId(0));
    let root = configure(&mut b);
    let arena = Arc::new(b.finish());
    let file = DeclarationGraphBuilder::build_file(&graph, module, &arena, root);

    let session = Arc::new(Session {
        graph: Arc::clone(&graph),
        modules,
        module,
        features: LanguageFeatures::latest(),
        provider: Arc::new(GraphSymbolProvider::new(graph)),
        scopes: Arc::new(ScopeProvider::new()),
        visibility: Arc::new(DanglingAwarePrivateVisibility),
    });
    let sink = Arc::new(DiagnosticSink::new());
    let mut arenas: FxHashMap<FileId, Arc<NodeArena>> = FxHashMap::default();
    arenas.insert(FileId(0), arena);
    let engine = ResolutionEngine::new(Arc::clone(&session), arenas, Arc::clone(&sink));
    Fixture {
        engine,
        session,
        sink,
        file,
    }
}

fn package() -> PackageFqName {
    PackageFqName::new("demo")
}

#[test]
fn every_declaration_reaches_the_terminal_phase() {
    let f = fixture(|b| {
        let int = b.simple_type("Int");
        let init = b.int_literal(0);
        let prop = b.property("x", false, Modifiers::default(), int, init);
        let missing = b.simple_type("NoSuchClass");
        let broken = b.property("y", false, Modifiers::default(), missing, NodeIndex::NONE);
        let class = b.class(
            "C",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        b.source_file(package(), vec![prop, broken, class])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();
    for id in f.session.graph.all_decl_ids() {
        assert_eq!(
            f.session.graph.cell(id).phase(),
            ResolvePhase::BodyResolved,
            "resolution must be total over the graph"
        );
    }
    // The broken property resolved to an error type and reported, rather
    // than aborting its node.
    assert_eq!(f.sink.count_of("UNRESOLVED_REFERENCE"), 1);
    let broken_cell = f.session.graph.cell(f.file.top_level[1]);
    let broken_decl = broken_cell.read();
    let property = broken_decl.as_property().unwrap();
    assert!(property.type_ref.resolved_type().is_error());
}

#[test]
fn resolved_property_types_are_what_was_written() {
    let f = fixture(|b| {
        let int = b.simple_type("Int");
        let init = b.int_literal(0);
        let prop = b.property("x", false, Modifiers::default(), int, init);
        b.source_file(package(), vec![prop])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();
    let cell = f.session.graph.cell(f.file.top_level[0]);
    let decl = cell.read();
    let property = decl.as_property().unwrap();
    assert_eq!(property.type_ref.resolved_type(), builtins::int_type());
    // Default accessors picked the property type and Unit up.
    let getter = property.getter.as_ref().unwrap();
    assert_eq!(getter.return_type.resolved_type(), builtins::int_type());
}

#[test]
fn implicit_property_type_comes_from_the_initializer_literal() {
    let f = fixture(|b| {
        let init = b.string_literal("hello");
        let prop = b.property("s", false, Modifiers::default(), NodeIndex::NONE, init);
        b.source_file(package(), vec![prop])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();
    let cell = f.session.graph.cell(f.file.top_level[0]);
    let decl = cell.read();
    assert_eq!(
        decl.as_property().unwrap().type_ref.resolved_type(),
        builtins::string_type()
    );
}

#[test]
fn uninferable_implicit_type_reports_once_even_under_contention() {
    // Single-flight observable: the diagnostic is emitted inside the types
    // phase, so hammering that phase from many threads must produce exactly
    // one report.
    let f = fixture(|b| {
        let prop = b.property(
            "mystery",
            false,
            Modifiers::default(),
            NodeIndex::NONE,
            NodeIndex::NONE,
        );
        b.source_file(package(), vec![prop])
    });
    let decl_id = f.file.top_level[0];
    let token = CancellationToken::new();

    use rayon::prelude::*;
    (0..32).into_par_iter().for_each(|_| {
        f.engine
            .advance_to(decl_id, ResolvePhase::TypesResolved, &token)
            .unwrap();
    });
    assert_eq!(f.sink.count_of("CANNOT_INFER_TYPE"), 1);
}

#[test]
fn cancellation_stops_before_any_commit() {
    let f = fixture(|b| {
        let int = b.simple_type("Int");
        let prop = b.property("x", false, Modifiers::default(), int, NodeIndex::NONE);
        b.source_file(package(), vec![prop])
    });
    let token = CancellationToken::new();
    token.cancel();
    assert!(f.engine.resolve_graph(&token).is_err());
    for id in f.session.graph.all_decl_ids() {
        assert_eq!(f.session.graph.cell(id).phase(), ResolvePhase::Unresolved);
    }
}

#[test]
fn supertype_cycles_are_reported_and_broken() {
    let f = fixture(|b| {
        let b_ref = b.simple_type("B");
        let a = b.class(
            "A",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![b_ref],
            vec![],
        );
        let a_ref = b.simple_type("A");
        let b_class = b.class(
            "B",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![a_ref],
            vec![],
        );
        b.source_file(package(), vec![a, b_class])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();
    assert_eq!(f.sink.count_of("SUPERTYPE_CYCLE"), 2);
    // Scopes over the broken hierarchy terminate.
    let a_symbol = f.session.graph.cell(f.file.top_level[0]).symbol();
    let scope = f.session.combined_member_scope(a_symbol);
    assert!(scope.is_empty());
}

#[test]
fn member_calls_resolve_through_the_combined_scope() {
    let f = fixture(|b| {
        let int = b.simple_type("Int");
        let body = b.block(vec![]);
        let m = b.function("m", Modifiers::default(), vec![], vec![], int, body);
        let class = b.class(
            "C",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![m],
        );
        let ctor_call = b.call("C", vec![]);
        let local = b.local_val("c", NodeIndex::NONE, ctor_call);
        let receiver = b.name_ref("c");
        let member_call = b.call_on(receiver, "m", vec![], false);
        let test_body = b.block(vec![local, member_call]);
        let test = b.function(
            "test",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            test_body,
        );
        b.source_file(package(), vec![class, test])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();
    assert!(f.sink.is_empty(), "diagnostics: {:?}", f.sink.snapshot());

    // Find the member call and check its resolution.
    let test_cell = f.session.graph.cell(f.file.top_level[1]);
    let test_decl = test_cell.read();
    let body = test_decl.as_function().unwrap().body.unwrap();
    let graph = &f.session.graph;
    let tarn_binder::ExprKind::Block { statements } = &graph.expr(body).kind else {
        panic!("function body is a block");
    };
    let member_call = graph.expr(statements[1]);
    assert!(member_call.resolved_call().is_some());
    assert_eq!(member_call.resolved_type(), Some(&builtins::int_type()));
}

#[test]
fn safe_calls_produce_the_nullable_result_type() {
    let f = fixture(|b| {
        let int = b.simple_type("Int");
        let body = b.block(vec![]);
        let m = b.function("m", Modifiers::default(), vec![], vec![], int, body);
        let class = b.class(
            "C",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![m],
        );
        let nullable_c = b.nullable_type("C");
        let null = b.null_literal();
        let local = b.local_val("c", nullable_c, null);
        let receiver = b.name_ref("c");
        let safe_call = b.call_on(receiver, "m", vec![], true);
        let test_body = b.block(vec![local, safe_call]);
        let test = b.function(
            "test",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            test_body,
        );
        b.source_file(package(), vec![class, test])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();

    let test_cell = f.session.graph.cell(f.file.top_level[1]);
    let test_decl = test_cell.read();
    let body = test_decl.as_function().unwrap().body.unwrap();
    let graph = &f.session.graph;
    let tarn_binder::ExprKind::Block { statements } = &graph.expr(body).kind else {
        panic!("function body is a block");
    };
    let safe_call = graph.expr(statements[1]);
    let ty = safe_call.resolved_type().expect("resolved");
    assert_eq!(ty.nullability(), tarn_types::Nullability::Nullable);
}

#[test]
fn jump_outside_a_loop_is_reported_during_body_resolution() {
    let f = fixture(|b| {
        let brk = b.break_expr(None);
        let body = b.block(vec![brk]);
        let func = b.function(
            "f",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            body,
        );
        b.source_file(package(), vec![func])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();
    assert_eq!(f.sink.count_of("BREAK_OR_CONTINUE_OUTSIDE_OF_LOOP"), 1);
}

#[test]
fn generic_call_concretizes_the_return_type_from_arguments() {
    let f = fixture(|b| {
        // fun <T> identity(x: T): T = x   (expression body modeled as a block)
        let t_param = b.type_param("T", vec![]);
        let t_ret = b.simple_type("T");
        let t_param_ty = b.simple_type("T");
        let x = b.param("x", t_param_ty);
        let x_ref = b.name_ref("x");
        let body = b.block(vec![x_ref]);
        let identity = b.function(
            "identity",
            Modifiers::default(),
            vec![t_param],
            vec![x],
            t_ret,
            body,
        );
        let arg = b.int_literal(7);
        let call = b.call("identity", vec![arg]);
        let test_body = b.block(vec![call]);
        let test = b.function(
            "test",
            Modifiers::default(),
            vec![],
            vec![],
            NodeIndex::NONE,
            test_body,
        );
        b.source_file(package(), vec![identity, test])
    });
    f.engine.resolve_graph(&CancellationToken::new()).unwrap();

    let test_cell = f.session.graph.cell(f.file.top_level[1]);
    let test_decl = test_cell.read();
    let body = test_decl.as_function().unwrap().body.unwrap();
    let graph = &f.session.graph;
    let tarn_binder::ExprKind::Block { statements } = &graph.expr(body).kind else {
        panic!("function body is a block");
    };
    let call = graph.expr(statements[0]);
    assert_eq!(call.resolved_type(), Some(&builtins::int_type()));
}
