//! End-to-end pipeline behavior: build, resolve, check.

use std::sync::Arc;
use tarn::{FrontendOptions, SourceInput, analyze, recheck};
use tarn_binder::ResolvePhase;
use tarn_common::{CancellationToken, FileId, PackageFqName};
use tarn_syntax::{ClassKind, Modifiers, NodeIndex, SyntaxBuilder};

fn source(configure: impl FnOnce(&mut SyntaxBuilder) -> NodeIndex) -> SourceInput {
    // Honors RUST_LOG when a test needs resolution traces.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let mut b = SyntaxBuilder::new(FileId(0));
    let root = configure(&mut b);
    SourceInput {
        arena: Arc::new(b.finish()),
        root,
    }
}

fn package() -> PackageFqName {
    PackageFqName::new("app")
}

#[test]
fn clean_input_produces_no_diagnostics() {
    let input = source(|b| {
        let int = b.simple_type("Int");
        let init = b.int_literal(1);
        let prop = b.property("answer", false, Modifiers::default(), int, init);
        let string = b.simple_type("String");
        let greeting = b.string_literal("hi");
        let body = b.block(vec![greeting]);
        let f = b.function("greet", Modifiers::default(), vec![], vec![], string, body);
        let class = b.class(
            "App",
            ClassKind::Class,
            Modifiers::default(),
            vec![],
            vec![],
            vec![],
        );
        b.source_file(package(), vec![prop, f, class])
    });
    let analysis = analyze(&[input], FrontendOptions::default(), &CancellationToken::new()).unwrap();
    assert!(
        analysis.diagnostics.is_empty(),
        "unexpected: {:?}",
        analysis.diagnostics
    );
    for id in analysis.session.graph.all_decl_ids() {
        assert_eq!(
            analysis.session.graph.cell(id).phase(),
            ResolvePhase::BodyResolved
        );
    }
}

#[test]
fn unresolved_types_surface_as_diagnostics_not_failures() {
    let input = source(|b| {
        let missing = b.simple_type("Missing");
        let prop = b.property("broken", false, Modifiers::default(), missing, NodeIndex::NONE);
        b.source_file(package(), vec![prop])
    });
    let analysis = analyze(&[input], FrontendOptions::default(), &CancellationToken::new()).unwrap();
    assert_eq!(analysis.diagnostics_named("UNRESOLVED_REFERENCE").len(), 1);
    assert!(analysis.has_errors());
}

#[test]
fn rechecking_a_resolved_graph_is_idempotent() {
    let input = source(|b| {
        // A property with a wrong setter parameter type, so there is a
        // diagnostic to observe across runs.
        let string = b.simple_type("String");
        let int = b.simple_type("Int");
        let v = b.param("v", int);
        let setter_body = b.block(vec![]);
        let setter = b.setter(None, v, NodeIndex::NONE, setter_body);
        let text = b.string_literal("x");
        let getter = b.getter(None, NodeIndex::NONE, text);
        let prop = b.property_full(tarn_syntax::PropertyNode {
            name: tarn_common::Name::new("p"),
            is_var: true,
            modifiers: Modifiers::default(),
            receiver_type: NodeIndex::NONE,
            type_params: vec![],
            type_ref: string,
            initializer: NodeIndex::NONE,
            delegate: NodeIndex::NONE,
            getter,
            setter,
        });
        b.source_file(package(), vec![prop])
    });
    let token = CancellationToken::new();
    let analysis = analyze(&[input], FrontendOptions::default(), &token).unwrap();
    let first: Vec<_> = analysis
        .diagnostics
        .iter()
        .map(|d| (d.factory.name, d.source.range(), d.args.clone()))
        .collect();
    assert!(!first.is_empty());

    let second = recheck(&analysis, &token).unwrap();
    let second: Vec<_> = second
        .iter()
        .map(|d| (d.factory.name, d.source.range(), d.args.clone()))
        .collect();
    assert_eq!(first, second, "same resolved graph, same diagnostics");
}

#[test]
fn cancellation_propagates_out_of_analyze() {
    let input = source(|b| {
        let int = b.simple_type("Int");
        let prop = b.property("x", false, Modifiers::default(), int, NodeIndex::NONE);
        b.source_file(package(), vec![prop])
    });
    let token = CancellationToken::new();
    token.cancel();
    assert!(analyze(&[input], FrontendOptions::default(), &token).is_err());
}

#[test]
fn multiple_files_share_one_graph() {
    let mut b0 = SyntaxBuilder::new(FileId(0));
    let base = b0.class(
        "Base",
        ClassKind::Class,
        Modifiers::default().with_modality(tarn_common::Modality::Open),
        vec![],
        vec![],
        vec![],
    );
    let root0 = b0.source_file(package(), vec![base]);

    let mut b1 = SyntaxBuilder::new(FileId(1));
    let base_ref = b1.simple_type("Base");
    let derived = b1.class(
        "Derived",
        ClassKind::Class,
        Modifiers::default(),
        vec![],
        vec![base_ref],
        vec![],
    );
    let root1 = b1.source_file(package(), vec![derived]);

    let analysis = analyze(
        &[
            SourceInput {
                arena: Arc::new(b0.finish()),
                root: root0,
            },
            SourceInput {
                arena: Arc::new(b1.finish()),
                root: root1,
            },
        ],
        FrontendOptions::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert!(
        analysis.diagnostics.is_empty(),
        "cross-file supertype resolution works: {:?}",
        analysis.diagnostics
    );
}
