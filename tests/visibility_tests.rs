//! Session-level private-visibility policy: the dangling-module asymmetry.

use std::sync::Arc;
use tarn_binder::{
    DanglingAwarePrivateVisibility, DeclarationGraph, GraphSymbolProvider, ModulePlatform,
    ModuleRegistry, ScopeProvider, Session,
};
use tarn_common::{FileId, LanguageFeatures};

fn session_with_dangling() -> (Arc<Session>, tarn_binder::ModuleId, FileId, FileId, FileId) {
    let graph = Arc::new(DeclarationGraph::new());
    let modules = Arc::new(ModuleRegistry::new());
    let real = modules.add_source_module("app", ModulePlatform::Platform);
    let context_file = FileId(0);
    let ordinary_file = FileId(1);
    modules.register_file(context_file, real);
    modules.register_file(ordinary_file, real);

    let dangling = modules.add_dangling_module("scratch", real, context_file);
    let dangling_file = FileId(7);
    modules.register_file(dangling_file, dangling);

    let session = Arc::new(Session {
        graph: Arc::clone(&graph),
        modules,
        module: dangling,
        features: LanguageFeatures::latest(),
        provider: Arc::new(GraphSymbolProvider::new(graph)),
        scopes: Arc::new(ScopeProvider::new()),
        visibility: Arc::new(DanglingAwarePrivateVisibility),
    });
    (session, real, context_file, ordinary_file, dangling_file)
}

#[test]
fn dangling_session_sees_context_module_privates() {
    let (session, real, _, _, _) = session_with_dangling();
    assert!(session.can_see_private_declarations_of_module(session.module, real));
    assert!(!session.can_see_private_declarations_of_module(real, session.module));
}

#[test]
fn file_level_asymmetry_holds_through_the_session() {
    let (session, _, context_file, ordinary_file, dangling_file) = session_with_dangling();
    // The dangling file sees into exactly the file it is scoped against.
    assert!(session.can_see_private_top_level_declarations_from_file(dangling_file, context_file));
    assert!(!session.can_see_private_top_level_declarations_from_file(dangling_file, ordinary_file));
    // Never the reverse: ordinary files are unaffected by scratch content.
    assert!(!session.can_see_private_top_level_declarations_from_file(context_file, dangling_file));
    assert!(!session.can_see_private_top_level_declarations_from_file(ordinary_file, dangling_file));
}

#[test]
fn dangling_sessions_inherit_the_context_platform() {
    let (session, _, _, _, _) = session_with_dangling();
    assert_eq!(session.platform(), ModulePlatform::Platform);
}
