//! Build -> resolve -> check, in one call.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tarn_binder::{
    DanglingAwarePrivateVisibility, DeclarationGraph, DeclarationGraphBuilder, GraphFile,
    GraphSymbolProvider, ModulePlatform, ModuleRegistry, ScopeProvider, Session,
};
use tarn_checker::{CheckerDriver, CheckerRegistry};
use tarn_common::{Cancelled, CancellationToken, Diagnostic, DiagnosticSink, FileId, LanguageFeatures};
use tarn_solver::ResolutionEngine;
use tarn_syntax::{NodeArena, NodeIndex};
use tracing::debug;

/// One file of input: its syntax arena and the source-file root node.
pub struct SourceInput {
    pub arena: Arc<NodeArena>,
    pub root: NodeIndex,
}

#[derive(Clone)]
pub struct FrontendOptions {
    pub features: LanguageFeatures,
    pub platform: ModulePlatform,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        FrontendOptions {
            features: LanguageFeatures::latest(),
            platform: ModulePlatform::Platform,
        }
    }
}

/// The resolved output: the session (graph, scopes, providers) and the
/// drained diagnostic stream in rendering order.
pub struct Analysis {
    pub session: Arc<Session>,
    pub files: Vec<GraphFile>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn diagnostics_named(&self, factory_name: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.factory.name == factory_name)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity() == tarn_common::Severity::Error)
    }
}

/// Analyze one module's files with the built-in rule set.
pub fn analyze(
    sources: &[SourceInput],
    options: FrontendOptions,
    token: &CancellationToken,
) -> Result<Analysis, Cancelled> {
    let graph = Arc::new(DeclarationGraph::new());
    let modules = Arc::new(ModuleRegistry::new());
    let module = modules.add_source_module("main", options.platform);

    let mut arenas: FxHashMap<FileId, Arc<NodeArena>> = FxHashMap::default();
    let mut files = Vec::with_capacity(sources.len());
    for source in sources {
        modules.register_file(source.arena.file, module);
        arenas.insert(source.arena.file, Arc::clone(&source.arena));
        files.push(DeclarationGraphBuilder::build_file(
            &graph,
            module,
            &source.arena,
            source.root,
        ));
    }
    debug!(files = files.len(), decls = graph.decl_count(), "graph built");

    let session = Arc::new(Session {
        graph: Arc::clone(&graph),
        modules,
        module,
        features: options.features,
        provider: Arc::new(GraphSymbolProvider::new(graph)),
        scopes: Arc::new(ScopeProvider::new()),
        visibility: Arc::new(DanglingAwarePrivateVisibility),
    });

    let sink = Arc::new(DiagnosticSink::new());
    let engine = ResolutionEngine::new(Arc::clone(&session), arenas, Arc::clone(&sink));
    engine.resolve_graph(token)?;

    let driver = CheckerDriver::new(
        Arc::new(CheckerRegistry::builtin()),
        Arc::clone(&session),
        Arc::clone(&sink),
    );
    driver.check_graph(token)?;

    Ok(Analysis {
        session,
        files,
        diagnostics: sink.drain_sorted(),
    })
}

/// Re-run only the checker walk over an already-resolved analysis. The walk
/// is read-only, so checking is idempotent: the same resolved graph yields
/// the same diagnostics every time.
pub fn recheck(analysis: &Analysis, token: &CancellationToken) -> Result<Vec<Diagnostic>, Cancelled> {
    let sink = Arc::new(DiagnosticSink::new());
    let driver = CheckerDriver::new(
        Arc::new(CheckerRegistry::builtin()),
        Arc::clone(&analysis.session),
        Arc::clone(&sink),
    );
    driver.check_graph(token)?;
    Ok(sink.drain_sorted())
}
