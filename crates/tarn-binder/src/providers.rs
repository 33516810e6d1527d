//! Symbol providers: qualified-id lookup across module boundaries.

use crate::graph::DeclarationGraph;
use crate::symbols::{SymbolId, SymbolKind};
use std::sync::Arc;
use tarn_common::{ClassId, Name, PackageFqName};

/// Lookup surface consumed by resolution and by the scope provider. The
/// classpath side of a session implements this for libraries; the graph
/// itself implements it for in-session sources.
pub trait SymbolProvider: Send + Sync {
    fn find_class(&self, id: &ClassId) -> Option<SymbolId>;
    fn find_type_alias(&self, id: &ClassId) -> Option<SymbolId>;
    fn find_top_level_callables(&self, package: &PackageFqName, name: &Name) -> Vec<SymbolId>;
    fn find_package(&self, package: &PackageFqName) -> bool;
}

/// Provider backed by the session's own declaration graph.
pub struct GraphSymbolProvider {
    graph: Arc<DeclarationGraph>,
}

impl GraphSymbolProvider {
    pub fn new(graph: Arc<DeclarationGraph>) -> Self {
        GraphSymbolProvider { graph }
    }
}

impl SymbolProvider for GraphSymbolProvider {
    fn find_class(&self, id: &ClassId) -> Option<SymbolId> {
        self.graph
            .class_like_symbol(id)
            .filter(|&symbol| self.graph.symbol_kind(symbol) == SymbolKind::Class)
    }

    fn find_type_alias(&self, id: &ClassId) -> Option<SymbolId> {
        self.graph
            .class_like_symbol(id)
            .filter(|&symbol| self.graph.symbol_kind(symbol) == SymbolKind::TypeAlias)
    }

    fn find_top_level_callables(&self, package: &PackageFqName, name: &Name) -> Vec<SymbolId> {
        self.graph.top_level_callables(package, name)
    }

    fn find_package(&self, package: &PackageFqName) -> bool {
        self.graph.has_package(package)
    }
}

/// Chains providers; first hit wins.
pub struct CompositeSymbolProvider {
    providers: Vec<Arc<dyn SymbolProvider>>,
}

impl CompositeSymbolProvider {
    pub fn new(providers: Vec<Arc<dyn SymbolProvider>>) -> Self {
        CompositeSymbolProvider { providers }
    }
}

impl SymbolProvider for CompositeSymbolProvider {
    fn find_class(&self, id: &ClassId) -> Option<SymbolId> {
        self.providers.iter().find_map(|provider| provider.find_class(id))
    }

    fn find_type_alias(&self, id: &ClassId) -> Option<SymbolId> {
        self.providers
            .iter()
            .find_map(|provider| provider.find_type_alias(id))
    }

    fn find_top_level_callables(&self, package: &PackageFqName, name: &Name) -> Vec<SymbolId> {
        self.providers
            .iter()
            .flat_map(|provider| provider.find_top_level_callables(package, name))
            .collect()
    }

    fn find_package(&self, package: &PackageFqName) -> bool {
        self.providers
            .iter()
            .any(|provider| provider.find_package(package))
    }
}

/// Lookup helpers for contexts where the target is expected to exist
/// (tests, tooling-facing resolvers). A miss is a hard failure naming the
/// missing id, not a silent `None`.
pub trait RequireSymbol: SymbolProvider {
    fn class_by_id_or_fail(&self, id: &ClassId) -> SymbolId {
        self.find_class(id)
            .unwrap_or_else(|| panic!("class not found by id: {id}"))
    }

    fn type_alias_by_id_or_fail(&self, id: &ClassId) -> SymbolId {
        self.find_type_alias(id)
            .unwrap_or_else(|| panic!("type alias not found by id: {id}"))
    }
}

impl<P: SymbolProvider + ?Sized> RequireSymbol for P {}
