//! Analysis session: one module's view of the world.

use crate::graph::DeclarationGraph;
use crate::modules::{ModuleId, ModulePlatform, ModuleRegistry};
use crate::providers::SymbolProvider;
use crate::scopes::{MemberScope, ScopeProvider};
use crate::symbols::SymbolId;
use crate::visibility::PrivateVisibleFromDifferentModuleExtension;
use std::sync::Arc;
use tarn_common::{FileId, LanguageFeatures};
use tarn_types::{AliasExpansion, TypeAliasExpander};

/// Everything resolution and checking need to see from one module's
/// perspective: the graph, the module topology, symbol lookup, scopes,
/// feature flags, and the private-visibility policy hook.
pub struct Session {
    pub graph: Arc<DeclarationGraph>,
    pub modules: Arc<ModuleRegistry>,
    pub module: ModuleId,
    pub features: LanguageFeatures,
    pub provider: Arc<dyn SymbolProvider>,
    pub scopes: Arc<ScopeProvider>,
    pub visibility: Arc<dyn PrivateVisibleFromDifferentModuleExtension>,
}

impl Session {
    pub fn declared_member_scope(&self, class: SymbolId) -> Arc<MemberScope> {
        self.scopes.declared_member_scope(&self.graph, class)
    }

    pub fn combined_member_scope(&self, class: SymbolId) -> Arc<MemberScope> {
        self.scopes
            .combined_member_scope(&self.graph, self.provider.as_ref(), class)
    }

    pub fn can_see_private_declarations_of_module(
        &self,
        requesting: ModuleId,
        owning: ModuleId,
    ) -> bool {
        self.visibility
            .can_see_private_declarations_of_module(&self.modules, requesting, owning)
    }

    pub fn can_see_private_top_level_declarations_from_file(
        &self,
        use_site: FileId,
        target: FileId,
    ) -> bool {
        self.visibility
            .can_see_private_top_level_declarations_from_file(&self.modules, use_site, target)
    }

    /// Declaration-site (common) or use-site (platform) session, for
    /// expect/actual checker filtering.
    pub fn platform(&self) -> ModulePlatform {
        self.modules.platform(self.module)
    }
}

impl TypeAliasExpander for Session {
    fn expand_alias(&self, id: &tarn_common::ClassId) -> Option<AliasExpansion> {
        let symbol = self.provider.find_type_alias(id)?;
        let cell = self.graph.cell_of(symbol);
        let decl = cell.read();
        let alias = decl.as_type_alias()?;
        let expanded = alias.expanded_ref.ty()?;
        Some(AliasExpansion {
            type_params: alias.type_params.iter().map(|param| param.id).collect(),
            expanded,
        })
    }
}
