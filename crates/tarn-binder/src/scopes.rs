//! Member scopes: declared-only and combined (declared + fake overrides).
//!
//! `declared_member_scope` answers "what did the user write in this class";
//! `combined_member_scope` answers "what can you call on this class",
//! materializing a synthetic fake-override node for every inherited member
//! that is not overridden textually. The split exists because
//! declaration-site checks must ignore compiler-synthesized members while
//! override-consistency checks must see them.
//!
//! Combined scopes are cached at-most-once per class; concurrent computors
//! race, the first insert wins, and losers discard their result.

use crate::decls::{
    DeclKind, Declaration, DeclarationCell, DeclarationOrigin, FunctionDecl, PropertyDecl,
    ResolvePhase, TypeRef, ValueParam,
};
use crate::graph::DeclarationGraph;
use crate::providers::SymbolProvider;
use crate::symbols::{SymbolId, SymbolKind};
use dashmap::DashMap;
use indexmap::IndexMap;
use std::sync::Arc;
use tarn_common::limits::MAX_SUPERTYPE_WALK;
use tarn_common::{FakeElementKind, Name};
use tarn_types::{SimpleType, Type, TypeSubstitutor, substitutor_for_arguments};
use tracing::debug;

/// Resolved shape of one callable member, post substitution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSignature {
    pub is_property: bool,
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// One entry of a member scope.
#[derive(Clone, Debug)]
pub struct ScopeMember {
    pub symbol: SymbolId,
    pub name: Name,
    /// The class whose scope materialized this member. For fake overrides
    /// this is the subclass, not the class that declared the original.
    pub containing_class: SymbolId,
    pub signature: MemberSignature,
    pub is_fake_override: bool,
}

/// Callable members of one class under one policy, indexed by name.
#[derive(Debug, Default)]
pub struct MemberScope {
    members: IndexMap<Name, Vec<ScopeMember>>,
}

impl MemberScope {
    fn add(&mut self, member: ScopeMember) {
        self.members.entry(member.name.clone()).or_default().push(member);
    }

    /// Case-sensitive exact-name lookup.
    pub fn callables_by_name(&self, name: &Name) -> &[ScopeMember] {
        self.members.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn process_all_callables(&self, mut f: impl FnMut(&ScopeMember)) {
        for members in self.members.values() {
            for member in members {
                f(member);
            }
        }
    }

    pub fn process_all_properties(&self, mut f: impl FnMut(&ScopeMember)) {
        self.process_all_callables(|member| {
            if member.signature.is_property {
                f(member);
            }
        });
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.values().map(Vec::len).sum()
    }
}

/// Per-session scope cache.
#[derive(Default)]
pub struct ScopeProvider {
    declared: DashMap<SymbolId, Arc<MemberScope>>,
    combined: DashMap<SymbolId, Arc<MemberScope>>,
}

impl ScopeProvider {
    pub fn new() -> Self {
        ScopeProvider::default()
    }

    /// Members written directly in source. No fake overrides, no
    /// compiler-synthesized declarations.
    pub fn declared_member_scope(
        &self,
        graph: &DeclarationGraph,
        class: SymbolId,
    ) -> Arc<MemberScope> {
        if let Some(cached) = self.declared.get(&class) {
            return Arc::clone(&cached);
        }
        let scope = Arc::new(self.compute_declared(graph, class));
        match self.declared.entry(class) {
            dashmap::Entry::Occupied(winner) => Arc::clone(winner.get()),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&scope));
                scope
            }
        }
    }

    /// Declared members plus fake overrides for everything inherited and not
    /// overridden textually, with supertype type parameters substituted.
    pub fn combined_member_scope(
        &self,
        graph: &DeclarationGraph,
        provider: &dyn SymbolProvider,
        class: SymbolId,
    ) -> Arc<MemberScope> {
        if let Some(cached) = self.combined.get(&class) {
            return Arc::clone(&cached);
        }
        let scope = Arc::new(self.compute_combined(graph, provider, class));
        match self.combined.entry(class) {
            dashmap::Entry::Occupied(winner) => Arc::clone(winner.get()),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&scope));
                scope
            }
        }
    }

    /// Evict cached scopes for a class whose source changed.
    pub fn invalidate(&self, class: SymbolId) {
        self.declared.remove(&class);
        self.combined.remove(&class);
    }

    fn compute_declared(&self, graph: &DeclarationGraph, class: SymbolId) -> MemberScope {
        let cell = graph.cell_of(class);
        let decl = cell.read();
        let class_decl = decl
            .as_class()
            .unwrap_or_else(|| panic!("declared_member_scope of non-class symbol {class:?}"));
        let mut scope = MemberScope::default();
        for &member_id in &class_decl.members {
            let member_cell = graph.cell(member_id);
            let member = member_cell.read();
            if member.origin != DeclarationOrigin::Source {
                continue;
            }
            if let Some(entry) = scope_member_of(&member, class) {
                scope.add(entry);
            }
        }
        scope
    }

    fn compute_combined(
        &self,
        graph: &DeclarationGraph,
        provider: &dyn SymbolProvider,
        class: SymbolId,
    ) -> MemberScope {
        let cell = graph.cell_of(class);
        assert!(
            cell.phase() >= ResolvePhase::TypesResolved,
            "combined_member_scope requires resolved member types"
        );
        let decl = cell.read();
        let class_decl = decl
            .as_class()
            .unwrap_or_else(|| panic!("combined_member_scope of non-class symbol {class:?}"));

        let mut scope = MemberScope::default();
        for &member_id in &class_decl.members {
            let member_cell = graph.cell(member_id);
            let member = member_cell.read();
            if let Some(entry) = scope_member_of(&member, class) {
                scope.add(entry);
            }
        }

        let supertypes = decl.supertypes.clone();
        drop(decl);

        let mut walked = 0usize;
        for supertype in &supertypes {
            let SimpleType::Class(super_class_type) = supertype.lower_bound_if_flexible() else {
                continue;
            };
            let Some(super_symbol) = provider.find_class(super_class_type.tag.class_id()) else {
                continue;
            };
            let super_scope = self.combined_member_scope(graph, provider, super_symbol);
            let substitutor = supertype_substitutor(graph, super_symbol, supertype);

            let mut inherited: Vec<ScopeMember> = Vec::new();
            super_scope.process_all_callables(|member| inherited.push(member.clone()));
            for inherited_member in inherited {
                walked += 1;
                assert!(
                    walked <= MAX_SUPERTYPE_WALK,
                    "runaway supertype member walk for {class:?}"
                );
                let substituted = substitute_signature(&inherited_member.signature, &substitutor);
                if is_overridden(&scope, &inherited_member.name, &substituted) {
                    continue;
                }
                let fake = materialize_fake_override(
                    graph,
                    class,
                    &cell,
                    &inherited_member,
                    substituted,
                );
                scope.add(fake);
            }
        }
        debug!(class = class.0, members = scope.len(), "combined scope computed");
        scope
    }
}

fn scope_member_of(decl: &Declaration, containing_class: SymbolId) -> Option<ScopeMember> {
    // Constructors and init blocks are not scope members; nested classes go
    // through the class-id namespace instead.
    if decl.name.as_str() == "<init>" {
        return None;
    }
    let signature = match &decl.kind {
        DeclKind::Function(function) => function_signature(function),
        DeclKind::Property(property) => property_signature(property),
        _ => return None,
    };
    Some(ScopeMember {
        symbol: decl.symbol,
        name: decl.name.clone(),
        containing_class,
        signature,
        is_fake_override: decl.is_fake_override(),
    })
}

fn function_signature(function: &FunctionDecl) -> MemberSignature {
    MemberSignature {
        is_property: false,
        params: function
            .params
            .iter()
            .map(|param| param.type_ref.resolved_type())
            .collect(),
        return_type: function.return_type.resolved_type(),
    }
}

fn property_signature(property: &PropertyDecl) -> MemberSignature {
    MemberSignature {
        is_property: true,
        params: Vec::new(),
        return_type: property.type_ref.resolved_type(),
    }
}

/// Substitutor mapping the supertype class's type parameters to the
/// arguments at this use site (`Box<Int>` maps `T -> Int`).
fn supertype_substitutor(
    graph: &DeclarationGraph,
    super_symbol: SymbolId,
    supertype: &Type,
) -> TypeSubstitutor {
    let super_cell = graph.cell_of(super_symbol);
    let super_decl = super_cell.read();
    let Some(super_class) = super_decl.as_class() else {
        return TypeSubstitutor::empty();
    };
    let params: Vec<_> = super_class.type_params.iter().map(|p| p.id).collect();
    substitutor_for_arguments(&params, supertype.arguments())
}

fn substitute_signature(signature: &MemberSignature, substitutor: &TypeSubstitutor) -> MemberSignature {
    MemberSignature {
        is_property: signature.is_property,
        params: signature
            .params
            .iter()
            .map(|param| substitutor.substitute(param))
            .collect(),
        return_type: substitutor.substitute(&signature.return_type),
    }
}

/// A textual override (or an already-added fake override from an earlier
/// supertype) suppresses synthesis: functions match on name + parameter
/// types, properties on name.
fn is_overridden(scope: &MemberScope, name: &Name, signature: &MemberSignature) -> bool {
    scope.callables_by_name(name).iter().any(|existing| {
        existing.signature.is_property == signature.is_property
            && (signature.is_property || existing.signature.params == signature.params)
    })
}

/// Create the synthetic graph node for an inherited member: containing
/// declaration repointed at the subclass, signature substituted, anchored to
/// the subclass's element under the fake-override kind. Born fully resolved.
fn materialize_fake_override(
    graph: &DeclarationGraph,
    class: SymbolId,
    class_cell: &Arc<DeclarationCell>,
    inherited: &ScopeMember,
    signature: MemberSignature,
) -> ScopeMember {
    let original_cell = graph.cell_of(inherited.symbol);
    let original = original_cell.read();
    let class_decl = class_cell.read();
    let source = class_decl.source.fake_element(FakeElementKind::FakeOverride);

    let kind = if signature.is_property {
        let original_property = original
            .as_property()
            .expect("property scope member backed by non-property declaration");
        DeclKind::Property(PropertyDecl {
            is_var: original_property.is_var,
            receiver: None,
            type_params: Vec::new(),
            type_ref: TypeRef::resolved(source.clone(), signature.return_type.clone()),
            initializer: None,
            delegate: None,
            getter: None,
            setter: None,
        })
    } else {
        let original_function = original
            .as_function()
            .expect("function scope member backed by non-function declaration");
        DeclKind::Function(FunctionDecl {
            type_params: Vec::new(),
            params: original_function
                .params
                .iter()
                .zip(&signature.params)
                .map(|(param, ty)| ValueParam {
                    name: param.name.clone(),
                    source: source.clone(),
                    type_ref: TypeRef::resolved(source.clone(), ty.clone()),
                    is_vararg: param.is_vararg,
                    is_noinline: param.is_noinline,
                })
                .collect(),
            return_type: TypeRef::resolved(source.clone(), signature.return_type.clone()),
            body: None,
            is_inline: false,
            is_anonymous: false,
        })
    };

    let symbol_kind = if signature.is_property {
        SymbolKind::Property
    } else {
        SymbolKind::Function
    };
    let symbol = graph.symbols.alloc(symbol_kind, crate::graph::DeclId(u32::MAX));
    let decl = Declaration {
        symbol,
        name: inherited.name.clone(),
        source,
        origin: DeclarationOrigin::FakeOverride {
            original: inherited.symbol,
        },
        module: class_decl.module,
        file: class_decl.file,
        containing_class: Some(class),
        visibility: original.visibility,
        modality: original.modality,
        is_expect: original.is_expect,
        is_actual: original.is_actual,
        suppressions: Vec::new(),
        kind,
        supertypes: Vec::new(),
    };
    drop(original);
    drop(class_decl);
    let decl_id = graph.add_cell(DeclarationCell::new_resolved(decl));
    graph.symbols.rebind(symbol, decl_id);

    ScopeMember {
        symbol,
        name: inherited.name.clone(),
        containing_class: class,
        signature,
        is_fake_override: true,
    }
}
