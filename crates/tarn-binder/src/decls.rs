//! Declaration-graph nodes and the resolution phase state machine.

use crate::exprs::ExprId;
use crate::modules::ModuleId;
use crate::symbols::SymbolId;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tarn_common::{FileId, Modality, Name, SourceElement, Visibility};
use tarn_syntax::NodeIndex;
use tarn_types::{Type, TypeParameterId};

/// Resolution phases, in order. A declaration's phase only ever advances.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ResolvePhase {
    Unresolved = 0,
    SupertypesResolved = 1,
    StatusResolved = 2,
    TypesResolved = 3,
    BodyResolved = 4,
}

impl ResolvePhase {
    pub const LAST: ResolvePhase = ResolvePhase::BodyResolved;

    pub fn next(self) -> Option<ResolvePhase> {
        match self {
            ResolvePhase::Unresolved => Some(ResolvePhase::SupertypesResolved),
            ResolvePhase::SupertypesResolved => Some(ResolvePhase::StatusResolved),
            ResolvePhase::StatusResolved => Some(ResolvePhase::TypesResolved),
            ResolvePhase::TypesResolved => Some(ResolvePhase::BodyResolved),
            ResolvePhase::BodyResolved => None,
        }
    }

    fn from_u8(raw: u8) -> ResolvePhase {
        match raw {
            0 => ResolvePhase::Unresolved,
            1 => ResolvePhase::SupertypesResolved,
            2 => ResolvePhase::StatusResolved,
            3 => ResolvePhase::TypesResolved,
            4 => ResolvePhase::BodyResolved,
            other => unreachable!("invalid phase tag {other}"),
        }
    }
}

/// Where a graph node came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclarationOrigin {
    /// Written in source.
    Source,
    /// Synthesized by the graph builder (default accessor, implicit
    /// constructor, ...).
    Synthetic,
    /// Materialized by the combined member scope for an inherited,
    /// non-overridden member of `original`.
    FakeOverride { original: SymbolId },
}

/// A written (or implicit) type position, resolved during the types phase.
#[derive(Debug)]
pub struct TypeRef {
    pub source: SourceElement,
    /// Syntax node of the written type, `NONE` for implicit positions.
    pub node: NodeIndex,
    resolved: RwLock<Option<Type>>,
}

impl TypeRef {
    pub fn from_syntax(source: SourceElement, node: NodeIndex) -> Self {
        TypeRef {
            source,
            node,
            resolved: RwLock::new(None),
        }
    }

    /// An already-resolved ref, used for synthesized declarations.
    pub fn resolved(source: SourceElement, ty: Type) -> Self {
        TypeRef {
            source,
            node: NodeIndex::NONE,
            resolved: RwLock::new(Some(ty)),
        }
    }

    pub fn is_implicit(&self) -> bool {
        self.node.is_none()
    }

    pub fn ty(&self) -> Option<Type> {
        self.resolved.read().expect("type ref poisoned").clone()
    }

    /// The resolved type; panics when the owning declaration has not reached
    /// the types phase yet.
    pub fn resolved_type(&self) -> Type {
        self.ty().expect("type ref read before types were resolved")
    }

    /// Commit the resolved type. First writer wins, matching the
    /// computed-once rule for race losers.
    pub fn resolve_to(&self, ty: Type) {
        let mut slot = self.resolved.write().expect("type ref poisoned");
        if slot.is_none() {
            *slot = Some(ty);
        }
    }
}

#[derive(Debug)]
pub struct TypeParamDecl {
    pub id: TypeParameterId,
    pub name: Name,
    pub bounds: Vec<TypeRef>,
}

#[derive(Debug)]
pub struct ValueParam {
    pub name: Name,
    pub source: SourceElement,
    pub type_ref: TypeRef,
    pub is_vararg: bool,
    pub is_noinline: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassDeclKind {
    Class,
    Interface,
    EnumClass,
    Object,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub class_kind: ClassDeclKind,
    pub type_params: Vec<TypeParamDecl>,
    pub supertype_refs: Vec<TypeRef>,
    pub members: Vec<crate::graph::DeclId>,
    pub is_anonymous: bool,
}

#[derive(Debug)]
pub struct FunctionDecl {
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ValueParam>,
    pub return_type: TypeRef,
    pub body: Option<ExprId>,
    pub is_inline: bool,
    pub is_anonymous: bool,
}

#[derive(Debug)]
pub struct PropertyAccessor {
    pub is_getter: bool,
    pub source: SourceElement,
    /// Visibility written on the accessor itself, if any.
    pub explicit_visibility: Option<Visibility>,
    /// Effective visibility; defaults to the property's during status
    /// resolution.
    pub visibility: RwLock<Visibility>,
    pub param: Option<ValueParam>,
    pub return_type: TypeRef,
    pub body: Option<ExprId>,
}

impl PropertyAccessor {
    pub fn effective_visibility(&self) -> Visibility {
        *self.visibility.read().expect("accessor poisoned")
    }

    pub fn set_effective_visibility(&self, visibility: Visibility) {
        *self.visibility.write().expect("accessor poisoned") = visibility;
    }
}

#[derive(Debug)]
pub struct PropertyDecl {
    pub is_var: bool,
    pub receiver: Option<TypeRef>,
    pub type_params: Vec<TypeParamDecl>,
    pub type_ref: TypeRef,
    pub initializer: Option<ExprId>,
    pub delegate: Option<ExprId>,
    pub getter: Option<PropertyAccessor>,
    pub setter: Option<PropertyAccessor>,
}

impl PropertyDecl {
    pub fn is_extension(&self) -> bool {
        self.receiver.is_some()
    }
}

#[derive(Debug)]
pub struct TypeAliasDecl {
    pub type_params: Vec<TypeParamDecl>,
    pub expanded_ref: TypeRef,
}

#[derive(Debug)]
pub enum DeclKind {
    Class(ClassDecl),
    TypeAlias(TypeAliasDecl),
    Function(FunctionDecl),
    Property(PropertyDecl),
    AnonymousInitializer { body: Option<ExprId> },
}

/// One declaration-graph node.
#[derive(Debug)]
pub struct Declaration {
    pub symbol: SymbolId,
    pub name: Name,
    pub source: SourceElement,
    pub origin: DeclarationOrigin,
    pub module: ModuleId,
    pub file: FileId,
    pub containing_class: Option<SymbolId>,
    pub visibility: Visibility,
    pub modality: Modality,
    pub is_expect: bool,
    pub is_actual: bool,
    /// Diagnostic factory names suppressed for this declaration's subtree.
    pub suppressions: Vec<String>,
    pub kind: DeclKind,
    /// Supertypes, filled at `SupertypesResolved` for classes.
    pub supertypes: Vec<Type>,
}

impl Declaration {
    pub fn as_class(&self) -> Option<&ClassDecl> {
        match &self.kind {
            DeclKind::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertyDecl> {
        match &self.kind {
            DeclKind::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_type_alias(&self) -> Option<&TypeAliasDecl> {
        match &self.kind {
            DeclKind::TypeAlias(alias) => Some(alias),
            _ => None,
        }
    }

    pub fn is_fake_override(&self) -> bool {
        matches!(self.origin, DeclarationOrigin::FakeOverride { .. })
    }
}

/// Shared cell around one declaration: the atomic phase tag, the
/// single-flight resolve lock, and the node itself.
///
/// Phase advancement contract: a resolver takes `resolve_lock`, re-checks
/// the phase, computes the next phase's data against `read()` state, then
/// commits via `write()` + `advance_phase`. Readers that only need data of
/// an already-reached phase take `read()` without the resolve lock.
#[derive(Debug)]
pub struct DeclarationCell {
    symbol: SymbolId,
    phase: AtomicU8,
    resolve_lock: Mutex<()>,
    decl: RwLock<Declaration>,
}

impl DeclarationCell {
    pub fn new(decl: Declaration) -> Self {
        DeclarationCell {
            symbol: decl.symbol,
            phase: AtomicU8::new(ResolvePhase::Unresolved as u8),
            resolve_lock: Mutex::new(()),
            decl: RwLock::new(decl),
        }
    }

    /// A node created in an already-resolved state (fake overrides).
    pub fn new_resolved(decl: Declaration) -> Self {
        DeclarationCell {
            symbol: decl.symbol,
            phase: AtomicU8::new(ResolvePhase::BodyResolved as u8),
            resolve_lock: Mutex::new(()),
            decl: RwLock::new(decl),
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn phase(&self) -> ResolvePhase {
        ResolvePhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Declaration> {
        self.decl.read().expect("declaration cell poisoned")
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Declaration> {
        self.decl.write().expect("declaration cell poisoned")
    }

    pub fn lock_for_resolve(&self) -> MutexGuard<'_, ()> {
        self.resolve_lock.lock().expect("resolve lock poisoned")
    }

    /// Commit a phase transition. Strictly monotonic; skipping or regressing
    /// is a resolver bug and fails fast.
    pub fn advance_phase(&self, to: ResolvePhase) {
        let current = self.phase();
        assert_eq!(
            current.next(),
            Some(to),
            "non-monotonic phase transition {current:?} -> {to:?}"
        );
        self.phase.store(to as u8, Ordering::Release);
    }
}
