//! Declaration graph, member scopes, and symbol providers.
//!
//! The builder turns syntax into unresolved declaration cells; the solver
//! crate advances them through resolution phases; scopes and providers are
//! the lookup surfaces both the solver and the checkers consult.

pub mod builder;
pub mod decls;
pub mod exprs;
pub mod graph;
pub mod modules;
pub mod providers;
pub mod scopes;
pub mod session;
pub mod symbols;
pub mod visibility;

pub use builder::DeclarationGraphBuilder;
pub use decls::{
    ClassDecl, ClassDeclKind, DeclKind, Declaration, DeclarationCell, DeclarationOrigin,
    FunctionDecl, PropertyAccessor, PropertyDecl, ResolvePhase, TypeAliasDecl, TypeParamDecl,
    TypeRef, ValueParam,
};
pub use exprs::{ExprId, ExprKind, Expression, JumpKind, ResolvedCall};
pub use graph::{DeclId, DeclarationGraph, GraphFile};
pub use modules::{ModuleData, ModuleId, ModuleKind, ModulePlatform, ModuleRegistry};
pub use providers::{CompositeSymbolProvider, GraphSymbolProvider, RequireSymbol, SymbolProvider};
pub use scopes::{MemberScope, MemberSignature, ScopeMember, ScopeProvider};
pub use session::Session;
pub use symbols::{SymbolArena, SymbolId, SymbolKind};
pub use visibility::{
    DanglingAwarePrivateVisibility, DefaultPrivateVisibility,
    PrivateVisibleFromDifferentModuleExtension,
};
