//! Checker framework for the Tarn frontend.
//!
//! Rules are registered as data (node-kind filter, session kind, check
//! function); drivers walk the resolved graph read-only, dispatch by kind
//! tag, and report through the shared sink with scope-aware suppression.

pub mod context;
pub mod driver;
pub mod errors;
pub mod registry;
pub mod rules;

pub use context::CheckerContext;
pub use driver::CheckerDriver;
pub use registry::{
    CheckerRegistry, DeclKindFilter, DeclarationRule, ExprKindFilter, ExpressionRule,
    RuleSessionKind, decl_kind_tag, expr_kind_tag, invoke_declaration_rule, invoke_expression_rule,
};
