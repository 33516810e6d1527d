//! Rule registry.
//!
//! Rules are data: an applicability filter over node kinds, a session-kind
//! tag for expect/actual filtering, and a check function. Drivers dispatch
//! by kind tag; invoking a rule on a node its filter excludes is a
//! programming error and fails fast naming both.

use crate::context::CheckerContext;
use bitflags::bitflags;
use tarn_binder::{DeclKind, Declaration, ExprId, ExprKind, Expression};

bitflags! {
    /// Declaration kinds a rule applies to.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DeclKindFilter: u8 {
        const CLASS = 1 << 0;
        const FUNCTION = 1 << 1;
        const PROPERTY = 1 << 2;
        const TYPE_ALIAS = 1 << 3;
        const ANONYMOUS_INITIALIZER = 1 << 4;
    }
}

bitflags! {
    /// Expression kinds a rule applies to.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ExprKindFilter: u8 {
        const CALL = 1 << 0;
        const JUMP = 1 << 1;
        const LOOP = 1 << 2;
        const LAMBDA = 1 << 3;
    }
}

pub fn decl_kind_tag(decl: &Declaration) -> DeclKindFilter {
    match &decl.kind {
        DeclKind::Class(_) => DeclKindFilter::CLASS,
        DeclKind::Function(_) => DeclKindFilter::FUNCTION,
        DeclKind::Property(_) => DeclKindFilter::PROPERTY,
        DeclKind::TypeAlias(_) => DeclKindFilter::TYPE_ALIAS,
        DeclKind::AnonymousInitializer { .. } => DeclKindFilter::ANONYMOUS_INITIALIZER,
    }
}

pub fn expr_kind_tag(expr: &Expression) -> Option<ExprKindFilter> {
    match &expr.kind {
        ExprKind::Call { .. } => Some(ExprKindFilter::CALL),
        ExprKind::Jump { .. } => Some(ExprKindFilter::JUMP),
        ExprKind::Loop { .. } => Some(ExprKindFilter::LOOP),
        ExprKind::Lambda { .. } => Some(ExprKindFilter::LAMBDA),
        _ => None,
    }
}

/// Where a rule runs for multi-platform expect/actual pairs.
///
/// `DeclarationSite` rules run where a declaration is declared: for
/// `expect` declarations that is the common module only; everything else
/// declares itself wherever it lives. `UseSite` rules run in platform
/// sessions only. `Both` always runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuleSessionKind {
    DeclarationSite,
    UseSite,
    Both,
}

pub struct DeclarationRule {
    pub name: &'static str,
    pub applies_to: DeclKindFilter,
    pub session: RuleSessionKind,
    pub check: fn(&CheckerContext, &Declaration),
}

pub struct ExpressionRule {
    pub name: &'static str,
    pub applies_to: ExprKindFilter,
    pub session: RuleSessionKind,
    pub check: fn(&CheckerContext, ExprId, &Expression),
}

/// The registered rule set for a session. Rules are independent: no rule
/// may rely on another having run, and the driver invokes them in
/// unspecified order.
pub struct CheckerRegistry {
    pub declaration_rules: Vec<DeclarationRule>,
    pub expression_rules: Vec<ExpressionRule>,
}

impl CheckerRegistry {
    pub fn empty() -> Self {
        CheckerRegistry {
            declaration_rules: Vec::new(),
            expression_rules: Vec::new(),
        }
    }

    /// The built-in language rule set.
    pub fn builtin() -> Self {
        let mut registry = CheckerRegistry::empty();
        registry.declaration_rules.push(crate::rules::accessors::RULE);
        registry.declaration_rules.push(crate::rules::delegates::RULE);
        registry.expression_rules.push(crate::rules::jumps::RULE);
        registry.expression_rules.push(crate::rules::safe_calls::RULE);
        registry
    }

    pub fn register_declaration_rule(&mut self, rule: DeclarationRule) {
        self.declaration_rules.push(rule);
    }

    pub fn register_expression_rule(&mut self, rule: ExpressionRule) {
        self.expression_rules.push(rule);
    }
}

/// Invoke a declaration rule, enforcing its applicability filter. A filter
/// mismatch is a driver/rule wiring bug, not user input.
pub fn invoke_declaration_rule(
    rule: &DeclarationRule,
    context: &CheckerContext,
    decl: &Declaration,
) {
    let tag = decl_kind_tag(decl);
    assert!(
        rule.applies_to.contains(tag),
        "rule '{}' does not support declaration kind {tag:?}",
        rule.name
    );
    (rule.check)(context, decl);
}

pub fn invoke_expression_rule(
    rule: &ExpressionRule,
    context: &CheckerContext,
    id: ExprId,
    expr: &Expression,
) {
    let Some(tag) = expr_kind_tag(expr) else {
        panic!(
            "rule '{}' invoked on an expression kind outside every filter",
            rule.name
        );
    };
    assert!(
        rule.applies_to.contains(tag),
        "rule '{}' does not support expression kind {tag:?}",
        rule.name
    );
    (rule.check)(context, id, expr);
}
