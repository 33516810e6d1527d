//! `?.` on a receiver that can never be null.

use crate::context::CheckerContext;
use crate::errors;
use crate::registry::{ExprKindFilter, ExpressionRule, RuleSessionKind};
use tarn_binder::{ExprId, ExprKind, Expression};
use tarn_types::Nullability;

pub const RULE: ExpressionRule = ExpressionRule {
    name: "UnnecessarySafeCall",
    applies_to: ExprKindFilter::CALL,
    session: RuleSessionKind::Both,
    check,
};

fn check(context: &CheckerContext, _id: ExprId, expr: &Expression) {
    let ExprKind::Call {
        receiver: Some(receiver),
        is_safe: true,
        ..
    } = &expr.kind
    else {
        return;
    };
    let receiver_expr = context.session.graph.expr(*receiver);
    let Some(receiver_type) = receiver_expr.resolved_type() else {
        return;
    };
    if receiver_type.is_error() {
        return;
    }
    if receiver_type.nullability() == Nullability::NotNull {
        context.report_on(
            &expr.source,
            errors::UNNECESSARY_SAFE_CALL,
            &[&receiver_type.to_string()],
        );
    }
}
