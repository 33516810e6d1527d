//! `break`/`continue` must not cross a function boundary.
//!
//! A depth-first walk from the jump's target loop outward toward the jump
//! itself, pushing a boundary marker whenever the path descends into a
//! function, lambda, anonymous object, or initializer. Inline lambda bodies
//! are transparent when the enclosing call's matching parameter is inline
//! and not `noinline`, gated by the language feature that permits jumps
//! through inline lambdas at all. The walk stops at the first path that
//! reaches the jump: the lexical target is unique per jump by construction,
//! so a single-path existence check is exact.

use crate::context::CheckerContext;
use crate::errors;
use crate::registry::{ExprKindFilter, ExpressionRule, RuleSessionKind};
use tarn_binder::{DeclId, DeclKind, ExprId, ExprKind, Expression};
use tarn_common::LanguageFeature;

pub const RULE: ExpressionRule = ExpressionRule {
    name: "BreakOrContinueJumpsAcrossFunctionBoundary",
    applies_to: ExprKindFilter::JUMP,
    session: RuleSessionKind::Both,
    check,
};

fn check(context: &CheckerContext, jump: ExprId, expr: &Expression) {
    let ExprKind::Jump {
        target: Some(target),
        ..
    } = &expr.kind
    else {
        // A jump without a loop target was already reported by resolution.
        return;
    };
    let loop_expr = context.session.graph.expr(*target);
    let ExprKind::Loop { body, .. } = &loop_expr.kind else {
        return;
    };
    let mut walk = Walk {
        context,
        jump,
        jump_source: expr,
        boundaries: 0,
    };
    walk.find_path_and_check(Some(*body), false);
}

struct Walk<'a> {
    context: &'a CheckerContext,
    jump: ExprId,
    jump_source: &'a Expression,
    /// Count of boundary markers currently on the path stack.
    boundaries: usize,
}

impl Walk<'_> {
    fn with_boundary(&mut self, element: Option<ExprId>) -> bool {
        self.boundaries += 1;
        let found = self.find_path_and_check(element, false);
        self.boundaries -= 1;
        found
    }

    /// Returns true as soon as the jump is found along this path.
    fn find_path_and_check(&mut self, element: Option<ExprId>, is_inline: bool) -> bool {
        let Some(element) = element else {
            return false;
        };
        if element == self.jump {
            if self.boundaries > 0 {
                self.context.report_on(
                    &self.jump_source.source,
                    errors::BREAK_OR_CONTINUE_JUMPS_ACROSS_FUNCTION_BOUNDARY,
                    &[],
                );
            }
            return true;
        }

        let expr = self.context.session.graph.expr(element);
        match &expr.kind {
            ExprKind::Block { statements } => statements
                .iter()
                .any(|&statement| self.find_path_and_check(Some(statement), false)),
            ExprKind::When { branches } => branches
                .iter()
                .any(|&branch| self.find_path_and_check(Some(branch), false)),
            ExprKind::LocalVariable { initializer, .. } => {
                self.find_path_and_check(*initializer, false)
            }
            ExprKind::Return { value } => self.find_path_and_check(*value, false),
            ExprKind::Loop { body, .. } => self.find_path_and_check(Some(*body), false),
            ExprKind::Call {
                receiver, args, ..
            } => {
                if self.find_path_and_check(*receiver, false) {
                    return true;
                }
                let callee_params = expr.resolved_call().map(|resolved| {
                    let cell = self.context.session.graph.cell_of(resolved.callee);
                    let decl = cell.read();
                    match &decl.kind {
                        DeclKind::Function(function) => (
                            function.is_inline,
                            function
                                .params
                                .iter()
                                .map(|param| param.is_noinline)
                                .collect::<Vec<_>>(),
                        ),
                        _ => (false, Vec::new()),
                    }
                });
                args.iter().enumerate().any(|(i, &arg)| {
                    let arg_is_inline = match &callee_params {
                        Some((callee_is_inline, noinline)) => {
                            *callee_is_inline && !noinline.get(i).copied().unwrap_or(false)
                        }
                        None => false,
                    };
                    self.find_path_and_check(Some(arg), arg_is_inline)
                })
            }
            ExprKind::Lambda { function } => {
                let body = function_body(self.context, *function);
                // An inline lambda is transparent when the language permits
                // jumping through it; otherwise (and for non-inline
                // arguments) the lambda is a boundary.
                if self
                    .context
                    .session
                    .features
                    .supports(LanguageFeature::BreakContinueInInlineLambdas)
                    && is_inline
                    && self.find_path_and_check(body, false)
                {
                    return true;
                }
                self.with_boundary(body)
            }
            ExprKind::AnonymousObject { class } => {
                self.boundaries += 1;
                let found = self.walk_class_members(*class);
                self.boundaries -= 1;
                found
            }
            ExprKind::Jump { .. } | ExprKind::NameRef { .. } | ExprKind::Literal { .. } => false,
        }
    }

    fn walk_class_members(&mut self, class: DeclId) -> bool {
        enum MemberWalk {
            Boundary(Option<ExprId>),
            Transparent(Option<ExprId>),
            Skip,
        }
        let members: Vec<DeclId> = {
            let cell = self.context.session.graph.cell(class);
            let decl = cell.read();
            match &decl.kind {
                DeclKind::Class(class_decl) => class_decl.members.clone(),
                _ => return false,
            }
        };
        for member in members {
            let walk = {
                let cell = self.context.session.graph.cell(member);
                let decl = cell.read();
                match &decl.kind {
                    DeclKind::Function(function) => MemberWalk::Boundary(function.body),
                    // Initializers of member variables run in the enclosing
                    // frame; they are not a boundary of their own.
                    DeclKind::Property(property) => MemberWalk::Transparent(property.initializer),
                    DeclKind::AnonymousInitializer { body } => MemberWalk::Boundary(*body),
                    _ => MemberWalk::Skip,
                }
            };
            let found = match walk {
                MemberWalk::Boundary(body) => self.with_boundary(body),
                MemberWalk::Transparent(body) => self.find_path_and_check(body, false),
                MemberWalk::Skip => false,
            };
            if found {
                return true;
            }
        }
        false
    }
}

fn function_body(context: &CheckerContext, function: DeclId) -> Option<ExprId> {
    let cell = context.session.graph.cell(function);
    let decl = cell.read();
    decl.as_function().and_then(|f| f.body)
}
