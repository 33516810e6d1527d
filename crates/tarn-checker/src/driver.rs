//! Checker drivers: walk the resolved graph once per compilation unit and
//! run every applicable rule per node.
//!
//! The walk is read-only; diagnostics are the only side channel. Top-level
//! declarations check in parallel, each subtree with its own context (the
//! containing-declaration stack is path state, not shared state).
//! Cancellation is observed at node boundaries.

use crate::context::CheckerContext;
use crate::registry::{
    CheckerRegistry, RuleSessionKind, decl_kind_tag, expr_kind_tag, invoke_declaration_rule,
    invoke_expression_rule,
};
use rayon::prelude::*;
use std::sync::Arc;
use tarn_binder::{
    DeclId, DeclKind, Declaration, ExprId, ExprKind, ModulePlatform, ResolvePhase, Session,
};
use tarn_common::{Cancelled, CancellationToken, DiagnosticSink};
use tracing::debug;

pub struct CheckerDriver {
    registry: Arc<CheckerRegistry>,
    session: Arc<Session>,
    sink: Arc<DiagnosticSink>,
}

impl CheckerDriver {
    pub fn new(
        registry: Arc<CheckerRegistry>,
        session: Arc<Session>,
        sink: Arc<DiagnosticSink>,
    ) -> Self {
        CheckerDriver {
            registry,
            session,
            sink,
        }
    }

    /// Check every top-level declaration tree, in parallel.
    pub fn check_graph(&self, token: &CancellationToken) -> Result<(), Cancelled> {
        let top_level = self.session.graph.top_level_decl_ids();
        debug!(roots = top_level.len(), "checker walk starting");
        top_level.par_iter().try_for_each(|&decl| {
            let mut context =
                CheckerContext::new(Arc::clone(&self.session), Arc::clone(&self.sink));
            self.check_declaration_tree(&mut context, decl, token)
        })
    }

    /// Check one declaration and everything nested in it.
    pub fn check_declaration_tree(
        &self,
        context: &mut CheckerContext,
        decl_id: DeclId,
        token: &CancellationToken,
    ) -> Result<(), Cancelled> {
        token.check()?;
        let cell = self.session.graph.cell(decl_id);
        assert!(
            cell.phase() == ResolvePhase::BodyResolved,
            "checker walk over an unresolved declaration (phase {:?})",
            cell.phase()
        );

        let mut bodies: Vec<ExprId> = Vec::new();
        let mut members: Vec<DeclId> = Vec::new();
        {
            let decl = cell.read();
            // The stack includes the declaration being checked, so its own
            // suppression scope covers what its rules report.
            context.push_declaration(decl_id, &decl.suppressions);
            for rule in &self.registry.declaration_rules {
                if !rule.applies_to.contains(decl_kind_tag(&decl)) {
                    continue;
                }
                if !self.session_allows(rule.session, &decl) {
                    continue;
                }
                invoke_declaration_rule(rule, context, &decl);
            }
            match &decl.kind {
                DeclKind::Class(class) => members.extend(&class.members),
                DeclKind::Function(function) => bodies.extend(function.body),
                DeclKind::Property(property) => {
                    bodies.extend(property.initializer);
                    bodies.extend(property.delegate);
                    for accessor in [property.getter.as_ref(), property.setter.as_ref()]
                        .into_iter()
                        .flatten()
                    {
                        bodies.extend(accessor.body);
                    }
                }
                DeclKind::AnonymousInitializer { body } => bodies.extend(*body),
                DeclKind::TypeAlias(_) => {}
            }
        }

        let result = (|| {
            for body in bodies {
                self.check_expression_tree(context, body, token)?;
            }
            for member in members {
                self.check_declaration_tree(context, member, token)?;
            }
            Ok(())
        })();
        context.pop_declaration();
        result
    }

    fn check_expression_tree(
        &self,
        context: &mut CheckerContext,
        expr_id: ExprId,
        token: &CancellationToken,
    ) -> Result<(), Cancelled> {
        let expr = self.session.graph.expr(expr_id);
        if let Some(tag) = expr_kind_tag(&expr) {
            for rule in &self.registry.expression_rules {
                if !rule.applies_to.contains(tag) {
                    continue;
                }
                if !self.session_allows_expression(rule.session) {
                    continue;
                }
                invoke_expression_rule(rule, context, expr_id, &expr);
            }
        }
        match &expr.kind {
            ExprKind::Block { statements } => {
                for &statement in statements {
                    self.check_expression_tree(context, statement, token)?;
                }
            }
            ExprKind::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    self.check_expression_tree(context, *receiver, token)?;
                }
                for &arg in args {
                    self.check_expression_tree(context, arg, token)?;
                }
            }
            ExprKind::When { branches } => {
                for &branch in branches {
                    self.check_expression_tree(context, branch, token)?;
                }
            }
            ExprKind::Loop { body, .. } => self.check_expression_tree(context, *body, token)?,
            ExprKind::LocalVariable { initializer, .. } => {
                if let Some(initializer) = initializer {
                    self.check_expression_tree(context, *initializer, token)?;
                }
            }
            ExprKind::Return { value } => {
                if let Some(value) = value {
                    self.check_expression_tree(context, *value, token)?;
                }
            }
            // Nested declarations check as declaration trees of their own.
            ExprKind::Lambda { function } => {
                self.check_declaration_tree(context, *function, token)?;
            }
            ExprKind::AnonymousObject { class } => {
                self.check_declaration_tree(context, *class, token)?;
            }
            ExprKind::Jump { .. } | ExprKind::NameRef { .. } | ExprKind::Literal { .. } => {}
        }
        Ok(())
    }

    /// Declaration-site rules run where the declaration declares itself:
    /// for `expect` declarations that is the common session only. Use-site
    /// rules run in platform sessions.
    fn session_allows(&self, kind: RuleSessionKind, decl: &Declaration) -> bool {
        match kind {
            RuleSessionKind::Both => true,
            RuleSessionKind::DeclarationSite => {
                !decl.is_expect || self.session.platform() == ModulePlatform::Common
            }
            RuleSessionKind::UseSite => self.session.platform() == ModulePlatform::Platform,
        }
    }

    fn session_allows_expression(&self, kind: RuleSessionKind) -> bool {
        match kind {
            RuleSessionKind::Both => true,
            RuleSessionKind::DeclarationSite => self.session.platform() == ModulePlatform::Common,
            RuleSessionKind::UseSite => self.session.platform() == ModulePlatform::Platform,
        }
    }
}
