//! Checker context: what a rule may know beyond the node it was given.

use rustc_hash::FxHashSet;
use std::sync::Arc;
use tarn_binder::{ClassDeclKind, DeclId, DeclKind, Session};
use tarn_common::{Diagnostic, DiagnosticFactory, DiagnosticSink, SourceElement};

/// Read-only context threaded through every rule invocation: the session,
/// the containing-declaration stack, and the active suppression scopes.
/// Rules report through [`CheckerContext::report_on`], which consults the
/// suppression scopes; everything else is the session's surface.
pub struct CheckerContext {
    pub session: Arc<Session>,
    sink: Arc<DiagnosticSink>,
    containing_declarations: Vec<DeclId>,
    suppressed: Vec<FxHashSet<String>>,
}

impl CheckerContext {
    pub fn new(session: Arc<Session>, sink: Arc<DiagnosticSink>) -> Self {
        CheckerContext {
            session,
            sink,
            containing_declarations: Vec::new(),
            suppressed: Vec::new(),
        }
    }

    pub fn containing_declarations(&self) -> &[DeclId] {
        &self.containing_declarations
    }

    /// The nearest enclosing class-like declaration, if any.
    pub fn closest_class(&self) -> Option<DeclId> {
        self.containing_declarations
            .iter()
            .rev()
            .copied()
            .find(|&decl| {
                matches!(
                    self.session.graph.cell(decl).read().kind,
                    DeclKind::Class(_)
                )
            })
    }

    /// Kind of the nearest enclosing class-like declaration.
    pub fn closest_class_kind(&self) -> Option<ClassDeclKind> {
        let class_id = self.closest_class()?;
        let cell = self.session.graph.cell(class_id);
        let decl = cell.read();
        match &decl.kind {
            DeclKind::Class(class) => Some(class.class_kind),
            _ => None,
        }
    }

    /// Whether the closest class may own abstract members.
    pub fn closest_class_can_have_abstract_members(&self) -> bool {
        let Some(class_id) = self.closest_class() else {
            return false;
        };
        let cell = self.session.graph.cell(class_id);
        let decl = cell.read();
        match &decl.kind {
            DeclKind::Class(class) => {
                class.class_kind == ClassDeclKind::Interface
                    || matches!(
                        decl.modality,
                        tarn_common::Modality::Abstract | tarn_common::Modality::Sealed
                    )
            }
            _ => false,
        }
    }

    pub(crate) fn push_declaration(&mut self, decl: DeclId, suppressions: &[String]) {
        self.containing_declarations.push(decl);
        self.suppressed
            .push(suppressions.iter().cloned().collect::<FxHashSet<_>>());
    }

    pub(crate) fn pop_declaration(&mut self) {
        self.containing_declarations.pop();
        self.suppressed.pop();
    }

    /// A factory is suppressed when any enclosing declaration's suppression
    /// scope names it.
    pub fn is_suppressed(&self, factory_name: &str) -> bool {
        self.suppressed
            .iter()
            .any(|scope| scope.contains(factory_name))
    }

    /// Report unless a suppression scope covers the factory.
    pub fn report_on(&self, source: &SourceElement, factory: DiagnosticFactory, args: &[&str]) {
        if self.is_suppressed(factory.name) {
            return;
        }
        self.sink.report(Diagnostic::new(
            factory,
            source.clone(),
            args.iter().map(|arg| arg.to_string()).collect(),
        ));
    }
}
