//! Typed expression trees for declaration bodies.
//!
//! The builder produces these in their unresolved shape; body resolution
//! fills in types and callee references through write-once slots. Checkers
//! walk them read-only.

use crate::graph::DeclId;
use crate::symbols::SymbolId;
use std::sync::OnceLock;
use tarn_common::{Name, SourceElement};
use tarn_syntax::{ConstantValue, NodeIndex};
use tarn_types::Type;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpKind {
    Break,
    Continue,
}

/// Resolved callee of a call expression.
#[derive(Clone, Debug)]
pub struct ResolvedCall {
    pub callee: SymbolId,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Block {
        statements: Vec<ExprId>,
    },
    Call {
        callee_name: Name,
        receiver: Option<ExprId>,
        args: Vec<ExprId>,
        is_safe: bool,
    },
    /// Lambda argument; the anonymous function declaration carries the body.
    Lambda {
        function: DeclId,
    },
    /// `object : ... {}` expression; the anonymous class carries the members.
    AnonymousObject {
        class: DeclId,
    },
    LocalVariable {
        name: Name,
        /// Written type of the variable (a syntax node), `NONE` if inferred.
        type_node: NodeIndex,
        initializer: Option<ExprId>,
    },
    When {
        branches: Vec<ExprId>,
    },
    Loop {
        label: Option<Name>,
        body: ExprId,
    },
    /// `break`/`continue`; `target` is the lexically enclosing loop matched
    /// by label (or the nearest one), `None` when no loop encloses the jump.
    Jump {
        kind: JumpKind,
        target: Option<ExprId>,
    },
    NameRef {
        name: Name,
    },
    Literal {
        value: ConstantValue,
    },
    Return {
        value: Option<ExprId>,
    },
}

#[derive(Debug)]
pub struct Expression {
    pub kind: ExprKind,
    pub source: SourceElement,
    ty: OnceLock<Type>,
    resolved_call: OnceLock<ResolvedCall>,
}

impl Expression {
    pub fn new(kind: ExprKind, source: SourceElement) -> Self {
        Expression {
            kind,
            source,
            ty: OnceLock::new(),
            resolved_call: OnceLock::new(),
        }
    }

    pub fn resolved_type(&self) -> Option<&Type> {
        self.ty.get()
    }

    /// Commit this expression's type; first writer wins.
    pub fn resolve_type(&self, ty: Type) {
        let _ = self.ty.set(ty);
    }

    pub fn resolved_call(&self) -> Option<&ResolvedCall> {
        self.resolved_call.get()
    }

    pub fn resolve_call(&self, resolved: ResolvedCall) {
        let _ = self.resolved_call.set(resolved);
    }
}
