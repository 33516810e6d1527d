//! Constraint-based type inference over union-find variables.
//!
//! Built on the `ena` crate's unification table. Each generic call
//! instantiates its type parameters as inference variables; constraints
//! accumulate as lower bounds (argument flows in) and upper bounds
//! (declared `where` constraints, expected types). A variable is normally
//! fixed when the constraint system completes — except when scope
//! navigation (member access, call) needs a concrete receiver type *now*,
//! in which case the variable is fixed on demand to its currently
//! consistent lower bound and later constraints are checked against the
//! fixed type instead of narrowing it further.

use crate::subtype::TypeRelation;
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use rustc_hash::FxHashMap;
use tarn_types::{Nullability, Type};
use tracing::trace;

/// An inference variable standing for an unknown type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceVar(pub u32);

/// Wrapper for `Type` to implement `UnifyValue` (avoiding the orphan rule).
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceValue(pub Option<Type>);

impl UnifyKey for InferenceVar {
    type Value = InferenceValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceVar(u)
    }

    fn tag() -> &'static str {
        "InferenceVar"
    }
}

impl UnifyValue for InferenceValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (&a.0, &b.0) {
            (None, None) => Ok(InferenceValue(None)),
            (Some(t), None) | (None, Some(t)) => Ok(InferenceValue(Some(t.clone()))),
            // On conflict keep the first; the constraint check reports it.
            (Some(t), Some(_)) => Ok(InferenceValue(Some(t.clone()))),
        }
    }
}

/// Bounds recorded for one variable: `L <: a` and `a <: U`.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    pub lower_bounds: Vec<Type>,
    pub upper_bounds: Vec<Type>,
}

/// Why a constraint was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintError {
    /// A bound recorded after fixation is incompatible with the fixed type.
    /// `expected` is the fixed type as checks see it (the nullable view for
    /// variables fixed through a safe-call chain).
    IncompatibleWithFixed { expected: Type, actual: Type },
    /// No lower bound satisfies the other recorded bounds.
    NoConsistentBound,
}

pub struct InferenceContext {
    table: InPlaceUnificationTable<InferenceVar>,
    constraints: FxHashMap<InferenceVar, ConstraintSet>,
    fixed: FxHashMap<InferenceVar, Type>,
}

impl InferenceContext {
    pub fn new() -> Self {
        InferenceContext {
            table: InPlaceUnificationTable::new(),
            constraints: FxHashMap::default(),
            fixed: FxHashMap::default(),
        }
    }

    pub fn fresh_var(&mut self) -> InferenceVar {
        let var = self.table.new_key(InferenceValue(None));
        self.constraints.insert(var, ConstraintSet::default());
        var
    }

    fn root(&mut self, var: InferenceVar) -> InferenceVar {
        self.table.find(var)
    }

    pub fn is_fixed(&mut self, var: InferenceVar) -> bool {
        let root = self.root(var);
        self.fixed.contains_key(&root)
    }

    pub fn fixed_type(&mut self, var: InferenceVar) -> Option<Type> {
        let root = self.root(var);
        self.fixed.get(&root).cloned()
    }

    /// Record `lower <: var`. After fixation this becomes a check against
    /// the fixed type rather than a new bound.
    pub fn add_lower_bound(
        &mut self,
        var: InferenceVar,
        lower: Type,
        relation: &dyn TypeRelation,
    ) -> Result<(), ConstraintError> {
        let root = self.root(var);
        if let Some(fixed) = self.fixed.get(&root) {
            if relation.is_subtype(&lower, fixed) {
                return Ok(());
            }
            return Err(ConstraintError::IncompatibleWithFixed {
                expected: fixed.clone(),
                actual: lower,
            });
        }
        self.constraints.entry(root).or_default().lower_bounds.push(lower);
        Ok(())
    }

    /// Record `var <: upper`.
    pub fn add_upper_bound(
        &mut self,
        var: InferenceVar,
        upper: Type,
        relation: &dyn TypeRelation,
    ) -> Result<(), ConstraintError> {
        let root = self.root(var);
        if let Some(fixed) = self.fixed.get(&root) {
            if relation.is_subtype(fixed, &upper) {
                return Ok(());
            }
            return Err(ConstraintError::IncompatibleWithFixed {
                expected: upper,
                actual: fixed.clone(),
            });
        }
        self.constraints.entry(root).or_default().upper_bounds.push(upper);
        Ok(())
    }

    /// Fix `var` because scope navigation needs a concrete type now.
    ///
    /// The chosen type is the earliest recorded lower bound consistent with
    /// every other recorded bound (the tie-break is an implementation
    /// choice; see the crate tests for the properties it must satisfy).
    /// When the navigation goes through a nullable/safe-call chain, the
    /// *nullable* variant is what gets fixed, so that subsequent constraint
    /// checks compare against the nullable upper type rather than the
    /// unwrapped one.
    pub fn fix_on_demand(
        &mut self,
        var: InferenceVar,
        via_safe_call: bool,
        relation: &dyn TypeRelation,
    ) -> Result<Type, ConstraintError> {
        let root = self.root(var);
        if let Some(already) = self.fixed.get(&root) {
            return Ok(already.clone());
        }
        let constraints = self.constraints.get(&root).cloned().unwrap_or_default();
        let candidate = constraints
            .lower_bounds
            .iter()
            .find(|candidate| {
                constraints
                    .lower_bounds
                    .iter()
                    .all(|other| relation.is_subtype(other, candidate))
                    && constraints
                        .upper_bounds
                        .iter()
                        .all(|upper| relation.is_subtype(candidate, upper))
            })
            .cloned()
            .ok_or(ConstraintError::NoConsistentBound)?;

        let fixed = if via_safe_call {
            candidate.with_nullability(Nullability::Nullable)
        } else {
            candidate
        };
        trace!(var = root.0, fixed = %fixed, via_safe_call, "fixed inference variable on demand");
        self.fixed.insert(root, fixed.clone());
        self.table
            .union_value(root, InferenceValue(Some(fixed.clone())));
        Ok(fixed)
    }

    /// Final answer for a variable, fixing it from its bounds if scope
    /// navigation never forced the issue.
    pub fn resolve_var(
        &mut self,
        var: InferenceVar,
        relation: &dyn TypeRelation,
    ) -> Result<Type, ConstraintError> {
        let root = self.root(var);
        if let Some(fixed) = self.fixed.get(&root) {
            return Ok(fixed.clone());
        }
        self.fix_on_demand(var, false, relation)
    }

    /// Bounds recorded so far, for diagnostics and tests.
    pub fn constraints_of(&mut self, var: InferenceVar) -> ConstraintSet {
        let root = self.root(var);
        self.constraints.get(&root).cloned().unwrap_or_default()
    }

    pub fn unify(&mut self, a: InferenceVar, b: InferenceVar) {
        let root_a = self.table.find(a);
        let root_b = self.table.find(b);
        if root_a == root_b {
            return;
        }
        self.table.union(root_a, root_b);
        let new_root = self.table.find(root_a);
        let merged_from = if new_root == root_a { root_b } else { root_a };
        if let Some(merged) = self.constraints.remove(&merged_from) {
            let target = self.constraints.entry(new_root).or_default();
            target.lower_bounds.extend(merged.lower_bounds);
            target.upper_bounds.extend(merged.upper_bounds);
        }
        if let Some(fixed) = self.fixed.remove(&merged_from) {
            self.fixed.entry(new_root).or_insert(fixed);
        }
    }
}

impl Default for InferenceContext {
    fn default() -> Self {
        InferenceContext::new()
    }
}
