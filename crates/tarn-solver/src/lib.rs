//! Resolution and inference engine.
//!
//! - `resolve` — the phase-advancement engine (single-flight per node) and
//!   per-phase computations.
//! - `infer` — constraint-based inference on `ena` union-find, with
//!   on-demand variable fixation for scope navigation.
//! - `subtype` — the subtyping oracle over the resolved graph.
//! - `calls` — overload resolution.

pub mod calls;
pub mod diagnostics;
pub mod infer;
pub mod resolve;
pub mod subtype;

pub use calls::{CallResolution, resolve_call};
pub use infer::{ConstraintError, ConstraintSet, InferenceContext, InferenceValue, InferenceVar};
pub use resolve::{ResolutionEngine, supertypes_of_class_type};
pub use subtype::{StructuralRelation, SubtypeChecker, TypeRelation};
