//! Defensive caps on unbounded-looking walks.

/// Upper bound on type-alias expansion steps. Expansion carries a visited
/// set that catches cycles; the cap bounds pathological non-cyclic chains.
pub const MAX_ALIAS_EXPANSION_DEPTH: usize = 100;

/// Upper bound on supertype-graph traversal when collecting inherited
/// members. Supertype graphs with cycles are already reported during
/// supertype resolution; the cap keeps scope construction total anyway.
pub const MAX_SUPERTYPE_WALK: usize = 10_000;
