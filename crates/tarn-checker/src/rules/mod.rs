//! The built-in rule set. Each rule is independent and side-effect-free
//! apart from the reporter.

pub mod accessors;
pub mod delegates;
pub mod jumps;
pub mod safe_calls;
