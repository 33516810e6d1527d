//! Tarn frontend driver.
//!
//! Assembles the pipeline the member crates implement: build the typed
//! declaration graph from syntax, advance every declaration through the
//! resolution phases, run the checker walk, and hand back the resolved
//! graph plus the diagnostic stream. The parser and the backends are
//! external collaborators: syntax arenas come in, a resolved graph and
//! diagnostics go out.

pub use tarn_binder as binder;
pub use tarn_checker as checker;
pub use tarn_common as common;
pub use tarn_solver as solver;
pub use tarn_syntax as syntax;
pub use tarn_types as types;

pub mod pipeline;

pub use pipeline::{Analysis, FrontendOptions, SourceInput, analyze, recheck};
