//! Common foundations shared by every Tarn frontend crate.
//!
//! This crate carries the pieces that both the declaration-graph side and the
//! checker side depend on: source element anchoring, qualified names,
//! the structured diagnostic model, language feature flags, and the
//! cancellation token observed at resolution safe points.

pub mod cancel;
pub mod diagnostics;
pub mod features;
pub mod lang;
pub mod limits;
pub mod name;
pub mod source;

pub use cancel::{Cancelled, CancellationToken};
pub use diagnostics::{Diagnostic, DiagnosticFactory, DiagnosticSink, Severity, format_message};
pub use features::{LanguageFeature, LanguageFeatures};
pub use lang::{Modality, Variance, Visibility};
pub use name::{CallableId, ClassId, Name, PackageFqName};
pub use source::{ElementKind, FakeElementKind, FileId, SourceElement, SyntaxNodeHandle, TextRange};
