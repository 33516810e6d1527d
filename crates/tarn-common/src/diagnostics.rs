//! Structured diagnostics and the sink that collects them.
//!
//! Checkers and the resolution engine never throw for user-facing problems;
//! they report here and keep going. The sink supports concurrent append (the
//! checker walk is parallel) and drains into a stable order for rendering.

use crate::source::SourceElement;
use serde::Serialize;
use std::sync::Mutex;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

/// Static descriptor of one diagnostic kind: a stable name used as the
/// factory identifier, the default severity, and a message template with
/// `{0}`-style placeholders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DiagnosticFactory {
    pub name: &'static str,
    pub severity: Severity,
    pub message: &'static str,
}

impl DiagnosticFactory {
    pub const fn error(name: &'static str, message: &'static str) -> Self {
        DiagnosticFactory {
            name,
            severity: Severity::Error,
            message,
        }
    }

    pub const fn warning(name: &'static str, message: &'static str) -> Self {
        DiagnosticFactory {
            name,
            severity: Severity::Warning,
            message,
        }
    }
}

/// One reported diagnostic: factory identity, severity, the source element it
/// is anchored to, and rendering parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub factory: DiagnosticFactory,
    pub source: SourceElement,
    pub args: Vec<String>,
}

impl Diagnostic {
    pub fn new(factory: DiagnosticFactory, source: SourceElement, args: Vec<String>) -> Self {
        Diagnostic {
            factory,
            source,
            args,
        }
    }

    pub fn severity(&self) -> Severity {
        self.factory.severity
    }

    pub fn rendered_message(&self) -> String {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        format_message(self.factory.message, &args)
    }

    /// JSON shape consumed by the CLI/IDE rendering layers.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "factory": self.factory.name,
            "severity": self.factory.severity,
            "file": self.source.file().0,
            "start": self.source.range().start,
            "end": self.source.range().end,
            "message": self.rendered_message(),
        })
    }
}

/// Substitute `{0}`, `{1}`, ... placeholders in a message template.
pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Append-only diagnostic collector, safe to share across checker threads.
#[derive(Default)]
pub struct DiagnosticSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .expect("diagnostic sink poisoned")
            .push(diagnostic);
    }

    /// Report `factory` on `source` with the given rendering arguments.
    pub fn report_on(&self, source: &SourceElement, factory: DiagnosticFactory, args: &[&str]) {
        self.report(Diagnostic::new(
            factory,
            source.clone(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("diagnostic sink poisoned").is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("diagnostic sink poisoned").len()
    }

    /// Current contents, in report order.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().expect("diagnostic sink poisoned").clone()
    }

    /// Drain into rendering order: by file, then offset, then factory name.
    /// Parallel checking makes the raw append order nondeterministic; the
    /// drain order is what downstream consumers key on.
    pub fn drain_sorted(&self) -> Vec<Diagnostic> {
        let mut entries = std::mem::take(&mut *self.entries.lock().expect("diagnostic sink poisoned"));
        entries.sort_by(|a, b| {
            (a.source.file(), a.source.range(), a.factory.name)
                .cmp(&(b.source.file(), b.source.range(), b.factory.name))
        });
        entries
    }

    /// Count of diagnostics with the given factory name.
    pub fn count_of(&self, factory_name: &str) -> usize {
        self.entries
            .lock()
            .expect("diagnostic sink poisoned")
            .iter()
            .filter(|d| d.factory.name == factory_name)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ElementKind, FileId, TextRange};

    const TEST_ERROR: DiagnosticFactory =
        DiagnosticFactory::error("TEST_ERROR", "expected {0} but found {1}");

    #[test]
    fn message_formatting_substitutes_placeholders() {
        let source = SourceElement::offset(FileId(0), TextRange::new(0, 1), ElementKind::Real);
        let sink = DiagnosticSink::new();
        sink.report_on(&source, TEST_ERROR, &["Int", "String"]);
        let rendered = sink.snapshot()[0].rendered_message();
        assert_eq!(rendered, "expected Int but found String");
    }

    #[test]
    fn drain_orders_by_file_and_offset() {
        let sink = DiagnosticSink::new();
        let late = SourceElement::offset(FileId(0), TextRange::new(50, 51), ElementKind::Real);
        let early = SourceElement::offset(FileId(0), TextRange::new(2, 3), ElementKind::Real);
        sink.report_on(&late, TEST_ERROR, &[]);
        sink.report_on(&early, TEST_ERROR, &[]);
        let drained = sink.drain_sorted();
        assert_eq!(drained[0].source.range().start, 2);
        assert_eq!(drained[1].source.range().start, 50);
        assert!(sink.is_empty());
    }
}
