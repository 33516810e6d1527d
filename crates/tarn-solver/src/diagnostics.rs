//! Diagnostic factories reported by resolution.

use tarn_common::DiagnosticFactory;

pub const UNRESOLVED_REFERENCE: DiagnosticFactory =
    DiagnosticFactory::error("UNRESOLVED_REFERENCE", "unresolved reference: {0}");

pub const OVERLOAD_RESOLUTION_AMBIGUITY: DiagnosticFactory = DiagnosticFactory::error(
    "OVERLOAD_RESOLUTION_AMBIGUITY",
    "overload resolution ambiguity between candidates of '{0}'",
);

pub const NONE_APPLICABLE: DiagnosticFactory = DiagnosticFactory::error(
    "NONE_APPLICABLE",
    "none of the candidates for '{0}' is applicable to the arguments",
);

pub const ARGUMENT_TYPE_MISMATCH: DiagnosticFactory = DiagnosticFactory::error(
    "ARGUMENT_TYPE_MISMATCH",
    "argument type mismatch: expected {0}, actual {1}",
);

pub const CANNOT_INFER_TYPE: DiagnosticFactory =
    DiagnosticFactory::error("CANNOT_INFER_TYPE", "cannot infer a type for this declaration");

pub const SUPERTYPE_CYCLE: DiagnosticFactory = DiagnosticFactory::error(
    "SUPERTYPE_CYCLE",
    "there is a cycle in the supertype hierarchy of '{0}'",
);

pub const BREAK_OR_CONTINUE_OUTSIDE_OF_LOOP: DiagnosticFactory = DiagnosticFactory::error(
    "BREAK_OR_CONTINUE_OUTSIDE_OF_LOOP",
    "'break' and 'continue' are only allowed inside a loop",
);
