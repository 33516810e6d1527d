//! Diagnostic factories reported by the checker rules.

use tarn_common::DiagnosticFactory;

pub const WRONG_GETTER_RETURN_TYPE: DiagnosticFactory = DiagnosticFactory::error(
    "WRONG_GETTER_RETURN_TYPE",
    "getter return type must be equal to the type of the property, expected {0}, actual {1}",
);

pub const WRONG_SETTER_PARAMETER_TYPE: DiagnosticFactory = DiagnosticFactory::error(
    "WRONG_SETTER_PARAMETER_TYPE",
    "setter parameter type must be equal to the type of the property, expected {0}, actual {1}",
);

pub const WRONG_SETTER_RETURN_TYPE: DiagnosticFactory = DiagnosticFactory::error(
    "WRONG_SETTER_RETURN_TYPE",
    "setter return type must be Unit",
);

pub const GETTER_VISIBILITY_DIFFERS_FROM_PROPERTY_VISIBILITY: DiagnosticFactory =
    DiagnosticFactory::error(
        "GETTER_VISIBILITY_DIFFERS_FROM_PROPERTY_VISIBILITY",
        "getter visibility must be the same as property visibility",
    );

pub const SETTER_VISIBILITY_INCONSISTENT_WITH_PROPERTY_VISIBILITY: DiagnosticFactory =
    DiagnosticFactory::error(
        "SETTER_VISIBILITY_INCONSISTENT_WITH_PROPERTY_VISIBILITY",
        "setter visibility must not be more permissive than property visibility",
    );

pub const PRIVATE_SETTER_FOR_ABSTRACT_PROPERTY: DiagnosticFactory = DiagnosticFactory::error(
    "PRIVATE_SETTER_FOR_ABSTRACT_PROPERTY",
    "private setters are not allowed for abstract properties",
);

pub const PRIVATE_SETTER_FOR_OPEN_PROPERTY: DiagnosticFactory = DiagnosticFactory::error(
    "PRIVATE_SETTER_FOR_OPEN_PROPERTY",
    "private setters are not allowed for open properties",
);

pub const ABSTRACT_PROPERTY_WITH_GETTER: DiagnosticFactory = DiagnosticFactory::error(
    "ABSTRACT_PROPERTY_WITH_GETTER",
    "abstract property cannot have a getter with a body",
);

pub const ABSTRACT_PROPERTY_WITH_SETTER: DiagnosticFactory = DiagnosticFactory::error(
    "ABSTRACT_PROPERTY_WITH_SETTER",
    "abstract property cannot have a setter with a body",
);

pub const VAL_WITH_SETTER: DiagnosticFactory =
    DiagnosticFactory::error("VAL_WITH_SETTER", "a 'val' property cannot have a setter");

pub const ACCESSOR_FOR_DELEGATED_PROPERTY: DiagnosticFactory = DiagnosticFactory::error(
    "ACCESSOR_FOR_DELEGATED_PROPERTY",
    "delegated property cannot have accessors with non-default implementations",
);

pub const BREAK_OR_CONTINUE_JUMPS_ACROSS_FUNCTION_BOUNDARY: DiagnosticFactory =
    DiagnosticFactory::error(
        "BREAK_OR_CONTINUE_JUMPS_ACROSS_FUNCTION_BOUNDARY",
        "'break' or 'continue' jumps across a function or a class boundary",
    );

pub const DELEGATE_USES_EXTENSION_PROPERTY_TYPE_PARAMETER: DiagnosticFactory =
    DiagnosticFactory::error(
        "DELEGATE_USES_EXTENSION_PROPERTY_TYPE_PARAMETER",
        "delegate of an extension property uses its type parameter '{0}'",
    );

pub const UNNECESSARY_SAFE_CALL: DiagnosticFactory = DiagnosticFactory::warning(
    "UNNECESSARY_SAFE_CALL",
    "unnecessary safe call on a non-null receiver of type {0}",
);
