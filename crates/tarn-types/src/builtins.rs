//! Builtin class ids and ready-made types.

use crate::types::{ClassType, LookupTag, Nullability, SimpleType, Type};
use once_cell::sync::Lazy;
use tarn_common::{ClassId, Name, PackageFqName};

fn builtin(name: &str) -> ClassId {
    ClassId::top_level(PackageFqName::new("tarn"), Name::new(name))
}

pub static ANY: Lazy<ClassId> = Lazy::new(|| builtin("Any"));
pub static NOTHING: Lazy<ClassId> = Lazy::new(|| builtin("Nothing"));
pub static UNIT: Lazy<ClassId> = Lazy::new(|| builtin("Unit"));
pub static INT: Lazy<ClassId> = Lazy::new(|| builtin("Int"));
pub static LONG: Lazy<ClassId> = Lazy::new(|| builtin("Long"));
pub static BOOLEAN: Lazy<ClassId> = Lazy::new(|| builtin("Boolean"));
pub static STRING: Lazy<ClassId> = Lazy::new(|| builtin("String"));

fn class_type(id: &ClassId, nullability: Nullability) -> Type {
    Type::Simple(SimpleType::Class(ClassType::new(
        LookupTag::new(id.clone()),
        Vec::new(),
        nullability,
    )))
}

pub fn any_type() -> Type {
    class_type(&ANY, Nullability::NotNull)
}

pub fn nullable_any_type() -> Type {
    class_type(&ANY, Nullability::Nullable)
}

pub fn nothing_type() -> Type {
    class_type(&NOTHING, Nullability::NotNull)
}

pub fn unit_type() -> Type {
    class_type(&UNIT, Nullability::NotNull)
}

pub fn int_type() -> Type {
    class_type(&INT, Nullability::NotNull)
}

pub fn boolean_type() -> Type {
    class_type(&BOOLEAN, Nullability::NotNull)
}

pub fn string_type() -> Type {
    class_type(&STRING, Nullability::NotNull)
}

/// The name a simple type reference resolves to when it names a builtin.
pub fn by_short_name(name: &str) -> Option<ClassId> {
    match name {
        "Any" => Some(ANY.clone()),
        "Nothing" => Some(NOTHING.clone()),
        "Unit" => Some(UNIT.clone()),
        "Int" => Some(INT.clone()),
        "Long" => Some(LONG.clone()),
        "Boolean" => Some(BOOLEAN.clone()),
        "String" => Some(STRING.clone()),
        _ => None,
    }
}
