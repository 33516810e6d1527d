//! Qualified names and stable declaration ids.
//!
//! Lookup tags refer to declarations by these ids rather than by direct
//! pointers, so cross-references stay valid across forward references and
//! incremental re-resolution.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A simple (unqualified) identifier. Cheap to clone.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(name: &str) -> Self {
        debug_assert!(!name.is_empty(), "empty name");
        Name(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

/// Dot-separated package name; the root package is the empty string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageFqName(Arc<str>);

impl PackageFqName {
    pub fn root() -> Self {
        PackageFqName(Arc::from(""))
    }

    pub fn new(fq_name: &str) -> Self {
        PackageFqName(Arc::from(fq_name))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn child(&self, name: &Name) -> PackageFqName {
        if self.is_root() {
            PackageFqName(Arc::from(name.as_str()))
        } else {
            PackageFqName(Arc::from(format!("{}.{}", self.0, name)))
        }
    }
}

impl fmt::Display for PackageFqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl fmt::Debug for PackageFqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageFqName({self})")
    }
}

/// Qualified id of a class-like declaration (class, interface, enum class,
/// type alias). `relative` is the dot-separated path from the package to the
/// declaration, so nested classes keep their owner in the id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Debug)]
pub struct ClassId {
    pub package: PackageFqName,
    pub relative: Name,
}

impl ClassId {
    pub fn top_level(package: PackageFqName, name: Name) -> Self {
        ClassId {
            package,
            relative: name,
        }
    }

    /// Id of a class nested directly inside `self`.
    pub fn nested(&self, name: &Name) -> ClassId {
        ClassId {
            package: self.package.clone(),
            relative: Name::new(&format!("{}.{}", self.relative, name)),
        }
    }

    /// The simple name, i.e. the last segment of the relative path.
    pub fn short_name(&self) -> Name {
        match self.relative.as_str().rsplit_once('.') {
            Some((_, last)) => Name::new(last),
            None => self.relative.clone(),
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_root() {
            write!(f, "{}", self.relative)
        } else {
            write!(f, "{}/{}", self.package.as_str(), self.relative)
        }
    }
}

/// Qualified id of a callable declaration (function or property). Members
/// carry the owning class id; top-level callables carry only the package.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Debug)]
pub struct CallableId {
    pub package: PackageFqName,
    pub class: Option<ClassId>,
    pub name: Name,
}

impl CallableId {
    pub fn top_level(package: PackageFqName, name: Name) -> Self {
        CallableId {
            package,
            class: None,
            name,
        }
    }

    pub fn member(class: ClassId, name: Name) -> Self {
        CallableId {
            package: class.package.clone(),
            class: Some(class),
            name,
        }
    }

    pub fn is_member(&self) -> bool {
        self.class.is_some()
    }
}

impl fmt::Display for CallableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{}", class, self.name),
            None if self.package.is_root() => write!(f, "{}", self.name),
            None => write!(f, "{}/{}", self.package.as_str(), self.name),
        }
    }
}
