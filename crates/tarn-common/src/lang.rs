//! Visibility and modality lattices.

use serde::Serialize;
use std::cmp::Ordering;

/// Declaration visibility. Note that `Internal` and `Protected` are
/// incomparable: neither permits the other's use sites, so [`Visibility::compare`]
/// returns `None` for the pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Visibility {
    Private,
    Protected,
    Internal,
    Public,
}

impl Visibility {
    /// Partial order by how much each visibility exposes. `None` means the
    /// two are incomparable.
    pub fn compare(self, other: Visibility) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match (self, other) {
            (Visibility::Private, _) => Some(Ordering::Less),
            (_, Visibility::Private) => Some(Ordering::Greater),
            (Visibility::Public, _) => Some(Ordering::Greater),
            (_, Visibility::Public) => Some(Ordering::Less),
            // Protected vs Internal
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Variance of a type-parameter use or a type-argument projection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Variance {
    Invariant,
    In,
    Out,
}

impl Variance {
    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Modality {
    Final,
    Open,
    Abstract,
    Sealed,
}

impl Modality {
    pub fn is_overridable(self) -> bool {
        !matches!(self, Modality::Final)
    }
}
