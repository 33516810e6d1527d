//! Symbol arena.
//!
//! A symbol is the stable identity of a declaration — the only thing other
//! declarations may hold long-lived references to. The graph node behind a
//! symbol can be replaced during incremental re-resolution; references
//! through the symbol survive that.

use crate::graph::DeclId;
use std::sync::RwLock;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    TypeAlias,
    Function,
    Property,
}

#[derive(Copy, Clone, Debug)]
struct SymbolEntry {
    kind: SymbolKind,
    decl: DeclId,
}

#[derive(Default)]
pub struct SymbolArena {
    entries: RwLock<Vec<SymbolEntry>>,
}

impl SymbolArena {
    pub fn new() -> Self {
        SymbolArena::default()
    }

    pub fn alloc(&self, kind: SymbolKind, decl: DeclId) -> SymbolId {
        let mut entries = self.entries.write().expect("symbol arena poisoned");
        let id = SymbolId(entries.len() as u32);
        entries.push(SymbolEntry { kind, decl });
        id
    }

    pub fn kind(&self, id: SymbolId) -> SymbolKind {
        self.entries.read().expect("symbol arena poisoned")[id.0 as usize].kind
    }

    /// Current graph node of a symbol.
    pub fn decl_of(&self, id: SymbolId) -> DeclId {
        self.entries.read().expect("symbol arena poisoned")[id.0 as usize].decl
    }

    /// Repoint a symbol at a replacement node. Used when a source edit
    /// invalidates the previous node; external references keep the symbol.
    pub fn rebind(&self, id: SymbolId, decl: DeclId) {
        self.entries.write().expect("symbol arena poisoned")[id.0 as usize].decl = decl;
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("symbol arena poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
