//! The typed declaration graph: arena of declaration cells, expression
//! storage, and lookup maps keyed by qualified ids.

use crate::decls::DeclarationCell;
use crate::exprs::{ExprId, Expression};
use crate::modules::ModuleId;
use crate::symbols::{SymbolArena, SymbolId, SymbolKind};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};
use tarn_common::{ClassId, FileId, Name, PackageFqName};
use tarn_types::TypeParameterId;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// One analyzed file's contribution to the graph.
#[derive(Clone, Debug)]
pub struct GraphFile {
    pub file: FileId,
    pub module: ModuleId,
    pub package: PackageFqName,
    pub top_level: Vec<DeclId>,
}

/// Declaration graph for one analysis session. Cells are appended during
/// building (and by fake-override materialization later); existing cells are
/// never removed, and indices are stable.
#[derive(Default)]
pub struct DeclarationGraph {
    pub symbols: SymbolArena,
    cells: RwLock<Vec<Arc<DeclarationCell>>>,
    exprs: RwLock<Vec<Arc<Expression>>>,
    files: RwLock<Vec<GraphFile>>,
    classes: RwLock<FxHashMap<ClassId, SymbolId>>,
    top_level_callables: RwLock<FxHashMap<(PackageFqName, Name), Vec<SymbolId>>>,
    next_type_param: AtomicU32,
}

impl DeclarationGraph {
    pub fn new() -> Self {
        DeclarationGraph::default()
    }

    pub fn add_cell(&self, cell: DeclarationCell) -> DeclId {
        let mut cells = self.cells.write().expect("graph poisoned");
        let id = DeclId(cells.len() as u32);
        cells.push(Arc::new(cell));
        id
    }

    pub fn cell(&self, id: DeclId) -> Arc<DeclarationCell> {
        Arc::clone(&self.cells.read().expect("graph poisoned")[id.0 as usize])
    }

    pub fn decl_count(&self) -> usize {
        self.cells.read().expect("graph poisoned").len()
    }

    pub fn cell_of(&self, symbol: SymbolId) -> Arc<DeclarationCell> {
        self.cell(self.symbols.decl_of(symbol))
    }

    pub fn add_expr(&self, expr: Expression) -> ExprId {
        let mut exprs = self.exprs.write().expect("graph poisoned");
        let id = ExprId(exprs.len() as u32);
        exprs.push(Arc::new(expr));
        id
    }

    pub fn expr(&self, id: ExprId) -> Arc<Expression> {
        Arc::clone(&self.exprs.read().expect("graph poisoned")[id.0 as usize])
    }

    /// Swap out an expression slot. Only the builder uses this, to commit a
    /// loop over the slot it reserved for forward jump targets.
    pub fn replace_expr(&self, id: ExprId, expr: Expression) {
        self.exprs.write().expect("graph poisoned")[id.0 as usize] = Arc::new(expr);
    }

    pub fn add_file(&self, file: GraphFile) {
        self.files.write().expect("graph poisoned").push(file);
    }

    pub fn files(&self) -> Vec<GraphFile> {
        self.files.read().expect("graph poisoned").clone()
    }

    pub fn fresh_type_param_id(&self) -> TypeParameterId {
        TypeParameterId(self.next_type_param.fetch_add(1, Ordering::Relaxed))
    }

    pub fn register_class_like(&self, id: ClassId, symbol: SymbolId) {
        let previous = self
            .classes
            .write()
            .expect("graph poisoned")
            .insert(id.clone(), symbol);
        assert!(
            previous.is_none(),
            "duplicate class-like registration for {id}"
        );
    }

    pub fn class_like_symbol(&self, id: &ClassId) -> Option<SymbolId> {
        self.classes.read().expect("graph poisoned").get(id).copied()
    }

    pub fn register_top_level_callable(
        &self,
        package: PackageFqName,
        name: Name,
        symbol: SymbolId,
    ) {
        self.top_level_callables
            .write()
            .expect("graph poisoned")
            .entry((package, name))
            .or_default()
            .push(symbol);
    }

    pub fn top_level_callables(&self, package: &PackageFqName, name: &Name) -> Vec<SymbolId> {
        self.top_level_callables
            .read()
            .expect("graph poisoned")
            .get(&(package.clone(), name.clone()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_package(&self, package: &PackageFqName) -> bool {
        self.files
            .read()
            .expect("graph poisoned")
            .iter()
            .any(|file| &file.package == package)
    }

    /// All declarations, for whole-graph sweeps.
    pub fn all_decl_ids(&self) -> Vec<DeclId> {
        (0..self.decl_count() as u32).map(DeclId).collect()
    }

    /// Top-level declarations of every file, the unit of checker
    /// parallelism.
    pub fn top_level_decl_ids(&self) -> Vec<DeclId> {
        self.files()
            .iter()
            .flat_map(|file| file.top_level.iter().copied())
            .collect()
    }

    pub fn symbol_kind(&self, symbol: SymbolId) -> SymbolKind {
        self.symbols.kind(symbol)
    }
}
