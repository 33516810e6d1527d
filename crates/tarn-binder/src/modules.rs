//! Modules and files.
//!
//! A module is either an ordinary source module or a *dangling* module: an
//! ephemeral wrapper (editor scratch buffer, code fragment) scoped against a
//! context file of a real module. Dangling modules only exist for the
//! duration of an analysis session.

use rustc_hash::FxHashMap;
use std::sync::RwLock;
use tarn_common::{FileId, Name};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

/// Whether a source module is the common (declaration-site) module of an
/// expect/actual pair or a platform (use-site) module.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModulePlatform {
    Common,
    Platform,
}

#[derive(Clone, Debug)]
pub enum ModuleKind {
    Source {
        platform: ModulePlatform,
    },
    /// Ephemeral module wrapping a real context module; resolution inside it
    /// is scoped against `context_file`.
    Dangling {
        context_module: ModuleId,
        context_file: FileId,
    },
}

#[derive(Clone, Debug)]
pub struct ModuleData {
    pub id: ModuleId,
    pub name: Name,
    pub kind: ModuleKind,
}

impl ModuleData {
    pub fn is_dangling(&self) -> bool {
        matches!(self.kind, ModuleKind::Dangling { .. })
    }
}

/// Registry of modules and the file-to-module mapping for a session.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: RwLock<Vec<ModuleData>>,
    file_modules: RwLock<FxHashMap<FileId, ModuleId>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    pub fn add_source_module(&self, name: &str, platform: ModulePlatform) -> ModuleId {
        self.add(name, ModuleKind::Source { platform })
    }

    pub fn add_dangling_module(
        &self,
        name: &str,
        context_module: ModuleId,
        context_file: FileId,
    ) -> ModuleId {
        self.add(
            name,
            ModuleKind::Dangling {
                context_module,
                context_file,
            },
        )
    }

    fn add(&self, name: &str, kind: ModuleKind) -> ModuleId {
        let mut modules = self.modules.write().expect("module registry poisoned");
        let id = ModuleId(modules.len() as u32);
        modules.push(ModuleData {
            id,
            name: Name::new(name),
            kind,
        });
        id
    }

    pub fn module(&self, id: ModuleId) -> ModuleData {
        self.modules.read().expect("module registry poisoned")[id.0 as usize].clone()
    }

    pub fn register_file(&self, file: FileId, module: ModuleId) {
        self.file_modules
            .write()
            .expect("module registry poisoned")
            .insert(file, module);
    }

    pub fn module_of_file(&self, file: FileId) -> Option<ModuleId> {
        self.file_modules
            .read()
            .expect("module registry poisoned")
            .get(&file)
            .copied()
    }

    /// A dangling module resolves to its context module; anything else is
    /// already real.
    pub fn unwrap_dangling(&self, id: ModuleId) -> ModuleId {
        match self.module(id).kind {
            ModuleKind::Dangling { context_module, .. } => context_module,
            ModuleKind::Source { .. } => id,
        }
    }

    pub fn is_dangling(&self, id: ModuleId) -> bool {
        self.module(id).is_dangling()
    }

    /// Context file a dangling module is scoped against.
    pub fn context_file(&self, id: ModuleId) -> Option<FileId> {
        match self.module(id).kind {
            ModuleKind::Dangling { context_file, .. } => Some(context_file),
            ModuleKind::Source { .. } => None,
        }
    }

    pub fn platform(&self, id: ModuleId) -> ModulePlatform {
        match self.module(id).kind {
            ModuleKind::Source { platform } => platform,
            ModuleKind::Dangling { context_module, .. } => self.platform(context_module),
        }
    }
}
