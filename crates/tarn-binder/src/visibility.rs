//! Cross-module visibility of private declarations.
//!
//! The policy hook that decides whether one module may see another's
//! privates. The dangling-aware implementation lets an editor scratch file
//! see into the file it is scoped against; the reverse direction must never
//! hold, so ordinary compilation units are unaffected by transient scratch
//! content.

use crate::modules::{ModuleId, ModuleRegistry};
use tarn_common::FileId;

pub trait PrivateVisibleFromDifferentModuleExtension: Send + Sync {
    /// May `requesting` see private declarations owned by `owning`?
    fn can_see_private_declarations_of_module(
        &self,
        registry: &ModuleRegistry,
        requesting: ModuleId,
        owning: ModuleId,
    ) -> bool;

    /// May file-private top-level declarations of `target` be seen from
    /// `use_site`?
    fn can_see_private_top_level_declarations_from_file(
        &self,
        registry: &ModuleRegistry,
        use_site: FileId,
        target: FileId,
    ) -> bool;
}

/// Default policy: same module only, never across files.
pub struct DefaultPrivateVisibility;

impl PrivateVisibleFromDifferentModuleExtension for DefaultPrivateVisibility {
    fn can_see_private_declarations_of_module(
        &self,
        _registry: &ModuleRegistry,
        requesting: ModuleId,
        owning: ModuleId,
    ) -> bool {
        requesting == owning
    }

    fn can_see_private_top_level_declarations_from_file(
        &self,
        _registry: &ModuleRegistry,
        use_site: FileId,
        target: FileId,
    ) -> bool {
        use_site == target
    }
}

/// Dangling-file-aware policy: a dangling module can see the privates of its
/// context module, and a dangling file can see the file-private top-level
/// declarations of the exact file it is scoped against.
pub struct DanglingAwarePrivateVisibility;

impl DanglingAwarePrivateVisibility {
    fn is_dangling_file_with_context_equal_to(
        registry: &ModuleRegistry,
        use_site: FileId,
        target: FileId,
    ) -> bool {
        let Some(use_module) = registry.module_of_file(use_site) else {
            return false;
        };
        if !registry.is_dangling(use_module) {
            return false;
        }
        // Never in the reverse direction: a target inside a dangling module
        // is invisible to everyone.
        match registry.module_of_file(target) {
            Some(target_module) if registry.is_dangling(target_module) => return false,
            None => return false,
            Some(_) => {}
        }
        registry.context_file(use_module) == Some(target)
    }
}

impl PrivateVisibleFromDifferentModuleExtension for DanglingAwarePrivateVisibility {
    fn can_see_private_declarations_of_module(
        &self,
        registry: &ModuleRegistry,
        requesting: ModuleId,
        owning: ModuleId,
    ) -> bool {
        registry.unwrap_dangling(requesting) == owning
    }

    fn can_see_private_top_level_declarations_from_file(
        &self,
        registry: &ModuleRegistry,
        use_site: FileId,
        target: FileId,
    ) -> bool {
        Self::is_dangling_file_with_context_equal_to(registry, use_site, target)
    }
}
