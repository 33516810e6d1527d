use tarn_binder::{
    DanglingAwarePrivateVisibility, DefaultPrivateVisibility, ModulePlatform, ModuleRegistry,
    PrivateVisibleFromDifferentModuleExtension,
};
use tarn_common::FileId;

struct Setup {
    registry: ModuleRegistry,
    real_module: tarn_binder::ModuleId,
    dangling_module: tarn_binder::ModuleId,
    context_file: FileId,
    other_file: FileId,
    dangling_file: FileId,
}

fn setup() -> Setup {
    let registry = ModuleRegistry::new();
    let real_module = registry.add_source_module("app", ModulePlatform::Platform);
    let context_file = FileId(0);
    let other_file = FileId(1);
    registry.register_file(context_file, real_module);
    registry.register_file(other_file, real_module);

    let dangling_module = registry.add_dangling_module("scratch", real_module, context_file);
    let dangling_file = FileId(100);
    registry.register_file(dangling_file, dangling_module);

    Setup {
        registry,
        real_module,
        dangling_module,
        context_file,
        other_file,
        dangling_file,
    }
}

#[test]
fn dangling_module_sees_privates_of_its_context_module() {
    let s = setup();
    let policy = DanglingAwarePrivateVisibility;
    assert!(policy.can_see_private_declarations_of_module(
        &s.registry,
        s.dangling_module,
        s.real_module
    ));
}

#[test]
fn real_module_never_sees_privates_of_a_dangling_module() {
    let s = setup();
    let policy = DanglingAwarePrivateVisibility;
    assert!(!policy.can_see_private_declarations_of_module(
        &s.registry,
        s.real_module,
        s.dangling_module
    ));
}

#[test]
fn dangling_file_sees_private_top_level_of_its_context_file_only() {
    let s = setup();
    let policy = DanglingAwarePrivateVisibility;
    assert!(policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.dangling_file,
        s.context_file
    ));
    assert!(!policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.dangling_file,
        s.other_file
    ));
}

#[test]
fn direction_is_asymmetric() {
    // The load-bearing property: an ordinary file must never see into a
    // dangling file, even though the dangling file sees into it.
    let s = setup();
    let policy = DanglingAwarePrivateVisibility;
    assert!(!policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.context_file,
        s.dangling_file
    ));
    assert!(!policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.other_file,
        s.dangling_file
    ));
}

#[test]
fn dangling_file_never_sees_another_dangling_file() {
    let s = setup();
    let second_dangling = s
        .registry
        .add_dangling_module("scratch2", s.real_module, s.context_file);
    let second_file = FileId(101);
    s.registry.register_file(second_file, second_dangling);

    let policy = DanglingAwarePrivateVisibility;
    assert!(!policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.dangling_file,
        second_file
    ));
}

#[test]
fn default_policy_is_same_module_same_file() {
    let s = setup();
    let policy = DefaultPrivateVisibility;
    assert!(policy.can_see_private_declarations_of_module(
        &s.registry,
        s.real_module,
        s.real_module
    ));
    assert!(!policy.can_see_private_declarations_of_module(
        &s.registry,
        s.dangling_module,
        s.real_module
    ));
    assert!(policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.context_file,
        s.context_file
    ));
    assert!(!policy.can_see_private_top_level_declarations_from_file(
        &s.registry,
        s.context_file,
        s.other_file
    ));
}

#[test]
fn unwrap_dangling_resolves_to_the_context_module() {
    let s = setup();
    assert_eq!(s.registry.unwrap_dangling(s.dangling_module), s.real_module);
    assert_eq!(s.registry.unwrap_dangling(s.real_module), s.real_module);
    assert_eq!(s.registry.context_file(s.dangling_module), Some(s.context_file));
    assert_eq!(s.registry.context_file(s.real_module), None);
}
