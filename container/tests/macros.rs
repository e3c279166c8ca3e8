//! Tests for the global container slot and the `resolve!` macro.
//!
//! Every test here touches the process-wide container, so they run serially.

use fibre_container::{global, resolve, set_global, take_global, Concrete, Container, Instance};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

struct MacroTestService {
  value: i32,
}

trait MacroTestTrait: Send + Sync {
  fn value(&self) -> i32;
}

impl MacroTestTrait for MacroTestService {
  fn value(&self) -> i32 {
    self.value
  }
}

fn install() -> Arc<Container> {
  let container = Container::new();
  container.instance("service", Instance::new(MacroTestService { value: 42 }));
  container.singleton(
    "IMacroTest",
    Concrete::factory(|_, _| {
      Ok(Instance::from_arc::<dyn MacroTestTrait>(Arc::new(
        MacroTestService { value: 7 },
      )))
    }),
  );
  let container = Arc::new(container);
  set_global(Arc::clone(&container));
  container
}

// --- Global Slot Tests ---

#[test]
#[serial]
fn test_global_is_empty_until_set() {
  take_global();
  assert!(global().is_none());

  let container = install();

  assert!(Arc::ptr_eq(&global().unwrap(), &container));
  take_global();
}

#[test]
#[serial]
fn test_set_global_returns_replaced_container() {
  let first = install();
  let second = Arc::new(Container::new());

  let replaced = set_global(Arc::clone(&second)).unwrap();

  assert!(Arc::ptr_eq(&replaced, &first));
  assert!(Arc::ptr_eq(&take_global().unwrap(), &second));
  assert!(global().is_none());
}

// --- `resolve!` Tests ---

#[test]
#[serial]
fn test_resolve_untyped() {
  install();

  let instance = resolve!("service");

  assert_eq!(instance.downcast::<MacroTestService>().unwrap().value, 42);
  take_global();
}

#[test]
#[serial]
fn test_resolve_concrete_type() {
  install();

  let service = resolve!("service", MacroTestService);

  assert_eq!(service.value, 42);
  take_global();
}

#[test]
#[serial]
fn test_resolve_trait_object() {
  install();

  let first = resolve!("IMacroTest", trait MacroTestTrait);
  let second = resolve!("IMacroTest", trait MacroTestTrait);

  assert_eq!(first.value(), 7);
  assert!(Arc::ptr_eq(&first, &second));
  take_global();
}

#[test]
#[serial]
#[should_panic(expected = "Failed to resolve required service 'missing'")]
fn test_resolve_panics_for_unbound_abstract() {
  install();
  let _ = resolve!("missing");
}

#[test]
#[serial]
#[should_panic(expected = "as i32")]
fn test_resolve_panics_on_type_mismatch() {
  install();
  let _ = resolve!("service", i32);
}

#[test]
#[serial]
#[should_panic(expected = "No global container installed")]
fn test_resolve_panics_without_global() {
  take_global();
  let _ = resolve!("service");
}
