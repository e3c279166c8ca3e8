use fibre_container::{Concrete, Container, ErrorKind, Instance};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// --- Test Fixtures ---

trait IClock: Send + Sync {
  fn ticks(&self) -> u64;
}

struct Clock {
  ticks: u64,
}

impl IClock for Clock {
  fn ticks(&self) -> u64 {
    self.ticks
  }
}

fn clock_factory() -> Concrete {
  Concrete::factory(|_, _| Ok(Instance::from_arc::<dyn IClock>(Arc::new(Clock { ticks: 7 }))))
}

// --- Basic Tests ---

#[test]
fn test_transient_binding_yields_distinct_instances() {
  // Arrange
  let container = Container::new();
  container.bind("IClock", clock_factory(), false);

  // Act
  let first = container.make("IClock").unwrap();
  let second = container.make("IClock").unwrap();

  // Assert
  assert_eq!(first.downcast::<dyn IClock>().unwrap().ticks(), 7);
  assert!(!Instance::ptr_eq(&first, &second));
  assert!(!container.is_shared("IClock"));
}

#[test]
fn test_shared_binding_yields_same_instance() {
  // Arrange
  let container = Container::new();
  container.bind_shared("IClock", |_, _| {
    Ok(Instance::from_arc::<dyn IClock>(Arc::new(Clock { ticks: 1 })))
  });

  // Act
  let first = container.make("IClock").unwrap();
  let second = container.make("IClock").unwrap();

  // Assert
  assert!(Instance::ptr_eq(&first, &second));
  assert!(container.is_shared("IClock"));
}

#[test]
fn test_singleton_caches_until_forgotten() {
  static BUILDS: AtomicUsize = AtomicUsize::new(0);

  // Arrange
  let container = Container::new();
  container.singleton(
    "counter",
    Concrete::factory(|_, _| Ok(Instance::new(BUILDS.fetch_add(1, Ordering::SeqCst)))),
  );

  // Act
  let first = container.make("counter").unwrap();
  let again = container.make("counter").unwrap();
  container.forget_instance("counter");
  let rebuilt = container.make("counter").unwrap();

  // Assert
  assert!(Instance::ptr_eq(&first, &again));
  assert!(!Instance::ptr_eq(&first, &rebuilt));
  assert_eq!(BUILDS.load(Ordering::SeqCst), 2);
}

#[test]
fn test_bind_shared_factory_survives_forget_instance() {
  // The shared factory memoises its own result, so forgetting the cached
  // instance hands back the very same value.
  let container = Container::new();
  container.bind_shared("config", |_, _| Ok(Instance::new(String::from("cfg"))));

  let first = container.make("config").unwrap();
  container.forget_instance("config");
  let second = container.make("config").unwrap();

  assert!(Instance::ptr_eq(&first, &second));
}

#[test]
fn test_alias_resolves_like_the_abstract() {
  // Arrange
  let container = Container::new();
  container.bind_shared("IClock", |_, _| {
    Ok(Instance::from_arc::<dyn IClock>(Arc::new(Clock { ticks: 3 })))
  });
  container.alias("IClock", "clock").unwrap();

  // Act
  let by_alias = container.make("clock").unwrap();
  let by_abstract = container.make("IClock").unwrap();

  // Assert
  assert!(container.is_alias("clock"));
  assert!(!container.is_alias("IClock"));
  assert_eq!(container.get_alias("clock"), "IClock");
  assert!(Instance::ptr_eq(&by_alias, &by_abstract));
  assert_eq!(by_alias.downcast::<dyn IClock>().unwrap().ticks(), 3);
  assert!(container.bound("clock"));
  assert!(container.is_shared("clock"));
}

#[test]
fn test_alias_chains_are_followed_and_loops_rejected() {
  let container = Container::new();
  container.instance("IClock", Instance::new(5u64));
  container.alias("IClock", "clock").unwrap();
  container.alias("clock", "timer").unwrap();

  assert_eq!(*container.make_as::<u64>("timer").unwrap(), 5);

  let err = container.alias("timer", "IClock").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidArgument);
  let err = container.alias("clock", "clock").unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_rebinding_drops_stale_instance_and_alias() {
  // Arrange
  let container = Container::new();
  container.singleton(
    "mailer",
    Concrete::factory(|_, _| Ok(Instance::new("smtp"))),
  );
  let old = container.make("mailer").unwrap();
  container.instance("transport", Instance::new("old transport"));
  container.alias("transport", "mailer_alias").unwrap();
  container.alias("transport", "queue").unwrap();

  // Act: bind over an abstract that is also used as an alias name.
  container.bind("queue", Concrete::factory(|_, _| Ok(Instance::new("redis"))), false);
  container.singleton(
    "mailer",
    Concrete::factory(|_, _| Ok(Instance::new("sendmail"))),
  );

  // Assert
  assert!(!container.is_alias("queue"));
  assert_eq!(*container.make_as::<&str>("queue").unwrap(), "redis");
  let new = container.make("mailer").unwrap();
  assert!(!Instance::ptr_eq(&old, &new));
  assert_eq!(*new.downcast::<&str>().unwrap(), "sendmail");
}

#[test]
fn test_bind_if_keeps_existing_binding() {
  let container = Container::new();
  assert!(container.bind_if("name", Concrete::factory(|_, _| Ok(Instance::new("first"))), false));
  assert!(!container.bind_if("name", Concrete::factory(|_, _| Ok(Instance::new("second"))), false));

  assert_eq!(*container.make_as::<&str>("name").unwrap(), "first");
}

#[test]
fn test_instance_registration_is_shared_and_bound() {
  let container = Container::new();
  let value = Instance::new(vec![1, 2, 3]);
  container.instance("numbers", value.clone());

  assert!(container.bound("numbers"));
  assert!(container.is_shared("numbers"));
  assert!(container.resolved("numbers"));
  assert!(Instance::ptr_eq(&container.make("numbers").unwrap(), &value));
}

#[test]
fn test_resolved_tracks_transient_resolutions() {
  let container = Container::new();
  container.bind("IClock", clock_factory(), false);
  assert!(!container.resolved("IClock"));

  container.make("IClock").unwrap();

  assert!(container.resolved("IClock"));
  // A transient resolution is never cached.
  assert!(!container.is_shared("IClock"));
}

#[test]
fn test_abstract_bound_to_abstract_is_resolved_through_it() {
  let container = Container::new();
  container.singleton("IClock", clock_factory());
  container.bind("clock.default", "IClock", false);

  let via_indirection = container.make("clock.default").unwrap();
  let direct = container.make("IClock").unwrap();

  assert!(Instance::ptr_eq(&via_indirection, &direct));
}

#[test]
fn test_leading_namespace_separator_fallback() {
  let container = Container::new();
  container.bind("\\App\\Clock", clock_factory(), false);

  let clock = container.make_as::<dyn IClock>("App\\Clock").unwrap();

  assert_eq!(clock.ticks(), 7);
}

#[test]
fn test_unbound_interface_fails_with_binding_resolution() {
  let container = Container::new();

  let err = container.make("Unbound\\Interface").unwrap_err();

  assert_eq!(err.kind(), ErrorKind::BindingResolution);
  assert!(container.build_stack().is_empty());
}

#[test]
fn test_get_bindings_snapshot() {
  let container = Container::new();
  container.bind("a", clock_factory(), false);
  container.singleton("b", "a");

  let bindings = container.get_bindings();

  let mut keys: Vec<_> = bindings.keys().cloned().collect();
  keys.sort();
  assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
  assert!(bindings["b"].is_shared());
  assert_eq!(bindings["b"].concrete().as_abstract(), Some("a"));
  assert!(bindings["a"].concrete().is_factory());
}

#[test]
fn test_forget_instances_and_flush() {
  // Arrange
  let container = Container::new();
  container.singleton("IClock", clock_factory());
  container.alias("IClock", "clock").unwrap();
  container.instance("answer", Instance::new(42u8));
  container.make("clock").unwrap();

  // Act: drop every cached instance.
  container.forget_instances();

  // Assert
  assert!(!container.bound("answer"));
  assert!(container.bound("IClock"));
  assert!(container.resolved("IClock"));

  // Act: flush everything else.
  container.flush();

  // Assert
  assert!(!container.bound("IClock"));
  assert!(!container.resolved("IClock"));
  assert!(!container.is_alias("clock"));
  assert!(container.get_bindings().is_empty());
}

#[test]
fn test_keyed_set_unset_has() {
  let container = Container::new();
  let value = Instance::new(String::from("value"));
  container.set("key", value.clone());

  assert!(container.has("key"));
  let first = container.make("key").unwrap();
  assert!(Instance::ptr_eq(&first, &value));

  container.unset("key");
  assert!(!container.has("key"));
  assert!(!container.bound("key"));
}

#[test]
fn test_make_as_reports_type_mismatch() {
  let container = Container::new();
  container.instance("port", Instance::new(8080u16));

  let err = container.make_as::<String>("port").unwrap_err();

  assert_eq!(err.kind(), ErrorKind::Factory);
}
