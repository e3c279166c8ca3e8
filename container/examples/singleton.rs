use fibre_container::{resolve, set_global, Concrete, Container, Instance};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn tracker(kind: &'static str) -> Concrete {
  Concrete::factory(move |_, _| {
    println!("Creating {} RequestTracker...", kind);
    Ok(Instance::new(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    }))
  })
}

fn main() {
  let container = Container::new();

  // --- Shared Registration ---
  // This factory will only be called ONCE.
  container.singleton("singleton_tracker", tracker("SINGLETON"));

  // --- Transient Registration ---
  // This factory will be called EVERY time the abstract is resolved.
  container.bind("transient_tracker", tracker("TRANSIENT"), false);

  set_global(Arc::new(container));

  println!("--- Resolving Singletons ---");
  let s1 = resolve!("singleton_tracker", RequestTracker);
  let s2 = resolve!("singleton_tracker", RequestTracker);
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert_eq!(s2.id, 0);
  assert!(
    Arc::ptr_eq(&s1, &s2),
    "Singleton instances should be identical"
  );
  println!("Singleton instances are the same pointer, as expected.\n");

  println!("--- Resolving Transients ---");
  let t1 = resolve!("transient_tracker", RequestTracker);
  let t2 = resolve!("transient_tracker", RequestTracker);
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(
    !Arc::ptr_eq(&t1, &t2),
    "Transient instances should be different"
  );
  println!("Transient instances are different pointers, as expected.");
}
