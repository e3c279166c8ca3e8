use fibre_container::{global, resolve, set_global, Class, Container, ErrorKind, Parameter};
use std::panic;
use std::sync::Arc;

fn main() {
  let container = Container::new();
  container.register_class(Class::interface("IMailer"));
  container.register_class(
    Class::new("Newsletter")
      .parameter(Parameter::class("mailer", "IMailer"))
      .constructor(|_| Ok(())),
  );
  set_global(Arc::new(container));

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve an abstract that was never bound...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!("UnregisteredService");
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `make` method ---
  println!("\nNow, building a class whose dependency is an unbound interface...");

  let container = global().expect("container was installed above");
  match container.make("Newsletter") {
    Ok(_) => panic!("Should not have built the newsletter!"),
    Err(err) => {
      assert_eq!(err.kind(), ErrorKind::BindingResolution);
      println!("Correctly received an error: {}", err);
    }
  }
  assert!(container.build_stack().is_empty());
}
