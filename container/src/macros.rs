//! Public macros for ergonomic resolution from the global container.

/// Resolves an abstract from the global container.
///
/// It panics if no global container is installed or the abstract cannot be
/// resolved, so required dependencies fail loudly at runtime. For a
/// non-panicking version, call [`global`](crate::global) and
/// [`Container::make`](crate::Container::make) directly.
///
/// # Panics
///
/// On a missing global container, a resolution error, or a type mismatch.
///
/// # Examples
///
/// ```
/// use fibre_container::{resolve, set_global, take_global, Concrete, Container, Instance};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::new();
/// container.instance("greeting", Instance::new(String::from("hello")));
/// container.singleton(
///   "IGreeter",
///   Concrete::factory(|_, _| Ok(Instance::from_arc::<dyn Greeter>(Arc::new(EnglishGreeter)))),
/// );
/// set_global(Arc::new(container));
///
/// let message = resolve!("greeting", String);
/// assert_eq!(*message, "hello");
///
/// let greeter = resolve!("IGreeter", trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
///
/// take_global();
/// ```
#[macro_export]
macro_rules! resolve {
    // Arm for an untyped instance: resolve!("abstract")
    ($abstract:expr) => {
        $crate::global()
            .unwrap_or_else(|| panic!("No global container installed while resolving '{}'", $abstract))
            .make($abstract)
            .unwrap_or_else(|err| panic!("Failed to resolve required service '{}': {}", $abstract, err))
    };

    // Arm for a trait object: resolve!("abstract", trait MyTrait)
    ($abstract:expr, trait $trait_ident:ident) => {
        $crate::global()
            .unwrap_or_else(|| panic!("No global container installed while resolving '{}'", $abstract))
            .make_as::<dyn $trait_ident>($abstract)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required trait service '{}' as {}: {}",
                    $abstract,
                    std::any::type_name::<dyn $trait_ident>(),
                    err
                )
            })
    };

    // Arm for a concrete type: resolve!("abstract", MyService)
    ($abstract:expr, $type:ty) => {
        $crate::global()
            .unwrap_or_else(|| panic!("No global container installed while resolving '{}'", $abstract))
            .make_as::<$type>($abstract)
            .unwrap_or_else(|err| {
                panic!(
                    "Failed to resolve required service '{}' as {}: {}",
                    $abstract,
                    std::any::type_name::<$type>(),
                    err
                )
            })
    };
}
