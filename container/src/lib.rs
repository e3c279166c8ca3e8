//! # Fibre Container
//!
//! A dependency resolution container keyed by string abstracts.
//!
//! Application bootstrap code declares "what implements what" once, and the
//! container assembles object graphs on demand: it follows aliases, applies
//! contextual overrides, caches shared instances, and supplies constructor or
//! method parameters by resolving them recursively.
//!
//! ## Core Concepts
//!
//! - **Abstract**: the string naming a requested capability, e.g. `"IClock"`.
//! - **Binding**: how an abstract is built, either another abstract or a
//!   factory, and whether the result is shared.
//! - **Class registry**: types describe their constructor parameters up front
//!   ([`Class`], [`Injectable`]) so the container can build them with no
//!   binding at all.
//! - **Contextual binding**: `when("Consumer").needs("Dep").give(..)`
//!   overrides `Dep` only while `Consumer` is being built.
//! - **Instance**: the type-erased handle every resolution returns.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_container::{Class, Concrete, Container, Instance, Parameter};
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!   fn log(&self, message: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!   fn log(&self, message: &str) -> String {
//!     format!("[console] {}", message)
//!   }
//! }
//!
//! struct Service {
//!   logger: Arc<dyn Logger>,
//!   name: String,
//! }
//!
//! let container = Container::new();
//!
//! // Bind the interface to a factory producing the trait object.
//! container.singleton(
//!   "ILogger",
//!   Concrete::factory(|_, _| Ok(Instance::from_arc::<dyn Logger>(Arc::new(ConsoleLogger)))),
//! );
//!
//! // Describe how `Service` is constructed; no binding is needed for it.
//! container.register_class(
//!   Class::new("Service")
//!     .parameter(Parameter::class("logger", "ILogger"))
//!     .parameter(Parameter::new("name").with_default(String::from("default")))
//!     .constructor(|args| {
//!       Ok(Service {
//!         logger: args.get::<dyn Logger>("logger")?,
//!         name: args.value::<String>("name")?,
//!       })
//!     }),
//! );
//!
//! let service = container.make_as::<Service>("Service").unwrap();
//! assert_eq!(service.name, "default");
//! assert_eq!(service.logger.log("up"), "[console] up");
//! ```

mod binding;
mod config;
mod container;
mod contextual;
mod core;
mod error;
mod global;
mod instance;
mod macros;
mod params;
mod reflect;

pub use binding::{share, Binding, Concrete, Factory};
pub use config::{ContainerConfig, DEFAULT_MAX_BUILD_DEPTH};
pub use container::Container;
pub use contextual::{ContextualBindingBuilder, ContextualNeeds};
pub use error::{Error, ErrorKind, Result};
pub use global::{global, set_global, take_global};
pub use instance::Instance;
pub use params::{Arguments, Parameters};
pub use reflect::{CallTarget, Callable, Class, ClassKind, Injectable, Method, Parameter};
