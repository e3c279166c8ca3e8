//! Binding table entries and the function types stored alongside them.

use crate::container::Container;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::params::Parameters;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// A factory producing an instance from the container and the caller's
/// explicit parameters.
pub type Factory = Arc<dyn Fn(&Container, &Parameters) -> Result<Instance> + Send + Sync>;

pub(crate) type Decorator = Arc<dyn Fn(Instance, &Container) -> Result<Instance> + Send + Sync>;
pub(crate) type ResolvingCallback = Arc<dyn Fn(&Instance, &Container) + Send + Sync>;
pub(crate) type ReboundCallback = Arc<dyn Fn(&Container, &Instance) + Send + Sync>;

/// What an abstract resolves to.
#[derive(Clone)]
pub enum Concrete {
  /// Another abstract identifier (or the name of a registered class).
  Abstract(String),
  /// A factory invoked on every build.
  Factory(Factory),
}

impl Concrete {
  pub fn factory<F>(factory: F) -> Self
  where
    F: Fn(&Container, &Parameters) -> Result<Instance> + Send + Sync + 'static,
  {
    Concrete::Factory(Arc::new(factory))
  }

  pub fn is_factory(&self) -> bool {
    matches!(self, Concrete::Factory(_))
  }

  pub fn as_abstract(&self) -> Option<&str> {
    match self {
      Concrete::Abstract(name) => Some(name),
      Concrete::Factory(_) => None,
    }
  }

  /// Turns an indirection into a factory for `abstract`: the target is built
  /// directly when it names `abstract` itself and resolved otherwise.
  pub(crate) fn into_factory(self, abstract_: &str) -> Factory {
    match self {
      Concrete::Factory(factory) => factory,
      Concrete::Abstract(target) if target == abstract_ => {
        Arc::new(move |container: &Container, parameters: &Parameters| {
          container.build_with(target.as_str(), parameters)
        })
      }
      Concrete::Abstract(target) => Arc::new(move |container: &Container, parameters: &Parameters| {
        container.make_with(&target, parameters)
      }),
    }
  }
}

impl From<&str> for Concrete {
  fn from(name: &str) -> Self {
    Concrete::Abstract(name.to_owned())
  }
}

impl From<String> for Concrete {
  fn from(name: String) -> Self {
    Concrete::Abstract(name)
  }
}

impl From<&String> for Concrete {
  fn from(name: &String) -> Self {
    Concrete::Abstract(name.clone())
  }
}

impl From<Factory> for Concrete {
  fn from(factory: Factory) -> Self {
    Concrete::Factory(factory)
  }
}

impl fmt::Debug for Concrete {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Concrete::Abstract(name) => write!(f, "Abstract({})", name),
      Concrete::Factory(_) => write!(f, "Factory"),
    }
  }
}

/// How to build one abstract.
#[derive(Clone, Debug)]
pub struct Binding {
  pub(crate) concrete: Concrete,
  pub(crate) shared: bool,
}

impl Binding {
  pub fn concrete(&self) -> &Concrete {
    &self.concrete
  }

  pub fn is_shared(&self) -> bool {
    self.shared
  }
}

/// Wraps a factory so it runs at most once; every later call returns the
/// first successful result. A failed attempt leaves the cell empty.
///
/// A factory that resolves itself while initializing fails with
/// [`Error::CircularDependency`] instead of waiting on its own cell.
pub fn share<F>(factory: F) -> Concrete
where
  F: Fn(&Container, &Parameters) -> Result<Instance> + Send + Sync + 'static,
{
  let cell: Arc<OnceCell<Instance>> = Arc::new(OnceCell::new());
  let initializer: Arc<Mutex<Option<ThreadId>>> = Arc::new(Mutex::new(None));
  Concrete::factory(move |container, parameters| {
    if let Some(instance) = cell.get() {
      return Ok(instance.clone());
    }

    let current = thread::current().id();
    if *initializer.lock() == Some(current) {
      return Err(Error::CircularDependency {
        path: container.build_stack(),
      });
    }

    cell
      .get_or_try_init(|| {
        let _owner = InitOwner::claim(&initializer, current);
        factory(container, parameters)
      })
      .cloned()
  })
}

/// Marks the thread running a shared factory's initializer until dropped.
struct InitOwner<'a> {
  slot: &'a Mutex<Option<ThreadId>>,
}

impl<'a> InitOwner<'a> {
  fn claim(slot: &'a Mutex<Option<ThreadId>>, thread: ThreadId) -> Self {
    *slot.lock() = Some(thread);
    Self { slot }
  }
}

impl Drop for InitOwner<'_> {
  fn drop(&mut self) {
    *self.slot.lock() = None;
  }
}
