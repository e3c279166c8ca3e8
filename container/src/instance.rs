//! The type-erased value handed out by the container.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

/// A cheaply clonable, type-erased handle to a resolved value.
///
/// The payload is always stored as an `Arc<T>` behind a `dyn Any`, which is
/// what allows trait objects (`Arc<dyn Trait>`) to be stored and recovered
/// the same way as concrete types. Cloning an `Instance` never clones the
/// value; two clones are [`ptr_eq`](Instance::ptr_eq).
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  // Address of the wrapped `T`, used for identity.
  payload: usize,
  type_name: &'static str,
  class: Option<Arc<str>>,
}

impl Instance {
  /// Wraps an owned value.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Wraps an existing `Arc`, which may point at a trait object.
  pub fn from_arc<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
    Self {
      payload: Arc::as_ptr(&value) as *const () as usize,
      value: Arc::new(value),
      type_name: any::type_name::<T>(),
      class: None,
    }
  }

  /// Recovers the value as `Arc<T>`, where `T` must be the exact type the
  /// instance was created with.
  pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  pub fn is<T: ?Sized + 'static>(&self) -> bool {
    self.value.is::<Arc<T>>()
  }

  /// The name of the type the instance was created with.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// The registered class that constructed this instance, if it came out of
  /// the class registry.
  pub fn class(&self) -> Option<&str> {
    self.class.as_deref()
  }

  /// Identity comparison: true when both handles point at the same value,
  /// including two instances wrapped separately around clones of one `Arc`.
  pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
    a.payload == b.payload
  }

  pub(crate) fn with_class(mut self, class: &str) -> Self {
    self.class = Some(Arc::from(class));
    self
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.class {
      Some(class) => write!(f, "Instance({}, class = {})", self.type_name, class),
      None => write!(f, "Instance({})", self.type_name),
    }
  }
}
