//! Declarative constructor and method signatures.
//!
//! Rust has no runtime reflection, so types that the container should be able
//! to build on its own describe themselves up front: a [`Class`] lists the
//! constructor's [`Parameter`]s in order, says whether it can be instantiated
//! at all, and optionally exposes [`Method`]s for `call("Class@method")`.
//! The [`Injectable`] trait is the typed shortcut for the same description.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::params::Arguments;
use std::any::{self, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type ConstructorFn = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;
type MethodFn = Arc<dyn Fn(&Instance, &Arguments) -> Result<Instance> + Send + Sync>;
type CallableFn = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

/// One declared parameter of a constructor, method or callable.
#[derive(Clone, Debug)]
pub struct Parameter {
  name: String,
  class: Option<String>,
  default: Option<Instance>,
}

impl Parameter {
  /// An untyped (primitive) parameter. It can only be satisfied by an
  /// explicit value or its default.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      class: None,
      default: None,
    }
  }

  /// A parameter typed with the abstract `class`, resolved through the
  /// container when no explicit value is supplied.
  pub fn class(name: impl Into<String>, class: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      class: Some(class.into()),
      default: None,
    }
  }

  pub fn with_default<T: Any + Send + Sync>(self, value: T) -> Self {
    self.with_default_instance(Instance::new(value))
  }

  pub fn with_default_instance(mut self, value: Instance) -> Self {
    self.default = Some(value);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn class_name(&self) -> Option<&str> {
    self.class.as_deref()
  }

  pub fn default_value(&self) -> Option<&Instance> {
    self.default.as_ref()
  }

  pub fn is_optional(&self) -> bool {
    self.default.is_some()
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
  Concrete,
  Interface,
  Abstract,
}

/// A method that can be invoked on a built instance through `call`.
#[derive(Clone)]
pub struct Method {
  parameters: Vec<Parameter>,
  body: MethodFn,
}

impl Method {
  pub fn new<F>(parameters: Vec<Parameter>, body: F) -> Self
  where
    F: Fn(&Instance, &Arguments) -> Result<Instance> + Send + Sync + 'static,
  {
    Self {
      parameters,
      body: Arc::new(body),
    }
  }

  /// A method on a known receiver type `T` returning `R`.
  pub fn typed<T, R, F>(parameters: Vec<Parameter>, body: F) -> Self
  where
    T: Any + Send + Sync,
    R: Any + Send + Sync,
    F: Fn(&T, &Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self::new(parameters, move |receiver, args| {
      let target = receiver.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
        name: "self".to_owned(),
        expected: any::type_name::<T>(),
        found: receiver.type_name(),
      })?;
      body(&*target, args).map(Instance::new)
    })
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn invoke(&self, receiver: &Instance, args: &Arguments) -> Result<Instance> {
    (self.body)(receiver, args)
  }
}

impl fmt::Debug for Method {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Method")
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

/// Build metadata for one named type.
#[derive(Clone)]
pub struct Class {
  name: String,
  kind: ClassKind,
  parameters: Vec<Parameter>,
  constructor: Option<ConstructorFn>,
  methods: HashMap<String, Method>,
}

impl Class {
  /// A concrete class. It becomes instantiable once a constructor is set.
  pub fn new(name: impl Into<String>) -> Self {
    Self::with_kind(name, ClassKind::Concrete)
  }

  pub fn interface(name: impl Into<String>) -> Self {
    Self::with_kind(name, ClassKind::Interface)
  }

  pub fn abstract_class(name: impl Into<String>) -> Self {
    Self::with_kind(name, ClassKind::Abstract)
  }

  fn with_kind(name: impl Into<String>, kind: ClassKind) -> Self {
    Self {
      name: name.into(),
      kind,
      parameters: Vec::new(),
      constructor: None,
      methods: HashMap::new(),
    }
  }

  /// Appends a constructor parameter. Order of calls is declaration order.
  pub fn parameter(mut self, parameter: Parameter) -> Self {
    self.parameters.push(parameter);
    self
  }

  pub fn parameters_from(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
    self.parameters.extend(parameters);
    self
  }

  pub fn constructor<T, F>(self, constructor: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
  {
    self.constructor_instance(move |args| constructor(args).map(Instance::new))
  }

  /// Like [`constructor`](Class::constructor), for constructors that already
  /// produce an [`Instance`] (for example one wrapping a trait object).
  pub fn constructor_instance<F>(mut self, constructor: F) -> Self
  where
    F: Fn(&Arguments) -> Result<Instance> + Send + Sync + 'static,
  {
    self.constructor = Some(Arc::new(constructor));
    self
  }

  pub fn method(mut self, name: impl Into<String>, method: Method) -> Self {
    self.methods.insert(name.into(), method);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn kind(&self) -> ClassKind {
    self.kind
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub fn get_method(&self, name: &str) -> Option<&Method> {
    self.methods.get(name)
  }

  pub fn is_instantiable(&self) -> bool {
    self.kind == ClassKind::Concrete && self.constructor.is_some()
  }

  pub(crate) fn construct(&self, args: &Arguments) -> Result<Instance> {
    match &self.constructor {
      Some(constructor) => constructor(args).map(|instance| instance.with_class(&self.name)),
      None => Err(Error::NotInstantiable(self.name.clone())),
    }
  }
}

impl fmt::Debug for Class {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Class")
      .field("name", &self.name)
      .field("kind", &self.kind)
      .field("parameters", &self.parameters)
      .field("methods", &self.methods.keys().collect::<Vec<_>>())
      .finish()
  }
}

/// A free function whose parameters the container supplies.
#[derive(Clone)]
pub struct Callable {
  name: String,
  parameters: Vec<Parameter>,
  body: CallableFn,
}

impl Callable {
  pub fn new<R, F>(body: F) -> Self
  where
    R: Any + Send + Sync,
    F: Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  {
    Self {
      name: "Closure".to_owned(),
      parameters: Vec::new(),
      body: Arc::new(move |args: &Arguments| body(args).map(Instance::new)),
    }
  }

  /// Names the callable in error messages.
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn parameter(mut self, parameter: Parameter) -> Self {
    self.parameters.push(parameter);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn parameters(&self) -> &[Parameter] {
    &self.parameters
  }

  pub(crate) fn invoke(&self, args: &Arguments) -> Result<Instance> {
    (self.body)(args)
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callable")
      .field("name", &self.name)
      .field("parameters", &self.parameters)
      .finish_non_exhaustive()
  }
}

/// What `call` invokes: a [`Callable`] or a `"Class@method"` reference.
#[derive(Clone, Debug)]
pub enum CallTarget {
  Callable(Callable),
  Reference(String),
}

impl From<Callable> for CallTarget {
  fn from(callable: Callable) -> Self {
    CallTarget::Callable(callable)
  }
}

impl From<&str> for CallTarget {
  fn from(reference: &str) -> Self {
    CallTarget::Reference(reference.to_owned())
  }
}

impl From<String> for CallTarget {
  fn from(reference: String) -> Self {
    CallTarget::Reference(reference)
  }
}

/// Typed self-description for a buildable type.
///
/// ```
/// use fibre_container::{Arguments, Injectable, Parameter, Result};
///
/// struct Greeting {
///   text: String,
/// }
///
/// impl Injectable for Greeting {
///   const CLASS: &'static str = "Greeting";
///
///   fn parameters() -> Vec<Parameter> {
///     vec![Parameter::new("text").with_default(String::from("hi"))]
///   }
///
///   fn construct(args: &Arguments) -> Result<Self> {
///     Ok(Greeting { text: args.value("text")? })
///   }
/// }
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
  /// The name the type is registered and built under.
  const CLASS: &'static str;

  fn parameters() -> Vec<Parameter> {
    Vec::new()
  }

  fn construct(args: &Arguments) -> Result<Self>;

  fn methods() -> Vec<(&'static str, Method)> {
    Vec::new()
  }

  fn describe() -> Class {
    Self::methods().into_iter().fold(
      Class::new(Self::CLASS)
        .parameters_from(Self::parameters())
        .constructor(Self::construct),
      |class, (name, method)| class.method(name, method),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_concrete_classes_with_constructors_are_instantiable() {
    assert!(!Class::interface("ILogger").is_instantiable());
    assert!(!Class::abstract_class("Base").is_instantiable());
    assert!(!Class::new("NoCtor").is_instantiable());
    assert!(Class::new("Unit").constructor(|_| Ok(())).is_instantiable());
  }

  #[test]
  fn constructed_instances_remember_their_class() {
    let class = Class::new("Counter").constructor(|_| Ok(0u32));
    let instance = class.construct(&Arguments::default()).unwrap();
    assert_eq!(instance.class(), Some("Counter"));
  }

  #[test]
  fn typed_methods_reject_foreign_receivers() {
    let method = Method::typed::<u32, u32, _>(vec![], |value, _| Ok(value + 1));

    let out = method
      .invoke(&Instance::new(1u32), &Arguments::default())
      .unwrap();
    assert_eq!(*out.downcast::<u32>().unwrap(), 2);

    let err = method
      .invoke(&Instance::new("nope"), &Arguments::default())
      .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
  }

  #[test]
  fn optional_parameters_carry_defaults() {
    let parameter = Parameter::class("logger", "ILogger").with_default(0u8);
    assert!(parameter.is_optional());
    assert_eq!(parameter.class_name(), Some("ILogger"));
    assert!(!Parameter::new("name").is_optional());
  }
}
