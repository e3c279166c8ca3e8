//! The main `Container` struct and its associated methods.

use crate::binding::{
  share, Binding, Concrete, Decorator, ReboundCallback, ResolvingCallback,
};
use crate::config::ContainerConfig;
use crate::contextual::ContextualBindingBuilder;
use crate::core::{check_redirect, BuildStacks, FrameKind};
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::params::{Arguments, Parameters};
use crate::reflect::{CallTarget, Class, Injectable, Parameter};
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use std::any::{self, Any};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// The dependency resolution container.
///
/// Abstracts are plain strings (usually an interface or class name). Each one
/// can be bound to another abstract or to a factory, shared or not, aliased,
/// or given a pre-built instance. Types registered in the class registry can
/// be built without any binding: their declared constructor parameters are
/// resolved recursively.
///
/// All methods take `&self`, so factories and callbacks receive the container
/// and may resolve further dependencies from it. No internal lock is held
/// while user code runs.
#[derive(Default)]
pub struct Container {
  config: ContainerConfig,
  bindings: DashMap<String, Binding>,
  instances: DashMap<String, Instance>,
  aliases: DashMap<String, String>,
  resolved: DashSet<String>,
  contextual: DashMap<String, HashMap<String, Concrete>>,
  classes: DashMap<String, Arc<Class>>,
  build_stacks: BuildStacks,
  resolving_callbacks: DashMap<String, Vec<ResolvingCallback>>,
  after_resolving_callbacks: DashMap<String, Vec<ResolvingCallback>>,
  global_resolving_callbacks: RwLock<Vec<ResolvingCallback>>,
  global_after_resolving_callbacks: RwLock<Vec<ResolvingCallback>>,
  rebound_callbacks: DashMap<String, Vec<ReboundCallback>>,
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    Self {
      config,
      ..Self::default()
    }
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.config
  }

  // --- PRIVATE HELPERS ---

  fn binding(&self, abstract_: &str) -> Option<Binding> {
    self.bindings.get(abstract_).map(|entry| entry.value().clone())
  }

  fn cached(&self, abstract_: &str) -> Option<Instance> {
    self.instances.get(abstract_).map(|entry| entry.value().clone())
  }

  fn drop_stale_instances(&self, abstract_: &str) {
    self.instances.remove(abstract_);
    self.aliases.remove(abstract_);
  }

  fn callbacks<C: Clone>(registry: &DashMap<String, Vec<C>>, abstract_: &str) -> Vec<C> {
    registry
      .get(abstract_)
      .map(|entry| entry.value().clone())
      .unwrap_or_default()
  }

  /// Whether following aliases from `start` ever reaches `needle`.
  fn alias_chain_reaches(&self, start: &str, needle: &str) -> bool {
    let mut current = start.to_owned();
    for _ in 0..=self.aliases.len() {
      if current == needle {
        return true;
      }
      match self.aliases.get(&current).map(|target| target.value().clone()) {
        Some(target) => current = target,
        None => return false,
      }
    }
    false
  }

  /// The bound concrete for `abstract_`, ignoring contextual overrides.
  fn get_concrete(&self, abstract_: &str) -> Concrete {
    if let Some(binding) = self.binding(abstract_) {
      return binding.concrete;
    }

    if !abstract_.starts_with('\\') {
      let qualified = format!("\\{}", abstract_);
      if self.bindings.contains_key(&qualified) {
        return Concrete::Abstract(qualified);
      }
    }

    Concrete::Abstract(abstract_.to_owned())
  }

  fn resolve(
    &self,
    requested: &str,
    parameters: &Parameters,
    chain: &mut Vec<String>,
  ) -> Result<Instance> {
    let abstract_ = self.get_alias(requested);

    // A contextual build neither reads nor fills the shared cache.
    let contextual = self.get_contextual_concrete(&abstract_);
    let contextual_build = contextual.is_some();

    if !contextual_build {
      if let Some(instance) = self.cached(&abstract_) {
        return Ok(instance);
      }
    }

    let concrete = contextual.unwrap_or_else(|| self.get_concrete(&abstract_));
    trace!(target: "fibre_container", abstract_ = %abstract_, concrete = ?concrete, contextual_build, "make");

    let object = match concrete {
      Concrete::Factory(factory) => {
        let _frame = self
          .build_stacks
          .enter(&abstract_, FrameKind::Factory, &self.config)?;
        factory(self, parameters)?
      }
      Concrete::Abstract(target) if target == abstract_ => self.build_class(&target, parameters)?,
      Concrete::Abstract(target) => {
        if chain.len() >= self.config.max_build_depth {
          return Err(Error::DepthExceeded(self.config.max_build_depth));
        }
        chain.push(abstract_.clone());
        let redirected = if self.config.detect_cycles {
          check_redirect(chain.as_slice(), &target)
        } else {
          Ok(())
        }
        .and_then(|_| self.resolve(&target, parameters, chain));
        chain.pop();
        redirected?
      }
    };

    let object = if !contextual_build && self.is_shared(&abstract_) {
      self
        .instances
        .entry(abstract_.clone())
        .or_insert(object)
        .value()
        .clone()
    } else {
      object
    };

    self.fire_resolving_callbacks(&abstract_, &object);
    self.resolved.insert(abstract_);

    Ok(object)
  }

  fn build_class(&self, name: &str, parameters: &Parameters) -> Result<Instance> {
    let class = self
      .class(name)
      .ok_or_else(|| Error::UnknownClass(name.to_owned()))?;

    if !class.is_instantiable() {
      return Err(Error::NotInstantiable(name.to_owned()));
    }

    let args = {
      let _frame = self
        .build_stacks
        .enter(class.name(), FrameKind::Class, &self.config)?;
      let supplied = parameters.keyed_by(class.parameters());
      self.resolve_dependencies(class.name(), class.parameters(), &supplied)?
    };

    class.construct(&args)
  }

  /// Resolves every declared parameter in order: explicit value, then the
  /// container for typed parameters, then the declared default.
  fn resolve_dependencies(
    &self,
    declaring: &str,
    declared: &[Parameter],
    supplied: &HashMap<String, Instance>,
  ) -> Result<Arguments> {
    let mut args = Arguments::with_capacity(declared.len());

    for parameter in declared {
      let value = if let Some(value) = supplied.get(parameter.name()) {
        value.clone()
      } else if let Some(class) = parameter.class_name() {
        self.resolve_class_parameter(declaring, parameter, class)?
      } else if let Some(default) = parameter.default_value() {
        default.clone()
      } else {
        return Err(Error::UnresolvableDependency {
          parameter: parameter.name().to_owned(),
          class: declaring.to_owned(),
        });
      };
      args.push(parameter.name(), value);
    }

    Ok(args)
  }

  fn resolve_class_parameter(
    &self,
    declaring: &str,
    parameter: &Parameter,
    class: &str,
  ) -> Result<Instance> {
    match self.make(class) {
      Ok(instance) => Ok(instance),
      Err(err) if err.is_binding_resolution() => match parameter.default_value() {
        Some(default) => {
          warn!(
            target: "fibre_container",
            parameter = parameter.name(),
            class = declaring,
            error = %err,
            "optional dependency unresolvable, using default"
          );
          Ok(default.clone())
        }
        None => Err(err),
      },
      Err(err) => Err(err),
    }
  }

  fn call_class(
    &self,
    reference: &str,
    parameters: &Parameters,
    default_method: Option<&str>,
  ) -> Result<Instance> {
    let (class_name, method) = match reference.split_once('@') {
      Some((class_name, method)) => (class_name, Some(method)),
      None => (reference, default_method),
    };
    let method_name = method
      .filter(|method| !method.is_empty())
      .ok_or_else(|| Error::MethodNotProvided(reference.to_owned()))?;

    let receiver = self.make(class_name)?;
    let canonical = self.get_alias(class_name);
    let owner = receiver.class().unwrap_or(canonical.as_str()).to_owned();

    let method = [owner.as_str(), canonical.as_str()]
      .iter()
      .find_map(|name| self.class(name)?.get_method(method_name).cloned())
      .ok_or_else(|| Error::MethodNotFound {
        class: owner.clone(),
        method: method_name.to_owned(),
      })?;

    let declaring = format!("{}@{}", owner, method_name);
    let supplied = parameters.keyed_by(method.parameters());
    let args = self.resolve_dependencies(&declaring, method.parameters(), &supplied)?;
    method.invoke(&receiver, &args)
  }

  fn fire_resolving_callbacks(&self, abstract_: &str, object: &Instance) {
    let resolving = Self::callbacks(&self.resolving_callbacks, abstract_);
    let global = self.global_resolving_callbacks.read().clone();
    for callback in resolving.iter().chain(global.iter()) {
      callback(object, self);
    }

    let after = Self::callbacks(&self.after_resolving_callbacks, abstract_);
    let global_after = self.global_after_resolving_callbacks.read().clone();
    for callback in after.iter().chain(global_after.iter()) {
      callback(object, self);
    }
  }

  fn rebound(&self, abstract_: &str) -> Result<()> {
    let callbacks = Self::callbacks(&self.rebound_callbacks, abstract_);
    if callbacks.is_empty() {
      return Ok(());
    }
    let instance = self.make(abstract_)?;
    for callback in &callbacks {
      callback(self, &instance);
    }
    Ok(())
  }

  /// Rebinding during registration cannot fail the registration itself.
  fn dispatch_rebound(&self, abstract_: &str) {
    if let Err(err) = self.rebound(abstract_) {
      warn!(target: "fibre_container", abstract_, error = %err, "rebound dispatch failed");
    }
  }

  // --- PUBLIC API ---

  // --- Queries ---

  /// Whether `abstract_` has a binding or a cached instance.
  pub fn bound(&self, abstract_: &str) -> bool {
    let abstract_ = self.get_alias(abstract_);
    self.bindings.contains_key(&abstract_) || self.instances.contains_key(&abstract_)
  }

  /// Whether `abstract_` has been resolved at least once (or holds an instance).
  pub fn resolved(&self, abstract_: &str) -> bool {
    let abstract_ = self.get_alias(abstract_);
    self.resolved.contains(&abstract_) || self.instances.contains_key(&abstract_)
  }

  pub fn is_alias(&self, name: &str) -> bool {
    self.aliases.contains_key(name)
  }

  pub fn is_shared(&self, abstract_: &str) -> bool {
    let abstract_ = self.get_alias(abstract_);
    self.instances.contains_key(&abstract_)
      || self
        .bindings
        .get(&abstract_)
        .map(|binding| binding.shared)
        .unwrap_or(false)
  }

  /// Follows the alias table from `name` to its canonical abstract.
  pub fn get_alias(&self, name: &str) -> String {
    let mut current = name.to_owned();
    for _ in 0..=self.aliases.len() {
      match self.aliases.get(&current).map(|target| target.value().clone()) {
        Some(target) => current = target,
        None => break,
      }
    }
    current
  }

  /// A snapshot of the binding table.
  pub fn get_bindings(&self) -> HashMap<String, Binding> {
    self
      .bindings
      .iter()
      .map(|entry| (entry.key().clone(), entry.value().clone()))
      .collect()
  }

  /// The names currently under construction on this thread, outermost first.
  pub fn build_stack(&self) -> Vec<String> {
    self.build_stacks.snapshot()
  }

  // --- Binding Registration ---

  /// Registers (or replaces) how `abstract_` is built. Any cached instance
  /// and any alias named `abstract_` are dropped first.
  pub fn bind(&self, abstract_: &str, concrete: impl Into<Concrete>, shared: bool) {
    let concrete = concrete.into();
    self.drop_stale_instances(abstract_);
    debug!(target: "fibre_container", abstract_, concrete = ?concrete, shared, "bind");
    self
      .bindings
      .insert(abstract_.to_owned(), Binding { concrete, shared });

    if self.resolved(abstract_) {
      self.dispatch_rebound(abstract_);
    }
  }

  /// Binds only if `abstract_` is not bound yet. Returns whether it bound.
  pub fn bind_if(&self, abstract_: &str, concrete: impl Into<Concrete>, shared: bool) -> bool {
    if self.bound(abstract_) {
      return false;
    }
    self.bind(abstract_, concrete, shared);
    true
  }

  pub fn singleton(&self, abstract_: &str, concrete: impl Into<Concrete>) {
    self.bind(abstract_, concrete, true);
  }

  /// Binds a shared factory that itself runs at most once.
  pub fn bind_shared<F>(&self, abstract_: &str, factory: F)
  where
    F: Fn(&Container, &Parameters) -> Result<Instance> + Send + Sync + 'static,
  {
    self.bind(abstract_, share(factory), true);
  }

  /// Registers a pre-built instance, shared from now on.
  pub fn instance(&self, abstract_: &str, instance: Instance) {
    self.aliases.remove(abstract_);
    let bound = self.bound(abstract_);
    debug!(target: "fibre_container", abstract_, instance = ?instance, "instance");
    self.instances.insert(abstract_.to_owned(), instance);

    if bound {
      self.dispatch_rebound(abstract_);
    }
  }

  /// Makes `alias` resolve to `abstract_`.
  pub fn alias(&self, abstract_: &str, alias: &str) -> Result<()> {
    if alias == abstract_ {
      return Err(Error::InvalidAlias {
        alias: alias.to_owned(),
        target: abstract_.to_owned(),
        reason: "an abstract cannot alias itself",
      });
    }
    if self.alias_chain_reaches(abstract_, alias) {
      return Err(Error::InvalidAlias {
        alias: alias.to_owned(),
        target: abstract_.to_owned(),
        reason: "the alias chain would loop",
      });
    }
    debug!(target: "fibre_container", abstract_, alias, "alias");
    self.aliases.insert(alias.to_owned(), abstract_.to_owned());
    Ok(())
  }

  /// Decorates `abstract_`: every future build passes through `decorator`.
  /// A cached instance is decorated immediately and rebound.
  pub fn extend<F>(&self, abstract_: &str, decorator: F) -> Result<()>
  where
    F: Fn(Instance, &Container) -> Result<Instance> + Send + Sync + 'static,
  {
    let abstract_ = self.get_alias(abstract_);
    let binding = self
      .binding(&abstract_)
      .ok_or_else(|| Error::NotBound(abstract_.clone()))?;

    let decorator: Decorator = Arc::new(decorator);
    let resolver = binding.concrete.into_factory(&abstract_);
    let wrapped = Arc::clone(&decorator);
    let extender = Concrete::factory(move |container, parameters| {
      wrapped(resolver(container, parameters)?, container)
    });
    debug!(target: "fibre_container", abstract_ = %abstract_, "extend");

    match self.cached(&abstract_) {
      Some(instance) => {
        let extended = decorator(instance, self)?;
        self.bindings.insert(
          abstract_.clone(),
          Binding {
            concrete: extender,
            shared: binding.shared,
          },
        );
        self.instances.insert(abstract_.clone(), extended);
        self.rebound(&abstract_)
      }
      None => {
        self.bind(&abstract_, extender, binding.shared);
        Ok(())
      }
    }
  }

  // --- Contextual Bindings ---

  /// Starts a contextual binding for builds of `consumer`.
  pub fn when(&self, consumer: &str) -> ContextualBindingBuilder<'_> {
    ContextualBindingBuilder::new(self, consumer)
  }

  pub fn add_contextual_binding(
    &self,
    consumer: &str,
    dependency: &str,
    implementation: impl Into<Concrete>,
  ) {
    let implementation = implementation.into();
    debug!(target: "fibre_container", consumer, dependency, implementation = ?implementation, "contextual binding");
    self
      .contextual
      .entry(consumer.to_owned())
      .or_default()
      .insert(dependency.to_owned(), implementation);
  }

  /// The override for `abstract_` while the current thread is building the
  /// consumer on top of its build stack.
  pub fn get_contextual_concrete(&self, abstract_: &str) -> Option<Concrete> {
    let consumer = self.build_stacks.top()?;
    self
      .contextual
      .get(&consumer)
      .and_then(|overrides| overrides.get(abstract_).cloned())
  }

  // --- Class Registry ---

  pub fn register_class(&self, class: Class) {
    debug!(target: "fibre_container", class = class.name(), instantiable = class.is_instantiable(), "register class");
    self.classes.insert(class.name().to_owned(), Arc::new(class));
  }

  pub fn register<T: Injectable>(&self) {
    self.register_class(T::describe());
  }

  pub fn class(&self, name: &str) -> Option<Arc<Class>> {
    self.classes.get(name).map(|entry| Arc::clone(entry.value()))
  }

  pub fn has_class(&self, name: &str) -> bool {
    self.classes.contains_key(name)
  }

  // --- Callbacks ---

  /// Runs `callback` after every construction of `abstract_`.
  pub fn resolving<F>(&self, abstract_: &str, callback: F)
  where
    F: Fn(&Instance, &Container) + Send + Sync + 'static,
  {
    self
      .resolving_callbacks
      .entry(self.get_alias(abstract_))
      .or_default()
      .push(Arc::new(callback));
  }

  /// Runs `callback` after every construction of any abstract.
  pub fn resolving_any<F>(&self, callback: F)
  where
    F: Fn(&Instance, &Container) + Send + Sync + 'static,
  {
    self.global_resolving_callbacks.write().push(Arc::new(callback));
  }

  /// Like [`resolving`](Container::resolving), but runs once every resolving
  /// callback has.
  pub fn after_resolving<F>(&self, abstract_: &str, callback: F)
  where
    F: Fn(&Instance, &Container) + Send + Sync + 'static,
  {
    self
      .after_resolving_callbacks
      .entry(self.get_alias(abstract_))
      .or_default()
      .push(Arc::new(callback));
  }

  pub fn after_resolving_any<F>(&self, callback: F)
  where
    F: Fn(&Instance, &Container) + Send + Sync + 'static,
  {
    self
      .global_after_resolving_callbacks
      .write()
      .push(Arc::new(callback));
  }

  /// Runs `callback` whenever `abstract_` is rebound. If it is already bound,
  /// it is resolved right away and that instance is returned.
  pub fn rebinding<F>(&self, abstract_: &str, callback: F) -> Result<Option<Instance>>
  where
    F: Fn(&Container, &Instance) + Send + Sync + 'static,
  {
    let abstract_ = self.get_alias(abstract_);
    self
      .rebound_callbacks
      .entry(abstract_.clone())
      .or_default()
      .push(Arc::new(callback));

    if self.bound(&abstract_) {
      return self.make(&abstract_).map(Some);
    }
    Ok(None)
  }

  // --- Resolution ---

  pub fn make(&self, abstract_: &str) -> Result<Instance> {
    self.make_with(abstract_, &Parameters::new())
  }

  /// Resolves `abstract_`, handing `parameters` to its factory or constructor.
  pub fn make_with(&self, abstract_: &str, parameters: &Parameters) -> Result<Instance> {
    self.resolve(abstract_, parameters, &mut Vec::new())
  }

  /// Resolves `abstract_` and downcasts it to `T`.
  pub fn make_as<T: ?Sized + Any>(&self, abstract_: &str) -> Result<Arc<T>> {
    let instance = self.make(abstract_)?;
    instance.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
      name: abstract_.to_owned(),
      expected: any::type_name::<T>(),
      found: instance.type_name(),
    })
  }

  pub fn build(&self, concrete: impl Into<Concrete>) -> Result<Instance> {
    self.build_with(concrete, &Parameters::new())
  }

  /// Builds a factory or registered class directly, bypassing bindings,
  /// the instance cache and resolving callbacks.
  pub fn build_with(&self, concrete: impl Into<Concrete>, parameters: &Parameters) -> Result<Instance> {
    match concrete.into() {
      Concrete::Factory(factory) => factory(self, parameters),
      Concrete::Abstract(name) => self.build_class(&name, parameters),
    }
  }

  /// Invokes a callable or a `"Class@method"` reference, supplying its
  /// parameters from `parameters` and the container.
  pub fn call(
    &self,
    target: impl Into<CallTarget>,
    parameters: &Parameters,
    default_method: Option<&str>,
  ) -> Result<Instance> {
    match target.into() {
      CallTarget::Callable(callable) => {
        let supplied = parameters.keyed_by(callable.parameters());
        let args = self.resolve_dependencies(callable.name(), callable.parameters(), &supplied)?;
        callable.invoke(&args)
      }
      CallTarget::Reference(reference) => self.call_class(&reference, parameters, default_method),
    }
  }

  // --- Keyed Access ---

  /// Binds `key` to a transient factory that always returns `value`.
  pub fn set(&self, key: &str, value: Instance) {
    self.bind(
      key,
      Concrete::factory(move |_, _| Ok(value.clone())),
      false,
    );
  }

  /// Drops the binding and cached instance under `key`.
  pub fn unset(&self, key: &str) {
    self.bindings.remove(key);
    self.instances.remove(key);
  }

  pub fn has(&self, key: &str) -> bool {
    self.bindings.contains_key(key)
  }

  // --- Invalidation ---

  pub fn forget_instance(&self, abstract_: &str) {
    let abstract_ = self.get_alias(abstract_);
    self.instances.remove(&abstract_);
  }

  pub fn forget_instances(&self) {
    self.instances.clear();
  }

  /// Clears bindings, aliases, the resolved set and cached instances.
  /// Contextual bindings, callbacks and registered classes are kept.
  pub fn flush(&self) {
    debug!(target: "fibre_container", "flush");
    self.aliases.clear();
    self.resolved.clear();
    self.bindings.clear();
    self.instances.clear();
  }
}
