//! Values flowing into a build: what the caller supplies and what the
//! container resolved.

use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::reflect::Parameter;
use std::any::{self, Any};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Explicit values supplied to `make`, `build` or `call`.
///
/// Values can be keyed by parameter name or by position. Positional values
/// are re-keyed to the declared parameter names before resolution; a value
/// supplied by name always wins over one supplied for the same position.
#[derive(Clone, Debug, Default)]
pub struct Parameters {
  named: HashMap<String, Instance>,
  positional: BTreeMap<usize, Instance>,
}

impl Parameters {
  pub fn new() -> Self {
    Self::default()
  }

  /// Supplies `value` for the parameter called `name`.
  pub fn with<T: Any + Send + Sync>(self, name: impl Into<String>, value: T) -> Self {
    self.with_instance(name, Instance::new(value))
  }

  pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
    self.named.insert(name.into(), value);
    self
  }

  /// Supplies `value` for the parameter declared at `position`.
  pub fn at<T: Any + Send + Sync>(self, position: usize, value: T) -> Self {
    self.at_instance(position, Instance::new(value))
  }

  pub fn at_instance(mut self, position: usize, value: Instance) -> Self {
    self.positional.insert(position, value);
    self
  }

  pub fn insert(&mut self, name: impl Into<String>, value: Instance) {
    self.named.insert(name.into(), value);
  }

  pub fn get(&self, name: &str) -> Option<&Instance> {
    self.named.get(name)
  }

  pub fn get_at(&self, position: usize) -> Option<&Instance> {
    self.positional.get(&position)
  }

  pub fn len(&self) -> usize {
    self.named.len() + self.positional.len()
  }

  pub fn is_empty(&self) -> bool {
    self.named.is_empty() && self.positional.is_empty()
  }

  /// Folds positional values into the named map using the declared order.
  /// Positions past the end of `declared` are dropped.
  pub(crate) fn keyed_by(&self, declared: &[Parameter]) -> HashMap<String, Instance> {
    let mut keyed = self.named.clone();
    for (position, value) in &self.positional {
      match declared.get(*position) {
        Some(parameter) => {
          keyed
            .entry(parameter.name().to_owned())
            .or_insert_with(|| value.clone());
        }
        None => tracing::trace!(target: "fibre_container", position, "ignoring positional parameter with no declaration"),
      }
    }
    keyed
  }
}

/// The resolved dependency list for one constructor or callable invocation,
/// in declaration order.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
  entries: Vec<(String, Instance)>,
}

impl Arguments {
  pub(crate) fn with_capacity(capacity: usize) -> Self {
    Self {
      entries: Vec::with_capacity(capacity),
    }
  }

  pub(crate) fn push(&mut self, name: impl Into<String>, value: Instance) {
    self.entries.push((name.into(), value));
  }

  pub fn instance(&self, name: &str) -> Option<&Instance> {
    self
      .entries
      .iter()
      .find(|(entry, _)| entry == name)
      .map(|(_, value)| value)
  }

  pub fn at(&self, position: usize) -> Option<&Instance> {
    self.entries.get(position).map(|(_, value)| value)
  }

  /// Returns the argument called `name` as `Arc<T>`.
  pub fn get<T: ?Sized + 'static>(&self, name: &str) -> Result<Arc<T>> {
    let instance = self
      .instance(name)
      .ok_or_else(|| Error::MissingArgument(name.to_owned()))?;
    instance.downcast::<T>().ok_or_else(|| Error::TypeMismatch {
      name: name.to_owned(),
      expected: any::type_name::<T>(),
      found: instance.type_name(),
    })
  }

  /// Returns an owned copy of a primitive argument.
  pub fn value<T: Clone + 'static>(&self, name: &str) -> Result<T> {
    self.get::<T>(name).map(|value| (*value).clone())
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(name, _)| name.as_str())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
