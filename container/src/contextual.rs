//! The fluent `when(..).needs(..).give(..)` helper.

use crate::binding::Concrete;
use crate::container::Container;

/// First step of a contextual binding: the consumer has been captured.
#[must_use = "a contextual binding is only recorded by `give`"]
pub struct ContextualBindingBuilder<'a> {
  container: &'a Container,
  consumer: String,
}

impl<'a> ContextualBindingBuilder<'a> {
  pub(crate) fn new(container: &'a Container, consumer: &str) -> Self {
    Self {
      container,
      consumer: consumer.to_owned(),
    }
  }

  /// Names the dependency whose resolution is overridden.
  pub fn needs(self, dependency: &str) -> ContextualNeeds<'a> {
    ContextualNeeds {
      container: self.container,
      consumer: self.consumer,
      dependency: dependency.to_owned(),
    }
  }
}

/// Second step: consumer and dependency are known.
#[must_use = "a contextual binding is only recorded by `give`"]
pub struct ContextualNeeds<'a> {
  container: &'a Container,
  consumer: String,
  dependency: String,
}

impl ContextualNeeds<'_> {
  /// Commits the override into the container.
  pub fn give(self, implementation: impl Into<Concrete>) {
    self
      .container
      .add_contextual_binding(&self.consumer, &self.dependency, implementation);
  }
}
