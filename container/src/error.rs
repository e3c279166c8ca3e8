use thiserror::Error;

/// Broad classification of an [`Error`].
///
/// Callers that only care about *why* a resolution failed can match on this
/// instead of the individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// A type could not be built or one of its dependencies could not be supplied.
  BindingResolution,
  /// The container was asked to do something its current state does not allow.
  InvalidArgument,
  /// A type ended up depending on itself, or the build went too deep.
  Circular,
  /// A user supplied factory, constructor or callback failed on its own,
  /// including reading an argument it was never given or under the wrong type.
  Factory,
}

/// The main error type for the `fibre_container` library.
#[derive(Debug, Clone, Error)]
pub enum Error {
  #[error("Target class [{0}] does not exist.")]
  UnknownClass(String),

  #[error("Target [{0}] is not instantiable.")]
  NotInstantiable(String),

  #[error("Unresolvable dependency resolving [{parameter}] in class {class}")]
  UnresolvableDependency { parameter: String, class: String },

  #[error("Circular dependency detected: {}", path.join(" -> "))]
  CircularDependency { path: Vec<String> },

  #[error("Maximum build depth of {0} exceeded")]
  DepthExceeded(usize),

  #[error("Type {0} is not bound")]
  NotBound(String),

  #[error("Method not provided for call target [{0}]")]
  MethodNotProvided(String),

  #[error("Method [{method}] does not exist on [{class}]")]
  MethodNotFound { class: String, method: String },

  #[error("[{alias}] cannot be aliased to [{target}]: {reason}")]
  InvalidAlias {
    alias: String,
    target: String,
    reason: &'static str,
  },

  #[error("Type mismatch for [{name}]: expected {expected}, found {found}")]
  TypeMismatch {
    name: String,
    expected: &'static str,
    found: &'static str,
  },

  #[error("No argument named [{0}] was resolved")]
  MissingArgument(String),

  #[error("{0}")]
  Custom(String),
}

impl Error {
  /// Creates an error from a factory or callback failure message.
  pub fn custom(message: impl Into<String>) -> Self {
    Error::Custom(message.into())
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::UnknownClass(_)
      | Error::NotInstantiable(_)
      | Error::UnresolvableDependency { .. } => ErrorKind::BindingResolution,
      Error::NotBound(_)
      | Error::MethodNotProvided(_)
      | Error::MethodNotFound { .. }
      | Error::InvalidAlias { .. } => ErrorKind::InvalidArgument,
      Error::CircularDependency { .. } | Error::DepthExceeded(_) => ErrorKind::Circular,
      Error::TypeMismatch { .. } | Error::MissingArgument(_) | Error::Custom(_) => {
        ErrorKind::Factory
      }
    }
  }

  /// Whether this failure may be replaced by an optional parameter's default.
  pub fn is_binding_resolution(&self) -> bool {
    self.kind() == ErrorKind::BindingResolution
  }
}

/// A specialized `Result` type for `fibre_container` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
