/// Default limit on nested builds for one resolution.
pub const DEFAULT_MAX_BUILD_DEPTH: usize = 100;

/// Tunables for a [`Container`](crate::Container).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContainerConfig {
  /// Maximum number of frames on one thread's build stack. Exceeding it
  /// fails with [`Error::DepthExceeded`](crate::Error::DepthExceeded).
  pub max_build_depth: usize,
  /// Fail with [`Error::CircularDependency`](crate::Error::CircularDependency)
  /// as soon as a type re-enters its own build. When disabled the depth limit
  /// stops runaway recursion, except for a [`share`](crate::share)d factory
  /// resolving itself, which still fails as circular.
  pub detect_cycles: bool,
}

impl ContainerConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn max_build_depth(mut self, depth: usize) -> Self {
    self.max_build_depth = depth;
    self
  }

  pub fn detect_cycles(mut self, enabled: bool) -> Self {
    self.detect_cycles = enabled;
    self
  }
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      max_build_depth: DEFAULT_MAX_BUILD_DEPTH,
      detect_cycles: true,
    }
  }
}
