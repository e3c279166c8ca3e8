//! Core, non-public data structures for tracking builds in progress.

use crate::config::ContainerConfig;
use crate::error::{Error, Result};
use dashmap::DashMap;
use std::thread::{self, ThreadId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameKind {
  /// A bound factory running on behalf of an abstract.
  Factory,
  /// A registered class being built from its declared parameters.
  Class,
}

#[derive(Clone, Debug)]
struct Frame {
  name: String,
  kind: FrameKind,
}

/// The build stacks of one container, one per thread.
///
/// The top of the calling thread's stack is "who is asking" for contextual
/// binding lookups. Keeping a stack per thread means concurrent resolutions on
/// a shared container never observe each other's context.
#[derive(Default)]
pub(crate) struct BuildStacks {
  stacks: DashMap<ThreadId, Vec<Frame>>,
}

impl BuildStacks {
  /// The name on top of the current thread's stack.
  pub(crate) fn top(&self) -> Option<String> {
    self
      .stacks
      .get(&thread::current().id())
      .and_then(|stack| stack.last().map(|frame| frame.name.clone()))
  }

  pub(crate) fn snapshot(&self) -> Vec<String> {
    self
      .stacks
      .get(&thread::current().id())
      .map(|stack| stack.iter().map(|frame| frame.name.clone()).collect())
      .unwrap_or_default()
  }

  /// Pushes `name` onto the current thread's stack.
  ///
  /// Fails if `name` is already being built further down, unless this is a
  /// class build directly under a factory frame of the same name (a factory
  /// that builds its own abstract, as extended self-bindings do).
  pub(crate) fn enter(
    &self,
    name: &str,
    kind: FrameKind,
    config: &ContainerConfig,
  ) -> Result<FrameGuard<'_>> {
    let mut stack = self.stacks.entry(thread::current().id()).or_default();

    if config.detect_cycles {
      if let Some(start) = stack.iter().position(|frame| frame.name == name) {
        let builds_own_factory = kind == FrameKind::Class
          && start + 1 == stack.len()
          && stack[start].kind == FrameKind::Factory;
        if !builds_own_factory {
          let mut path: Vec<String> = stack[start..].iter().map(|f| f.name.clone()).collect();
          path.push(name.to_owned());
          return Err(Error::CircularDependency { path });
        }
      }
    }

    if stack.len() >= config.max_build_depth {
      return Err(Error::DepthExceeded(config.max_build_depth));
    }

    stack.push(Frame {
      name: name.to_owned(),
      kind,
    });
    tracing::trace!(target: "fibre_container", frame = name, depth = stack.len(), "enter build frame");

    Ok(FrameGuard { stacks: self })
  }

  fn pop(&self) {
    let thread = thread::current().id();
    let emptied = match self.stacks.get_mut(&thread) {
      Some(mut stack) => {
        stack.pop();
        stack.is_empty()
      }
      None => false,
    };
    if emptied {
      self.stacks.remove_if(&thread, |_, stack| stack.is_empty());
    }
  }
}

/// An RAII guard for one build frame.
///
/// Dropping it pops the frame, so the stack unwinds on every exit path,
/// including `?` returns from a failed dependency.
pub(crate) struct FrameGuard<'a> {
  stacks: &'a BuildStacks,
}

impl Drop for FrameGuard<'_> {
  fn drop(&mut self) {
    self.stacks.pop();
  }
}

/// Rejects an indirection (`A` bound to `B`) that leads back to an abstract
/// already visited by the current `make` call.
pub(crate) fn check_redirect(chain: &[String], target: &str) -> Result<()> {
  match chain.iter().position(|name| name == target) {
    Some(start) => {
      let mut path = chain[start..].to_vec();
      path.push(target.to_owned());
      Err(Error::CircularDependency { path })
    }
    None => Ok(()),
  }
}
