//! The process-wide container slot and its access functions.
//!
//! Nothing is installed implicitly: an application's composition root builds
//! its container, publishes it with [`set_global`] and, when shutting down or
//! between tests, removes it again with [`take_global`].

use crate::container::Container;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL_CONTAINER: Lazy<RwLock<Option<Arc<Container>>>> = Lazy::new(|| RwLock::new(None));

/// Publishes `container` as the global container, returning the one it
/// replaces.
///
/// # Examples
///
/// ```
/// use fibre_container::{global, set_global, take_global, Container};
/// use std::sync::Arc;
///
/// let container = Arc::new(Container::new());
/// set_global(Arc::clone(&container));
/// assert!(Arc::ptr_eq(&global().unwrap(), &container));
/// take_global();
/// ```
pub fn set_global(container: Arc<Container>) -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.write().replace(container)
}

/// The current global container, if one has been published.
pub fn global() -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.read().clone()
}

/// Removes and returns the global container.
pub fn take_global() -> Option<Arc<Container>> {
  GLOBAL_CONTAINER.write().take()
}
